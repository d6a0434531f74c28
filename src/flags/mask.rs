use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use num_traits::Float;
use tracing::debug;

use crate::{Result, flags::contains_flag, utils::check_same_shape};

/// Copies `data`, writing NaN wherever `keep` rejects the flag value
fn mask_where<T, S1, S2, D, F>(
    data: &ArrayBase<S1, D>,
    flags: &ArrayBase<S2, D>,
    keep: F,
) -> Result<Array<T, D>>
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = u32>,
    D: Dimension,
    F: Fn(u32) -> bool,
{
    check_same_shape(data, flags)?;
    let mut out = data.to_owned();
    Zip::from(&mut out).and(flags).for_each(|x, &flag| {
        if !keep(flag) {
            *x = T::nan();
        }
    });
    Ok(out)
}

/// Masks out the samples carrying a flag
///
/// Every position where `flags & bit != 0` is replaced by NaN, all other
/// positions are copied unchanged.
///
/// # Arguments
///
/// * `data` - The measured series
/// * `flags` - Flag values with exactly the shape of `data`
/// * `bit` - The flag bit(s) to mask out
///
/// # Returns
///
/// * `Result<Array<T, D>>` - The masked copy, or [`Error::DimensionMismatch`](crate::Error::DimensionMismatch)
pub fn apply_mask<T, S1, S2, D>(
    data: &ArrayBase<S1, D>,
    flags: &ArrayBase<S2, D>,
    bit: u32,
) -> Result<Array<T, D>>
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = u32>,
    D: Dimension,
{
    debug!(shape = ?data.shape(), bit, "masking flagged samples");
    mask_where(data, flags, |flag| !contains_flag(flag, bit))
}

/// Keeps only the samples carrying a flag
///
/// The complement of [`apply_mask`]: positions where `flags & bit == 0` are
/// replaced by NaN. `select_flagged(data, flags, 1)` keeps the active vectors
/// of the default PIV table.
pub fn select_flagged<T, S1, S2, D>(
    data: &ArrayBase<S1, D>,
    flags: &ArrayBase<S2, D>,
    bit: u32,
) -> Result<Array<T, D>>
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = u32>,
    D: Dimension,
{
    debug!(shape = ?data.shape(), bit, "selecting flagged samples");
    mask_where(data, flags, |flag| contains_flag(flag, bit))
}

/// Returns true where `mask_bit` is not set
///
/// With the default PIV table, `valid_mask(flags, 2)` selects all vectors
/// outside of the masked region.
pub fn valid_mask<S, D>(flags: &ArrayBase<S, D>, mask_bit: u32) -> Array<bool, D>
where
    S: Data<Elem = u32>,
    D: Dimension,
{
    flags.mapv(|flag| !contains_flag(flag, mask_bit))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;
    use crate::Error;

    #[test]
    fn apply_mask_works() {
        let data = array![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let flags = array![[1u32, 33, 1], [65, 0, 33]];
        let masked = apply_mask(&data, &flags, 32).unwrap();

        assert_eq!(masked.shape(), data.shape());
        for ((m, d), f) in masked.iter().zip(data.iter()).zip(flags.iter()) {
            if f & 32 != 0 {
                assert!(m.is_nan());
            } else {
                assert_eq!(m.to_bits(), d.to_bits());
            }
        }
    }

    #[test]
    fn apply_mask_with_several_bits() {
        let data = array![1.0f64, 2.0, 3.0, 4.0];
        let flags = array![1u32, 32, 64, 96];
        let masked = apply_mask(&data, &flags, 32 | 64).unwrap();
        assert_eq!(masked[0], 1.0);
        assert!(masked.iter().skip(1).all(|v| v.is_nan()));
    }

    #[test]
    fn apply_mask_rejects_shape_mismatch() {
        let data = Array2::<f64>::zeros((2, 3));
        let flags = Array2::<u32>::zeros((3, 2));
        assert_eq!(
            apply_mask(&data, &flags, 1),
            Err(Error::DimensionMismatch {
                expected: vec![2, 3],
                found: vec![3, 2],
            })
        );
    }

    #[test]
    fn select_flagged_keeps_only_flagged_samples() {
        let data = array![1.0f64, 2.0, 3.0, 4.0, 5.0];
        let flags = array![1u32, 0, 33, 2, 65];
        let active = select_flagged(&data, &flags, 1).unwrap();
        assert_eq!(active[0], 1.0);
        assert!(active[1].is_nan());
        assert_eq!(active[2], 3.0);
        assert!(active[3].is_nan());
        assert_eq!(active[4], 5.0);

        // complement of apply_mask for a single bit
        let masked = apply_mask(&data, &flags, 1).unwrap();
        for (kept, dropped) in active.iter().zip(masked.iter()) {
            assert!(kept.is_nan() != dropped.is_nan());
        }
    }

    #[test]
    fn select_flagged_rejects_shape_mismatch() {
        let data = Array2::<f64>::zeros((2, 2));
        let flags = Array2::<u32>::zeros((1, 4));
        assert!(matches!(
            select_flagged(&data, &flags, 1),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn valid_mask_works() {
        let flags = array![1u32, 2, 3, 0];
        assert_eq!(valid_mask(&flags, 2), array![true, false, false, true]);
    }
}
