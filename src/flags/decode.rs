use alloc::{string::String, vec::Vec};

use ndarray::{Array, ArrayBase, Data, Dimension};
use tracing::trace;

use crate::flags::{FlagMeaning, INACTIVE};

/// Returns true if any bit of `bit` is set in `value`
#[inline]
pub const fn contains_flag(value: u32, bit: u32) -> bool {
    value & bit != 0
}

/// Returns the names of the bits set in a flag value
///
/// A value of `0` is reported as [`INACTIVE`]. Otherwise the names follow the
/// iteration order of `meaning`. Bits without a name are skipped.
///
/// # Arguments
///
/// * `value` - The flag value
/// * `meaning` - The mapping from bit to name
///
/// # Returns
///
/// * `Vec<&str>` - The names of all known bits set in `value`
///
/// # Examples
///
/// ```
/// # use piv_statistics::flags::{FlagMeaning, flag_names};
/// let meaning: FlagMeaning = [(1, "ACTIVE"), (4, "REPLACED")].into_iter().collect();
/// assert_eq!(flag_names(5, &meaning), ["ACTIVE", "REPLACED"]);
/// assert_eq!(flag_names(0, &meaning), ["INACTIVE"]);
/// ```
pub fn flag_names(value: u32, meaning: &FlagMeaning) -> Vec<&str> {
    if value == 0 {
        return vec![INACTIVE];
    }

    let unknown = value & !meaning.known_bits();
    if unknown != 0 {
        trace!(value, unknown, "flag value carries unnamed bits");
    }

    meaning
        .iter()
        .filter(|(bit, _)| contains_flag(value, *bit))
        .map(|(_, name)| name)
        .collect()
}

/// Returns the flag names joined by `_`, e.g. `ACTIVE_REPLACED`
pub fn flag_label(value: u32, meaning: &FlagMeaning) -> String {
    flag_names(value, meaning).join("_")
}

/// Decodes every element of a flag array
///
/// The output has the shape of `flags`. A zero-dimensional array decodes a
/// single value.
pub fn explain_flags<'a, S, D>(
    flags: &ArrayBase<S, D>,
    meaning: &'a FlagMeaning,
) -> Array<Vec<&'a str>, D>
where
    S: Data<Elem = u32>,
    D: Dimension,
{
    flags.map(|&value| flag_names(value, meaning))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ndarray::{arr0, array};

    use super::*;

    fn meaning() -> FlagMeaning {
        [(1, "ACTIVE"), (4, "REPLACED")].into_iter().collect()
    }

    #[test]
    fn flag_names_works() {
        assert_eq!(flag_names(5, &meaning()), vec!["ACTIVE", "REPLACED"]);
        assert_eq!(flag_names(4, &meaning()), vec!["REPLACED"]);
    }

    #[test]
    fn zero_is_inactive() {
        assert_eq!(flag_names(0, &meaning()), vec![INACTIVE]);
        assert_eq!(flag_names(0, &FlagMeaning::piv()), vec![INACTIVE]);
        assert_eq!(flag_names(0, &FlagMeaning::new()), vec![INACTIVE]);
    }

    #[test]
    fn unknown_bits_are_ignored() {
        // 2 and 8 are not named
        assert_eq!(flag_names(15, &meaning()), vec!["ACTIVE", "REPLACED"]);
        assert!(flag_names(2, &meaning()).is_empty());
    }

    #[test]
    fn names_follow_meaning_order() {
        let meaning: FlagMeaning = [(4, "REPLACED"), (1, "ACTIVE")].into_iter().collect();
        assert_eq!(flag_names(5, &meaning), vec!["REPLACED", "ACTIVE"]);
    }

    #[test]
    fn names_match_set_bits() {
        let meaning = FlagMeaning::piv();
        for value in 1..=255u32 {
            let names = flag_names(value, &meaning);
            for (bit, name) in meaning.iter() {
                assert_eq!(names.contains(&name), contains_flag(value, bit));
            }
        }
    }

    #[test]
    fn flag_label_works() {
        assert_eq!(flag_label(5, &meaning()), "ACTIVE_REPLACED");
        assert_eq!(flag_label(0, &meaning()), "INACTIVE");
    }

    #[test]
    fn explain_flags_keeps_shape() {
        let m = meaning();
        let flags = array![[0u32, 1], [4, 5]];
        let explained = explain_flags(&flags, &m);
        assert_eq!(explained.shape(), &[2, 2]);
        assert_eq!(explained[[0, 0]], vec![INACTIVE]);
        assert_eq!(explained[[0, 1]], vec!["ACTIVE"]);
        assert_eq!(explained[[1, 1]], vec!["ACTIVE", "REPLACED"]);

        let scalar = explain_flags(&arr0(5u32), &m);
        assert_eq!(scalar[()], vec!["ACTIVE", "REPLACED"]);
    }
}
