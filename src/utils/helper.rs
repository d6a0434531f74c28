use alloc::vec::Vec;

use num_traits::Float;
use ordered_float::{OrderedFloat, PrimitiveFloat};

/// Returns the median from a sorted slice
///
/// # Arguments
///
/// * `ss` - The sorted slice
///
/// # Returns
///
/// * `Option<T>` - The median, or `None` if the slice is empty
#[inline]
pub fn median_from_sorted_slice<T: Float>(ss: &[T]) -> Option<T> {
    let len = ss.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    let _2 = T::one() + T::one();
    if len.is_multiple_of(2) {
        Some((ss[mid - 1] + ss[mid]) / _2)
    } else {
        Some(ss[mid])
    }
}

/// Collects the finite values of an iterator in ascending order
///
/// NaN and infinite values are dropped before sorting.
pub fn sorted_finite<'a, T, I>(values: I) -> Vec<T>
where
    T: Float + PrimitiveFloat + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out: Vec<T> = values
        .into_iter()
        .copied()
        .filter(|v| Float::is_finite(*v))
        .collect();
    out.sort_unstable_by_key(|&v| OrderedFloat(v));
    out
}

/// Converts a count into the float type
#[inline]
pub fn count_as<T: Float>(n: usize) -> T {
    T::from(n).unwrap_or_else(T::nan)
}
