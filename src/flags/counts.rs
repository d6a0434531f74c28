use alloc::{string::String, vec::Vec};

use ahash::RandomState;
use hashbrown::HashMap;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Dimension, RemoveAxis};
use num_traits::Float;
use tracing::debug;

use crate::{
    Result,
    flags::{FlagMeaning, contains_flag},
    helper::count_as,
    utils::{lane_len, resolve_axis},
};

/// Flags treated as edited or rejected vectors by [`FlagCounts::vdp`]
pub const DEFAULT_DEFECTS: [&str; 5] = [
    "NORESULT",
    "FILTERED",
    "INTERPOLATED",
    "REPLACED",
    "MANUALEDIT",
];

/// Name of the flag counted as the reference population of the VDP
const ACTIVE: &str = "ACTIVE";

/// Per-step occurrence counts of every named flag.
///
/// Row `k` holds the counts of the `k`-th flag of the meaning used to build
/// it, column `i` the step `i` along the accumulation axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagCounts {
    /// Flag names, one per row of `counts`
    names: Vec<String>,
    /// Counts, flags x steps
    counts: Array2<usize>,
}

impl FlagCounts {
    /// Returns the number of steps
    pub fn len(&self) -> usize {
        self.counts.ncols()
    }

    /// Returns the flag names in meaning order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns the count series of a flag
    pub fn get(&self, name: &str) -> Option<ArrayView1<'_, usize>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|row| self.counts.row(row))
    }

    /// Iterates over `(name, counts)` in meaning order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArrayView1<'_, usize>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.counts.rows())
    }

    /// Sums the count series of several flags
    ///
    /// Names that were not counted contribute zero.
    pub fn total(&self, names: &[&str]) -> Array1<usize> {
        let mut total = Array1::zeros(self.len());
        for counts in names.iter().filter_map(|name| self.get(name)) {
            total += &counts;
        }
        total
    }

    /// Computes the valid detection probability per step
    ///
    /// `(ACTIVE - Σ defects) / ACTIVE`. Steps without active vectors yield NaN.
    ///
    /// # Arguments
    ///
    /// * `defects` - Names of the flags marking edited or rejected vectors
    pub fn valid_detection_probability<T: Float>(&self, defects: &[&str]) -> Array1<T> {
        let active = self.total(&[ACTIVE]);
        let edited = self.total(defects);
        active
            .iter()
            .zip(edited.iter())
            .map(|(&a, &e)| {
                let a = count_as::<T>(a);
                (a - count_as(e)) / a
            })
            .collect()
    }

    /// Valid detection probability with [`DEFAULT_DEFECTS`]
    pub fn vdp<T: Float>(&self) -> Array1<T> {
        self.valid_detection_probability(&DEFAULT_DEFECTS)
    }
}

/// Counts the occurrence of every named flag at each step of an axis
///
/// For step `i` along `axis`, the count of a flag is the number of elements of
/// the sub-array at `i` that carry its bit.
///
/// # Arguments
///
/// * `flags` - Flag values
/// * `meaning` - The flags to count
/// * `axis` - The accumulation axis, negative values count from the end
///
/// # Returns
///
/// * `Result<FlagCounts>` - The counts, or an axis error
pub fn eval_flags<S, D>(
    flags: &ArrayBase<S, D>,
    meaning: &FlagMeaning,
    axis: isize,
) -> Result<FlagCounts>
where
    S: Data<Elem = u32>,
    D: RemoveAxis,
{
    let axis = resolve_axis(axis, flags.ndim())?;
    let steps = lane_len(flags, axis)?;
    debug!(shape = ?flags.shape(), axis = axis.index(), "counting flags");

    let bits: Vec<u32> = meaning.iter().map(|(bit, _)| bit).collect();
    let mut counts = Array2::zeros((bits.len(), steps));
    for (step, view) in flags.axis_iter(axis).enumerate() {
        for &flag in view.iter() {
            for (row, &bit) in bits.iter().enumerate() {
                if contains_flag(flag, bit) {
                    counts[[row, step]] += 1;
                }
            }
        }
    }

    Ok(FlagCounts {
        names: meaning.iter().map(|(_, name)| String::from(name)).collect(),
        counts,
    })
}

/// Returns every distinct flag value with its number of occurrences
///
/// Sorted by flag value.
pub fn flag_histogram<S, D>(flags: &ArrayBase<S, D>) -> Vec<(u32, usize)>
where
    S: Data<Elem = u32>,
    D: Dimension,
{
    let mut histogram: HashMap<u32, usize, RandomState> =
        HashMap::with_hasher(RandomState::default());
    for &flag in flags.iter() {
        *histogram.entry(flag).or_insert(0) += 1;
    }

    let mut out: Vec<(u32, usize)> = histogram.into_iter().collect();
    out.sort_unstable_by_key(|(flag, _)| *flag);
    out
}
