use alloc::vec::Vec;

use ndarray::{ArrayBase, Axis, Data, Dimension};

use crate::{Error, Result};

/// Resolves a possibly negative axis index against the number of dimensions
///
/// Negative values count from the end, `-1` being the last axis.
///
/// # Arguments
///
/// * `axis` - The requested axis
/// * `ndim` - The number of dimensions of the array
///
/// # Returns
///
/// * `Result<Axis>` - The resolved axis, or [`Error::InvalidAxis`]
#[inline]
pub fn resolve_axis(axis: isize, ndim: usize) -> Result<Axis> {
    let resolved = if axis < 0 {
        ndim.checked_sub(axis.unsigned_abs())
    } else {
        Some(axis.unsigned_abs())
    };
    match resolved {
        Some(index) if index < ndim => Ok(Axis(index)),
        _ => Err(Error::InvalidAxis { axis, ndim }),
    }
}

/// Converts a signed delta degrees of freedom into a count
#[inline]
pub fn validate_ddof(ddof: isize) -> Result<usize> {
    usize::try_from(ddof).map_err(|_| Error::InvalidDegreesOfFreedom(ddof))
}

/// Length of the lanes along `axis`, failing on a zero-length axis
#[inline]
pub fn lane_len<S, D>(array: &ArrayBase<S, D>, axis: Axis) -> Result<usize>
where
    S: Data,
    D: Dimension,
{
    match array.len_of(axis) {
        0 => Err(Error::EmptyInput),
        n => Ok(n),
    }
}

/// Fails with [`Error::DimensionMismatch`] unless both arrays have the same shape
pub fn check_same_shape<S1, S2, D>(
    expected: &ArrayBase<S1, D>,
    found: &ArrayBase<S2, D>,
) -> Result<()>
where
    S1: Data,
    S2: Data,
    D: Dimension,
{
    if expected.shape() == found.shape() {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected: Vec::from(expected.shape()),
            found: Vec::from(found.shape()),
        })
    }
}
