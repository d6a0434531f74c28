use alloc::{string::String, vec::Vec};

use core::fmt;

/// Convenience alias used by every fallible operation of the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while validating the arguments of an operation.
///
/// Every variant is detected before any numeric work starts, so a failed call
/// never leaves a partially computed result behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Axis index outside of `[-ndim, ndim)`
    InvalidAxis {
        /// The axis as requested by the caller
        axis: isize,
        /// Number of dimensions of the array
        ndim: usize,
    },
    /// Negative delta degrees of freedom
    InvalidDegreesOfFreedom(isize),
    /// Two arrays that must be aligned element for element have different shapes
    DimensionMismatch {
        /// Shape of the reference array
        expected: Vec<usize>,
        /// Shape of the offending array
        found: Vec<usize>,
    },
    /// Two labelled arrays carry different dimension names
    DimensionNamesMismatch {
        /// Dimension names of the reference array
        expected: Vec<String>,
        /// Dimension names of the offending array
        found: Vec<String>,
    },
    /// Number of dimension names differs from the number of array dimensions
    InvalidDimensionNames {
        /// Number of names given
        names: usize,
        /// Number of dimensions of the array
        ndim: usize,
    },
    /// A dimension name that is not part of the labelled array
    UnknownDimension(String),
    /// Zero-length accumulation axis, or no input at all
    EmptyInput,
    /// Normality test method that is not supported
    UnknownNormalityMethod(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidAxis { axis, ndim } => {
                write!(f, "invalid axis {axis} for an array with {ndim} dimension(s)")
            }
            Error::InvalidDegreesOfFreedom(ddof) => {
                write!(f, "invalid delta degrees of freedom {ddof}, must be >= 0")
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected shape {expected:?}, found {found:?}")
            }
            Error::DimensionNamesMismatch { expected, found } => {
                write!(f, "dimension names mismatch: expected {expected:?}, found {found:?}")
            }
            Error::InvalidDimensionNames { names, ndim } => {
                write!(f, "{names} dimension name(s) given for {ndim} dimension(s)")
            }
            Error::UnknownDimension(name) => write!(f, "unknown dimension \"{name}\""),
            Error::EmptyInput => write!(f, "empty input"),
            Error::UnknownNormalityMethod(name) => {
                write!(f, "unknown normality test method \"{name}\"")
            }
        }
    }
}

impl core::error::Error for Error {}
