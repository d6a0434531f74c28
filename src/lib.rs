#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits, clippy::len_without_is_empty)]

#[macro_use]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub(crate) use utils::helper;

mod error;
pub use error::{Error, Result};

mod developing_moments;
pub use developing_moments::{DevelopingMoments, VarianceEstimator};

mod developing;
pub use developing::{
    developing_mean, developing_relative_standard_deviation, developing_std,
    developing_std_with,
};

pub mod flags;

mod summary;
pub use summary::{Summary, nan_mean};

mod normality;
pub use normality::{NormalityMethod, is_gaussian, normality_p_values};

pub mod velocity;

mod field;
pub use field::{DataField, FlagField, STANDARD_NAME, UNITS, summarize};
