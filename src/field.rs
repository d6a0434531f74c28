//! Labelled arrays.
//!
//! [`DataField`] and [`FlagField`] own an array together with the names of its
//! dimensions, so that operations can be addressed by dimension name
//! (`"time"`, `"y"`, `"x"`) instead of axis index. Derived fields carry over
//! the dimension names and attributes and update the `standard_name`.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use ndarray::{Array, ArrayD, Dimension, IxDyn};
use num_traits::Float;
use ordered_float::PrimitiveFloat;

use crate::{
    Error, Result, Summary, developing_mean, developing_relative_standard_deviation,
    developing_std,
    flags::{
        FlagCounts, FlagMeaning, apply_mask, eval_flags, explain_flags, flag_histogram,
        flag_label, select_flagged, valid_mask,
    },
    nan_mean,
};

/// Attribute key of the standard name
pub const STANDARD_NAME: &str = "standard_name";

/// Attribute key of the physical units
pub const UNITS: &str = "units";

fn collect_dims<I, N>(dims: I, ndim: usize) -> Result<Vec<String>>
where
    I: IntoIterator<Item = N>,
    N: Into<String>,
{
    let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
    if dims.len() != ndim {
        return Err(Error::InvalidDimensionNames {
            names: dims.len(),
            ndim,
        });
    }
    Ok(dims)
}

fn axis_of(dims: &[String], dim: &str) -> Result<usize> {
    dims.iter()
        .position(|d| d == dim)
        .ok_or_else(|| Error::UnknownDimension(String::from(dim)))
}

/// A named floating point array with dimension names and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DataField<T> {
    name: String,
    dims: Vec<String>,
    data: ArrayD<T>,
    attrs: BTreeMap<String, String>,
}

impl<T: Float + Default> DataField<T> {
    /// Creates a field
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name
    /// * `dims` - One name per dimension of `data`
    /// * `data` - The values
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The field, or [`Error::InvalidDimensionNames`]
    pub fn new<D, I, N>(name: impl Into<String>, dims: I, data: Array<T, D>) -> Result<Self>
    where
        D: Dimension,
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let dims = collect_dims(dims, data.ndim())?;
        Ok(Self {
            name: name.into(),
            dims,
            data: data.into_dyn(),
            attrs: BTreeMap::new(),
        })
    }

    /// Sets an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension names
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// The values
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Consumes the field, returning its values
    pub fn into_data(self) -> ArrayD<T> {
        self.data
    }

    /// All attributes
    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    /// A single attribute
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// The `standard_name` attribute, falling back to the variable name
    pub fn standard_name(&self) -> &str {
        self.attr(STANDARD_NAME).unwrap_or(&self.name)
    }

    /// Axis index of a dimension name
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        axis_of(&self.dims, dim)
    }

    /// New field with the dimensions and attributes of `self`
    fn derive(&self, name: String, standard_name: String, data: ArrayD<T>) -> Self {
        let mut attrs = self.attrs.clone();
        attrs.insert(String::from(STANDARD_NAME), standard_name);
        Self {
            name,
            dims: self.dims.clone(),
            data,
            attrs,
        }
    }

    /// Developing mean along a dimension
    pub fn developing_mean(&self, dim: &str) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let data = developing_mean(&self.data, axis as isize)?;
        Ok(self.derive(
            format!("developing_mean_of_{}", self.name),
            format!("developing_mean_of_{}", self.standard_name()),
            data,
        ))
    }

    /// Developing standard deviation along a dimension
    pub fn developing_std(&self, dim: &str, ddof: isize) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let data = developing_std(&self.data, axis as isize, ddof)?;
        Ok(self.derive(
            format!("developing_std_of_{}", self.name),
            format!("developing_standard_deviation_of_{}", self.standard_name()),
            data,
        ))
    }

    /// Developing relative standard deviation along a dimension
    ///
    /// The result is dimensionless, its `units` attribute is empty.
    pub fn developing_relative_standard_deviation(&self, dim: &str, ddof: isize) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let data = developing_relative_standard_deviation(&self.data, axis as isize, ddof)?;
        let mut field = self.derive(
            format!("developing_rstd_of_{}", self.name),
            format!(
                "developing_relative_standard_deviation_of_{}",
                self.standard_name()
            ),
            data,
        );
        field.attrs.insert(String::from(UNITS), String::new());
        Ok(field)
    }

    /// Arithmetic mean over a dimension, skipping masked (NaN) samples
    ///
    /// The dimension is removed. A `standard_name` attribute, if present,
    /// becomes `arithmetic_mean_of_<standard_name>`.
    pub fn mean_over(&self, dim: &str) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let data = nan_mean(&self.data, axis as isize)?;

        let mut attrs = self.attrs.clone();
        if let Some(sn) = self.attrs.get(STANDARD_NAME) {
            attrs.insert(
                String::from(STANDARD_NAME),
                format!("arithmetic_mean_of_{sn}"),
            );
        }
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(Self {
            name: self.name.clone(),
            dims,
            data,
            attrs,
        })
    }

    fn check_dims(&self, flags: &FlagField) -> Result<()> {
        if self.dims != flags.dims {
            return Err(Error::DimensionNamesMismatch {
                expected: self.dims.clone(),
                found: flags.dims.clone(),
            });
        }
        Ok(())
    }

    /// Masks out samples whose flags carry `bit`
    ///
    /// Dimension names and shape of both fields must agree.
    pub fn apply_mask(&self, flags: &FlagField, bit: u32) -> Result<Self> {
        self.check_dims(flags)?;
        let data = apply_mask(&self.data, &flags.flags, bit)?;
        Ok(Self {
            data,
            ..self.clone()
        })
    }

    /// Keeps only samples whose flags carry `bit`, the others become NaN
    ///
    /// Dimension names and shape of both fields must agree.
    pub fn select_flagged(&self, flags: &FlagField, bit: u32) -> Result<Self> {
        self.check_dims(flags)?;
        let data = select_flagged(&self.data, &flags.flags, bit)?;
        Ok(Self {
            data,
            ..self.clone()
        })
    }

    /// Mean over a dimension of the samples whose flags carry `bit`
    ///
    /// With `bit = 1` this is the average of the active vectors only.
    pub fn time_average(&self, flags: &FlagField, dim: &str, bit: u32) -> Result<Self> {
        self.select_flagged(flags, bit)?.mean_over(dim)
    }

    /// Summary statistics of the whole field
    pub fn stats(&self) -> Summary<T>
    where
        T: PrimitiveFloat,
    {
        Summary::of(&self.data)
    }
}

/// Summarizes several fields, keyed by variable name
pub fn summarize<'a, T, I>(fields: I) -> Vec<(String, Summary<T>)>
where
    T: Float + PrimitiveFloat + Default + 'a,
    I: IntoIterator<Item = &'a DataField<T>>,
{
    fields
        .into_iter()
        .map(|f| (f.name.clone(), f.stats()))
        .collect()
}

/// Flag values with dimension names and the meaning of their bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagField {
    dims: Vec<String>,
    flags: ArrayD<u32>,
    meaning: FlagMeaning,
}

impl FlagField {
    /// Creates a flag field
    pub fn new<D, I, N>(dims: I, flags: Array<u32, D>, meaning: FlagMeaning) -> Result<Self>
    where
        D: Dimension,
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let dims = collect_dims(dims, flags.ndim())?;
        Ok(Self {
            dims,
            flags: flags.into_dyn(),
            meaning,
        })
    }

    /// Dimension names
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// The flag values
    pub fn flags(&self) -> &ArrayD<u32> {
        &self.flags
    }

    /// The meaning of the flag bits
    pub fn meaning(&self) -> &FlagMeaning {
        &self.meaning
    }

    /// Decodes every flag value into its names
    pub fn explain(&self) -> Array<Vec<&str>, IxDyn> {
        explain_flags(&self.flags, &self.meaning)
    }

    /// Per-step counts of every named flag along a dimension
    pub fn eval(&self, dim: &str) -> Result<FlagCounts> {
        let axis = axis_of(&self.dims, dim)?;
        eval_flags(&self.flags, &self.meaning, axis as isize)
    }

    /// True where `mask_bit` is not set
    pub fn valid_mask(&self, mask_bit: u32) -> ArrayD<bool> {
        valid_mask(&self.flags, mask_bit)
    }

    /// Distinct flag values with their label and number of occurrences
    pub fn histogram(&self) -> Vec<(u32, String, usize)> {
        flag_histogram(&self.flags)
            .into_iter()
            .map(|(value, count)| (value, flag_label(value, &self.meaning), count))
            .collect()
    }
}
