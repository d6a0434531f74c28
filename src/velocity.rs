//! Derived velocity quantities.

use ndarray::{Array, ArrayBase, ArrayView, Data, Dimension, RemoveAxis, Zip};
use num_traits::Float;

use crate::{Error, Result, flags::select_flagged, nan_mean, utils::check_same_shape};

/// Computes the magnitude `sqrt(Σ c²)` of a vector given by its components
///
/// All components must share one shape.
///
/// # Arguments
///
/// * `components` - Component arrays, e.g. `[u, v]` or `[u, v, w]`
///
/// # Returns
///
/// * `Result<Array<T, D>>` - The magnitude, [`Error::EmptyInput`] without components
pub fn magnitude<T, D>(components: &[ArrayView<'_, T, D>]) -> Result<Array<T, D>>
where
    T: Float,
    D: Dimension,
{
    let (first, rest) = components.split_first().ok_or(Error::EmptyInput)?;
    for c in rest {
        check_same_shape(first, c)?;
    }

    let mut sum_sq = first.mapv(|x| x * x);
    for c in rest {
        Zip::from(&mut sum_sq).and(c).for_each(|s, &x| *s = *s + x * x);
    }
    sum_sq.mapv_inplace(Float::sqrt);
    Ok(sum_sq)
}

/// Out-of-plane gradient `dw/dz` from the continuity equation
///
/// Only valid for incompressible flow, where `du/dx + dv/dy + dw/dz = 0`.
pub fn dwdz_from_continuity<T, S1, S2, D>(
    dudx: &ArrayBase<S1, D>,
    dvdy: &ArrayBase<S2, D>,
) -> Result<Array<T, D>>
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    check_same_shape(dudx, dvdy)?;
    Ok(Zip::from(dudx).and(dvdy).map_collect(|&a, &b| -a - b))
}

/// Velocity vector restricted to the measurement plane
#[derive(Debug, Clone, PartialEq)]
pub struct InPlaneVector<T, D: Dimension> {
    /// x-component
    pub u: Array<T, D>,
    /// y-component
    pub v: Array<T, D>,
    /// In-plane magnitude `sqrt(u² + v²)`
    pub mag: Array<T, D>,
}

impl<T: Float, D: Dimension> InPlaneVector<T, D> {
    /// Builds the in-plane vector from its two components
    ///
    /// Any out-of-plane component is left out by construction.
    pub fn new<S1, S2>(u: &ArrayBase<S1, D>, v: &ArrayBase<S2, D>) -> Result<Self>
    where
        S1: Data<Elem = T>,
        S2: Data<Elem = T>,
    {
        let mag = magnitude(&[u.view(), v.view()])?;
        Ok(Self {
            u: u.to_owned(),
            v: v.to_owned(),
            mag,
        })
    }

    /// Averages `u`, `v` and `mag` along `axis` over the samples carrying `bit`
    ///
    /// With the default PIV table, `bit = 1` averages the active vectors only.
    /// The magnitude is the mean of the instantaneous magnitudes.
    pub fn time_average<S>(
        &self,
        flags: &ArrayBase<S, D>,
        axis: isize,
        bit: u32,
    ) -> Result<InPlaneVector<T, D::Smaller>>
    where
        T: Default,
        S: Data<Elem = u32>,
        D: RemoveAxis,
    {
        let average = |component: &Array<T, D>| -> Result<Array<T, D::Smaller>> {
            nan_mean(&select_flagged(component, flags, bit)?, axis)
        };
        Ok(InPlaneVector {
            u: average(&self.u)?,
            v: average(&self.v)?,
            mag: average(&self.mag)?,
        })
    }
}
