//! Consistency checks shared across the minimizer layer.
//!
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Hessian validation**: [`validate_hessian`] enforces square shape and
//!   finite entries.
//! - **Minimum point**: [`validate_theta`] ensures a candidate best point
//!   exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks scalars for
//!   finiteness.
use crate::{
    errors::{MinError, MinResult},
    minimize::types::{Grad, Hessian, Theta},
};

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`MinError::GradientDimMismatch`] if the length does not match `dim`.
/// - [`MinError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> MinResult<()> {
    if grad.len() != dim {
        return Err(MinError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(MinError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate the shape and entries of a Hessian matrix.
///
/// # Errors
/// - [`MinError::HessianDimMismatch`] if dimensions do not match `dim`.
/// - [`MinError::InvalidHessian`] if any entry is non-finite.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> MinResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(MinError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((i, j), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(MinError::InvalidHessian { row: i, col: j, value });
        }
    }
    Ok(())
}

/// Validate and unwrap a candidate minimum point.
///
/// # Errors
/// - [`MinError::MissingMinimum`] if no vector was produced.
/// - [`MinError::InvalidTheta`] if any element is non-finite.
pub fn validate_theta(theta: Option<Theta>) -> MinResult<Theta> {
    match theta {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(MinError::InvalidTheta { index, value });
                }
            }
            Ok(t)
        }
        None => Err(MinError::MissingMinimum),
    }
}

/// Validate that a scalar objective value is finite.
///
/// # Errors
/// Returns [`MinError::NonFiniteValue`] for NaN or ±∞.
pub fn validate_value(value: f64) -> MinResult<()> {
    if !value.is_finite() {
        return Err(MinError::NonFiniteValue { value });
    }
    Ok(())
}

/// Clamp a point into a bound box, component-wise.
pub fn clamp_into(theta: &Theta, bounds: &[(f64, f64)]) -> Theta {
    Theta::from(
        theta
            .iter()
            .zip(bounds.iter())
            .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
            .collect::<Vec<_>>(),
    )
}
