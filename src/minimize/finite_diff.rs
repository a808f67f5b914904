//! minimize::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference gradient and Hessian approximations around a
//! parameter vector, together with validation and symmetry cleanup, so that
//! the rest of the minimizer can request derivatives without depending
//! directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute gradients with error capture and post-hoc validation via
//!   [`fd_gradient`], preferring central differences and retrying with
//!   forward differences when validation fails.
//! - Construct central-difference Hessians, falling back to forward
//!   differences when validation fails, via [`fd_hessian`].
//! - Enforce symmetry of Hessian matrices in-place with
//!   [`symmetrize_hess`] to prepare them for curvature checks and
//!   factorizations.
//!
//! Conventions
//! -----------
//! - Steps are `finitediff`'s fixed relative steps (`√ε` of the component
//!   magnitude for gradients), so results are deterministic for a fixed
//!   point.
//! - The scalar closure handed to [`fd_gradient`] cannot return `Result`;
//!   any error raised by the underlying objective is routed into the
//!   shared `closure_err` cell, the closure returns `NaN`, and the captured
//!   error is surfaced after the finite-difference pass.
use crate::{
    errors::MinResult,
    minimize::{
        types::{Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Central-difference gradient with forward-difference fallback.
///
/// # Errors
/// - Any error captured in `closure_err` while `func` was being sampled.
/// - [`MinError::InvalidGradient`] / [`MinError::GradientDimMismatch`] when
///   both difference schemes produce an invalid gradient.
///
/// [`MinError::InvalidGradient`]: crate::errors::MinError::InvalidGradient
/// [`MinError::GradientDimMismatch`]: crate::errors::MinError::GradientDimMismatch
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> MinResult<Grad> {
    let dim = theta.len();
    closure_err.replace(None);
    let fd_grad = theta.central_diff(func);
    if closure_err.borrow().is_none() && validate_grad(&fd_grad, dim).is_ok() {
        return Ok(fd_grad);
    }
    // Central differencing stepped somewhere the objective could not be
    // evaluated; forward differences stay closer to the expansion point.
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Finite-difference Hessian of a gradient map, validated and symmetrized.
///
/// Central differences are attempted first; any validation failure (shape
/// or finiteness) causes an automatic fallback to forward differences,
/// whose validation result is the one surfaced.
///
/// # Errors
/// - [`MinError::HessianDimMismatch`] / [`MinError::InvalidHessian`] when
///   the forward-difference Hessian also fails validation.
///
/// [`MinError::HessianDimMismatch`]: crate::errors::MinError::HessianDimMismatch
/// [`MinError::InvalidHessian`]: crate::errors::MinError::InvalidHessian
pub fn fd_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> MinResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

/// Replace each off-diagonal pair with its average, in place.
///
/// The diagonal is left untouched. Called only after a Hessian has passed
/// [`validate_hessian`].
pub(crate) fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
