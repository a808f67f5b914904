//! result::hesse — curvature-based covariance and symmetric errors.
//!
//! Purpose
//! -------
//! Convert a Hessian at the stored minimum into a covariance matrix and
//! per-parameter symmetric errors, without ever forming an explicit matrix
//! inverse: all computations go through a symmetric eigendecomposition
//! with eigenvalue truncation, so weakly identified directions inflate the
//! reported uncertainties instead of destabilizing them.
//!
//! Conventions
//! -----------
//! - The covariance scale is `2 · errordef · H⁺`: for a negative
//!   log-likelihood (`errordef = 0.5`) this reduces to `H⁻¹`, for a
//!   least-squares objective (`errordef = 1`) to `2 H⁻¹`.
//! - A confidence level `cl` scales errors by the standard-normal quantile
//!   `z = Φ⁻¹((1 + cl) / 2)`.
//! - Eigenvalues at or below [`EIGEN_EPS`] are treated as numerically zero
//!   and excluded from pseudoinverse directions.
use nalgebra::DMatrix;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{
    errors::{MinError, MinResult},
    loss::DynLoss,
    minimize::{
        evaluator::Evaluator,
        strategy::RetryStrategy,
        types::{Hessian, Theta, EIGEN_EPS},
    },
};
use std::sync::Arc;

/// Standard-normal quantile converting a confidence level into an
/// error-bar scale factor.
///
/// # Errors
/// Returns [`MinError::InvalidConfidenceLevel`] unless `0 < cl < 1`.
pub fn z_value(cl: f64) -> MinResult<f64> {
    if !cl.is_finite() || cl <= 0.0 || cl >= 1.0 {
        return Err(MinError::InvalidConfidenceLevel { cl });
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MinError::PotentialBug { text: format!("standard normal: {e}") })?;
    Ok(normal.inverse_cdf(0.5 * (1.0 + cl)))
}

/// Finite-difference Hessian of `loss` at `theta` through a fresh probing
/// evaluator (the minimum point itself is never mutated).
pub(crate) fn numeric_hessian(loss: &DynLoss, theta: &Theta) -> MinResult<Hessian> {
    let evaluator = Evaluator::probe(loss.clone(), Arc::new(RetryStrategy::default()));
    evaluator.hessian(theta)
}

/// Covariance `2 · errordef · H⁺` from a Hessian.
pub(crate) fn covariance_from_hessian(hess: &Hessian, errordef: f64) -> Hessian {
    let mut cov = pseudo_inverse(hess);
    cov.mapv_inplace(|v| 2.0 * errordef * v);
    cov
}

/// Covariance `2 · errordef · H⁻¹` from an already-inverted Hessian.
pub(crate) fn covariance_from_inverse(inv: &Hessian, errordef: f64) -> Hessian {
    inv.mapv(|v| 2.0 * errordef * v)
}

/// Symmetric per-parameter errors `z · √cov_ii`.
///
/// Non-positive diagonal entries (flat or indefinite directions) yield a
/// zero error for that parameter rather than NaN.
pub(crate) fn diagonal_errors(cov: &Hessian, z: f64) -> Vec<f64> {
    (0..cov.nrows()).map(|i| z * cov[[i, i]].max(0.0).sqrt()).collect()
}

/// Moore–Penrose pseudoinverse of a symmetric matrix via eigendecomposition
/// with eigenvalue truncation at [`EIGEN_EPS`].
fn pseudo_inverse(hess: &Hessian) -> Hessian {
    let n = hess.nrows();
    let mut h = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        for i in 0..n {
            h[(i, j)] = hess[[i, j]];
        }
    }
    let eigen = h.symmetric_eigen();
    let q = eigen.eigenvectors;
    let eigenvals = eigen.eigenvalues;
    let mut inv = Hessian::zeros((n, n));
    for (k, &lambda) in eigenvals.iter().enumerate() {
        if lambda > EIGEN_EPS {
            for i in 0..n {
                for j in 0..n {
                    inv[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
                }
            }
        }
    }
    inv
}
