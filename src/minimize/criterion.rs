//! minimize::criterion — uniform distance-to-minimum verdicts.
//!
//! Purpose
//! -------
//! Make results from different backend algorithms numerically comparable:
//! after a backend run, a single [`Criterion`] computes a non-negative
//! distance-to-minimum estimate and the converged/not-converged verdict,
//! independent of which solver produced the point.
//!
//! Key behaviors
//! -------------
//! - [`Edm`] computes the estimated distance to minimum `½ gᵀH⁻¹g`,
//!   preferring backend-native curvature (inverse Hessian, then Hessian)
//!   over a fresh finite-difference Hessian from the evaluator.
//! - [`GradientNorm`] is the substitutable alternative; callers switch
//!   criteria without changing any other code.
//! - Pseudo-inversion uses symmetric eigendecomposition with eigenvalue
//!   truncation ([`EIGEN_EPS`]); no explicit matrix inverse is formed.
use argmin_math::ArgminL2Norm;
use nalgebra::DMatrix;

use crate::{
    errors::MinResult,
    minimize::{
        evaluator::Evaluator,
        types::{Grad, Hessian, Theta, EIGEN_EPS},
    },
};

/// Post-run state a criterion may consult.
///
/// `gradient`, `hessian`, and `inv_hessian` carry whatever the backend
/// already produced; the evaluator fills the gaps with finite differences.
pub struct ConvergenceInput<'a> {
    pub theta: &'a Theta,
    pub fmin: f64,
    pub gradient: Option<&'a Grad>,
    pub hessian: Option<&'a Hessian>,
    pub inv_hessian: Option<&'a Hessian>,
    pub evaluator: &'a Evaluator,
}

/// Convergence policy: a scalar distance estimate plus a verdict.
pub trait Criterion: Send + Sync {
    fn name(&self) -> &'static str;

    /// Configured tolerance the verdict compares against.
    fn tol(&self) -> f64;

    /// Compute the distance estimate for the given state and remember it.
    fn calculate(&mut self, input: &ConvergenceInput<'_>) -> MinResult<f64>;

    /// Most recent computed value, without recomputation.
    fn last_value(&self) -> Option<f64>;

    /// True iff the last computed value is below the tolerance.
    fn converged(&self) -> bool {
        matches!(self.last_value(), Some(v) if v < self.tol())
    }
}

/// Estimated distance to minimum, `½ gᵀH⁻¹g`.
pub struct Edm {
    tol: f64,
    last: Option<f64>,
}

impl Edm {
    pub fn new(tol: f64) -> Self {
        Self { tol, last: None }
    }
}

impl Criterion for Edm {
    fn name(&self) -> &'static str {
        "edm"
    }

    fn tol(&self) -> f64 {
        self.tol
    }

    fn calculate(&mut self, input: &ConvergenceInput<'_>) -> MinResult<f64> {
        let grad = match input.gradient {
            Some(g) => g.clone(),
            None => input.evaluator.gradient(input.theta)?,
        };
        let edm = match input.inv_hessian {
            Some(inv) => 0.5 * grad.dot(&inv.dot(&grad)),
            None => {
                let hess = match input.hessian {
                    Some(h) => h.clone(),
                    None => input.evaluator.hessian(input.theta)?,
                };
                truncated_quadratic_form(&hess, &grad)
            }
        };
        // Indefinite curvature can push the raw form below zero.
        let edm = edm.max(0.0);
        self.last = Some(edm);
        Ok(edm)
    }

    fn last_value(&self) -> Option<f64> {
        self.last
    }
}

/// L2 norm of the gradient as a convergence proxy.
pub struct GradientNorm {
    tol: f64,
    last: Option<f64>,
}

impl GradientNorm {
    pub fn new(tol: f64) -> Self {
        Self { tol, last: None }
    }
}

impl Criterion for GradientNorm {
    fn name(&self) -> &'static str {
        "grad_norm"
    }

    fn tol(&self) -> f64 {
        self.tol
    }

    fn calculate(&mut self, input: &ConvergenceInput<'_>) -> MinResult<f64> {
        let grad = match input.gradient {
            Some(g) => g.clone(),
            None => input.evaluator.gradient(input.theta)?,
        };
        let norm = grad.l2_norm();
        self.last = Some(norm);
        Ok(norm)
    }

    fn last_value(&self) -> Option<f64> {
        self.last
    }
}

/// Evaluate `½ gᵀH⁺g` through a symmetric eigendecomposition of `H`,
/// ignoring eigenvalues at or below [`EIGEN_EPS`].
fn truncated_quadratic_form(hess: &Hessian, grad: &Grad) -> f64 {
    let n = grad.len();
    let mut h = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        for i in 0..n {
            h[(i, j)] = hess[[i, j]];
        }
    }
    let eigen = h.symmetric_eigen();
    let mut form = 0.0;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda > EIGEN_EPS {
            let mut proj = 0.0;
            for i in 0..n {
                proj += eigen.eigenvectors[(i, k)] * grad[i];
            }
            form += proj * proj / lambda;
        }
    }
    0.5 * form
}
