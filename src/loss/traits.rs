//! Objective-function trait and its shared handle type.
use std::sync::Arc;

use crate::{
    errors::{MinError, MinResult},
    minimize::types::{Grad, Hessian, Theta},
    params::ParamSet,
};

/// Shared, clonable handle to an objective.
///
/// Results store one of these so that `hesse`/`errors` can rebuild an
/// evaluator over the same objective after the fit has completed.
pub type DynLoss = Arc<dyn Loss>;

/// Capability contract every minimizable objective satisfies.
///
/// Required:
/// - `value(&Theta) -> MinResult<f64>`: evaluate the objective on the
///   ordered value vector matching [`Loss::param_set`] order.
/// - `param_set() -> &ParamSet`: the defining parameters (names, starting
///   values, bounds, step sizes).
/// - `errordef() -> f64`: the objective-value increment corresponding to
///   one standard deviation. Fixed at construction, strictly positive;
///   0.5 for negative log-likelihoods, 1.0 for least-squares.
///
/// Optional:
/// - `grad` / `hessian`: analytic derivatives of the objective. The
///   default implementations return the `*NotImplemented` sentinels, which
///   the evaluator treats as a request for finite differences.
/// - `check`: validation hook for constraint-bearing objectives, called
///   before the first evaluation and on the final point. A failing check
///   on the final point marks the result invalid rather than erroring.
pub trait Loss: Send + Sync {
    fn value(&self, theta: &Theta) -> MinResult<f64>;

    fn param_set(&self) -> &ParamSet;

    fn errordef(&self) -> f64;

    fn grad(&self, _theta: &Theta) -> MinResult<Grad> {
        Err(MinError::GradientNotImplemented)
    }

    fn hessian(&self, _theta: &Theta) -> MinResult<Hessian> {
        Err(MinError::HessianNotImplemented)
    }

    fn check(&self, _theta: &Theta) -> MinResult<()> {
        Ok(())
    }
}
