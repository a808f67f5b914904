//! High-level entry points for driving a minimizer.
//!
//! [`minimize`] is the uniform front door shared by every adapter: it
//! accepts a loss-contract object and/or a prior result, validates the
//! input contract, and returns a [`FitResult`] whose `valid` flag absorbs
//! ordinary non-convergence. [`minimize_fn`] is the convenience path for
//! raw functions, wrapping them in a [`SimpleLoss`] with auto-created
//! parameters.
use std::sync::Arc;

use crate::{
    errors::MinResult,
    loss::{DynLoss, SimpleLoss},
    minimize::minimizer::{drive, Minimizer},
    params::{ParamSet, ParamSpec},
    result::FitResult,
};

/// Minimize `loss`, starting from `params`.
///
/// # Behavior
/// - `loss = None` requires `init`; the objective is then taken from the
///   prior result, enabling minimizer chaining.
/// - `params = None` starts from the `init` snapshot when given, else from
///   the loss's own parameter definition. When supplied, the set receives
///   the best-known values exactly once on return and is untouched if an
///   error propagates.
/// - `init` supplies warm-start information. For adapters that do not
///   declare [`Minimizer::consumes_init`], matching parameters are
///   pre-seeded from the prior result and the adapter sees `init = None`.
///
/// # Errors
/// Contract violations (missing objective, non-positive errordef, length
/// mismatches) and unrecoverable evaluation failures. Ordinary
/// non-convergence is reported through `valid = false`, never an error.
pub fn minimize(
    minimizer: &Arc<dyn Minimizer>, loss: Option<&DynLoss>, params: Option<&mut ParamSet>,
    init: Option<&FitResult>,
) -> MinResult<FitResult> {
    drive(minimizer, loss, params, init)
}

/// Minimize a raw function with an explicit `errordef`, auto-creating
/// parameters from the supplied specs.
pub fn minimize_fn<F>(
    minimizer: &Arc<dyn Minimizer>, f: F, specs: Vec<ParamSpec>, errordef: f64,
) -> MinResult<FitResult>
where
    F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
{
    let loss = SimpleLoss::from_specs(f, specs, errordef)?.into_dyn();
    drive(minimizer, Some(&loss), None, None)
}
