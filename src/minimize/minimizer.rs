//! minimize::minimizer — base minimizer contract and the shared driver.
//!
//! Purpose
//! -------
//! Define the seam between the uniform `minimize` front door and the
//! concrete algorithm adapters. An adapter implements [`Minimizer::run`],
//! receiving a [`Driver`] (the call-scoped context holding the working
//! parameter set and the evaluator) and returning a [`RawMinimum`] — the
//! common intermediate form every backend is translated into. Everything
//! else (contract validation, warm-start seeding, salvage of interrupted
//! runs, criterion verdicts, boundary detection, parameter write-back,
//! result assembly) lives in [`drive`] and is shared by all adapters.
//!
//! Invariants & assumptions
//! ------------------------
//! - A minimizer instance holds only immutable configuration and may be
//!   reused, including concurrently; every `minimize` call builds its own
//!   [`Driver`], [`Evaluator`], and criterion, and discards them at call
//!   end.
//! - Ordinary non-convergence and boundary contact never raise: they
//!   surface as `valid = false` on the returned result. Only contract
//!   violations and unrecoverable evaluation failures propagate as errors.
//! - The caller's parameter set is written exactly once, with best-known
//!   values, on every non-error return; it is untouched when an error
//!   propagates.
use std::sync::Arc;

use crate::{
    errors::{MinError, MinResult},
    loss::DynLoss,
    minimize::{
        criterion::{ConvergenceInput, Criterion, Edm, GradientNorm},
        evaluator::Evaluator,
        options::{CriterionKind, MinimizeOptions},
        types::{Grad, Hessian, InfoMap, InfoValue, Theta},
        validation::{clamp_into, validate_theta, validate_value},
    },
    params::ParamSet,
    result::FitResult,
};

/// How a minimization attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The criterion value dropped below tolerance.
    Converged,
    /// An iteration or evaluation budget ran out first.
    MaxIter,
    /// A callback or strategy requested early termination.
    Aborted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::MaxIter => "max_iter",
            Termination::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common intermediate form every backend run is translated into.
///
/// `gradient`, `hessian`, and `inv_hessian` carry whatever the backend
/// already maintains so the criterion and `hesse` can prefer native
/// curvature over fresh finite differences. `edm` is pre-set only by
/// composite minimizers that already judged convergence for the final
/// member.
#[derive(Debug, Clone)]
pub struct RawMinimum {
    pub theta: Theta,
    pub fmin: f64,
    pub converged: bool,
    pub iterations: usize,
    pub gradient: Option<Grad>,
    pub hessian: Option<Hessian>,
    pub inv_hessian: Option<Hessian>,
    pub edm: Option<f64>,
    pub status: String,
    pub native: InfoMap,
}

/// Call-scoped context handed to [`Minimizer::run`].
///
/// Owns the working parameter copy and the single evaluator of this
/// attempt; both are discarded when the `minimize` call returns.
pub struct Driver {
    loss: DynLoss,
    options: MinimizeOptions,
    params: ParamSet,
    evaluator: Evaluator,
}

impl Driver {
    pub(crate) fn new(loss: DynLoss, options: MinimizeOptions, params: ParamSet) -> Self {
        let evaluator = Evaluator::new(
            loss.clone(),
            &params,
            options.strategy.clone(),
            options.grad_source,
            options.effective_max_evals(params.len()),
        );
        Self { loss, options, params, evaluator }
    }

    pub fn loss(&self) -> &DynLoss {
        &self.loss
    }

    pub fn options(&self) -> &MinimizeOptions {
        &self.options
    }

    /// Working parameter set at its starting values.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn start(&self) -> Theta {
        self.params.values()
    }

    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.params.bounds()
    }

    /// The attempt's evaluator, pre-wired with loss, strategy, gradient
    /// source, and budget.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// A fresh criterion matching the configured kind and tolerance.
    pub fn criterion(&self) -> Box<dyn Criterion> {
        match self.options.criterion {
            CriterionKind::Edm => Box::new(Edm::new(self.options.tol)),
            CriterionKind::GradNorm => Box::new(GradientNorm::new(self.options.tol)),
        }
    }
}

/// Contract implemented by every concrete minimizer.
///
/// Implementations are immutable configuration objects; the one required
/// operation translates a prepared [`Driver`] into a backend run and back
/// into a [`RawMinimum`]. Adapters that make no use of a prior result keep
/// the default `consumes_init`; the driver then pre-seeds the working
/// parameters from `init` and passes `init = None` through.
pub trait Minimizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn options(&self) -> &MinimizeOptions;

    /// Whether `run` itself wants the prior result (composite minimizers).
    fn consumes_init(&self) -> bool {
        false
    }

    fn run(&self, driver: &Driver, init: Option<&FitResult>) -> MinResult<RawMinimum>;
}

/// Shared driving logic behind the `minimize` front door.
pub(crate) fn drive(
    minimizer: &Arc<dyn Minimizer>, loss: Option<&DynLoss>, params: Option<&mut ParamSet>,
    init: Option<&FitResult>,
) -> MinResult<FitResult> {
    let loss: DynLoss = match (loss, init) {
        (Some(l), _) => l.clone(),
        (None, Some(prev)) => prev.loss().clone(),
        (None, None) => return Err(MinError::MissingObjective),
    };
    let errordef = loss.errordef();
    if !errordef.is_finite() || errordef <= 0.0 {
        return Err(MinError::InvalidErrordef { value: errordef });
    }

    // Working copy: explicit params > init snapshot > loss definition.
    let mut caller_params = params;
    let mut working: ParamSet = match caller_params.as_deref() {
        Some(p) => p.clone(),
        None => match init {
            Some(prev) => prev.params().clone(),
            None => loss.param_set().clone(),
        },
    };
    if working.len() != loss.param_set().len() {
        return Err(MinError::ParamLengthMismatch {
            expected: loss.param_set().len(),
            found: working.len(),
        });
    }
    let pass_init = if minimizer.consumes_init() {
        init
    } else {
        if let Some(prev) = init {
            working.seed_from(prev.params())?;
        }
        None
    };
    loss.check(&working.values())?;

    let driver = Driver::new(loss.clone(), minimizer.options().clone(), working);

    let (raw, salvage_termination) = match minimizer.run(&driver, pass_init) {
        Ok(raw) => (raw, None),
        Err(MinError::Interrupted) => {
            (salvage(&driver, "interrupted", MinError::Interrupted)?, Some(Termination::Aborted))
        }
        Err(MinError::EvalBudgetExhausted { evals }) => (
            salvage(
                &driver,
                "evaluation budget exhausted",
                MinError::EvalBudgetExhausted { evals },
            )?,
            Some(Termination::MaxIter),
        ),
        Err(other) => return Err(other),
    };

    let theta = validate_theta(Some(raw.theta.clone()))?;
    let best = clamp_into(&theta, &driver.bounds());
    validate_value(raw.fmin)?;
    let mut snapshot = driver.params().clone();
    snapshot.set_values(&best)?;

    // Uniform convergence verdict; salvaged runs are never converged and
    // their evaluator may already refuse further calls.
    let mut criterion = driver.criterion();
    let mut edm = raw.edm;
    let mut criterion_failed = false;
    let converged = match salvage_termination {
        Some(_) => false,
        None => match edm {
            Some(value) => value < criterion.tol(),
            None => {
                let input = ConvergenceInput {
                    theta: &best,
                    fmin: raw.fmin,
                    gradient: raw.gradient.as_ref(),
                    hessian: raw.hessian.as_ref(),
                    inv_hessian: raw.inv_hessian.as_ref(),
                    evaluator: driver.evaluator(),
                };
                match criterion.calculate(&input) {
                    Ok(value) => {
                        edm = Some(value);
                        criterion.converged()
                    }
                    Err(_) => {
                        criterion_failed = true;
                        raw.converged
                    }
                }
            }
        },
    };

    let at_limit = snapshot.at_limit();
    let constraints_ok = loss.check(&best).is_ok();
    let termination = salvage_termination.unwrap_or(if converged {
        Termination::Converged
    } else {
        Termination::MaxIter
    });
    let valid = converged && at_limit.is_empty() && constraints_ok;

    let mut info = raw.native;
    info.insert("backend_status".to_string(), InfoValue::Text(raw.status));
    info.insert("iterations".to_string(), InfoValue::Int(raw.iterations as u64));
    info.insert("n_eval".to_string(), InfoValue::Int(driver.evaluator().n_eval() as u64));
    info.insert("n_grad".to_string(), InfoValue::Int(driver.evaluator().n_grad() as u64));
    info.insert("n_hess".to_string(), InfoValue::Int(driver.evaluator().n_hess() as u64));
    info.insert(
        "budget_exhausted".to_string(),
        InfoValue::Bool(driver.evaluator().budget_exhausted()),
    );
    info.insert("criterion".to_string(), InfoValue::Text(criterion.name().to_string()));
    if criterion_failed {
        info.insert("criterion_failed".to_string(), InfoValue::Bool(true));
    }
    if !constraints_ok {
        info.insert("constraints_ok".to_string(), InfoValue::Bool(false));
    }

    if let Some(p) = caller_params.as_deref_mut() {
        p.set_values(&best)?;
    }

    Ok(FitResult::assemble(
        raw.fmin,
        snapshot,
        valid,
        converged,
        termination,
        edm,
        at_limit,
        info,
        loss,
        minimizer.clone(),
        raw.inv_hessian,
        raw.hessian,
    ))
}

/// Build a not-converged minimum from the best point seen so far, or
/// propagate `fallback` when no evaluation ever succeeded.
fn salvage(driver: &Driver, status: &str, fallback: MinError) -> MinResult<RawMinimum> {
    match driver.evaluator().best() {
        Some((theta, fmin)) => Ok(RawMinimum {
            theta,
            fmin,
            converged: false,
            iterations: 0,
            gradient: None,
            hessian: None,
            inv_hessian: None,
            edm: None,
            status: status.to_string(),
            native: InfoMap::new(),
        }),
        None => Err(fallback),
    }
}
