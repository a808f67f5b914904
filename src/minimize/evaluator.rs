//! minimize::evaluator — counted, strategy-filtered objective access.
//!
//! Purpose
//! -------
//! Wrap a [`Loss`] behind the `value`/`gradient`/`hessian` triple every
//! backend adapter calls against. The three are mutually consistent: they
//! evaluate the same objective at the same point, with finite-difference
//! fallbacks supplied transparently when the loss implements no analytic
//! derivatives.
//!
//! Key behaviors
//! -------------
//! - Count every objective, gradient, and Hessian call; enforce the
//!   evaluation budget and record exhaustion.
//! - Route non-finite values through the configured [`Strategy`]
//!   (deterministic perturbation retries, penalty substitution, or
//!   escalation to a fatal evaluation error).
//! - Invoke the strategy's callback after each successful evaluation and
//!   honor a termination request at the next evaluation boundary.
//! - Track the best point seen so far so interrupted and budget-exhausted
//!   runs can still produce a well-formed result.
//!
//! Invariants & assumptions
//! ------------------------
//! - One evaluator serves exactly one minimization attempt (or one
//!   uncertainty computation); nothing is shared across calls on the same
//!   minimizer instance.
//! - Counters are strictly monotone within a run.
//! - Retried evaluations answer the original query with the perturbed
//!   point's value; the perturbation stays inside declared bounds.
use std::cell::RefCell;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use crate::{
    errors::{MinError, MinResult},
    loss::DynLoss,
    minimize::{
        finite_diff::{fd_gradient, fd_hessian},
        options::GradSource,
        strategy::{BudgetAction, CallbackAction, EvalSnapshot, InvalidAction, Strategy},
        types::{Grad, Hessian, Theta},
        validation::{clamp_into, validate_grad, validate_hessian},
    },
    params::ParamSet,
};
use ndarray::Array1;
use std::sync::Arc;

/// Budget used by post-fit probing evaluators (Hessian errors, profiles).
const PROBE_MAX_EVALS: usize = 1_000_000;

/// Per-attempt objective access with counters, budget, and strategy hooks.
pub struct Evaluator {
    loss: DynLoss,
    strategy: Arc<dyn Strategy>,
    grad_source: GradSource,
    steps: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    max_evals: usize,
    n_eval: AtomicUsize,
    n_grad: AtomicUsize,
    n_hess: AtomicUsize,
    budget_exhausted: AtomicBool,
    stop_requested: AtomicBool,
    best: Mutex<Option<(Theta, f64)>>,
}

impl Evaluator {
    /// Build an evaluator over `loss`, taking step sizes and bounds from
    /// `params` (the working set of the run, which may override the loss's
    /// own parameter definition).
    pub fn new(
        loss: DynLoss, params: &ParamSet, strategy: Arc<dyn Strategy>, grad_source: GradSource,
        max_evals: usize,
    ) -> Self {
        let steps = params.step_sizes();
        let bounds = params.bounds();
        Self {
            loss,
            strategy,
            grad_source,
            steps,
            bounds,
            max_evals,
            n_eval: AtomicUsize::new(0),
            n_grad: AtomicUsize::new(0),
            n_hess: AtomicUsize::new(0),
            budget_exhausted: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            best: Mutex::new(None),
        }
    }

    /// Evaluator for probing an already-fitted objective, with a generous
    /// budget and the loss's default derivative routing.
    pub(crate) fn probe(loss: DynLoss, strategy: Arc<dyn Strategy>) -> Self {
        let params = loss.param_set().clone();
        Self::new(loss, &params, strategy, GradSource::Auto, PROBE_MAX_EVALS)
    }

    /// Evaluate the objective at `theta`.
    ///
    /// Applies the budget check, the strategy's invalid-value policy, and
    /// the per-evaluation callback, in that order.
    ///
    /// # Errors
    /// - [`MinError::Interrupted`] once a callback has requested
    ///   termination (raised at the next boundary, never mid-evaluation).
    /// - [`MinError::EvalBudgetExhausted`] when the budget is spent and the
    ///   strategy halts.
    /// - [`MinError::EvaluationFailed`] when the strategy aborts on a
    ///   non-finite value.
    /// - Any error the loss itself returns.
    pub fn value(&self, theta: &Theta) -> MinResult<f64> {
        if self.stop_requested.load(Ordering::Relaxed) {
            return Err(MinError::Interrupted);
        }
        let mut point = theta.clone();
        let mut attempt = 0usize;
        loop {
            self.charge()?;
            let value = self.loss.value(&point)?;
            if value.is_finite() {
                self.record(&point, value);
                return Ok(value);
            }
            let best = self.best_value();
            match self.strategy.on_invalid(&point, value, attempt, best) {
                InvalidAction::Retry { scale } => {
                    point = self.perturb(theta, scale, attempt);
                    attempt += 1;
                }
                InvalidAction::Penalize { value } => return Ok(value),
                InvalidAction::Abort => {
                    return Err(MinError::EvaluationFailed {
                        value,
                        evals: self.n_eval.load(Ordering::Relaxed),
                    });
                }
            }
        }
    }

    /// Gradient of the objective at `theta`, routed per [`GradSource`].
    ///
    /// # Errors
    /// - [`MinError::AnalyticGradientMissing`] when the configuration
    ///   requires an analytic gradient the loss lacks.
    /// - Validation errors for wrong-dimension or non-finite gradients.
    /// - Any error raised by cost evaluations performed during finite
    ///   differencing.
    pub fn gradient(&self, theta: &Theta) -> MinResult<Grad> {
        self.n_grad.fetch_add(1, Ordering::Relaxed);
        let dim = theta.len();
        match self.grad_source {
            GradSource::Analytic => {
                let grad = self.loss.grad(theta).map_err(|e| match e {
                    MinError::GradientNotImplemented => MinError::AnalyticGradientMissing,
                    other => other,
                })?;
                validate_grad(&grad, dim)?;
                Ok(grad)
            }
            GradSource::Auto => match self.loss.grad(theta) {
                Ok(grad) => {
                    validate_grad(&grad, dim)?;
                    Ok(grad)
                }
                Err(MinError::GradientNotImplemented) => self.numeric_gradient(theta),
                Err(other) => Err(other),
            },
            GradSource::Numeric => self.numeric_gradient(theta),
        }
    }

    /// Hessian of the objective at `theta`.
    ///
    /// Uses the loss's analytic Hessian when implemented; otherwise finite
    /// differences of [`Evaluator::gradient`] (central, falling back to
    /// forward), symmetrized.
    pub fn hessian(&self, theta: &Theta) -> MinResult<Hessian> {
        self.n_hess.fetch_add(1, Ordering::Relaxed);
        let dim = theta.len();
        match self.loss.hessian(theta) {
            Ok(hess) => {
                validate_hessian(&hess, dim)?;
                Ok(hess)
            }
            Err(MinError::HessianNotImplemented) => {
                let closure_err: RefCell<Option<MinError>> = RefCell::new(None);
                let grad_fn = |t: &Theta| match self.gradient(t) {
                    Ok(g) => g,
                    Err(e) => {
                        let mut slot = closure_err.borrow_mut();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                        Array1::from_elem(dim, f64::NAN)
                    }
                };
                let hess = fd_hessian(&grad_fn, theta);
                if let Some(err) = closure_err.take() {
                    return Err(err);
                }
                hess
            }
            Err(other) => Err(other),
        }
    }

    pub fn n_eval(&self) -> usize {
        self.n_eval.load(Ordering::Relaxed)
    }

    pub fn n_grad(&self) -> usize {
        self.n_grad.load(Ordering::Relaxed)
    }

    pub fn n_hess(&self) -> usize {
        self.n_hess.load(Ordering::Relaxed)
    }

    pub fn max_evals(&self) -> usize {
        self.max_evals
    }

    pub fn budget_exhausted(&self) -> bool {
        self.budget_exhausted.load(Ordering::Relaxed)
    }

    /// Best `(point, value)` seen so far, if any evaluation succeeded.
    pub fn best(&self) -> Option<(Theta, f64)> {
        self.best.lock().ok().and_then(|b| b.clone())
    }

    fn best_value(&self) -> Option<f64> {
        self.best.lock().ok().and_then(|b| b.as_ref().map(|(_, v)| *v))
    }

    fn record(&self, theta: &Theta, value: f64) {
        if let Ok(mut best) = self.best.lock() {
            let improved = best.as_ref().map_or(true, |(_, v)| value < *v);
            if improved {
                *best = Some((theta.clone(), value));
            }
        }
        let snap = EvalSnapshot {
            theta,
            value,
            best: self.best_value(),
            n_eval: self.n_eval.load(Ordering::Relaxed),
        };
        if self.strategy.callback(&snap) == CallbackAction::Stop {
            self.stop_requested.store(true, Ordering::Relaxed);
        }
    }

    fn charge(&self) -> MinResult<()> {
        let n = self.n_eval.fetch_add(1, Ordering::Relaxed) + 1;
        if n > self.max_evals {
            self.budget_exhausted.store(true, Ordering::Relaxed);
            match self.strategy.on_budget(n) {
                BudgetAction::Continue => Ok(()),
                BudgetAction::Halt => Err(MinError::EvalBudgetExhausted { evals: n }),
            }
        } else {
            Ok(())
        }
    }

    /// Deterministic perturbation of `origin` for retry attempt `attempt`:
    /// per-coordinate step-size shifts with alternating signs, clamped into
    /// the bound box.
    fn perturb(&self, origin: &Theta, scale: f64, attempt: usize) -> Theta {
        let shifted = Theta::from(
            origin
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let sign = if (attempt + i) % 2 == 0 { 1.0 } else { -1.0 };
                    v + sign * scale * self.steps[i]
                })
                .collect::<Vec<_>>(),
        );
        clamp_into(&shifted, &self.bounds)
    }

    fn numeric_gradient(&self, theta: &Theta) -> MinResult<Grad> {
        let closure_err: RefCell<Option<argmin::core::Error>> = RefCell::new(None);
        let cost_fn = |t: &Theta| match self.value(t) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e.into());
                }
                f64::NAN
            }
        };
        fd_gradient(theta, &cost_fn, &closure_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loss::SimpleLoss,
        minimize::strategy::{PenaltyStrategy, RetryStrategy},
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Counter and budget behavior, including the exhaustion flag.
    // - Strategy routing for NaN values: retry, penalty, and abort paths.
    // - Callback-driven termination at the next evaluation boundary.
    // - Finite-difference gradient/Hessian fallbacks through the evaluator.
    //
    // They intentionally DO NOT cover:
    // - Backend solver interaction (adapter and integration tests).
    // -------------------------------------------------------------------------

    fn quadratic_loss() -> DynLoss {
        SimpleLoss::from_values(|x| x.iter().map(|v| v * v).sum(), &[1.0, -2.0], 0.5)
            .unwrap()
            .into_dyn()
    }

    fn eval_over(
        loss: DynLoss, strategy: Arc<dyn Strategy>, grad_source: GradSource, max_evals: usize,
    ) -> Evaluator {
        let params = loss.param_set().clone();
        Evaluator::new(loss, &params, strategy, grad_source, max_evals)
    }

    #[test]
    fn counts_evaluations_and_tracks_best() {
        let eval =
            eval_over(quadratic_loss(), Arc::new(RetryStrategy::default()), GradSource::Auto, 100);
        eval.value(&array![1.0, -2.0]).unwrap();
        eval.value(&array![0.5, 0.5]).unwrap();
        assert_eq!(eval.n_eval(), 2);
        let (theta, value) = eval.best().expect("best point recorded");
        assert_eq!(theta, array![0.5, 0.5]);
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the budget path: exceeding `max_evals` with the default
    // strategy sets the exhaustion flag and halts with the dedicated error.
    fn budget_exhaustion_halts_with_flag_set() {
        let eval =
            eval_over(quadratic_loss(), Arc::new(RetryStrategy::default()), GradSource::Auto, 2);
        eval.value(&array![0.0, 0.0]).unwrap();
        eval.value(&array![0.0, 0.0]).unwrap();
        let err = eval.value(&array![0.0, 0.0]).expect_err("budget spent");
        match err {
            MinError::EvalBudgetExhausted { evals: 3 } => {}
            other => panic!("Expected EvalBudgetExhausted, got {other:?}"),
        }
        assert!(eval.budget_exhausted());
    }

    #[test]
    // Purpose
    // -------
    // A NaN pocket at the queried point must be recovered by the retry
    // strategy via a perturbed evaluation, not surfaced to the backend.
    fn retry_strategy_recovers_from_nan_pocket() {
        let loss = SimpleLoss::from_values(
            |x| if x[0] == 0.0 { f64::NAN } else { x[0] * x[0] },
            &[0.0],
            0.5,
        )
        .unwrap()
        .into_dyn();
        let eval = eval_over(loss, Arc::new(RetryStrategy::default()), GradSource::Auto, 100);
        let v = eval.value(&array![0.0]).expect("retry must recover");
        assert!(v.is_finite());
        assert!(eval.n_eval() >= 2);
    }

    #[test]
    fn persistent_nan_escalates_to_evaluation_failure() {
        let loss = SimpleLoss::from_values(|_| f64::NAN, &[0.0], 0.5).unwrap().into_dyn();
        let eval = eval_over(loss, Arc::new(RetryStrategy::new(3, 0.1)), GradSource::Auto, 100);
        let err = eval.value(&array![0.0]).expect_err("always NaN");
        match err {
            MinError::EvaluationFailed { .. } => {}
            other => panic!("Expected EvaluationFailed, got {other:?}"),
        }
    }

    #[test]
    fn penalty_strategy_substitutes_instead_of_failing() {
        let loss = SimpleLoss::from_values(
            |x| if x[0] < 0.0 { f64::NAN } else { x[0] },
            &[1.0],
            0.5,
        )
        .unwrap()
        .into_dyn();
        let eval = eval_over(loss, Arc::new(PenaltyStrategy::new(10.0)), GradSource::Auto, 100);
        eval.value(&array![2.0]).unwrap();
        let v = eval.value(&array![-1.0]).expect("penalty substitution");
        assert!((v - 12.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A callback Stop must be honored at the *next* evaluation boundary:
    // the stopping evaluation itself still returns its value.
    fn callback_stop_is_honored_at_next_boundary() {
        let strategy = RetryStrategy::default().with_callback(Arc::new(|snap| {
            if snap.n_eval >= 2 {
                CallbackAction::Stop
            } else {
                CallbackAction::Continue
            }
        }));
        let eval = eval_over(quadratic_loss(), Arc::new(strategy), GradSource::Auto, 100);
        eval.value(&array![1.0, 1.0]).unwrap();
        eval.value(&array![0.5, 0.5]).unwrap();
        let err = eval.value(&array![0.1, 0.1]).expect_err("stop requested");
        assert_eq!(err, MinError::Interrupted);
        assert!(eval.best().is_some());
    }

    #[test]
    fn numeric_gradient_and_hessian_are_consistent_with_value() {
        let eval = eval_over(
            quadratic_loss(),
            Arc::new(RetryStrategy::default()),
            GradSource::Auto,
            10_000,
        );
        let theta = array![1.0, -2.0];
        let grad = eval.gradient(&theta).unwrap();
        assert!((grad[0] - 2.0).abs() < 1e-5);
        assert!((grad[1] + 4.0).abs() < 1e-5);
        let hess = eval.hessian(&theta).unwrap();
        assert!((hess[[0, 0]] - 2.0).abs() < 1e-4);
        assert!((hess[[1, 1]] - 2.0).abs() < 1e-4);
        assert!(hess[[0, 1]].abs() < 1e-4);
        assert!(eval.n_grad() >= 1);
        assert_eq!(eval.n_hess(), 1);
    }

    #[test]
    fn analytic_source_requires_loss_gradient() {
        let eval = eval_over(
            quadratic_loss(),
            Arc::new(RetryStrategy::default()),
            GradSource::Analytic,
            100,
        );
        let err = eval.gradient(&array![0.0, 0.0]).expect_err("no analytic gradient");
        assert_eq!(err, MinError::AnalyticGradientMissing);
    }
}
