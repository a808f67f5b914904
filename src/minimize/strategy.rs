//! Policies for invalid objective values, budget exhaustion, and
//! per-evaluation callbacks.
use std::sync::Arc;

use crate::minimize::types::Theta;

/// What to do with a NaN/Inf objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidAction {
    /// Re-evaluate at a deterministically perturbed point; `scale`
    /// multiplies the per-parameter step sizes.
    Retry { scale: f64 },
    /// Hand this substitute value to the backend instead of failing.
    Penalize { value: f64 },
    /// Escalate to a fatal evaluation error.
    Abort,
}

/// What to do once the evaluation budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetAction {
    /// Keep evaluating past the budget.
    Continue,
    /// Stop the run; the driver salvages the best-seen point.
    Halt,
}

/// Verdict of the per-evaluation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Continue,
    /// Terminate at the next evaluation boundary; the run returns the best
    /// point found so far, marked not converged.
    Stop,
}

/// Read-only view of one successful evaluation, handed to callbacks.
#[derive(Debug)]
pub struct EvalSnapshot<'a> {
    pub theta: &'a Theta,
    pub value: f64,
    pub best: Option<f64>,
    pub n_eval: usize,
}

/// Per-evaluation user callback.
pub type EvalCallback = Arc<dyn Fn(&EvalSnapshot<'_>) -> CallbackAction + Send + Sync>;

/// Policy object consulted by the evaluator.
///
/// All hooks have conservative defaults: invalid values abort, a spent
/// budget halts, and no callback is installed.
pub trait Strategy: Send + Sync {
    /// Decide the fate of a non-finite evaluation. `attempt` counts
    /// retries already made for the current point, starting at zero.
    fn on_invalid(
        &self, _theta: &Theta, _value: f64, _attempt: usize, _best: Option<f64>,
    ) -> InvalidAction {
        InvalidAction::Abort
    }

    /// Decide whether evaluation may continue past the budget.
    fn on_budget(&self, _n_eval: usize) -> BudgetAction {
        BudgetAction::Halt
    }

    /// Inspect a successful evaluation; may request early termination.
    fn callback(&self, _snap: &EvalSnapshot<'_>) -> CallbackAction {
        CallbackAction::Continue
    }
}

/// Default retry count before [`RetryStrategy`] gives up on a point.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Default strategy: bounded, deterministic perturbation retries.
///
/// Each retry shifts the offending point by `scale * step_size` per
/// coordinate with alternating signs, growing the scale linearly with the
/// attempt count; once `max_retries` is exhausted the evaluation aborts.
pub struct RetryStrategy {
    pub max_retries: usize,
    pub scale: f64,
    pub callback: Option<EvalCallback>,
}

impl RetryStrategy {
    pub fn new(max_retries: usize, scale: f64) -> Self {
        Self { max_retries, scale, callback: None }
    }

    pub fn with_callback(mut self, callback: EvalCallback) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, 0.1)
    }
}

impl Strategy for RetryStrategy {
    fn on_invalid(
        &self, _theta: &Theta, _value: f64, attempt: usize, _best: Option<f64>,
    ) -> InvalidAction {
        if attempt < self.max_retries {
            InvalidAction::Retry { scale: self.scale * (attempt + 1) as f64 }
        } else {
            InvalidAction::Abort
        }
    }

    fn callback(&self, snap: &EvalSnapshot<'_>) -> CallbackAction {
        self.callback.as_ref().map_or(CallbackAction::Continue, |cb| cb(snap))
    }
}

/// Substitute a best-seen-plus-offset penalty for invalid values.
///
/// Keeps gradient-free backends moving through NaN pockets by reporting a
/// value that is always worse than anything seen so far. Falls back to
/// `base` before any finite value exists.
pub struct PenaltyStrategy {
    pub offset: f64,
    pub base: f64,
    pub callback: Option<EvalCallback>,
}

impl PenaltyStrategy {
    pub fn new(offset: f64) -> Self {
        Self { offset, base: 1e12, callback: None }
    }

    pub fn with_callback(mut self, callback: EvalCallback) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl Default for PenaltyStrategy {
    fn default() -> Self {
        Self::new(1e3)
    }
}

impl Strategy for PenaltyStrategy {
    fn on_invalid(
        &self, _theta: &Theta, _value: f64, _attempt: usize, best: Option<f64>,
    ) -> InvalidAction {
        InvalidAction::Penalize { value: best.unwrap_or(self.base) + self.offset }
    }

    fn callback(&self, snap: &EvalSnapshot<'_>) -> CallbackAction {
        self.callback.as_ref().map_or(CallbackAction::Continue, |cb| cb(snap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn retry_escalates_after_budgeted_attempts() {
        let strategy = RetryStrategy::new(2, 0.1);
        let theta = array![0.0];
        match strategy.on_invalid(&theta, f64::NAN, 0, None) {
            InvalidAction::Retry { scale } => assert!((scale - 0.1).abs() < 1e-12),
            other => panic!("Expected Retry, got {other:?}"),
        }
        match strategy.on_invalid(&theta, f64::NAN, 2, None) {
            InvalidAction::Abort => {}
            other => panic!("Expected Abort, got {other:?}"),
        }
    }

    #[test]
    fn penalty_tracks_best_seen_value() {
        let strategy = PenaltyStrategy::new(10.0);
        let theta = array![0.0];
        match strategy.on_invalid(&theta, f64::INFINITY, 0, Some(3.0)) {
            InvalidAction::Penalize { value } => assert!((value - 13.0).abs() < 1e-12),
            other => panic!("Expected Penalize, got {other:?}"),
        }
        match strategy.on_invalid(&theta, f64::INFINITY, 0, None) {
            InvalidAction::Penalize { value } => assert!(value > 1e12),
            other => panic!("Expected Penalize, got {other:?}"),
        }
    }
}
