//! Immutable per-minimizer configuration, validated at construction.
use std::sync::Arc;

use crate::{
    errors::{MinError, MinResult},
    minimize::{
        strategy::{RetryStrategy, Strategy},
        types::{DEFAULT_MAX_ITER, EVALS_PER_ITER},
    },
};

/// Where gradients come from during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradSource {
    /// Use the loss's analytic gradient when implemented, finite
    /// differences otherwise.
    Auto,
    /// Always use finite differences, even when an analytic gradient
    /// exists.
    Numeric,
    /// Require the analytic gradient; its absence is a contract violation.
    Analytic,
}

/// Which convergence criterion judges the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionKind {
    /// Estimated distance to minimum, `½ gᵀH⁻¹g`.
    Edm,
    /// L2 norm of the gradient.
    GradNorm,
}

/// Minimizer-level configuration, fixed at construction.
///
/// Fields:
/// - `tol` — criterion tolerance; the run counts as converged when the
///   criterion value drops below it.
/// - `maxiter` — backend iteration cap; `None` uses
///   [`DEFAULT_MAX_ITER`].
/// - `max_evals` — evaluator call budget; `None` derives
///   `maxiter * EVALS_PER_ITER * n_params`.
/// - `grad_source` — gradient provenance, see [`GradSource`].
/// - `criterion` — convergence judge, see [`CriterionKind`].
/// - `verbose` — attaches an observer (behind the `obs_slog` feature) and
///   prints progress.
/// - `strategy` — invalid-value policy and optional per-evaluation
///   callback.
#[derive(Clone)]
pub struct MinimizeOptions {
    pub tol: f64,
    pub maxiter: Option<usize>,
    pub max_evals: Option<usize>,
    pub grad_source: GradSource,
    pub criterion: CriterionKind,
    pub verbose: bool,
    pub strategy: Arc<dyn Strategy>,
}

impl MinimizeOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`MinError::InvalidTol`] for a non-finite or non-positive `tol`.
    /// - [`MinError::InvalidMaxIter`] / [`MinError::InvalidMaxEvals`] for
    ///   zero budgets.
    pub fn new(
        tol: f64, maxiter: Option<usize>, max_evals: Option<usize>, grad_source: GradSource,
        criterion: CriterionKind, verbose: bool, strategy: Arc<dyn Strategy>,
    ) -> MinResult<Self> {
        if !tol.is_finite() {
            return Err(MinError::InvalidTol { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(MinError::InvalidTol { tol, reason: "Tolerance must be positive." });
        }
        if let Some(maxiter) = maxiter {
            if maxiter == 0 {
                return Err(MinError::InvalidMaxIter {
                    max_iter: maxiter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        if let Some(max_evals) = max_evals {
            if max_evals == 0 {
                return Err(MinError::InvalidMaxEvals {
                    max_evals,
                    reason: "Evaluation budget must be greater than zero.",
                });
            }
        }
        Ok(Self { tol, maxiter, max_evals, grad_source, criterion, verbose, strategy })
    }

    /// Convenience constructor varying only the tolerance.
    pub fn with_tol(tol: f64) -> MinResult<Self> {
        let defaults = Self::default();
        Self::new(
            tol,
            defaults.maxiter,
            defaults.max_evals,
            defaults.grad_source,
            defaults.criterion,
            defaults.verbose,
            defaults.strategy,
        )
    }

    /// Effective backend iteration cap.
    pub fn effective_maxiter(&self) -> usize {
        self.maxiter.unwrap_or(DEFAULT_MAX_ITER)
    }

    /// Effective evaluator call budget for an `n_params`-dimensional run.
    pub fn effective_max_evals(&self, n_params: usize) -> usize {
        self.max_evals
            .unwrap_or_else(|| self.effective_maxiter() * EVALS_PER_ITER * n_params.max(1))
    }
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tol: 1e-3,
            maxiter: None,
            max_evals: None,
            grad_source: GradSource::Auto,
            criterion: CriterionKind::Edm,
            verbose: false,
            strategy: Arc::new(RetryStrategy::default()),
        }
    }
}

impl std::fmt::Debug for MinimizeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinimizeOptions")
            .field("tol", &self.tol)
            .field("maxiter", &self.maxiter)
            .field("max_evals", &self.max_evals)
            .field("grad_source", &self.grad_source)
            .field("criterion", &self.criterion)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_tolerance() {
        let err = MinimizeOptions::with_tol(0.0).expect_err("tol 0 must fail");
        match err {
            MinError::InvalidTol { .. } => {}
            other => panic!("Expected InvalidTol, got {other:?}"),
        }
    }

    #[test]
    fn derives_eval_budget_from_iterations() {
        let opts = MinimizeOptions::default();
        assert_eq!(
            opts.effective_max_evals(3),
            DEFAULT_MAX_ITER * EVALS_PER_ITER * 3
        );
        let explicit = MinimizeOptions::new(
            1e-3,
            Some(10),
            Some(42),
            GradSource::Auto,
            CriterionKind::Edm,
            false,
            Arc::new(RetryStrategy::default()),
        )
        .unwrap();
        assert_eq!(explicit.effective_max_evals(3), 42);
    }
}
