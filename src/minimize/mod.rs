//! minimize — argmin-powered minimizer abstraction with a uniform result.
//!
//! Purpose
//! -------
//! Provide the central abstraction of the crate: immutable [`Minimizer`]
//! configurations exposing one operation, [`minimize`], which drives a
//! backend algorithm through a counted, strategy-filtered [`Evaluator`]
//! and a pluggable convergence [`Criterion`], and returns a
//! [`FitResult`](crate::result::FitResult) directly comparable across
//! backends.
//!
//! Key behaviors
//! -------------
//! - Adapt heterogeneous `argmin` solvers (L-BFGS, trust region,
//!   Nelder–Mead) to one contract via [`adapter::EvalProblem`], the
//!   [`builders`], and the [`run`] helpers.
//! - Normalize every backend's final state into
//!   [`minimizer::RawMinimum`], then judge convergence with a single
//!   criterion so verdicts are comparable across algorithms.
//! - Route invalid evaluations, budgets, and callbacks through the
//!   [`Strategy`] policy object.
//! - Compose minimizers sequentially with [`ChainMinimizer`], each member
//!   warm-started from the previous member's result.
//!
//! Invariants & assumptions
//! ------------------------
//! - Minimizer instances hold configuration only; all mutable state is
//!   call-scoped ([`minimizer::Driver`]) and discarded per call, so one
//!   instance is safely reusable, including concurrently.
//! - Within one call, evaluation counts increase strictly monotonically
//!   and are reported on the result.
//! - Non-convergence and boundary contact are result states, not errors.
//!
//! Downstream usage
//! ----------------
//! - Callers implement [`Loss`](crate::loss::Loss) (or wrap a raw function
//!   via [`api::minimize_fn`]), pick an adapter, and call [`minimize`].
//! - Uncertainty estimation on the returned result re-enters this module
//!   through fresh evaluators; see [`crate::result`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover evaluator counting/strategy routing,
//!   criterion values on analytic quadratics, bound projection in the
//!   adapter, and builder validation.
//! - The integration suite exercises determinism, statelessness, warm
//!   starts, bound handling, and composite chaining end to end.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod chain;
pub mod criterion;
pub mod evaluator;
pub mod finite_diff;
pub mod lbfgs;
pub mod minimizer;
pub mod nelder_mead;
pub mod options;
pub mod run;
pub mod strategy;
pub mod trust_region;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{minimize, minimize_fn};
pub use self::chain::ChainMinimizer;
pub use self::criterion::{ConvergenceInput, Criterion, Edm, GradientNorm};
pub use self::evaluator::Evaluator;
pub use self::lbfgs::{LbfgsMinimizer, LineSearcher};
pub use self::minimizer::{Driver, Minimizer, RawMinimum, Termination};
pub use self::nelder_mead::NelderMeadMinimizer;
pub use self::options::{CriterionKind, GradSource, MinimizeOptions};
pub use self::strategy::{
    BudgetAction, CallbackAction, EvalCallback, EvalSnapshot, InvalidAction, PenaltyStrategy,
    RetryStrategy, Strategy,
};
pub use self::trust_region::TrustRegionMinimizer;
pub use self::types::{Cost, Grad, Hessian, InfoMap, InfoValue, Theta, DEFAULT_LBFGS_MEM};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use minfit::minimize::prelude::*;
//
// to import the main minimizer surface in a single line.

pub mod prelude {
    pub use super::api::{minimize, minimize_fn};
    pub use super::chain::ChainMinimizer;
    pub use super::lbfgs::{LbfgsMinimizer, LineSearcher};
    pub use super::minimizer::{Minimizer, Termination};
    pub use super::nelder_mead::NelderMeadMinimizer;
    pub use super::options::{CriterionKind, GradSource, MinimizeOptions};
    pub use super::strategy::{PenaltyStrategy, RetryStrategy, Strategy};
    pub use super::trust_region::TrustRegionMinimizer;
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
