//! minfit — backend-agnostic minimizer abstraction for likelihood fits.
//!
//! Purpose
//! -------
//! Provide one uniform contract for minimizing scalar objectives
//! (negative log-likelihoods, least-squares losses) with heterogeneous
//! underlying algorithms. Quasi-Newton, trust-region, and derivative-free
//! backends are all driven through the same counted, strategy-filtered
//! evaluator, judged by the same convergence criterion, and produce the
//! same [`FitResult`](result::FitResult) supporting Hessian-based and
//! profile-likelihood uncertainty estimation.
//!
//! Key behaviors
//! -------------
//! - Objectives implement the [`Loss`](loss::Loss) capability set, or are
//!   raw functions wrapped with an explicit parameter list and `errordef`.
//! - Minimizers are immutable configuration objects exposing one
//!   operation, [`minimize`](minimize::minimize); all per-call state is
//!   allocated fresh, so one instance is safely reusable, including
//!   concurrently.
//! - Ordinary non-convergence and boundary contact surface as
//!   `valid = false` on the result, never as errors; only contract
//!   violations and unrecoverable evaluation failures raise.
//! - Results can seed later runs (warm starts) and be chained through the
//!   composite [`ChainMinimizer`](minimize::ChainMinimizer).
//!
//! Conventions
//! -----------
//! - Vectors and matrices use the `ndarray`-based aliases
//!   [`Theta`](minimize::Theta), [`Grad`](minimize::Grad),
//!   [`Hessian`](minimize::Hessian); parameter order is set order
//!   everywhere.
//! - Public entry points that can fail return
//!   [`MinResult<T>`](errors::MinResult); callers never see raw backend
//!   errors.
//! - This crate performs no I/O; the optional `obs_slog` feature attaches
//!   a terminal observer to verbose runs.
//!
//! Downstream usage
//! ----------------
//! - Fitting front-ends import the curated surface via
//!   [`prelude`], or depend on `minimize::prelude` for a finer split.
//! - Statistical-inference layers consume the documented
//!   [`FitResult`](result::FitResult) contract and its `hesse`/`errors`
//!   operations.

pub mod errors;
pub mod loss;
pub mod minimize;
pub mod params;
pub mod result;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use minfit::prelude::*;
//
// to import the main surface in a single line.

pub mod prelude {
    pub use crate::errors::{MinError, MinResult};
    pub use crate::loss::{DynLoss, Loss, SimpleLoss};
    pub use crate::minimize::prelude::*;
    pub use crate::params::{ParamSet, ParamSpec, Parameter};
    pub use crate::result::{FitResult, HesseMethod, ProfileError};
}
