//! result — fit snapshots and post-hoc uncertainty estimation.
//!
//! Purpose
//! -------
//! Hold the immutable outcome of a minimization ([`FitResult`]) and the
//! two uncertainty estimators that extend it after the fact: symmetric
//! curvature-based errors ([`FitResult::hesse`]) and asymmetric
//! profile-likelihood errors ([`FitResult::errors`]). Both probe the
//! original objective through freshly built evaluators; neither mutates
//! the stored minimum.
//!
//! Downstream usage
//! ----------------
//! - Statistical-inference consumers read `fmin`, `valid`, the parameter
//!   snapshot, and the recorded error estimates.
//! - A result can be passed back into `minimize` as a warm start; the
//!   chaining path reads its loss/minimizer back-references.

pub mod fit_result;
pub mod hesse;
pub mod profile;

pub use self::fit_result::{
    ErrorKey, FitResult, HesseErrors, HesseMethod, ProfileError, ProfileErrors,
};
