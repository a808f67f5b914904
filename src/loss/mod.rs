//! loss — objective-function contract consumed by every minimizer.
//!
//! Purpose
//! -------
//! Define the capability set an objective must satisfy to be minimized:
//! a scalar [`Loss::value`], an ordered [`Loss::param_set`], and a strictly
//! positive [`Loss::errordef`] that converts objective-value differences
//! into confidence-level error bars. Analytic derivatives and a constraint
//! check are optional; missing derivatives are signalled with sentinel
//! errors that route the evaluator onto its finite-difference fallbacks.
//!
//! Downstream usage
//! ----------------
//! - Model code implements [`Loss`] directly for rich objectives.
//! - Plain functions are wrapped via [`SimpleLoss`], which pairs a raw
//!   `Fn(&[f64]) -> f64` with an explicit parameter list and errordef.
//! - Results hold a [`DynLoss`] so uncertainty estimation can re-probe the
//!   objective near the stored minimum.

pub mod simple;
pub mod traits;

pub use self::simple::SimpleLoss;
pub use self::traits::{DynLoss, Loss};
