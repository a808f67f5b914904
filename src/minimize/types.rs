//! minimize::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! minimizer layer. By defining these in one place, the rest of the crate
//! stays agnostic to `ndarray` and Argmin generics and can more easily
//! evolve if the backend changes.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are treated conceptually as column vectors with
//!   length equal to the number of free parameters.
//! - `Hessian` is a dense square matrix with dimension
//!   `theta.len() × theta.len()` when used.
//! - `Cost` is the scalar objective value being minimized; no sign flips
//!   happen anywhere in this crate.
//! - [`InfoMap`] carries backend-specific diagnostics on results; keys are
//!   stable strings, values are the small [`InfoValue`] union.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::LBFGS,
    trustregion::{Steihaug, TrustRegion},
};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Parameter vector `θ` in set order.
pub type Theta = Array1<f64>;

/// Gradient vector `∇f(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Dense Hessian matrix; `n × n` for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Opaque diagnostics mapping carried on fit results.
pub type InfoMap = BTreeMap<String, InfoValue>;

/// Value union for [`InfoMap`] entries.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    Int(u64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for InfoValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfoValue::Bool(v) => write!(f, "{v}"),
            InfoValue::Int(v) => write!(f, "{v}"),
            InfoValue::Float(v) => write!(f, "{v}"),
            InfoValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Eigenvalues at or below this magnitude are treated as numerically zero
/// when curvature matrices are pseudo-inverted.
pub const EIGEN_EPS: f64 = 1e-12;

/// Default iteration budget when options leave it unset.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Objective evaluations granted per backend iteration when no explicit
/// evaluation budget is configured.
pub const EVALS_PER_ITER: usize = 20;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Simplex solver specialized to this crate's numeric types.
pub type Simplex = NelderMead<Theta, Cost>;

/// Trust-region solver with a Steihaug subproblem.
pub type TrustRegionSteihaug = TrustRegion<Steihaug<Theta, Cost>, Cost>;
