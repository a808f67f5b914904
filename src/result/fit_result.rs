//! result::fit_result — immutable fit snapshot with append-only errors.
//!
//! Purpose
//! -------
//! Hold everything a completed minimization produced: the minimum value,
//! an immutable snapshot of the parameter values and identities, the
//! validity verdict and its ingredients (convergence, boundary contact,
//! constraint check), backend diagnostics, and back-references to the loss
//! and the producing minimizer. Uncertainty estimates are appended after
//! the fact through [`FitResult::hesse`] and [`FitResult::errors`]; the
//! core fields are set exactly once and never change.
//!
//! Key behaviors
//! -------------
//! - `hesse` computes symmetric per-parameter errors from curvature at the
//!   stored minimum, either numerically or from retained backend
//!   curvature, keyed by `(name, cl)`; same-key calls overwrite, different
//!   keys coexist.
//! - `errors` computes profile-likelihood asymmetric errors; when
//!   profiling discovers a strictly lower minimum, the scan stops, the
//!   original result is left unmodified, and a freshly minimized alternate
//!   result is returned for the caller to adopt.
//! - A result can seed a later `minimize` call as a warm start; doing so
//!   reads but never mutates it.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    errors::MinResult,
    loss::DynLoss,
    minimize::{
        minimizer::{Minimizer, Termination},
        types::{Hessian, InfoMap, Theta},
    },
    params::ParamSet,
    result::{hesse, profile},
};

/// Key for stored uncertainty records: user-chosen (or method-derived)
/// name plus the confidence level. The level is keyed by its bit pattern
/// so that identical `f64` inputs land on identical keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ErrorKey {
    name: String,
    cl_bits: u64,
}

impl ErrorKey {
    pub fn new(name: &str, cl: f64) -> Self {
        Self { name: name.to_string(), cl_bits: cl.to_bits() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cl(&self) -> f64 {
        f64::from_bits(self.cl_bits)
    }
}

/// Source of curvature for [`FitResult::hesse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HesseMethod {
    /// Finite-difference Hessian at the stored minimum through a fresh
    /// evaluator.
    Numeric,
    /// Curvature the producing backend maintained (inverse Hessian or
    /// Hessian); errors if the backend kept none.
    Native,
}

impl HesseMethod {
    /// Default record name derived from the method.
    pub fn key(&self) -> &'static str {
        match self {
            HesseMethod::Numeric => "hesse",
            HesseMethod::Native => "native_hesse",
        }
    }
}

/// Symmetric, curvature-based uncertainty record.
#[derive(Debug, Clone)]
pub struct HesseErrors {
    pub method: HesseMethod,
    pub cl: f64,
    /// Per-parameter symmetric error, in parameter units.
    pub errors: BTreeMap<String, f64>,
    /// Full covariance at the minimum, in set order.
    pub covariance: Hessian,
}

/// Asymmetric error of one parameter from a profile scan.
///
/// `lower` and `upper` are signed offsets from the value at the minimum
/// (`lower <= 0 <= upper`); a side truncated by a declared bound is
/// flagged rather than extrapolated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileError {
    pub lower: f64,
    pub upper: f64,
    pub lower_at_limit: bool,
    pub upper_at_limit: bool,
}

/// Profile-likelihood uncertainty record.
#[derive(Debug, Clone)]
pub struct ProfileErrors {
    pub cl: f64,
    pub errors: BTreeMap<String, ProfileError>,
}

/// Immutable snapshot of a completed minimization.
#[derive(Clone)]
pub struct FitResult {
    fmin: f64,
    params: ParamSet,
    valid: bool,
    converged: bool,
    termination: Termination,
    edm: Option<f64>,
    at_limit: Vec<String>,
    info: InfoMap,
    loss: DynLoss,
    minimizer: Arc<dyn Minimizer>,
    native_inv_hessian: Option<Hessian>,
    native_hessian: Option<Hessian>,
    hesse_records: BTreeMap<ErrorKey, HesseErrors>,
    profile_records: BTreeMap<ErrorKey, ProfileErrors>,
}

impl FitResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        fmin: f64, params: ParamSet, valid: bool, converged: bool, termination: Termination,
        edm: Option<f64>, at_limit: Vec<String>, info: InfoMap, loss: DynLoss,
        minimizer: Arc<dyn Minimizer>, native_inv_hessian: Option<Hessian>,
        native_hessian: Option<Hessian>,
    ) -> Self {
        Self {
            fmin,
            params,
            valid,
            converged,
            termination,
            edm,
            at_limit,
            info,
            loss,
            minimizer,
            native_inv_hessian,
            native_hessian,
            hesse_records: BTreeMap::new(),
            profile_records: BTreeMap::new(),
        }
    }

    /// Minimum objective value.
    pub fn fmin(&self) -> f64 {
        self.fmin
    }

    /// Converged, off every bound, constraints satisfied.
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// The criterion's convergence verdict alone.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Criterion value at the minimum, when one was computed.
    pub fn edm(&self) -> Option<f64> {
        self.edm
    }

    /// Names of parameters whose fitted value touches a declared bound.
    pub fn at_limit(&self) -> &[String] {
        &self.at_limit
    }

    /// Immutable snapshot of the parameters at the minimum.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Fitted values in set order.
    pub fn values(&self) -> Theta {
        self.params.values()
    }

    /// Backend-specific diagnostics.
    pub fn info(&self) -> &InfoMap {
        &self.info
    }

    /// The objective this result was fitted from.
    pub fn loss(&self) -> &DynLoss {
        &self.loss
    }

    /// The minimizer that produced this result.
    pub fn minimizer(&self) -> &Arc<dyn Minimizer> {
        &self.minimizer
    }

    pub fn errordef(&self) -> f64 {
        self.loss.errordef()
    }

    /// Stored curvature-based uncertainty records.
    pub fn hesse_records(&self) -> &BTreeMap<ErrorKey, HesseErrors> {
        &self.hesse_records
    }

    /// Stored profile-likelihood uncertainty records.
    pub fn profile_records(&self) -> &BTreeMap<ErrorKey, ProfileErrors> {
        &self.profile_records
    }

    pub(crate) fn native_inv_hessian(&self) -> Option<&Hessian> {
        self.native_inv_hessian.as_ref()
    }

    pub(crate) fn native_hessian(&self) -> Option<&Hessian> {
        self.native_hessian.as_ref()
    }

    /// Symmetric errors from an (approximate) inverse Hessian at the
    /// stored minimum.
    ///
    /// The outcome is stored under `(name, cl)` — `name` defaulting to the
    /// method's key — and also returned. Re-invoking with the same key
    /// overwrites that record; different keys coexist. The minimum point
    /// is never mutated.
    ///
    /// # Errors
    /// - [`MinError::NativeCurvatureUnavailable`] for
    ///   [`HesseMethod::Native`] when the backend kept no curvature.
    /// - [`MinError::InvalidConfidenceLevel`] for `cl` outside (0, 1).
    /// - Evaluation errors from the finite-difference Hessian.
    ///
    /// [`MinError::NativeCurvatureUnavailable`]: crate::errors::MinError::NativeCurvatureUnavailable
    /// [`MinError::InvalidConfidenceLevel`]: crate::errors::MinError::InvalidConfidenceLevel
    pub fn hesse(
        &mut self, method: HesseMethod, name: Option<&str>, cl: f64,
    ) -> MinResult<&HesseErrors> {
        let z = hesse::z_value(cl)?;
        let errordef = self.loss.errordef();
        let covariance = match method {
            HesseMethod::Numeric => {
                let hessian = hesse::numeric_hessian(&self.loss, &self.values())?;
                hesse::covariance_from_hessian(&hessian, errordef)
            }
            HesseMethod::Native => match (&self.native_inv_hessian, &self.native_hessian) {
                (Some(inv), _) => hesse::covariance_from_inverse(inv, errordef),
                (None, Some(hessian)) => hesse::covariance_from_hessian(hessian, errordef),
                (None, None) => {
                    return Err(crate::errors::MinError::NativeCurvatureUnavailable {
                        minimizer: self.minimizer.name().to_string(),
                    });
                }
            },
        };
        let per_param = hesse::diagonal_errors(&covariance, z);
        let errors = self
            .params
            .names()
            .into_iter()
            .zip(per_param)
            .collect::<BTreeMap<String, f64>>();
        let key = ErrorKey::new(name.unwrap_or(method.key()), cl);
        let record = HesseErrors { method, cl, errors, covariance };
        match self.hesse_records.entry(key) {
            std::collections::btree_map::Entry::Occupied(mut occupied) => {
                occupied.insert(record);
                Ok(occupied.into_mut())
            }
            std::collections::btree_map::Entry::Vacant(vacant) => Ok(vacant.insert(record)),
        }
    }

    /// Profile-likelihood asymmetric errors for every parameter.
    ///
    /// Returns the per-parameter error mapping together with an alternate
    /// result: `None` normally, or `Some(better)` when profiling found a
    /// point with a strictly lower objective value than the stored
    /// minimum. In the latter case the stored minimum was not the true
    /// minimum, this result is left unmodified, nothing is recorded, and
    /// callers MUST switch to the returned result.
    ///
    /// Completed scans are stored under `(name, cl)` — `name` defaulting
    /// to `"profile"` — with the same overwrite semantics as
    /// [`FitResult::hesse`].
    pub fn errors(
        &mut self, name: Option<&str>, cl: f64,
    ) -> MinResult<(BTreeMap<String, ProfileError>, Option<FitResult>)> {
        let (errors, better) = profile::profile_errors(self, cl)?;
        if better.is_none() {
            let key = ErrorKey::new(name.unwrap_or("profile"), cl);
            self.profile_records.insert(key, ProfileErrors { cl, errors: errors.clone() });
        }
        Ok((errors, better))
    }
}

impl std::fmt::Debug for FitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitResult")
            .field("fmin", &self.fmin)
            .field("valid", &self.valid)
            .field("converged", &self.converged)
            .field("termination", &self.termination)
            .field("edm", &self.edm)
            .field("at_limit", &self.at_limit)
            .field("params", &self.params)
            .field("minimizer", &self.minimizer.name())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for FitResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FitResult(fmin={:.6}, valid={}, termination={}, edm={})",
            self.fmin,
            self.valid,
            self.termination,
            self.edm.map(|e| format!("{e:.3e}")).unwrap_or_else(|| "n/a".to_string()),
        )
    }
}
