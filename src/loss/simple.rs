//! Wrapper turning a raw function plus a parameter list into a [`Loss`].
use std::sync::Arc;

use crate::{
    errors::{MinError, MinResult},
    loss::traits::{DynLoss, Loss},
    minimize::types::Theta,
    params::{ParamSet, ParamSpec},
};

/// A pure-function objective with an explicit parameter list and errordef.
///
/// The function receives the ordered value vector as a slice; no analytic
/// derivatives are assumed, so the evaluator falls back to finite
/// differences for gradients and Hessians.
pub struct SimpleLoss {
    f: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
    params: ParamSet,
    errordef: f64,
}

impl SimpleLoss {
    /// Wrap `f` over an existing parameter set.
    ///
    /// # Errors
    /// Returns [`MinError::InvalidErrordef`] unless `errordef` is finite
    /// and strictly positive.
    pub fn new<F>(f: F, params: ParamSet, errordef: f64) -> MinResult<Self>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        if !errordef.is_finite() || errordef <= 0.0 {
            return Err(MinError::InvalidErrordef { value: errordef });
        }
        Ok(Self { f: Arc::new(f), params, errordef })
    }

    /// Wrap `f`, auto-creating parameters from loose specs.
    pub fn from_specs<F>(f: F, specs: Vec<ParamSpec>, errordef: f64) -> MinResult<Self>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(f, ParamSet::from_specs(specs)?, errordef)
    }

    /// Wrap `f`, auto-creating unbounded parameters from starting values.
    pub fn from_values<F>(f: F, values: &[f64], errordef: f64) -> MinResult<Self>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(f, ParamSet::from_values(values)?, errordef)
    }

    /// Erase the concrete type into the shared handle results hold.
    pub fn into_dyn(self) -> DynLoss {
        Arc::new(self)
    }
}

impl Loss for SimpleLoss {
    fn value(&self, theta: &Theta) -> MinResult<f64> {
        let slice = theta.as_slice().ok_or(MinError::PotentialBug {
            text: "parameter vector is not contiguous".to_string(),
        })?;
        Ok((self.f)(slice))
    }

    fn param_set(&self) -> &ParamSet {
        &self.params
    }

    fn errordef(&self) -> f64 {
        self.errordef
    }
}
