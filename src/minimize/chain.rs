//! Composite adapter delegating sequentially to wrapped minimizers.
use std::sync::Arc;

use crate::{
    errors::{MinError, MinResult},
    minimize::{
        api::minimize,
        minimizer::{Driver, Minimizer, RawMinimum},
        options::MinimizeOptions,
        types::{InfoMap, InfoValue},
    },
    result::FitResult,
};

/// Runs each wrapped minimizer exactly once, in order, warm-starting every
/// member from the previous member's result.
///
/// Declares `consumes_init`, so a caller-supplied prior result seeds the
/// first member instead of being flattened into starting values by the
/// driver. The final member's convergence verdict and curvature carry
/// through to the composite result; per-member minima are recorded in the
/// diagnostics map.
pub struct ChainMinimizer {
    members: Vec<Arc<dyn Minimizer>>,
    options: MinimizeOptions,
}

impl ChainMinimizer {
    /// # Errors
    /// Returns [`MinError::EmptyChain`] for an empty member list.
    pub fn new(members: Vec<Arc<dyn Minimizer>>, options: MinimizeOptions) -> MinResult<Self> {
        if members.is_empty() {
            return Err(MinError::EmptyChain);
        }
        Ok(Self { members, options })
    }

    pub fn members(&self) -> &[Arc<dyn Minimizer>] {
        &self.members
    }
}

impl Minimizer for ChainMinimizer {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn options(&self) -> &MinimizeOptions {
        &self.options
    }

    fn consumes_init(&self) -> bool {
        true
    }

    fn run(&self, driver: &Driver, init: Option<&FitResult>) -> MinResult<RawMinimum> {
        let mut working = driver.params().clone();
        let mut current: Option<FitResult> = None;
        let mut native = InfoMap::new();
        for (i, member) in self.members.iter().enumerate() {
            let prev = current.as_ref().or(init);
            let result = minimize(member, Some(driver.loss()), Some(&mut working), prev)?;
            native.insert(
                format!("member{i}_{}_fmin", member.name()),
                InfoValue::Float(result.fmin()),
            );
            native.insert(
                format!("member{i}_{}_valid", member.name()),
                InfoValue::Bool(result.valid()),
            );
            current = Some(result);
        }
        let last = current.ok_or(MinError::EmptyChain)?;
        Ok(RawMinimum {
            theta: last.params().values(),
            fmin: last.fmin(),
            converged: last.converged(),
            iterations: self.members.len(),
            gradient: None,
            hessian: last.native_hessian().cloned(),
            inv_hessian: last.native_inv_hessian().cloned(),
            edm: last.edm(),
            status: format!("chain of {} members", self.members.len()),
            native,
        })
    }
}
