//! Gradient-based trust-region adapter with a Steihaug subproblem.
//!
//! The Hessian demanded by the backend flows through the evaluator, so a
//! loss without an analytic Hessian is served finite differences; the last
//! backend Hessian is kept as native curvature for the criterion and for
//! Hessian-based errors.
use crate::{
    errors::MinResult,
    minimize::{
        adapter::EvalProblem,
        builders::build_trust_region,
        minimizer::{Driver, Minimizer, RawMinimum},
        options::MinimizeOptions,
        run::run_trust_region,
    },
    result::FitResult,
};

/// Trust-region minimizer.
pub struct TrustRegionMinimizer {
    options: MinimizeOptions,
}

impl TrustRegionMinimizer {
    pub fn new(options: MinimizeOptions) -> Self {
        Self { options }
    }
}

impl Default for TrustRegionMinimizer {
    fn default() -> Self {
        Self::new(MinimizeOptions::default())
    }
}

impl Minimizer for TrustRegionMinimizer {
    fn name(&self) -> &'static str {
        "trust_region"
    }

    fn options(&self) -> &MinimizeOptions {
        &self.options
    }

    fn run(&self, driver: &Driver, _init: Option<&FitResult>) -> MinResult<RawMinimum> {
        let bounds = driver.bounds();
        let problem = EvalProblem::new(driver.evaluator(), &bounds);
        let solver = build_trust_region(&self.options)?;
        run_trust_region(driver.start(), &self.options, problem, solver)
    }
}
