//! Derivative-free adapter: Nelder–Mead over a step-size-built simplex.
use crate::{
    errors::MinResult,
    minimize::{
        adapter::EvalProblem,
        builders::build_simplex,
        minimizer::{Driver, Minimizer, RawMinimum},
        options::MinimizeOptions,
        run::run_simplex,
    },
    result::FitResult,
};

/// Nelder–Mead minimizer; needs no gradients at all.
pub struct NelderMeadMinimizer {
    options: MinimizeOptions,
}

impl NelderMeadMinimizer {
    pub fn new(options: MinimizeOptions) -> Self {
        Self { options }
    }
}

impl Default for NelderMeadMinimizer {
    fn default() -> Self {
        Self::new(MinimizeOptions::default())
    }
}

impl Minimizer for NelderMeadMinimizer {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn options(&self) -> &MinimizeOptions {
        &self.options
    }

    fn run(&self, driver: &Driver, _init: Option<&FitResult>) -> MinResult<RawMinimum> {
        let bounds = driver.bounds();
        let problem = EvalProblem::new(driver.evaluator(), &bounds);
        let solver =
            build_simplex(&self.options, &driver.start(), &driver.params().step_sizes())?;
        run_simplex(&self.options, problem, solver)
    }
}
