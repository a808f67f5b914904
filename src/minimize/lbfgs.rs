//! Quasi-Newton adapter: L-BFGS with a configurable line search.
use std::str::FromStr;

use crate::{
    errors::{MinError, MinResult},
    minimize::{
        adapter::EvalProblem,
        builders::{build_lbfgs_hager_zhang, build_lbfgs_more_thuente},
        minimizer::{Driver, Minimizer, RawMinimum},
        options::MinimizeOptions,
        run::run_quasi_newton,
    },
    result::FitResult,
};

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`); unknown
/// names return [`MinError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = MinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(MinError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// L-BFGS minimizer: immutable configuration, reusable across calls.
pub struct LbfgsMinimizer {
    options: MinimizeOptions,
    line_searcher: LineSearcher,
    mem: Option<usize>,
}

impl LbfgsMinimizer {
    /// # Errors
    /// Returns [`MinError::InvalidLbfgsMem`] for a zero history size.
    pub fn new(
        options: MinimizeOptions, line_searcher: LineSearcher, mem: Option<usize>,
    ) -> MinResult<Self> {
        if let Some(m) = mem {
            if m == 0 {
                return Err(MinError::InvalidLbfgsMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { options, line_searcher, mem })
    }
}

impl Default for LbfgsMinimizer {
    fn default() -> Self {
        Self {
            options: MinimizeOptions::default(),
            line_searcher: LineSearcher::MoreThuente,
            mem: None,
        }
    }
}

impl Minimizer for LbfgsMinimizer {
    fn name(&self) -> &'static str {
        "lbfgs"
    }

    fn options(&self) -> &MinimizeOptions {
        &self.options
    }

    fn run(&self, driver: &Driver, _init: Option<&FitResult>) -> MinResult<RawMinimum> {
        let bounds = driver.bounds();
        let problem = EvalProblem::new(driver.evaluator(), &bounds);
        match self.line_searcher {
            LineSearcher::MoreThuente => {
                let solver = build_lbfgs_more_thuente(&self.options, self.mem)?;
                run_quasi_newton(driver.start(), &self.options, problem, solver)
            }
            LineSearcher::HagerZhang => {
                let solver = build_lbfgs_hager_zhang(&self.options, self.mem)?;
                run_quasi_newton(driver.start(), &self.options, problem, solver)
            }
        }
    }
}
