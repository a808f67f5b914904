//! Execution helpers that run `argmin` solvers and translate their final
//! state into the crate's [`RawMinimum`] intermediate form.
//!
//! One runner exists per solver state shape (quasi-Newton, simplex,
//! trust-region); all three share the same post-processing: best point and
//! value, termination mapping, function-evaluation counters, and whatever
//! native curvature the backend kept.
use argmin::core::{Executor, IterState, Solver, State, TerminationReason, TerminationStatus};
use std::collections::HashMap;

use crate::{
    errors::MinResult,
    minimize::{
        adapter::EvalProblem,
        minimizer::RawMinimum,
        options::MinimizeOptions,
        types::{Grad, Hessian, InfoMap, InfoValue, Theta},
        validation::validate_theta,
    },
};

/// Run a gradient-based solver whose state carries no curvature (L-BFGS).
pub fn run_quasi_newton<'a, S>(
    start: Theta, opts: &MinimizeOptions, problem: EvalProblem<'a>, solver: S,
) -> MinResult<RawMinimum>
where
    S: Solver<EvalProblem<'a>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer
        .configure(|state| state.param(start).max_iters(opts.effective_maxiter() as u64));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = optimizer.run()?.state().clone();
    let theta = validate_theta(state.take_best_param())?;
    let fmin = state.get_best_cost();
    let (converged, status) = termination_pieces(state.get_termination_status());
    Ok(RawMinimum {
        theta,
        fmin,
        converged,
        iterations: state.get_iter() as usize,
        gradient: state.take_gradient(),
        hessian: None,
        inv_hessian: None,
        edm: None,
        status,
        native: counts_info(state.get_func_counts()),
    })
}

/// Run a derivative-free simplex solver (Nelder–Mead).
///
/// The initial simplex is part of the solver, so no starting point is set
/// on the state.
pub fn run_simplex<'a, S>(
    opts: &MinimizeOptions, problem: EvalProblem<'a>, solver: S,
) -> MinResult<RawMinimum>
where
    S: Solver<EvalProblem<'a>, IterState<Theta, (), (), (), (), f64>> + Send + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.max_iters(opts.effective_maxiter() as u64));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = optimizer.run()?.state().clone();
    let theta = validate_theta(state.take_best_param())?;
    let fmin = state.get_best_cost();
    let (converged, status) = termination_pieces(state.get_termination_status());
    Ok(RawMinimum {
        theta,
        fmin,
        converged,
        iterations: state.get_iter() as usize,
        gradient: None,
        hessian: None,
        inv_hessian: None,
        edm: None,
        status,
        native: counts_info(state.get_func_counts()),
    })
}

/// Run a trust-region solver; the state's last Hessian is kept as native
/// curvature for the criterion and Hessian-based errors.
pub fn run_trust_region<'a, S>(
    start: Theta, opts: &MinimizeOptions, problem: EvalProblem<'a>, solver: S,
) -> MinResult<RawMinimum>
where
    S: Solver<EvalProblem<'a>, IterState<Theta, Grad, (), Hessian, (), f64>> + Send + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer
        .configure(|state| state.param(start).max_iters(opts.effective_maxiter() as u64));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = optimizer.run()?.state().clone();
    let theta = validate_theta(state.take_best_param())?;
    let fmin = state.get_best_cost();
    let (converged, status) = termination_pieces(state.get_termination_status());
    Ok(RawMinimum {
        theta,
        fmin,
        converged,
        iterations: state.get_iter() as usize,
        gradient: state.take_gradient(),
        hessian: state.take_hessian(),
        inv_hessian: None,
        edm: None,
        status,
        native: counts_info(state.get_func_counts()),
    })
}

// ---- Helper methods ----

fn termination_pieces(status: &TerminationStatus) -> (bool, String) {
    match status {
        TerminationStatus::NotTerminated => (false, "not terminated".to_string()),
        TerminationStatus::Terminated(reason) => {
            let converged = matches!(
                reason,
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            );
            (converged, format!("{reason:?}"))
        }
    }
}

fn counts_info(counts: &HashMap<String, u64>) -> InfoMap {
    counts.iter().map(|(k, &v)| (k.clone(), InfoValue::Int(v))).collect()
}
