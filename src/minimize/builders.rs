//! minimize::builders — backend solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind small, focused builders. Each
//! builder maps the crate-level [`MinimizeOptions`] onto the backend's own
//! stopping knobs, set strictly tighter than the criterion tolerance so
//! the uniform convergence verdict keeps the final say.
//!
//! Conventions
//! -----------
//! - Builders never set the starting point or `max_iters`; those are
//!   runtime concerns applied by the runners in [`run`](crate::minimize::run).
//! - Errors surface as [`MinResult`]; raw `argmin::core::Error` values
//!   never leak across module boundaries.
use crate::{
    errors::MinResult,
    minimize::{
        options::MinimizeOptions,
        types::{
            HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Simplex,
            TrustRegionSteihaug, DEFAULT_LBFGS_MEM, Theta,
        },
    },
};
use argmin::solver::{
    neldermead::NelderMead,
    quasinewton::LBFGS,
    trustregion::{Steihaug, TrustRegion},
};

/// Backend gradient tolerance as a fraction of the criterion tolerance.
const BACKEND_GRAD_TOL_FACTOR: f64 = 1e-3;

/// Backend simplex standard-deviation tolerance as a fraction of the
/// criterion tolerance.
const BACKEND_SD_TOL_FACTOR: f64 = 1e-6;

/// L-BFGS with Hager–Zhang line search.
pub fn build_lbfgs_hager_zhang(
    opts: &MinimizeOptions, mem: Option<usize>,
) -> MinResult<LbfgsHagerZhang> {
    let linesearch = HagerZhangLS::new();
    let lbfgs = LBFGS::new(linesearch, mem.unwrap_or(DEFAULT_LBFGS_MEM))
        .with_tolerance_grad(opts.tol * BACKEND_GRAD_TOL_FACTOR)?;
    Ok(lbfgs)
}

/// L-BFGS with More–Thuente line search.
pub fn build_lbfgs_more_thuente(
    opts: &MinimizeOptions, mem: Option<usize>,
) -> MinResult<LbfgsMoreThuente> {
    let linesearch = MoreThuenteLS::new();
    let lbfgs = LBFGS::new(linesearch, mem.unwrap_or(DEFAULT_LBFGS_MEM))
        .with_tolerance_grad(opts.tol * BACKEND_GRAD_TOL_FACTOR)?;
    Ok(lbfgs)
}

/// Nelder–Mead over an axis-aligned initial simplex: the starting point
/// plus one step-size displacement per coordinate.
pub fn build_simplex(
    opts: &MinimizeOptions, start: &Theta, steps: &[f64],
) -> MinResult<Simplex> {
    let mut vertices = Vec::with_capacity(start.len() + 1);
    vertices.push(start.clone());
    for (i, &step) in steps.iter().enumerate() {
        let mut vertex = start.clone();
        vertex[i] += step;
        vertices.push(vertex);
    }
    let solver =
        NelderMead::new(vertices).with_sd_tolerance(opts.tol * BACKEND_SD_TOL_FACTOR)?;
    Ok(solver)
}

/// Trust region with a Steihaug conjugate-gradient subproblem.
pub fn build_trust_region(_opts: &MinimizeOptions) -> MinResult<TrustRegionSteihaug> {
    let subproblem = Steihaug::new();
    Ok(TrustRegion::new(subproblem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn simplex_has_one_vertex_per_dimension_plus_one() {
        let opts = MinimizeOptions::default();
        let start = array![1.0, 2.0, 3.0];
        let steps = vec![0.1, 0.2, 0.3];
        let solver = build_simplex(&opts, &start, &steps);
        assert!(solver.is_ok());
    }

    #[test]
    fn lbfgs_builders_accept_default_options() {
        let opts = MinimizeOptions::default();
        assert!(build_lbfgs_hager_zhang(&opts, None).is_ok());
        assert!(build_lbfgs_more_thuente(&opts, Some(11)).is_ok());
    }
}
