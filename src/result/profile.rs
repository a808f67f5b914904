//! result::profile — profile-likelihood asymmetric error scans.
//!
//! Purpose
//! -------
//! Estimate asymmetric per-parameter uncertainties by re-minimizing the
//! objective with one parameter fixed and scanning that parameter until
//! the profiled objective rises by `errordef · z(cl)²` above the stored
//! minimum. The free remainder is handled as a reduced objective (the
//! fixed coordinate is removed from the optimizer's parameter vector, not
//! pinned by degenerate bounds); with a single parameter the profile
//! degenerates to direct evaluation.
//!
//! Key behaviors
//! -------------
//! - Seed each direction's scan with the curvature-based error, expand an
//!   outward bracket geometrically, then bisect to the crossing.
//! - Flag a side truncated by a declared bound instead of extrapolating.
//! - Watch every profiled value against the stored minimum: a point
//!   strictly below it (beyond [`NEW_MIN_FRACTION`] of errordef) aborts
//!   the scan, triggers a fresh full minimization from the discovered
//!   point, and hands the alternate result back to the caller.
use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::Array1;

use crate::{
    errors::{MinError, MinResult},
    loss::{DynLoss, Loss},
    minimize::{
        api::minimize,
        minimizer::Minimizer,
        types::{Grad, Hessian, Theta},
        validation::validate_value,
    },
    params::ParamSet,
    result::{fit_result::ProfileError, hesse, FitResult},
};

/// Growth factor for the outward bracket expansion.
const BRACKET_GROWTH: f64 = 2.0;

/// Bracket expansions attempted before the scan gives up.
const MAX_BRACKET_EXPANSIONS: usize = 16;

/// Bisection iterations refining a bracketed crossing.
const MAX_BISECTIONS: usize = 40;

/// Fraction of errordef by which a profiled value must undercut the stored
/// minimum to count as a genuinely lower minimum.
const NEW_MIN_FRACTION: f64 = 1e-3;

/// Fraction of the seed error at which bisection stops refining.
const BISECTION_XTOL_FRACTION: f64 = 1e-3;

enum Scan {
    /// Parameter value at which the profile crosses the target rise.
    Crossing(f64),
    /// Declared bound reached with the profile still below the target.
    AtLimit(f64),
    /// Full-space point whose objective undercuts the stored minimum.
    LowerMinimum(Theta),
}

/// Run the full profile scan for `result` at confidence level `cl`.
pub(crate) fn profile_errors(
    result: &FitResult, cl: f64,
) -> MinResult<(BTreeMap<String, ProfileError>, Option<FitResult>)> {
    let loss = result.loss().clone();
    let minimizer = result.minimizer().clone();
    let errordef = loss.errordef();
    let z = hesse::z_value(cl)?;
    let target = errordef * z * z;
    let lower_tol = NEW_MIN_FRACTION * errordef;
    let fmin = result.fmin();
    let center = result.values();
    let names = result.params().names();
    let bounds = result.params().bounds();
    let steps = result.params().step_sizes();

    // Curvature-based seed for the scan step per parameter.
    let hessian = hesse::numeric_hessian(&loss, &center)?;
    let covariance = hesse::covariance_from_hessian(&hessian, errordef);
    let seeds: Vec<f64> = (0..center.len())
        .map(|i| {
            let sigma = z * covariance[[i, i]].max(0.0).sqrt();
            if sigma.is_finite() && sigma > 0.0 { sigma } else { steps[i] }
        })
        .collect();

    let mut errors = BTreeMap::new();
    for (i, name) in names.iter().enumerate() {
        let (lo, hi) = bounds[i];
        let scan_up = scan_direction(
            &loss, &minimizer, result.params(), i, center[i], seeds[i], 1.0, hi, fmin, target,
            lower_tol,
        )?;
        let (upper, upper_at_limit) = match scan_up {
            Scan::Crossing(v) => (v - center[i], false),
            Scan::AtLimit(v) => (v - center[i], true),
            Scan::LowerMinimum(theta) => {
                return Ok((errors, Some(reminimize(&loss, &minimizer, &theta)?)));
            }
        };
        let scan_down = scan_direction(
            &loss, &minimizer, result.params(), i, center[i], seeds[i], -1.0, lo, fmin, target,
            lower_tol,
        )?;
        let (lower, lower_at_limit) = match scan_down {
            Scan::Crossing(v) => (v - center[i], false),
            Scan::AtLimit(v) => (v - center[i], true),
            Scan::LowerMinimum(theta) => {
                return Ok((errors, Some(reminimize(&loss, &minimizer, &theta)?)));
            }
        };
        errors.insert(
            name.clone(),
            ProfileError { lower, upper, lower_at_limit, upper_at_limit },
        );
    }
    Ok((errors, None))
}

/// Scan one direction for the target crossing.
#[allow(clippy::too_many_arguments)]
fn scan_direction(
    loss: &DynLoss, minimizer: &Arc<dyn Minimizer>, snapshot: &ParamSet, index: usize,
    center: f64, seed: f64, direction: f64, bound: f64, fmin: f64, target: f64, lower_tol: f64,
) -> MinResult<Scan> {
    let clip = |v: f64| if direction > 0.0 { v.min(bound) } else { v.max(bound) };
    let mut step = seed;
    let mut inside = center;
    for _ in 0..MAX_BRACKET_EXPANSIONS {
        let probe = clip(inside + direction * step);
        let at_bound = probe == bound;
        let (value, theta) = profile_value(loss, minimizer, snapshot, index, probe)?;
        if value < fmin - lower_tol {
            return Ok(Scan::LowerMinimum(theta));
        }
        if value - fmin >= target {
            return bisect(
                loss, minimizer, snapshot, index, inside, probe, seed, fmin, target, lower_tol,
            );
        }
        if at_bound {
            return Ok(Scan::AtLimit(probe));
        }
        inside = probe;
        step *= BRACKET_GROWTH;
    }
    Err(MinError::ProfileBracketFailed {
        name: snapshot.names().get(index).cloned().unwrap_or_default(),
    })
}

/// Bisect a bracket `[inside, outside]` with the crossing in between.
#[allow(clippy::too_many_arguments)]
fn bisect(
    loss: &DynLoss, minimizer: &Arc<dyn Minimizer>, snapshot: &ParamSet, index: usize,
    mut inside: f64, mut outside: f64, seed: f64, fmin: f64, target: f64, lower_tol: f64,
) -> MinResult<Scan> {
    let xtol = BISECTION_XTOL_FRACTION * seed.abs().max(f64::EPSILON);
    for _ in 0..MAX_BISECTIONS {
        if (outside - inside).abs() <= xtol {
            break;
        }
        let mid = 0.5 * (inside + outside);
        let (value, theta) = profile_value(loss, minimizer, snapshot, index, mid)?;
        if value < fmin - lower_tol {
            return Ok(Scan::LowerMinimum(theta));
        }
        if value - fmin >= target {
            outside = mid;
        } else {
            inside = mid;
        }
    }
    Ok(Scan::Crossing(0.5 * (inside + outside)))
}

/// Profiled objective value with parameter `index` fixed at `fixed`.
///
/// Returns the profile minimum and the corresponding full-space point.
fn profile_value(
    loss: &DynLoss, minimizer: &Arc<dyn Minimizer>, snapshot: &ParamSet, index: usize,
    fixed: f64,
) -> MinResult<(f64, Theta)> {
    if snapshot.len() == 1 {
        let theta = Array1::from(vec![fixed]);
        let value = loss.value(&theta)?;
        validate_value(value)?;
        return Ok((value, theta));
    }
    let reduced: DynLoss = Arc::new(FixedParamLoss::new(loss.clone(), index, fixed, snapshot)?);
    let res = minimize(minimizer, Some(&reduced), None, None)?;
    let full = expand(&res.values(), index, fixed);
    Ok((res.fmin(), full))
}

/// Fresh full minimization from a discovered lower point.
fn reminimize(
    loss: &DynLoss, minimizer: &Arc<dyn Minimizer>, theta: &Theta,
) -> MinResult<FitResult> {
    let mut start = loss.param_set().clone();
    start.set_values(theta)?;
    minimize(minimizer, Some(loss), Some(&mut start), None)
}

fn expand(reduced: &Theta, index: usize, fixed: f64) -> Theta {
    let mut full = Vec::with_capacity(reduced.len() + 1);
    full.extend(reduced.iter().take(index).copied());
    full.push(fixed);
    full.extend(reduced.iter().skip(index).copied());
    Array1::from(full)
}

fn contract(full: &Grad, index: usize) -> Grad {
    let mut reduced = Vec::with_capacity(full.len() - 1);
    for (i, &g) in full.iter().enumerate() {
        if i != index {
            reduced.push(g);
        }
    }
    Array1::from(reduced)
}

/// Objective with one coordinate pinned, exposed over the free remainder.
struct FixedParamLoss {
    inner: DynLoss,
    index: usize,
    fixed: f64,
    reduced: ParamSet,
}

impl FixedParamLoss {
    fn new(inner: DynLoss, index: usize, fixed: f64, snapshot: &ParamSet) -> MinResult<Self> {
        let reduced = ParamSet::new(snapshot.without(index))?;
        Ok(Self { inner, index, fixed, reduced })
    }
}

impl Loss for FixedParamLoss {
    fn value(&self, theta: &Theta) -> MinResult<f64> {
        self.inner.value(&expand(theta, self.index, self.fixed))
    }

    fn param_set(&self) -> &ParamSet {
        &self.reduced
    }

    fn errordef(&self) -> f64 {
        self.inner.errordef()
    }

    fn grad(&self, theta: &Theta) -> MinResult<Grad> {
        let full = self.inner.grad(&expand(theta, self.index, self.fixed))?;
        Ok(contract(&full, self.index))
    }

    fn hessian(&self, _theta: &Theta) -> MinResult<Hessian> {
        // The reduced problem always takes the finite-difference path.
        Err(MinError::HessianNotImplemented)
    }

    fn check(&self, theta: &Theta) -> MinResult<()> {
        self.inner.check(&expand(theta, self.index, self.fixed))
    }
}
