//! Adapter exposing an [`Evaluator`] as an `argmin` problem.
//!
//! Bounds are enforced at this seam: trial points are clamped into the box
//! before evaluation, and gradient components that would push an
//! at-the-bound coordinate further outside are zeroed so line searches do
//! not keep stepping into flat clamped regions.
use argmin::core::{CostFunction, Error, Gradient, Hessian as ArgminHessian};

use crate::minimize::{
    evaluator::Evaluator,
    types::{Cost, Grad, Hessian, Theta},
    validation::clamp_into,
};

/// Bridges the evaluator triple to `argmin`'s problem traits.
pub struct EvalProblem<'a> {
    evaluator: &'a Evaluator,
    bounds: &'a [(f64, f64)],
}

impl<'a> EvalProblem<'a> {
    pub fn new(evaluator: &'a Evaluator, bounds: &'a [(f64, f64)]) -> Self {
        Self { evaluator, bounds }
    }
}

impl CostFunction for EvalProblem<'_> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let clamped = clamp_into(theta, self.bounds);
        Ok(self.evaluator.value(&clamped)?)
    }
}

impl Gradient for EvalProblem<'_> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let clamped = clamp_into(theta, self.bounds);
        let mut grad = self.evaluator.gradient(&clamped)?;
        const EPS: f64 = 1e-12;
        for (i, (&x, &(lo, hi))) in clamped.iter().zip(self.bounds.iter()).enumerate() {
            if x <= lo + EPS && grad[i] > 0.0 {
                grad[i] = 0.0;
            }
            if x >= hi - EPS && grad[i] < 0.0 {
                grad[i] = 0.0;
            }
        }
        Ok(grad)
    }
}

impl ArgminHessian for EvalProblem<'_> {
    type Param = Theta;
    type Hessian = Hessian;

    fn hessian(&self, theta: &Self::Param) -> Result<Self::Hessian, Error> {
        let clamped = clamp_into(theta, self.bounds);
        Ok(self.evaluator.hessian(&clamped)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loss::SimpleLoss,
        minimize::{options::GradSource, strategy::RetryStrategy},
    };
    use ndarray::array;
    use std::sync::Arc;

    #[test]
    fn cost_clamps_trial_points_into_bounds() {
        let loss = SimpleLoss::from_specs(
            |x| x[0] * x[0],
            vec![crate::params::ParamSpec::new(0.5).bounds(-1.0, 1.0)],
            0.5,
        )
        .unwrap()
        .into_dyn();
        let params = loss.param_set().clone();
        let eval =
            Evaluator::new(loss, &params, Arc::new(RetryStrategy::default()), GradSource::Auto, 100);
        let bounds = vec![(-1.0, 1.0)];
        let problem = EvalProblem::new(&eval, &bounds);
        let v = problem.cost(&array![3.0]).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    // A descent direction pointing out of the box at an active bound must
    // be projected away; the inward component is kept.
    fn gradient_is_projected_at_active_bounds() {
        let loss = SimpleLoss::from_specs(
            |x| -x[0],
            vec![crate::params::ParamSpec::new(0.0).bounds(-1.0, 1.0)],
            0.5,
        )
        .unwrap()
        .into_dyn();
        let params = loss.param_set().clone();
        let eval =
            Evaluator::new(loss, &params, Arc::new(RetryStrategy::default()), GradSource::Auto, 100);
        let bounds = vec![(-1.0, 1.0)];
        let problem = EvalProblem::new(&eval, &bounds);
        // d(-x)/dx = -1 pushes x upward; at the upper bound it is zeroed.
        let g = problem.gradient(&array![1.0]).unwrap();
        assert_eq!(g[0], 0.0);
        let g = problem.gradient(&array![0.0]).unwrap();
        assert!((g[0] + 1.0).abs() < 1e-6);
    }
}
