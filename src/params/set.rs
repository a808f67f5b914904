//! Ordered, name-unique collection of fit parameters.
use crate::{
    errors::{MinError, MinResult},
    minimize::types::Theta,
    params::parameter::{Parameter, ParamSpec},
};
use ndarray::Array1;

/// Tolerance used by [`ParamSet::at_limit`] to flag boundary contact.
pub const BOUND_EPS: f64 = 1e-9;

/// Ordered sequence of [`Parameter`]s with unique names.
///
/// The set order defines the layout of every value vector, gradient, and
/// Hessian exchanged with a loss.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    params: Vec<Parameter>,
}

impl ParamSet {
    /// Build a set from ready-made parameters.
    ///
    /// # Errors
    /// - [`MinError::EmptyParamSet`] for an empty list.
    /// - [`MinError::DuplicateParamName`] when two parameters share a name.
    pub fn new(params: Vec<Parameter>) -> MinResult<Self> {
        if params.is_empty() {
            return Err(MinError::EmptyParamSet);
        }
        for (i, p) in params.iter().enumerate() {
            if params.iter().take(i).any(|q| q.name() == p.name()) {
                return Err(MinError::DuplicateParamName { name: p.name().to_string() });
            }
        }
        Ok(Self { params })
    }

    /// Build a set from loose specs, auto-naming positionally.
    pub fn from_specs(specs: Vec<ParamSpec>) -> MinResult<Self> {
        let params = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| spec.build(i))
            .collect::<MinResult<Vec<_>>>()?;
        Self::new(params)
    }

    /// Build an unbounded set from plain starting values.
    pub fn from_values(values: &[f64]) -> MinResult<Self> {
        Self::from_specs(values.iter().map(|&v| ParamSpec::new(v)).collect())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Current values in set order.
    pub fn values(&self) -> Theta {
        Array1::from(self.params.iter().map(|p| p.value()).collect::<Vec<_>>())
    }

    /// Bound pairs in set order, open sides mapped to ±∞.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.params.iter().map(|p| p.bound_pair()).collect()
    }

    /// Step sizes in set order, using the per-parameter default when unset.
    pub fn step_sizes(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.step_size()).collect()
    }

    /// Overwrite all values at once, clamping into declared bounds.
    ///
    /// # Errors
    /// - [`MinError::ParamLengthMismatch`] when the vector length differs.
    /// - [`MinError::InvalidParamValue`] for non-finite entries.
    pub fn set_values(&mut self, values: &Theta) -> MinResult<()> {
        if values.len() != self.params.len() {
            return Err(MinError::ParamLengthMismatch {
                expected: self.params.len(),
                found: values.len(),
            });
        }
        for (p, &v) in self.params.iter_mut().zip(values.iter()) {
            p.set_value(v)?;
        }
        Ok(())
    }

    /// Copy values from `other` for every name both sets share.
    pub fn seed_from(&mut self, other: &ParamSet) -> MinResult<()> {
        let updates: Vec<(usize, f64)> = self
            .params
            .iter()
            .enumerate()
            .filter_map(|(i, p)| other.get(p.name()).map(|q| (i, q.value())))
            .collect();
        for (i, v) in updates {
            self.params[i].set_value(v)?;
        }
        Ok(())
    }

    /// Names of parameters whose value touches a declared bound.
    pub fn at_limit(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.at_bound(BOUND_EPS))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Remove the parameter at `index`, returning the reduced set.
    ///
    /// Used by profile scans that fix one parameter and re-minimize the
    /// rest; an empty remainder is allowed there and handled by the caller.
    pub(crate) fn without(&self, index: usize) -> Vec<Parameter> {
        let mut rest = self.params.clone();
        rest.remove(index);
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn new_rejects_duplicate_names() {
        let params =
            vec![Parameter::new("a", 0.0).unwrap(), Parameter::new("a", 1.0).unwrap()];
        let err = ParamSet::new(params).expect_err("duplicate names must be rejected");
        match err {
            MinError::DuplicateParamName { name } => assert_eq!(name, "a"),
            other => panic!("Expected DuplicateParamName, got {other:?}"),
        }
    }

    #[test]
    fn from_values_autonames_in_order() {
        let set = ParamSet::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(set.names(), vec!["p0", "p1", "p2"]);
        assert_eq!(set.values(), array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn set_values_checks_length() {
        let mut set = ParamSet::from_values(&[1.0, 2.0]).unwrap();
        let err = set.set_values(&array![1.0]).expect_err("length mismatch");
        match err {
            MinError::ParamLengthMismatch { expected: 2, found: 1 } => {}
            other => panic!("Expected ParamLengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn seed_from_matches_by_name() {
        let mut set = ParamSet::new(vec![
            Parameter::new("a", 0.0).unwrap(),
            Parameter::new("b", 0.0).unwrap(),
        ])
        .unwrap();
        let donor = ParamSet::new(vec![
            Parameter::new("b", 7.0).unwrap(),
            Parameter::new("c", 9.0).unwrap(),
        ])
        .unwrap();
        set.seed_from(&donor).unwrap();
        assert_eq!(set.get("a").unwrap().value(), 0.0);
        assert_eq!(set.get("b").unwrap().value(), 7.0);
    }

    #[test]
    fn at_limit_reports_touching_parameters() {
        let mut set = ParamSet::new(vec![
            Parameter::with_bounds("a", 0.0, -1.0, 1.0).unwrap(),
            Parameter::new("b", 0.5).unwrap(),
        ])
        .unwrap();
        set.set_values(&array![1.0, 0.5]).unwrap();
        assert_eq!(set.at_limit(), vec!["a"]);
    }
}
