//! Single free variable of a fit: identity, value, bounds, step size.
use crate::errors::{MinError, MinResult};

/// Fraction of `|value|` used for the default step size.
pub const DEFAULT_STEP_FRACTION: f64 = 0.1;

/// Floor for the default step size when the value is at or near zero.
pub const DEFAULT_STEP_FLOOR: f64 = 0.01;

/// A named free variable with an optional box constraint.
///
/// Invariants (enforced at construction):
/// - `value` is finite;
/// - bounds, where given, are finite with `lower < upper` and
///   `lower <= value <= upper`;
/// - `step_size`, where given, is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: f64,
    lower: Option<f64>,
    upper: Option<f64>,
    step_size: Option<f64>,
}

impl Parameter {
    /// Create an unbounded parameter.
    ///
    /// # Errors
    /// Returns [`MinError::InvalidParamValue`] for a non-finite value.
    pub fn new(name: &str, value: f64) -> MinResult<Self> {
        ParamSpec::new(value).name(name).build(0)
    }

    /// Create a parameter with a box constraint.
    ///
    /// # Errors
    /// - [`MinError::InvalidBounds`] if `lower >= upper` or either bound is
    ///   non-finite.
    /// - [`MinError::ValueOutsideBounds`] if `value` lies outside the box.
    pub fn with_bounds(name: &str, value: f64, lower: f64, upper: f64) -> MinResult<Self> {
        ParamSpec::new(value).name(name).bounds(lower, upper).build(0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn lower(&self) -> Option<f64> {
        self.lower
    }

    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    /// Bounds as a closed pair, with open sides mapped to ±∞.
    pub fn bound_pair(&self) -> (f64, f64) {
        (self.lower.unwrap_or(f64::NEG_INFINITY), self.upper.unwrap_or(f64::INFINITY))
    }

    /// Declared step size, or the documented default
    /// `max(DEFAULT_STEP_FRACTION * |value|, DEFAULT_STEP_FLOOR)`.
    pub fn step_size(&self) -> f64 {
        self.step_size
            .unwrap_or_else(|| (DEFAULT_STEP_FRACTION * self.value.abs()).max(DEFAULT_STEP_FLOOR))
    }

    /// Overwrite the current value, clamping it into the declared bounds.
    ///
    /// # Errors
    /// Returns [`MinError::InvalidParamValue`] for a non-finite value.
    pub(crate) fn set_value(&mut self, value: f64) -> MinResult<()> {
        if !value.is_finite() {
            return Err(MinError::InvalidParamValue { name: self.name.clone(), value });
        }
        let (lo, hi) = self.bound_pair();
        self.value = value.clamp(lo, hi);
        Ok(())
    }

    /// Whether the current value sits on a declared bound, within `eps`.
    pub fn at_bound(&self, eps: f64) -> bool {
        let near = |bound: Option<f64>| {
            bound.map_or(false, |b| (self.value - b).abs() <= eps.max(eps * b.abs()))
        };
        near(self.lower) || near(self.upper)
    }
}

/// Loose configuration form of a parameter.
///
/// Recognized fields mirror the construction contract: `value` (required),
/// `lower`, `upper`, `step_size`, `name` (all optional). Missing names are
/// filled positionally (`p0`, `p1`, …) when the spec is built into a
/// [`Parameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub step_size: Option<f64>,
    pub name: Option<String>,
}

impl ParamSpec {
    pub fn new(value: f64) -> Self {
        Self { value, lower: None, upper: None, step_size: None, name: None }
    }

    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }

    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = Some(step_size);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Validate the spec and build a [`Parameter`], naming it `p{index}`
    /// when no explicit name was given.
    ///
    /// # Errors
    /// Any of the construction-contract violations documented on
    /// [`Parameter`].
    pub fn build(self, index: usize) -> MinResult<Parameter> {
        let name = self.name.unwrap_or_else(|| format!("p{index}"));
        if !self.value.is_finite() {
            return Err(MinError::InvalidParamValue { name, value: self.value });
        }
        if let (Some(lower), Some(upper)) = (self.lower, self.upper) {
            if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                return Err(MinError::InvalidBounds { name, lower, upper });
            }
        }
        let lo = self.lower.unwrap_or(f64::NEG_INFINITY);
        let hi = self.upper.unwrap_or(f64::INFINITY);
        if self.value < lo || self.value > hi {
            return Err(MinError::ValueOutsideBounds {
                name,
                value: self.value,
                lower: lo,
                upper: hi,
            });
        }
        if let Some(step) = self.step_size {
            if !step.is_finite() || step <= 0.0 {
                return Err(MinError::InvalidStepSize { name, value: step });
            }
        }
        Ok(Parameter {
            name,
            value: self.value,
            lower: self.lower,
            upper: self.upper,
            step_size: self.step_size,
        })
    }
}

impl From<f64> for ParamSpec {
    fn from(value: f64) -> Self {
        ParamSpec::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_non_finite_values() {
        let err = Parameter::new("a", f64::NAN).expect_err("NaN value must be rejected");
        match err {
            MinError::InvalidParamValue { .. } => {}
            other => panic!("Expected InvalidParamValue, got {other:?}"),
        }
    }

    #[test]
    fn with_bounds_rejects_inverted_bounds() {
        let err = Parameter::with_bounds("a", 0.0, 1.0, -1.0).expect_err("inverted bounds");
        match err {
            MinError::InvalidBounds { .. } => {}
            other => panic!("Expected InvalidBounds, got {other:?}"),
        }
    }

    #[test]
    fn with_bounds_rejects_value_outside_box() {
        let err = Parameter::with_bounds("a", 5.0, -1.0, 1.0).expect_err("outside box");
        match err {
            MinError::ValueOutsideBounds { .. } => {}
            other => panic!("Expected ValueOutsideBounds, got {other:?}"),
        }
    }

    #[test]
    fn default_step_size_scales_with_value() {
        let p = Parameter::new("a", 20.0).unwrap();
        assert!((p.step_size() - 2.0).abs() < 1e-12);
        let origin = Parameter::new("b", 0.0).unwrap();
        assert!((origin.step_size() - DEFAULT_STEP_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn set_value_clamps_into_bounds() {
        let mut p = Parameter::with_bounds("a", 0.0, -1.0, 1.0).unwrap();
        p.set_value(5.0).unwrap();
        assert_eq!(p.value(), 1.0);
        assert!(p.at_bound(1e-9));
    }

    #[test]
    fn spec_build_autonames_positionally() {
        let p = ParamSpec::new(1.5).build(3).unwrap();
        assert_eq!(p.name(), "p3");
        let named = ParamSpec::new(1.5).name("mu").build(3).unwrap();
        assert_eq!(named.name(), "mu");
    }
}
