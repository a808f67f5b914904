use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for minimizer operations.
pub type MinResult<T> = Result<T, MinError>;

/// Unified error surface for the minimizer layer.
///
/// Contract violations (malformed parameters, objectives, or options) are
/// raised before any evaluation takes place. Evaluation failures are raised
/// out of a running minimization. `Interrupted` and `EvalBudgetExhausted`
/// are internal control signals: the driver absorbs them into `valid=false`
/// fit results whenever a best-seen point exists, and only lets them
/// propagate when no evaluation ever succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum MinError {
    // ---- Parameters ----
    /// Parameter names must be unique within a set.
    DuplicateParamName {
        name: String,
    },
    /// A parameter set must contain at least one parameter.
    EmptyParamSet,
    /// Parameter values must be finite.
    InvalidParamValue {
        name: String,
        value: f64,
    },
    /// Bounds must be finite where given, with lower strictly below upper.
    InvalidBounds {
        name: String,
        lower: f64,
        upper: f64,
    },
    /// The value must lie inside the declared bounds.
    ValueOutsideBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// Step sizes must be finite and strictly positive.
    InvalidStepSize {
        name: String,
        value: f64,
    },
    /// Supplied values do not match the parameter set length.
    ParamLengthMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Objective ----
    /// `errordef` must be finite and strictly positive.
    InvalidErrordef {
        value: f64,
    },
    /// Neither an objective nor a prior fit result was supplied.
    MissingObjective,
    /// Implies that finite differences should be used.
    GradientNotImplemented,
    /// Implies that a finite-difference Hessian should be used.
    HessianNotImplemented,
    /// The configuration requires an analytic gradient the loss lacks.
    AnalyticGradientMissing,

    // ---- Options ----
    /// Tolerance must be finite and strictly positive.
    InvalidTol {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations must be greater than zero.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Evaluation budget must be greater than zero.
    InvalidMaxEvals {
        max_evals: usize,
        reason: &'static str,
    },
    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    /// L-BFGS memory must be at least 1.
    InvalidLbfgsMem {
        mem: usize,
        reason: &'static str,
    },
    /// Confidence levels live strictly inside (0, 1).
    InvalidConfidenceLevel {
        cl: f64,
    },
    /// A composite minimizer needs at least one member.
    EmptyChain,

    // ---- Evaluation ----
    /// The objective kept returning non-finite values past the strategy's
    /// tolerance.
    EvaluationFailed {
        value: f64,
        evals: usize,
    },
    /// The evaluator's call budget ran out and the strategy chose to halt.
    EvalBudgetExhausted {
        evals: usize,
    },
    /// A callback requested early termination.
    Interrupted,
    /// The backend finished without producing a best parameter vector.
    MissingMinimum,
    /// Objective values must be finite.
    NonFiniteValue {
        value: f64,
    },

    // ---- Gradients and Hessians ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },
    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },
    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },
    /// Estimated parameters must be finite.
    InvalidTheta {
        index: usize,
        value: f64,
    },

    // ---- Uncertainty estimation ----
    /// The producing minimizer recorded no backend curvature.
    NativeCurvatureUnavailable {
        minimizer: String,
    },
    /// The profile scan could not bracket the target crossing.
    ProfileBracketFailed {
        name: String,
    },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },
}

impl std::error::Error for MinError {}

impl std::fmt::Display for MinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Parameters ----
            MinError::DuplicateParamName { name } => {
                write!(f, "Duplicate parameter name '{name}'")
            }
            MinError::EmptyParamSet => {
                write!(f, "Parameter set must contain at least one parameter")
            }
            MinError::InvalidParamValue { name, value } => {
                write!(f, "Invalid value for parameter '{name}': {value}, must be finite")
            }
            MinError::InvalidBounds { name, lower, upper } => {
                write!(f, "Invalid bounds for parameter '{name}': [{lower}, {upper}]")
            }
            MinError::ValueOutsideBounds { name, value, lower, upper } => {
                write!(
                    f,
                    "Value {value} of parameter '{name}' lies outside bounds [{lower}, {upper}]"
                )
            }
            MinError::InvalidStepSize { name, value } => {
                write!(
                    f,
                    "Invalid step size for parameter '{name}': {value}, must be finite and > 0"
                )
            }
            MinError::ParamLengthMismatch { expected, found } => {
                write!(f, "Parameter length mismatch: expected {expected}, found {found}")
            }

            // ---- Objective ----
            MinError::InvalidErrordef { value } => {
                write!(f, "Invalid errordef {value}: must be finite and strictly positive")
            }
            MinError::MissingObjective => {
                write!(f, "No objective supplied and no prior result to take one from")
            }
            MinError::GradientNotImplemented => {
                write!(f, "Loss does not implement an analytic gradient")
            }
            MinError::HessianNotImplemented => {
                write!(f, "Loss does not implement an analytic Hessian")
            }
            MinError::AnalyticGradientMissing => {
                write!(f, "Gradient source is set to analytic but the loss provides none")
            }

            // ---- Options ----
            MinError::InvalidTol { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            MinError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            MinError::InvalidMaxEvals { max_evals, reason } => {
                write!(f, "Invalid evaluation budget {max_evals}: {reason}")
            }
            MinError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            MinError::InvalidLbfgsMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            MinError::InvalidConfidenceLevel { cl } => {
                write!(f, "Invalid confidence level {cl}: must lie strictly inside (0, 1)")
            }
            MinError::EmptyChain => {
                write!(f, "Chain minimizer must wrap at least one member")
            }

            // ---- Evaluation ----
            MinError::EvaluationFailed { value, evals } => {
                write!(f, "Objective evaluation failed with value {value} after {evals} calls")
            }
            MinError::EvalBudgetExhausted { evals } => {
                write!(f, "Evaluation budget exhausted after {evals} calls")
            }
            MinError::Interrupted => {
                write!(f, "Minimization interrupted by callback")
            }
            MinError::MissingMinimum => {
                write!(f, "Backend produced no best parameter vector")
            }
            MinError::NonFiniteValue { value } => {
                write!(f, "Non-finite objective value: {value}")
            }

            // ---- Gradients and Hessians ----
            MinError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            MinError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            MinError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            MinError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }
            MinError::InvalidTheta { index, value } => {
                write!(f, "Invalid parameter estimate at index {index}: {value}, must be finite")
            }

            // ---- Uncertainty estimation ----
            MinError::NativeCurvatureUnavailable { minimizer } => {
                write!(f, "Minimizer '{minimizer}' recorded no backend curvature")
            }
            MinError::ProfileBracketFailed { name } => {
                write!(f, "Profile scan for parameter '{name}' could not bracket the crossing")
            }

            // ---- Argmin ----
            MinError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            MinError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            MinError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            MinError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            MinError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            MinError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }
        }
    }
}

impl From<Error> for MinError {
    /// Recover domain errors that crossed the argmin boundary.
    ///
    /// The adapter wraps `MinError` values into `argmin::core::Error` when a
    /// cost or gradient call fails inside a solver; this downcasts them back
    /// out unchanged, maps known `ArgminError` variants onto their wrappers,
    /// and folds everything else into `BackendError`.
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<MinError>() {
            Ok(min_err) => min_err,
            Err(err) => match err.downcast::<ArgminError>() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => MinError::InvalidParameter { text },
                    ArgminError::NotImplemented { text } => MinError::NotImplemented { text },
                    ArgminError::NotInitialized { text } => MinError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => MinError::ConditionViolated { text },
                    ArgminError::PotentialBug { text } => MinError::PotentialBug { text },
                    other => MinError::BackendError { text: other.to_string() },
                },
                Err(err) => MinError::BackendError { text: err.to_string() },
            },
        }
    }
}
