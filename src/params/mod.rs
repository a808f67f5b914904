//! params — free-variable representation shared between callers and fits.
//!
//! Purpose
//! -------
//! Define the parameter model used throughout the minimizer layer: a
//! [`Parameter`] carries identity, current value, optional box bounds, and
//! an optional step size; a [`ParamSet`] is an ordered, name-unique
//! collection of them; a [`ParamSpec`] is the loose configuration form from
//! which parameters are auto-created when callers pass plain values.
//!
//! Key behaviors
//! -------------
//! - Enforce finiteness, bound ordering, and name uniqueness at
//!   construction time, surfacing violations as [`MinError`] values before
//!   any evaluation can run.
//! - Expose the ordered value vector, bound pairs (open sides mapped to
//!   ±∞), and per-parameter step sizes with a documented default.
//! - Detect boundary contact after a fit via [`ParamSet::at_limit`].
//!
//! Conventions
//! -----------
//! - Parameter order is significant everywhere: losses are evaluated on the
//!   value vector in set order, and results report identities in the same
//!   order.
//! - A `ParamSet` passed to `minimize` is written exactly once on return
//!   with the best-known values; it is never left partially updated.
//!
//! [`MinError`]: crate::errors::MinError

pub mod parameter;
pub mod set;

pub use self::parameter::{Parameter, ParamSpec};
pub use self::set::ParamSet;
