//! Manipulability controller module
//!
//! Resolves the arm's kinematic redundancy each cycle by choosing the joint
//! velocity demand that ascends the manipulability measure fastest, subject
//! to per-joint velocity bounds derived from the configured position,
//! velocity and acceleration limits. The optimisation is a strictly convex
//! quadratic program with box constraints, solved in closed form.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_bounds;
mod calc_qp;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Per-joint `(lower, upper)` bounds on the velocity demand for one cycle.
pub type RateBounds = [(f64, f64); NUM_ARM_JOINTS];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ManiCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum ManiCtrlInitError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Regularisation weight must be positive, got {0}")]
    InvalidRegWeight(f64),

    #[error("Joint {0} position limits are inverted ({1} > {2})")]
    InvertedPosLimits(usize, f64, f64),

    #[error("Joint {0} has a non-positive {1} limit")]
    NonPositiveLimit(usize, &'static str),

    #[error("Gradient step must be positive, got {0}")]
    InvalidGradStep(f64),
}

/// Possible errors that can occur during ManiCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum ManiCtrlError {
    #[error("The module has not been initialised")]
    NotInit,
}
