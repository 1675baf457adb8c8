//! Parameters structure for ManiCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::kin_model::KinParams;
use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the manipulability controller.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- LIMITS ----

    /// Minimum joint position (lowest negative value)
    ///
    /// Units: radians
    pub pos_min_rad: [f64; NUM_ARM_JOINTS],

    /// Maximum joint position (highest positive value)
    ///
    /// Units: radians
    pub pos_max_rad: [f64; NUM_ARM_JOINTS],

    /// Maximum absolute joint velocity
    ///
    /// Units: radians/second
    pub rate_max_abs_rads: [f64; NUM_ARM_JOINTS],

    /// Maximum absolute joint acceleration
    ///
    /// Units: radians/second^2
    pub accel_max_abs_radss: [f64; NUM_ARM_JOINTS],

    // ---- OPTIMISATION ----

    /// Quadratic regularisation weight of the velocity demand in the QP
    /// objective.
    ///
    /// Must be positive. Larger values produce smaller demands for the same
    /// manipulability gradient.
    ///
    /// Units: dimensionless
    pub reg_weight: f64,

    // ---- KINEMATICS ----

    /// Kinematic description of the arm.
    pub kin: KinParams,
}
