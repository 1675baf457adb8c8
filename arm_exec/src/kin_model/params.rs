//! Parameters structure for the kinematics model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hw_if::arm::NUM_ARM_JOINTS;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic description of the arm.
///
/// The chain is described in the modified (Craig) Denavit-Hartenberg
/// convention: row `i` holds the parameters of the transform from joint
/// frame `i` to joint frame `i + 1`, with the joint angle as the free
/// variable.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct KinParams {
    // ---- GEOMETRY ----

    /// Link lengths along the common normal.
    ///
    /// Units: meters
    pub dh_a_m: [f64; NUM_ARM_JOINTS],

    /// Link offsets along the previous joint axis.
    ///
    /// Units: meters
    pub dh_d_m: [f64; NUM_ARM_JOINTS],

    /// Link twists about the common normal.
    ///
    /// Units: radians
    pub dh_alpha_rad: [f64; NUM_ARM_JOINTS],

    /// Offset from the last joint frame to the flange along its z axis.
    ///
    /// Units: meters
    pub flange_d_m: f64,

    // ---- NUMERICS ----

    /// Step used for the finite-difference manipulability gradient.
    ///
    /// Units: radians
    pub grad_step_rad: f64,
}
