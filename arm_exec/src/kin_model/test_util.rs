//! Shared kinematics fixtures for unit tests

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{JointVec, KinParams};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Kinematic description of the Franka Panda arm, modified-DH.
pub(crate) fn panda_params() -> KinParams {
    KinParams {
        dh_a_m: [0.0, 0.0, 0.0, 0.0825, -0.0825, 0.0, 0.088],
        dh_d_m: [0.333, 0.0, 0.316, 0.0, 0.384, 0.0, 0.0],
        dh_alpha_rad: [
            0.0, -FRAC_PI_2, FRAC_PI_2, FRAC_PI_2, -FRAC_PI_2, FRAC_PI_2, FRAC_PI_2,
        ],
        flange_d_m: 0.107,
        grad_step_rad: 1e-6,
    }
}

/// A home configuration well away from joint limits and singularities.
pub(crate) fn home_config() -> JointVec {
    JointVec::from_column_slice(&[
        0.0,
        -FRAC_PI_4,
        0.0,
        -3.0 * FRAC_PI_4,
        0.0,
        FRAC_PI_2,
        FRAC_PI_4,
    ])
}
