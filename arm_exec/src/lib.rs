//! # Arm controller library.
//!
//! This library holds the control modules driven by the `arm_exec`
//! executable, and allows them to be exercised directly by tests and other
//! crates in the workspace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm client - reads joint state from and sends velocity demands to the arm server
pub mod arm_client;

/// Global data store for the executable
pub mod data_store;

/// Kinematics model - Jacobian and manipulability calculations for the arm
pub mod kin_model;

/// Manipulability controller module - resolves the arm's redundancy into joint velocity demands
pub mod mani_ctrl;

/// Executable parameters
pub mod params;

/// State filter module - smooths raw joint velocities and estimates accelerations
pub mod state_filt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one control cycle.
pub const CYCLE_PERIOD_S: f64 = 0.001;

/// Number of control cycles per second
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
