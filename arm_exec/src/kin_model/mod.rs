//! Kinematics model
//!
//! Computes the geometric Jacobian of the arm's forward-kinematic chain, the
//! manipulability measure derived from it, and the gradient of that measure
//! with respect to joint position. The chain geometry is described by
//! modified Denavit-Hartenberg parameters supplied at construction.
//!
//! Unlike the control modules this is not cyclic state, the model is a pure
//! function of the joint configuration and is owned by whichever module
//! needs it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod jacobian;
mod manipulability;
mod params;

#[cfg(test)]
pub(crate) mod test_util;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{SMatrix, SVector};

// Internal
pub use jacobian::*;
pub use manipulability::*;
pub use params::*;

use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A vector with one element per arm joint.
pub type JointVec = SVector<f64, NUM_ARM_JOINTS>;

/// The manipulator Jacobian, mapping joint velocity to end-effector twist.
///
/// Rows 0..3 are the linear velocity components, rows 3..6 the angular.
pub type Jacobian = SMatrix<f64, 6, NUM_ARM_JOINTS>;
