//! # Arm Equipment Messages
//!
//! Messages exchanged with the arm hardware server: proprioceptive state
//! read once per control cycle, and the per-joint velocity demands sent back.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_ARM_JOINTS: usize = 7;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Request for the current joint state, sent from the client to the server.
#[derive(Serialize, Deserialize, Debug)]
pub struct ArmStateRequest;

/// Proprioceptive joint state returned by the arm server.
///
/// Joint ordering matches the joint name list in the executable's
/// configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ArmJointState {
    /// Measured joint positions.
    ///
    /// Units: radians
    pub pos_rad: [f64; NUM_ARM_JOINTS],

    /// Measured joint velocities.
    ///
    /// Units: radians/second
    pub rate_rads: [f64; NUM_ARM_JOINTS],
}

/// Demands that are sent from the ArmClient to the arm server.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArmDems {
    /// The demanded velocity of each joint, keyed by joint name.
    ///
    /// Units: radians/second
    pub rate_dems_rads: HashMap<String, f64>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Response from the arm server based on the demands sent by the client.
#[derive(Serialize, Deserialize, Debug)]
pub enum ArmDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for ArmDems {
    fn default() -> Self {
        Self {
            rate_dems_rads: HashMap::new(),
        }
    }
}

impl ArmDems {
    /// Build demands from a demand vector and the joint name list defining
    /// the joint ordering.
    ///
    /// # Panics
    /// - If `joint_names` and `rate_dems_rads` have different lengths.
    pub fn from_rates(joint_names: &[String], rate_dems_rads: &[f64]) -> Self {
        assert_eq!(joint_names.len(), rate_dems_rads.len());

        let mut dems = HashMap::new();

        for (name, rate) in joint_names.iter().zip(rate_dems_rads.iter()) {
            dems.insert(name.clone(), *rate);
        }

        Self {
            rate_dems_rads: dems,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dems_from_rates() {
        let names: Vec<String> = (1..=7).map(|i| format!("joint{}", i)).collect();
        let rates = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6];

        let dems = ArmDems::from_rates(&names, &rates);

        assert_eq!(dems.rate_dems_rads.len(), NUM_ARM_JOINTS);
        assert_eq!(dems.rate_dems_rads["joint3"], 0.2);
    }
}
