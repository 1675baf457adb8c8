//! # Arm Executable Parameters
//!
//! This module provides parameters for the arm controller executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hw_if::arm::NUM_ARM_JOINTS;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug)]
pub struct ArmExecParams {
    /// Identifier of the arm being controlled, for example `"panda"`.
    pub arm_id: String,

    /// Names of the arm's joints.
    ///
    /// The order of this list defines the joint indexing used throughout the
    /// executable, and must match the ordering used by the arm server.
    pub joint_names: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors in the content of the executable parameters.
#[derive(Debug, thiserror::Error)]
pub enum ArmExecParamsError {
    #[error("Wrong number of joint names, got {0} instead of {1}")]
    WrongJointNameCount(usize, usize),

    #[error("The arm_id parameter must not be empty")]
    EmptyArmId,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmExecParams {
    /// Validate the loaded parameters.
    ///
    /// The joint name list fixes the joint indexing for the whole controller,
    /// so a wrong count here is a fatal initialisation error.
    pub fn validate(&self) -> Result<(), ArmExecParamsError> {
        if self.arm_id.is_empty() {
            return Err(ArmExecParamsError::EmptyArmId);
        }

        if self.joint_names.len() != NUM_ARM_JOINTS {
            return Err(ArmExecParamsError::WrongJointNameCount(
                self.joint_names.len(),
                NUM_ARM_JOINTS,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        let mut params = ArmExecParams {
            arm_id: String::from("panda"),
            joint_names: (1..=7).map(|i| format!("panda_joint{}", i)).collect(),
        };

        assert!(params.validate().is_ok());

        params.joint_names.pop();
        assert!(matches!(
            params.validate(),
            Err(ArmExecParamsError::WrongJointNameCount(6, 7))
        ));

        params.arm_id = String::new();
        assert!(matches!(
            params.validate(),
            Err(ArmExecParamsError::EmptyArmId)
        ));
    }
}
