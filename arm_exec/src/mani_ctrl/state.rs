//! Implementations for the ManiCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{ManiCtrlError, ManiCtrlInitError, Params};
use crate::kin_model::{manipulability, JointVec, KinModel};
use hw_if::arm::NUM_ARM_JOINTS;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manipulability controller module state
#[derive(Default)]
pub struct ManiCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// Kinematics model, built from the parameters during init.
    pub(crate) kin: Option<KinModel>,
}

/// Input data to the manipulability controller.
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// Measured joint positions this cycle.
    ///
    /// Units: radians
    pub pos_rad: [f64; NUM_ARM_JOINTS],

    /// Filtered joint velocities this cycle.
    ///
    /// Units: radians/second
    pub rate_filt_rads: [f64; NUM_ARM_JOINTS],

    /// Time elapsed since the previous cycle.
    ///
    /// Units: seconds
    pub period_s: f64,
}

/// Output demands from the manipulability controller.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Joint velocity demands, guaranteed to lie within this cycle's
    /// velocity bounds.
    ///
    /// Units: radians/second
    pub rate_dems_rads: [f64; NUM_ARM_JOINTS],
}

/// Status report for ManiCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The manipulability measure at this cycle's configuration.
    pub manipulability: f64,

    /// True for joints whose velocity bounds had an empty intersection and
    /// were collapsed to a zero-width interval.
    pub bound_widened: [bool; NUM_ARM_JOINTS],

    /// True for joints whose manipulability gradient was non-finite and
    /// whose demand fell back to holding the current velocity.
    pub grad_nonfinite: [bool; NUM_ARM_JOINTS],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            rate_dems_rads: [0.0; NUM_ARM_JOINTS],
        }
    }
}

impl State for ManiCtrl {
    type InitData = &'static str;
    type InitError = ManiCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ManiCtrlError;

    /// Initialise the ManiCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data)?;

        // Validate the limits, a bad limit table must never reach the
        // constraint calculations
        if self.params.reg_weight <= 0.0 {
            return Err(ManiCtrlInitError::InvalidRegWeight(self.params.reg_weight));
        }

        for i in 0..NUM_ARM_JOINTS {
            if self.params.pos_min_rad[i] > self.params.pos_max_rad[i] {
                return Err(ManiCtrlInitError::InvertedPosLimits(
                    i,
                    self.params.pos_min_rad[i],
                    self.params.pos_max_rad[i],
                ));
            }
            if self.params.rate_max_abs_rads[i] <= 0.0 {
                return Err(ManiCtrlInitError::NonPositiveLimit(i, "velocity"));
            }
            if self.params.accel_max_abs_radss[i] <= 0.0 {
                return Err(ManiCtrlInitError::NonPositiveLimit(i, "acceleration"));
            }
        }

        if self.params.kin.grad_step_rad <= 0.0 {
            return Err(ManiCtrlInitError::InvalidGradStep(
                self.params.kin.grad_step_rad,
            ));
        }

        // Build the kinematics model
        self.kin = Some(KinModel::new(self.params.kin.clone()));

        Ok(())
    }

    /// Perform cyclic processing of the manipulability controller.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let q = JointVec::from_column_slice(&input_data.pos_rad);

        // Manipulability measure and its gradient at this configuration
        let (manip, grad) = match self.kin {
            Some(ref kin) => (
                manipulability(&kin.jacobian(&q)),
                kin.manipulability_gradient(&q),
            ),
            None => return Err(ManiCtrlError::NotInit),
        };

        self.report.manipulability = manip;

        // Velocity bounds for this cycle, then the QP solution within them
        let bounds = self.calc_rate_bounds(input_data);
        let rate_dems_rads = self.calc_qp_dems(&grad, &bounds, &input_data.rate_filt_rads);

        Ok((OutputData { rate_dems_rads }, self.report))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kin_model::test_util::{home_config, panda_params};

    /// Controller with the Panda kinematics and limits wide enough to never
    /// bind at the test configurations.
    fn wide_limit_ctrl() -> ManiCtrl {
        let params = Params {
            pos_min_rad: [-10.0; NUM_ARM_JOINTS],
            pos_max_rad: [10.0; NUM_ARM_JOINTS],
            rate_max_abs_rads: [100.0; NUM_ARM_JOINTS],
            accel_max_abs_radss: [1e6; NUM_ARM_JOINTS],
            reg_weight: 1e-3,
            kin: panda_params(),
        };
        let kin = KinModel::new(params.kin.clone());

        ManiCtrl {
            params,
            report: StatusReport::default(),
            kin: Some(kin),
        }
    }

    #[test]
    fn test_not_init_errors() {
        let mut ctrl = ManiCtrl::default();

        assert!(matches!(
            ctrl.proc(&InputData::default()),
            Err(ManiCtrlError::NotInit)
        ));
    }

    #[test]
    fn test_ascends_gradient_with_wide_limits() {
        let mut ctrl = wide_limit_ctrl();
        let q = home_config();

        let grad = ctrl
            .kin
            .as_ref()
            .unwrap()
            .manipulability_gradient(&q);

        let mut pos_rad = [0.0; NUM_ARM_JOINTS];
        for i in 0..NUM_ARM_JOINTS {
            pos_rad[i] = q[i];
        }

        let input = InputData {
            pos_rad,
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            period_s: 0.001,
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert!(report.manipulability > 0.0);

        // With non-binding limits the demand is exactly the gradient scaled
        // by 1/(2 lambda), so signs match and at least one joint moves
        let mut any_nonzero = false;
        for i in 0..NUM_ARM_JOINTS {
            let expected = grad[i] / (2.0 * ctrl.params.reg_weight);
            assert!(
                (output.rate_dems_rads[i] - expected).abs() < 1e-9,
                "joint {} dem {} expected {}",
                i,
                output.rate_dems_rads[i],
                expected
            );
            if output.rate_dems_rads[i].abs() > 1e-6 {
                any_nonzero = true;
                assert_eq!(
                    output.rate_dems_rads[i].signum(),
                    grad[i].signum(),
                    "joint {} demand sign",
                    i
                );
            }
        }
        assert!(any_nonzero);
    }

    #[test]
    fn test_singular_config_output_is_safe() {
        let mut ctrl = wide_limit_ctrl();

        // Fully stretched arm, a singular configuration
        let input = InputData {
            pos_rad: [0.0; NUM_ARM_JOINTS],
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            period_s: 0.001,
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert!(!report.manipulability.is_nan());
        assert!(report.manipulability < 1e-9);

        for i in 0..NUM_ARM_JOINTS {
            assert!(output.rate_dems_rads[i].is_finite());
            assert!(output.rate_dems_rads[i].abs() <= ctrl.params.rate_max_abs_rads[i]);
        }
    }

    #[test]
    fn test_demands_within_bounds_across_states() {
        let mut ctrl = wide_limit_ctrl();

        // Tighten the limits so they actually bind
        ctrl.params.rate_max_abs_rads = [0.05; NUM_ARM_JOINTS];
        ctrl.params.pos_min_rad = [-2.8; NUM_ARM_JOINTS];
        ctrl.params.pos_max_rad = [2.8; NUM_ARM_JOINTS];
        ctrl.params.accel_max_abs_radss = [10.0; NUM_ARM_JOINTS];

        let home = home_config();

        // A grid of positions and velocities around the home configuration
        for pos_offset_rad in [-0.5, 0.0, 0.5].iter() {
            for rate_rads in [-0.04, 0.0, 0.04].iter() {
                let mut pos_rad = [0.0; NUM_ARM_JOINTS];
                for i in 0..NUM_ARM_JOINTS {
                    pos_rad[i] = home[i] + pos_offset_rad;
                }

                let input = InputData {
                    pos_rad,
                    rate_filt_rads: [*rate_rads; NUM_ARM_JOINTS],
                    period_s: 0.001,
                };

                let (output, _) = ctrl.proc(&input).unwrap();
                let bounds = ctrl.calc_rate_bounds(&input);

                for i in 0..NUM_ARM_JOINTS {
                    let (lower, upper) = bounds[i];
                    assert!(
                        output.rate_dems_rads[i] >= lower
                            && output.rate_dems_rads[i] <= upper,
                        "joint {} dem {} outside [{}, {}]",
                        i,
                        output.rate_dems_rads[i],
                        lower,
                        upper
                    );
                }
            }
        }
    }
}
