//! Per-cycle velocity bound calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{InputData, ManiCtrl, RateBounds};
use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ManiCtrl {
    /// Calculate the per-joint bounds on the velocity demand for this cycle.
    ///
    /// Three envelopes are intersected for each joint:
    ///     1. The velocity limit itself, `[-v_max, v_max]`.
    ///     2. The position envelope: integrating the demand over one period
    ///        must keep the joint inside its position limits, giving
    ///        `[(q_min - q) / T, (q_max - q) / T]`.
    ///     3. The acceleration envelope: reaching the demand from the current
    ///        velocity within one period must not exceed the acceleration
    ///        limit, giving `[dq - a_max T, dq + a_max T]`.
    ///
    /// Noisy state near a limit can make the intersection transiently empty,
    /// in which case the interval is collapsed to zero width by clamping the
    /// upper bound to the lower, and the corresponding flag in the status
    /// report is raised.
    pub(crate) fn calc_rate_bounds(&mut self, input_data: &InputData) -> RateBounds {
        // Guard against a non-positive period, which would invert the
        // envelopes
        let period_s = if input_data.period_s > 0.0 {
            input_data.period_s
        } else {
            crate::CYCLE_PERIOD_S
        };

        let mut bounds = [(0.0, 0.0); NUM_ARM_JOINTS];

        for i in 0..NUM_ARM_JOINTS {
            // Velocity envelope
            let mut lower = -self.params.rate_max_abs_rads[i];
            let mut upper = self.params.rate_max_abs_rads[i];

            // Position envelope
            lower = lower.max((self.params.pos_min_rad[i] - input_data.pos_rad[i]) / period_s);
            upper = upper.min((self.params.pos_max_rad[i] - input_data.pos_rad[i]) / period_s);

            // Acceleration envelope
            let accel_window_rads = self.params.accel_max_abs_radss[i] * period_s;
            lower = lower.max(input_data.rate_filt_rads[i] - accel_window_rads);
            upper = upper.min(input_data.rate_filt_rads[i] + accel_window_rads);

            // An empty intersection is collapsed rather than failed on, the
            // demand is then pinned to the lower bound
            if upper < lower {
                warn!(
                    "Joint {} velocity bounds are empty ([{:.4}, {:.4}]), \
                     collapsing to the lower bound",
                    i, lower, upper
                );
                upper = lower;
                self.report.bound_widened[i] = true;
            }

            bounds[i] = (lower, upper);
        }

        bounds
    }
}

#[cfg(test)]
mod test {
    use super::super::Params;
    use super::*;

    fn test_ctrl() -> ManiCtrl {
        ManiCtrl {
            params: Params {
                pos_min_rad: [-2.0; NUM_ARM_JOINTS],
                pos_max_rad: [2.0; NUM_ARM_JOINTS],
                rate_max_abs_rads: [1.0; NUM_ARM_JOINTS],
                accel_max_abs_radss: [10.0; NUM_ARM_JOINTS],
                reg_weight: 1e-3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_velocity_envelope_binds_at_rest() {
        let mut ctrl = test_ctrl();

        let input = InputData {
            pos_rad: [0.0; NUM_ARM_JOINTS],
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            period_s: 1.0,
        };

        let bounds = ctrl.calc_rate_bounds(&input);

        // At rest in the middle of the range with a one second period the
        // position envelope is [-2, 2] and the acceleration envelope
        // [-10, 10], so the velocity limit binds
        for i in 0..NUM_ARM_JOINTS {
            assert_eq!(bounds[i], (-1.0, 1.0));
            assert!(!ctrl.report.bound_widened[i]);
        }
    }

    #[test]
    fn test_position_envelope_binds_near_limit() {
        let mut ctrl = test_ctrl();

        // Open up the acceleration envelope so it cannot bind here
        ctrl.params.accel_max_abs_radss = [1e4; NUM_ARM_JOINTS];

        // 1 mrad from the upper position limit with a 1 ms period: the
        // demand may not exceed 1 rad/s upward, exactly the distance over
        // the period
        let input = InputData {
            pos_rad: [1.999; NUM_ARM_JOINTS],
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            period_s: 0.001,
        };

        let bounds = ctrl.calc_rate_bounds(&input);

        for i in 0..NUM_ARM_JOINTS {
            let (lower, upper) = bounds[i];
            assert!((upper - 1.0).abs() < 1e-9, "upper = {}", upper);
            assert_eq!(lower, -1.0);
        }
    }

    #[test]
    fn test_acceleration_envelope_binds_when_moving() {
        let mut ctrl = test_ctrl();

        // Moving at 0.5 rad/s with a 10 rad/s^2 limit and 1 ms period the
        // demand must stay within 0.01 rad/s of the current velocity
        let input = InputData {
            pos_rad: [0.0; NUM_ARM_JOINTS],
            rate_filt_rads: [0.5; NUM_ARM_JOINTS],
            period_s: 0.001,
        };

        let bounds = ctrl.calc_rate_bounds(&input);

        for i in 0..NUM_ARM_JOINTS {
            let (lower, upper) = bounds[i];
            assert!((lower - 0.49).abs() < 1e-9, "lower = {}", lower);
            assert!((upper - 0.51).abs() < 1e-9, "upper = {}", upper);
        }
    }

    #[test]
    fn test_empty_intersection_collapses() {
        let mut ctrl = test_ctrl();

        // Past the upper position limit (noisy measurement) while moving
        // upward fast: the position envelope demands a downward velocity the
        // acceleration envelope cannot reach, so the intersection is empty
        let input = InputData {
            pos_rad: [2.001; NUM_ARM_JOINTS],
            rate_filt_rads: [0.9; NUM_ARM_JOINTS],
            period_s: 0.001,
        };

        let bounds = ctrl.calc_rate_bounds(&input);

        for i in 0..NUM_ARM_JOINTS {
            let (lower, upper) = bounds[i];
            assert_eq!(lower, upper);
            assert!(ctrl.report.bound_widened[i]);
        }
    }

    #[test]
    fn test_non_positive_period_uses_nominal() {
        let mut ctrl = test_ctrl();

        let input = InputData {
            pos_rad: [0.0; NUM_ARM_JOINTS],
            rate_filt_rads: [0.0; NUM_ARM_JOINTS],
            period_s: 0.0,
        };

        let bounds = ctrl.calc_rate_bounds(&input);

        for i in 0..NUM_ARM_JOINTS {
            let (lower, upper) = bounds[i];
            assert!(lower.is_finite() && upper.is_finite());
            assert!(lower < upper);
        }
    }
}
