//! Per-cycle manipulability QP solution

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{ManiCtrl, RateBounds};
use crate::kin_model::JointVec;
use hw_if::arm::NUM_ARM_JOINTS;
use util::maths;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ManiCtrl {
    /// Solve this cycle's QP for the joint velocity demands.
    ///
    /// The program is
    ///
    /// ```text
    ///     maximise    g^T v - lambda * ||v||^2
    ///     subject to  lower_i <= v_i <= upper_i
    /// ```
    ///
    /// with `g` the manipulability gradient and `lambda` the regularisation
    /// weight, which makes the problem strictly convex with a unique bounded
    /// solution. The objective is separable and the constraints are pure box
    /// constraints, so the program decomposes into independent scalar
    /// problems with the closed-form solution
    ///
    /// ```text
    ///     v_i = clamp(g_i / (2 lambda), lower_i, upper_i)
    /// ```
    ///
    /// A general QP solver can be substituted here without changing the
    /// contract if coupled constraints are ever added.
    ///
    /// A non-finite gradient component (possible at a kinematic singularity)
    /// falls back to holding the current filtered velocity for that joint,
    /// clamped into bounds, and raises the corresponding report flag.
    pub(crate) fn calc_qp_dems(
        &mut self,
        grad: &JointVec,
        bounds: &RateBounds,
        rate_filt_rads: &[f64; NUM_ARM_JOINTS],
    ) -> [f64; NUM_ARM_JOINTS] {
        let mut rate_dems_rads = [0.0; NUM_ARM_JOINTS];

        for i in 0..NUM_ARM_JOINTS {
            let (lower, upper) = bounds[i];

            let rate_rads = if grad[i].is_finite() {
                grad[i] / (2.0 * self.params.reg_weight)
            } else {
                warn!(
                    "Joint {} manipulability gradient is non-finite, holding \
                     the current velocity",
                    i
                );
                self.report.grad_nonfinite[i] = true;
                rate_filt_rads[i]
            };

            rate_dems_rads[i] = maths::clamp(&rate_rads, &lower, &upper);
        }

        rate_dems_rads
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const REG_WEIGHT: f64 = 1e-3;

    fn test_ctrl() -> ManiCtrl {
        let mut ctrl = ManiCtrl::default();
        ctrl.params.reg_weight = REG_WEIGHT;
        ctrl
    }

    fn wide_bounds() -> RateBounds {
        [(f64::NEG_INFINITY, f64::INFINITY); NUM_ARM_JOINTS]
    }

    #[test]
    fn test_unconstrained_solution_is_scaled_gradient() {
        let mut ctrl = test_ctrl();

        let grad = JointVec::from_column_slice(&[0.1, -0.2, 0.0, 0.4, -0.5, 0.6, -0.7]);
        let dems = ctrl.calc_qp_dems(&grad, &wide_bounds(), &[0.0; NUM_ARM_JOINTS]);

        for i in 0..NUM_ARM_JOINTS {
            assert_eq!(dems[i], grad[i] / (2.0 * REG_WEIGHT));
        }
    }

    #[test]
    fn test_zero_gradient_gives_clamped_zero() {
        let mut ctrl = test_ctrl();

        let mut bounds = wide_bounds();
        // Zero inside the bounds for all joints except the last, whose
        // interval excludes it
        bounds[6] = (0.1, 0.2);

        let dems = ctrl.calc_qp_dems(&JointVec::zeros(), &bounds, &[0.0; NUM_ARM_JOINTS]);

        for i in 0..6 {
            assert_eq!(dems[i], 0.0);
        }
        assert_eq!(dems[6], 0.1);
    }

    #[test]
    fn test_solution_respects_bounds() {
        let mut ctrl = test_ctrl();

        let grad = JointVec::from_column_slice(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
        let bounds = [(-0.5, 0.5); NUM_ARM_JOINTS];

        let dems = ctrl.calc_qp_dems(&grad, &bounds, &[0.0; NUM_ARM_JOINTS]);

        // The unconstrained solution is +/- 500 rad/s, far outside the
        // bounds, so every joint saturates
        for i in 0..NUM_ARM_JOINTS {
            assert_eq!(dems[i], 0.5 * grad[i].signum());
            assert!(!ctrl.report.grad_nonfinite[i]);
        }
    }

    #[test]
    fn test_non_finite_gradient_holds_velocity() {
        let mut ctrl = test_ctrl();

        let mut grad = JointVec::from_column_slice(&[0.1; NUM_ARM_JOINTS]);
        grad[2] = f64::NAN;
        grad[4] = f64::INFINITY;

        let rate_filt_rads = [0.3; NUM_ARM_JOINTS];
        let mut bounds = wide_bounds();
        // Joint 4's hold velocity lies outside its bounds and must still be
        // clamped
        bounds[4] = (-0.1, 0.1);

        let dems = ctrl.calc_qp_dems(&grad, &bounds, &rate_filt_rads);

        assert_eq!(dems[2], 0.3);
        assert_eq!(dems[4], 0.1);
        assert!(ctrl.report.grad_nonfinite[2]);
        assert!(ctrl.report.grad_nonfinite[4]);

        for i in [0usize, 1, 3, 5, 6].iter() {
            assert_eq!(dems[*i], 0.1 / (2.0 * REG_WEIGHT));
            assert!(!ctrl.report.grad_nonfinite[*i]);
        }
    }
}
