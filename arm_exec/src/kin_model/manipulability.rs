//! Manipulability measure and its gradient

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Jacobian, JointVec, KinModel};
use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the manipulability measure `w = sqrt(det(J J^T))`.
///
/// The measure is zero when the Jacobian loses rank, i.e. at a kinematic
/// singularity. Floating point error can push the determinant slightly
/// negative near a singularity, so it is clamped to zero before the root.
pub fn manipulability(jacobian: &Jacobian) -> f64 {
    let jjt = jacobian * jacobian.transpose();
    let det = jjt.determinant();

    if det > 0.0 {
        det.sqrt()
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinModel {
    /// Calculate the gradient of the manipulability measure with respect to
    /// joint position.
    ///
    /// Central finite difference per joint with the configured step. The
    /// cost is fixed at two Jacobian evaluations per joint, which keeps the
    /// calculation deterministic and within the cycle budget.
    pub fn manipulability_gradient(&self, q: &JointVec) -> JointVec {
        let step_rad = self.params.grad_step_rad;
        let mut grad = JointVec::zeros();

        for i in 0..NUM_ARM_JOINTS {
            let mut q_fwd = *q;
            let mut q_bwd = *q;
            q_fwd[i] += step_rad;
            q_bwd[i] -= step_rad;

            let w_fwd = manipulability(&self.jacobian(&q_fwd));
            let w_bwd = manipulability(&self.jacobian(&q_bwd));

            grad[i] = (w_fwd - w_bwd) / (2.0 * step_rad);
        }

        grad
    }
}

#[cfg(test)]
mod test {
    use super::super::test_util::{home_config, panda_params};
    use super::*;

    #[test]
    fn test_manipulability_at_home() {
        let model = KinModel::new(panda_params());
        let w = manipulability(&model.jacobian(&home_config()));

        // Hand-calculated for the Panda home configuration
        assert!((w - 0.08015).abs() < 1e-4, "w = {}", w);
    }

    #[test]
    fn test_manipulability_singular_is_zero() {
        let model = KinModel::new(panda_params());

        // The fully stretched configuration is singular: the arm cannot
        // generate velocity along its own axis. Rounding in the determinant
        // may leave a vanishingly small positive value rather than an exact
        // zero.
        let w = manipulability(&model.jacobian(&JointVec::zeros()));

        assert!(!w.is_nan());
        assert!(w < 1e-9, "w = {}", w);
    }

    #[test]
    fn test_manipulability_rank_deficient_jacobian() {
        // A Jacobian with an all-zero row has rank < 6 whatever the joint
        // columns are
        let mut jac = Jacobian::zeros();
        for i in 0..NUM_ARM_JOINTS {
            jac[(0, i)] = 1.0;
            jac[(3, i)] = 0.5;
        }

        assert_eq!(manipulability(&jac), 0.0);
    }

    #[test]
    fn test_gradient_at_home() {
        let model = KinModel::new(panda_params());
        let grad = model.manipulability_gradient(&home_config());

        // All components finite, and the dominant in-plane components match
        // hand-calculated values
        for i in 0..NUM_ARM_JOINTS {
            assert!(grad[i].is_finite());
        }
        assert!((grad[3] - 0.05951).abs() < 1e-4, "grad[3] = {}", grad[3]);
        assert!((grad[5] - 0.01035).abs() < 1e-4, "grad[5] = {}", grad[5]);

        // Out-of-plane joints have no first-order effect at this symmetric
        // configuration
        assert!(grad[0].abs() < 1e-6);
        assert!(grad[2].abs() < 1e-4);
    }

    #[test]
    fn test_gradient_deterministic() {
        let model = KinModel::new(panda_params());
        let q = home_config();

        let g0 = model.manipulability_gradient(&q);
        let g1 = model.manipulability_gradient(&q);

        assert_eq!(g0, g1);
    }
}
