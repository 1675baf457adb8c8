//! Forward kinematics and geometric Jacobian calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry3, Vector3};

// Internal
use super::{Jacobian, JointVec, KinParams};
use hw_if::arm::NUM_ARM_JOINTS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics model of the arm.
pub struct KinModel {
    pub(crate) params: KinParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinModel {
    /// Create a new model from the given kinematic description.
    pub fn new(params: KinParams) -> Self {
        Self { params }
    }

    /// Calculate the base-frame transform of every joint frame, plus the
    /// end-effector transform, at the given joint configuration.
    fn chain_transforms(
        &self,
        q: &JointVec,
    ) -> ([Isometry3<f64>; NUM_ARM_JOINTS], Isometry3<f64>) {
        let mut transforms = [Isometry3::identity(); NUM_ARM_JOINTS];
        let mut t = Isometry3::identity();

        for i in 0..NUM_ARM_JOINTS {
            t *= dh_transform(
                self.params.dh_a_m[i],
                self.params.dh_d_m[i],
                self.params.dh_alpha_rad[i],
                q[i],
            );
            transforms[i] = t;
        }

        let t_ee = t * Isometry3::translation(0.0, 0.0, self.params.flange_d_m);

        (transforms, t_ee)
    }

    /// Calculate the base-frame pose of the end-effector at the given joint
    /// configuration.
    pub fn ee_transform(&self, q: &JointVec) -> Isometry3<f64> {
        self.chain_transforms(q).1
    }

    /// Calculate the geometric Jacobian at the given joint configuration.
    ///
    /// All joints are revolute, so column `i` is `z_i x (p_ee - p_i)` in the
    /// linear rows and `z_i` in the angular rows, with `z_i` the joint axis
    /// and `p_i` the joint origin, both in the base frame.
    pub fn jacobian(&self, q: &JointVec) -> Jacobian {
        let (transforms, t_ee) = self.chain_transforms(q);
        let p_ee = t_ee.translation.vector;

        let mut jac = Jacobian::zeros();

        for i in 0..NUM_ARM_JOINTS {
            let z = transforms[i].rotation * Vector3::z();
            let p = transforms[i].translation.vector;
            let lin = z.cross(&(p_ee - p));

            jac[(0, i)] = lin.x;
            jac[(1, i)] = lin.y;
            jac[(2, i)] = lin.z;
            jac[(3, i)] = z.x;
            jac[(4, i)] = z.y;
            jac[(5, i)] = z.z;
        }

        jac
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Single modified-DH link transform.
///
/// `T = Rx(alpha) Tx(a) Rz(theta) Tz(d)`
fn dh_transform(a_m: f64, d_m: f64, alpha_rad: f64, theta_rad: f64) -> Isometry3<f64> {
    Isometry3::rotation(Vector3::x() * alpha_rad)
        * Isometry3::translation(a_m, 0.0, 0.0)
        * Isometry3::rotation(Vector3::z() * theta_rad)
        * Isometry3::translation(0.0, 0.0, d_m)
}

#[cfg(test)]
mod test {
    use super::super::test_util::{home_config, panda_params};
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_jacobian_angular_columns_are_unit_axes() {
        let model = KinModel::new(panda_params());
        let jac = model.jacobian(&home_config());

        // Every angular column is a rotation of the unit z axis, so must
        // itself be a unit vector
        for i in 0..NUM_ARM_JOINTS {
            let norm =
                (jac[(3, i)].powi(2) + jac[(4, i)].powi(2) + jac[(5, i)].powi(2)).sqrt();
            assert!((norm - 1.0).abs() < 1e-12, "column {} axis norm {}", i, norm);
        }
    }

    #[test]
    fn test_jacobian_first_joint() {
        let model = KinModel::new(panda_params());
        let q = home_config();
        let jac = model.jacobian(&q);

        // Joint 1 rotates about the base z axis, so its angular column is
        // exactly [0, 0, 1] and its linear column is z x p_ee
        assert!((jac[(3, 0)]).abs() < 1e-12);
        assert!((jac[(4, 0)]).abs() < 1e-12);
        assert!((jac[(5, 0)] - 1.0).abs() < 1e-12);

        let p_ee = model.ee_transform(&q).translation.vector;
        assert!((jac[(0, 0)] + p_ee.y).abs() < 1e-12);
        assert!((jac[(1, 0)] - p_ee.x).abs() < 1e-12);
        assert!((jac[(2, 0)]).abs() < 1e-12);
    }

    #[test]
    fn test_ee_transform_at_home() {
        let model = KinModel::new(panda_params());
        let t_ee = model.ee_transform(&home_config());
        let p = t_ee.translation.vector;

        // The Panda home pose puts the flange roughly half a meter out and
        // half a meter up, pointing down
        assert!(p.x > 0.2 && p.x < 0.6, "x = {}", p.x);
        assert!(p.y.abs() < 1e-9, "y = {}", p.y);
        assert!(p.z > 0.3 && p.z < 0.8, "z = {}", p.z);

        // Flange z axis points straight down at this configuration
        let z_ee = t_ee.rotation * Vector3::z();
        assert!((z_ee.z + 1.0).abs() < 1e-9, "z_ee = {:?}", z_ee);
    }

    #[test]
    fn test_dh_transform_pure_rotation() {
        let t = dh_transform(0.0, 0.0, 0.0, PI);
        let v = t * nalgebra::Point3::new(1.0, 0.0, 0.0);

        assert!((v.x + 1.0).abs() < 1e-12);
        assert!(v.y.abs() < 1e-12);
        assert!(v.z.abs() < 1e-12);
    }
}
