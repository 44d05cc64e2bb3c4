/// Euler rotation composition and position/attitude transforms
use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

/// Rotation around the three fixed world axes (in degrees)
///
/// Pitch turns about X, yaw about Y and roll about Z. Configuration files
/// spell it as a `[pitch, yaw, roll]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "[f64; 3]")]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl EulerAngles {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, d_pitch: f64, d_yaw: f64, d_roll: f64) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
        self.roll += d_roll;
    }
}

impl From<[f64; 3]> for EulerAngles {
    fn from([pitch, yaw, roll]: [f64; 3]) -> Self {
        Self::new(pitch, yaw, roll)
    }
}

/// Compose pitch/yaw/roll into a single orientation.
///
/// Yaw is applied first, then pitch, then roll, each around its fixed
/// world axis. Every placement and update goes through here so objects and
/// cameras agree on the convention.
pub fn compose_rotation(angles: &EulerAngles) -> UnitQuaternion<f64> {
    let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.yaw.to_radians());
    let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.pitch.to_radians());
    let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.roll.to_radians());

    roll * pitch * yaw
}

/// Position and orientation carried by a transform node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAttitude {
    pub position: Vector3<f64>,
    pub attitude: UnitQuaternion<f64>,
}

impl PositionAttitude {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
        }
    }

    /// Build a transform from a position and Euler rotation
    pub fn from_placement(position: &[f64; 3], rotation: &EulerAngles) -> Self {
        let mut transform = Self::identity();
        transform.set_placement(position, rotation);
        transform
    }

    /// Overwrite position and attitude in place
    pub fn set_placement(&mut self, position: &[f64; 3], rotation: &EulerAngles) {
        self.position = Vector3::from(*position);
        self.attitude = compose_rotation(rotation);
    }

    /// Local-to-parent matrix: rotate first, then translate
    pub fn matrix(&self) -> Matrix4<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.attitude).to_homogeneous()
    }
}

impl Default for PositionAttitude {
    fn default() -> Self {
        Self::identity()
    }
}

/// Matrix helpers shared by the viewer and renderers
pub struct Transform;

impl Transform {
    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f64>,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
    ) -> Matrix4<f64> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_orientation(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> bool {
        a.angle_to(b) < 1e-9
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let q = compose_rotation(&EulerAngles::zero());
        assert!(same_orientation(&q, &UnitQuaternion::identity()));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let angles = EulerAngles::new(12.5, -73.0, 410.0);
        let first = compose_rotation(&angles);
        let second = compose_rotation(&angles);
        assert_eq!(first, second);
    }

    #[test]
    fn test_yaw_applies_before_pitch() {
        // Yaw 90 sends +X to -Z, pitch 90 then sends -Z to +Y.
        let q = compose_rotation(&EulerAngles::new(90.0, 90.0, 0.0));
        let x = q * Vector3::x();
        assert!((x - Vector3::y()).norm() < 1e-9);

        // Pitch-first order would leave +X at -Z instead.
        let pitch_first = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 90f64.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 90f64.to_radians());
        assert!(((pitch_first * Vector3::x()) + Vector3::z()).norm() < 1e-9);
        assert!(!same_orientation(&q, &pitch_first));
    }

    #[test]
    fn test_pitch_and_roll_do_not_collapse_to_single_axis() {
        let combined = compose_rotation(&EulerAngles::new(90.0, 0.0, 90.0));
        let about_x = compose_rotation(&EulerAngles::new(180.0, 0.0, 0.0));
        let about_z = compose_rotation(&EulerAngles::new(0.0, 0.0, 180.0));
        assert!(!same_orientation(&combined, &about_x));
        assert!(!same_orientation(&combined, &about_z));

        // Roll is applied last, about world Z.
        let expected = compose_rotation(&EulerAngles::new(0.0, 0.0, 90.0))
            * compose_rotation(&EulerAngles::new(90.0, 0.0, 0.0));
        assert!(same_orientation(&combined, &expected));
    }

    #[test]
    fn test_angles_are_not_wrapped() {
        let wide = compose_rotation(&EulerAngles::new(0.0, 370.0, 0.0));
        let narrow = compose_rotation(&EulerAngles::new(0.0, 10.0, 0.0));
        assert!(same_orientation(&wide, &narrow));
    }

    #[test]
    fn test_placement_without_rotation() {
        let transform = PositionAttitude::from_placement(&[1.0, 2.0, 3.0], &EulerAngles::zero());
        assert_eq!(transform.position, Vector3::new(1.0, 2.0, 3.0));
        assert!(same_orientation(&transform.attitude, &UnitQuaternion::identity()));

        let m = transform.matrix();
        assert_eq!((m[(0, 3)], m[(1, 3)], m[(2, 3)]), (1.0, 2.0, 3.0));
        assert_eq!(m[(0, 0)], 1.0);
    }

    #[test]
    fn test_euler_from_array() {
        let mut angles = EulerAngles::from([10.0, 20.0, 30.0]);
        assert_eq!(angles, EulerAngles::new(10.0, 20.0, 30.0));

        angles.rotate(-10.0, 5.0, 0.5);
        assert!((angles.pitch).abs() < 1e-12);
        assert!((angles.yaw - 25.0).abs() < 1e-12);
        assert!((angles.roll - 30.5).abs() < 1e-12);
    }
}
