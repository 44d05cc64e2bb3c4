/// Viewer camera: view and projection matrices
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::Transform;

/// Vertical field of view used for every scene camera (degrees)
pub const FIELD_OF_VIEW_DEGREES: f64 = 30.0;

/// The matrices a viewer renders through
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCamera {
    view: Matrix4<f64>,
    projection: Matrix4<f64>,
    fov_y: f64,
    aspect: f64,
    near: f64,
    far: f64,
}

impl ViewCamera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            fov_y: FIELD_OF_VIEW_DEGREES,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        };
        let aspect = width.max(1) as f64 / height.max(1) as f64;
        camera.set_perspective(FIELD_OF_VIEW_DEGREES, aspect, 0.1, 1000.0);
        camera
    }

    /// Right-handed look-at view
    pub fn set_view_look_at(&mut self, eye: &Point3<f64>, center: &Point3<f64>, up: &Vector3<f64>) {
        self.view = Matrix4::look_at_rh(eye, center, up);
    }

    pub fn set_view_matrix(&mut self, view: Matrix4<f64>) {
        self.view = view;
    }

    /// Perspective projection, field of view given in degrees
    pub fn set_perspective(&mut self, fov_y_degrees: f64, aspect: f64, near: f64, far: f64) {
        self.fov_y = fov_y_degrees;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.projection = Matrix4::new_perspective(aspect, fov_y_degrees.to_radians(), near, far);
    }

    pub fn view_matrix(&self) -> &Matrix4<f64> {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Matrix4<f64> {
        &self.projection
    }

    pub fn fov_y(&self) -> f64 {
        self.fov_y
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn clip_range(&self) -> (f64, f64) {
        (self.near, self.far)
    }

    /// Project a model-space point to screen space.
    ///
    /// Returns pixel x/y and normalized depth, or `None` when the point lies
    /// behind the eye or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = Transform::mvp_matrix(model_matrix, &self.view, &self.projection);
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero or negative w
        if clip.w < 1e-9 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.x < -1.0
            || ndc.x > 1.0
            || ndc.y < -1.0
            || ndc.y > 1.0
            || ndc.z < -1.0
            || ndc.z > 1.0
        {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f64;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f64;

        Some((screen_x as f32, screen_y as f32, ndc.z as f32))
    }
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = ViewCamera::new(800, 600);
        assert_eq!(camera.fov_y(), FIELD_OF_VIEW_DEGREES);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-9);
        assert_eq!(camera.view_matrix(), &Matrix4::identity());
    }

    #[test]
    fn test_look_at_centers_target() {
        let mut camera = ViewCamera::new(100, 100);
        camera.set_view_look_at(
            &Point3::new(0.0, -10.0, 0.0),
            &Point3::origin(),
            &Vector3::z(),
        );

        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 100, 100)
            .unwrap();
        assert!((x - 50.0).abs() < 1e-4);
        assert!((y - 50.0).abs() < 1e-4);
        assert!(depth > -1.0 && depth < 1.0);

        // Behind the eye
        assert!(camera
            .project_to_screen(&Point3::new(0.0, -20.0, 0.0), &Matrix4::identity(), 100, 100)
            .is_none());
    }
}
