//! Camera placement for projecting meshes onto a 2D canvas

use meshfit_core::Point3f;
use nalgebra::{Matrix4, Point3, Vector3};

/// A look-at camera. Snapshots use its view space directly, which amounts to
/// an orthographic projection.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    /// A camera orbiting the origin, placed by elevation and azimuth in
    /// degrees with `+z` as the vertical axis.
    ///
    /// Elevations past the pole flip the up vector so the view is not mirrored.
    pub fn orbit_view(elevation_deg: f32, azimuth_deg: f32) -> Self {
        let mut camera = Self {
            up: Vector3::z(),
            ..Self::default()
        };
        camera.orbit(azimuth_deg.to_radians(), elevation_deg.to_radians());
        camera
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// View-space coordinates of `point`: `x` right, `y` up, `-z` forward.
    pub fn to_view(&self, point: &Point3f) -> Point3f {
        self.view_matrix().transform_point(point)
    }

    /// Place the camera on a sphere around the target, keeping its distance.
    ///
    /// `azimuth` is measured in the plane orthogonal to `up`, `elevation` from
    /// that plane toward `up`, both in radians.
    pub fn orbit(&mut self, azimuth: f32, elevation: f32) {
        let radius = (self.position - self.target).norm();
        let up = self.up.normalize();
        let reference = if up.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        let east = (reference - up * reference.dot(&up)).normalize();
        let north = up.cross(&east);

        let direction = east * (elevation.cos() * azimuth.cos())
            + north * (elevation.cos() * azimuth.sin())
            + up * elevation.sin();
        self.position = self.target + direction * radius;
        if elevation.cos() < 0.0 {
            self.up = -up;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        let view = camera.to_view(&Point3f::origin());
        assert_relative_eq!(view, Point3f::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = Camera::default();
        camera.orbit(0.7, 0.3);
        assert_relative_eq!((camera.position - camera.target).norm(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_top_down_view() {
        // looking straight down +z with x to the right
        let camera = Camera::orbit_view(89.9, -90.0);
        let p = camera.to_view(&Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-2);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_nearer_points_are_less_deep() {
        let camera = Camera::orbit_view(30.0, 45.0);
        let toward = (camera.position - camera.target).normalize();
        let near = camera.to_view(&Point3f::from(toward * 0.5));
        let far = camera.to_view(&Point3f::from(-toward * 0.5));
        assert!(near.z > far.z);
    }

    #[test]
    fn test_elevation_past_pole_flips_up() {
        let camera = Camera::orbit_view(190.0, 30.0);
        assert!(camera.up.z < 0.0);
        // -z is drawn upward once the camera passes under the scene
        let p = camera.to_view(&Point3f::new(0.0, 0.0, -0.5));
        assert!(p.y > 0.0);
    }
}
