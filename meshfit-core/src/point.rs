//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Convert a point to the `[x, y, z]` layout used by spatial indices.
#[inline]
pub fn to_array(point: &Point3f) -> [f32; 3] {
    [point.x, point.y, point.z]
}

/// Arithmetic mean of a set of points, accumulated in double precision.
///
/// Returns `None` for an empty slice.
pub fn centroid(points: &[Point3f]) -> Option<Point3f> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3d::zeros(), |acc, p| acc + p.coords.cast::<f64>());
    let mean = sum / points.len() as f64;
    Some(Point3f::from(mean.cast::<f32>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid() {
        let points = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 4.0, 6.0),
        ];
        let c = centroid(&points).unwrap();
        assert_relative_eq!(c, Point3f::new(2.0 / 3.0, 4.0 / 3.0, 2.0), epsilon = 1e-6);
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_to_array() {
        assert_eq!(to_array(&Point3f::new(1.0, -2.0, 3.5)), [1.0, -2.0, 3.5]);
    }
}
