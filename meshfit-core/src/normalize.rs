//! Center-and-scale normalization of target meshes
//!
//! Fitting runs in a canonical frame: the target is translated so its vertex
//! centroid sits at the origin and divided by its largest absolute coordinate,
//! which puts it inside the unit cube and roughly inside the unit sphere the
//! source starts from. The parameters are kept so the fitted result can be
//! mapped back to the target's original frame.

use crate::error::{Error, Result};
use crate::mesh::TriangleMesh;
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// Translation and uniform scale that map a vertex set into the unit frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Centroid of the original vertices.
    pub center: Point3f,
    /// Largest absolute coordinate after centering.
    pub scale: f32,
}

impl Normalization {
    /// Compute the normalization for a vertex set.
    pub fn fit(vertices: &[Point3f]) -> Result<Self> {
        let center = centroid(vertices).ok_or_else(|| {
            Error::InvalidData("cannot normalize an empty vertex set".to_string())
        })?;
        let scale = vertices
            .iter()
            .map(|v| (v - center).abs().max())
            .fold(0.0f32, f32::max);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::invalid_param(
                "scale",
                scale,
                "vertices must span a non-degenerate, finite extent",
            ));
        }
        Ok(Self { center, scale })
    }

    /// Map a point from the original frame into the unit frame.
    #[inline]
    pub fn apply(&self, point: &Point3f) -> Point3f {
        Point3f::from((point - self.center) / self.scale)
    }

    /// Map a point from the unit frame back to the original frame.
    #[inline]
    pub fn invert(&self, point: &Point3f) -> Point3f {
        self.center + point.coords * self.scale
    }

    /// The forward mapping as a matrix transform.
    pub fn to_transform(&self) -> Transform3D {
        Transform3D::uniform_scaling(1.0 / self.scale)
            * Transform3D::translation(-self.center.coords)
    }

    /// The inverse mapping as a matrix transform.
    pub fn inverse_transform(&self) -> Transform3D {
        Transform3D::translation(self.center.coords) * Transform3D::uniform_scaling(self.scale)
    }

    /// Copy of `mesh` with every vertex mapped into the unit frame.
    pub fn normalize_mesh(&self, mesh: &TriangleMesh) -> TriangleMesh {
        let mut out = TriangleMesh::from_vertices_and_faces(
            mesh.vertices.iter().map(|v| self.apply(v)).collect(),
            mesh.faces.clone(),
        );
        out.normals = mesh.normals.clone();
        out
    }

    /// Copy of `mesh` with every vertex mapped back to the original frame.
    pub fn denormalize_mesh(&self, mesh: &TriangleMesh) -> TriangleMesh {
        let mut out = TriangleMesh::from_vertices_and_faces(
            mesh.vertices.iter().map(|v| self.invert(v)).collect(),
            mesh.faces.clone(),
        );
        out.normals = mesh.normals.clone();
        out
    }
}

/// Normalize a mesh, returning the normalized copy and the parameters used.
pub fn normalize_mesh(mesh: &TriangleMesh) -> Result<(TriangleMesh, Normalization)> {
    let norm = Normalization::fit(&mesh.vertices)?;
    log::debug!(
        "normalized {} vertices: center = [{:.4}, {:.4}, {:.4}], scale = {:.4}",
        mesh.vertex_count(),
        norm.center.x,
        norm.center.y,
        norm.center.z,
        norm.scale
    );
    Ok((norm.normalize_mesh(mesh), norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn skewed_box() -> TriangleMesh {
        let vertices = vec![
            Point3f::new(10.0, 2.0, -3.0),
            Point3f::new(14.0, 2.0, -3.0),
            Point3f::new(14.0, 3.0, -3.0),
            Point3f::new(10.0, 3.0, -1.0),
            Point3f::new(11.0, 2.5, -2.0),
        ];
        TriangleMesh::from_vertices_and_faces(vertices, vec![[0, 1, 2], [0, 2, 3], [1, 3, 4]])
    }

    #[test]
    fn test_centroid_at_origin_and_unit_extent() {
        let (normalized, norm) = normalize_mesh(&skewed_box()).unwrap();
        let c = centroid(&normalized.vertices).unwrap();
        assert_relative_eq!(c, Point3f::origin(), epsilon = 1e-5);

        let max_abs = normalized
            .vertices
            .iter()
            .map(|v| v.coords.abs().max())
            .fold(0.0f32, f32::max);
        assert_relative_eq!(max_abs, 1.0, epsilon = 1e-6);
        assert!(norm.scale > 0.0);
        assert_eq!(normalized.faces, skewed_box().faces);
    }

    #[test]
    fn test_inverse_reconstructs_original() {
        let mesh = skewed_box();
        let (normalized, norm) = normalize_mesh(&mesh).unwrap();
        let restored = norm.denormalize_mesh(&normalized);
        for (a, b) in mesh.vertices.iter().zip(&restored.vertices) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_matrix_forms_agree() {
        let mesh = skewed_box();
        let norm = Normalization::fit(&mesh.vertices).unwrap();
        let forward = norm.to_transform();
        let inverse = norm.inverse_transform();
        for v in &mesh.vertices {
            assert_relative_eq!(forward.transform_point(v), norm.apply(v), epsilon = 1e-5);
            assert_relative_eq!(inverse.transform_point(&norm.apply(v)), *v, epsilon = 1e-4);
        }
        assert!((forward * inverse).is_identity(1e-5));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(Normalization::fit(&[]).is_err());
        let same = vec![Point3f::new(1.0, 1.0, 1.0); 3];
        assert!(matches!(
            Normalization::fit(&same),
            Err(Error::InvalidParameter { name: "scale", .. })
        ));
    }
}
