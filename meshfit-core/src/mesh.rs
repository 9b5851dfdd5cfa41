//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Check that the mesh has faces and that every face index is in range.
    pub fn validate(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(Error::EmptyMesh);
        }
        let vertex_count = self.vertices.len();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&v| v >= vertex_count) {
                return Err(Error::InvalidVertexIndex {
                    face,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// The three corner positions of a face.
    #[inline]
    pub fn face_vertices(&self, face: usize) -> [Point3f; 3] {
        let [a, b, c] = self.faces[face];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Area of a single face.
    pub fn face_area(&self, face: usize) -> f32 {
        let [v0, v1, v2] = self.face_vertices(face);
        0.5 * (v1 - v0).cross(&(v2 - v0)).norm()
    }

    /// Areas of all faces, in face order.
    pub fn face_areas(&self) -> Vec<f32> {
        (0..self.faces.len()).map(|f| self.face_area(f)).collect()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f32 {
        self.face_areas().iter().sum()
    }

    /// Calculate unit face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        (0..self.faces.len())
            .map(|f| {
                let [v0, v1, v2] = self.face_vertices(f);
                (v1 - v0)
                    .cross(&(v2 - v0))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Area-weighted vertex normals.
    pub fn calculate_vertex_normals(&self) -> Vec<Vector3f> {
        let mut normals = vec![Vector3f::zeros(); self.vertices.len()];
        for (f, face) in self.faces.iter().enumerate() {
            let [v0, v1, v2] = self.face_vertices(f);
            let n = (v1 - v0).cross(&(v2 - v0));
            for &v in face {
                normals[v] += n;
            }
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros))
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Build a new mesh whose vertices are displaced by `offsets`.
    ///
    /// Faces are shared with `self`; stored normals are dropped since they no
    /// longer describe the displaced surface.
    pub fn offset_vertices(&self, offsets: &[Vector3f]) -> Result<TriangleMesh> {
        if offsets.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} vertex offsets, got {}",
                self.vertices.len(),
                offsets.len()
            )));
        }
        let vertices = self
            .vertices
            .iter()
            .zip(offsets)
            .map(|(v, d)| v + d)
            .collect();
        Ok(TriangleMesh::from_vertices_and_faces(vertices, self.faces.clone()))
    }

    /// Replace the vertex positions, keeping the face topology.
    pub fn with_vertices(&self, vertices: Vec<Point3f>) -> Result<TriangleMesh> {
        if vertices.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} vertices, got {}",
                self.vertices.len(),
                vertices.len()
            )));
        }
        Ok(TriangleMesh::from_vertices_and_faces(vertices, self.faces.clone()))
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_tetrahedron() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    #[test]
    fn test_validate() {
        let mesh = make_tetrahedron();
        assert!(mesh.validate().is_ok());

        let mut broken = mesh.clone();
        broken.faces.push([0, 1, 7]);
        match broken.validate() {
            Err(Error::InvalidVertexIndex { face, vertex, vertex_count }) => {
                assert_eq!((face, vertex, vertex_count), (4, 7, 4));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(TriangleMesh::new().validate(), Err(Error::EmptyMesh)));
    }

    #[test]
    fn test_face_area() {
        let mesh = make_tetrahedron();
        assert_relative_eq!(mesh.face_area(0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(mesh.face_area(3), 3f32.sqrt() / 2.0, epsilon = 1e-6);
        assert_relative_eq!(mesh.surface_area(), 1.5 + 3f32.sqrt() / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_face_normals_point_outward() {
        let mesh = make_tetrahedron();
        let normals = mesh.calculate_face_normals();
        assert_relative_eq!(normals[0], Vector3f::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(normals[1], Vector3f::new(0.0, -1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_offset_vertices() {
        let mesh = make_tetrahedron();
        let zero = vec![Vector3f::zeros(); 4];
        assert_eq!(mesh.offset_vertices(&zero).unwrap(), mesh);

        let mut offsets = zero.clone();
        offsets[3] = Vector3f::new(0.0, 0.0, 1.0);
        let moved = mesh.offset_vertices(&offsets).unwrap();
        assert_eq!(moved.vertices[3], Point3f::new(0.0, 0.0, 2.0));
        assert_eq!(moved.faces, mesh.faces);
        // the source mesh is left untouched
        assert_eq!(mesh.vertices[3], Point3f::new(0.0, 0.0, 1.0));

        assert!(mesh.offset_vertices(&zero[..3]).is_err());
    }
}
