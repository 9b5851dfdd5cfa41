//! Edge and adjacency information derived from a fixed face set
//!
//! The regularizers only need connectivity, and the source mesh's faces never
//! change during a fit, so the topology is built once and reused every step.

use crate::error::Result;
use crate::mesh::TriangleMesh;
use std::collections::HashMap;

/// Two faces sharing an edge, described by the edge endpoints and the vertex
/// of each face that is not on the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacePair {
    /// Shared edge, smaller vertex index first.
    pub edge: [usize; 2],
    /// Opposite vertex of the first and of the second face.
    pub opposite: [usize; 2],
}

/// Connectivity of a triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    /// Unique undirected edges, smaller vertex index first, in first-seen order.
    pub edges: Vec<[usize; 2]>,
    /// Faces incident to each edge, indexed like `edges`.
    pub edge_faces: Vec<Vec<usize>>,
    /// Sorted neighbor vertices of each vertex.
    pub neighbors: Vec<Vec<usize>>,
    /// Every pair of faces that share an edge.
    pub face_pairs: Vec<FacePair>,
    vertex_count: usize,
}

impl MeshTopology {
    /// Build the topology of `mesh`, validating its face indices first.
    pub fn from_mesh(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;
        let vertex_count = mesh.vertex_count();

        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(mesh.faces.len() * 2);
        let mut edges = Vec::new();
        let mut edge_faces: Vec<Vec<usize>> = Vec::new();

        for (fi, face) in mesh.faces.iter().enumerate() {
            for j in 0..3 {
                let a = face[j];
                let b = face[(j + 1) % 3];
                if a == b {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                let idx = *edge_map.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_faces.push(Vec::new());
                    edges.len() - 1
                });
                edge_faces[idx].push(fi);
            }
        }

        let mut neighbors = vec![Vec::new(); vertex_count];
        for &[a, b] in &edges {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }

        let mut face_pairs = Vec::new();
        for (edge, faces) in edges.iter().zip(&edge_faces) {
            for i in 0..faces.len() {
                for j in (i + 1)..faces.len() {
                    let a = opposite_vertex(&mesh.faces[faces[i]], edge);
                    let b = opposite_vertex(&mesh.faces[faces[j]], edge);
                    if let (Some(a), Some(b)) = (a, b) {
                        face_pairs.push(FacePair {
                            edge: *edge,
                            opposite: [a, b],
                        });
                    }
                }
            }
        }

        log::debug!(
            "built topology: {} vertices, {} edges, {} face pairs",
            vertex_count,
            edges.len(),
            face_pairs.len()
        );

        Ok(Self {
            edges,
            edge_faces,
            neighbors,
            face_pairs,
            vertex_count,
        })
    }

    /// Number of vertices the topology was built for.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of unique edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges with only one incident face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = &[usize; 2]> {
        self.edges
            .iter()
            .zip(&self.edge_faces)
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| edge)
    }

    /// Whether every edge is shared by exactly two faces.
    pub fn is_closed(&self) -> bool {
        self.edge_faces.iter().all(|faces| faces.len() == 2)
    }
}

fn opposite_vertex(face: &[usize; 3], edge: &[usize; 2]) -> Option<usize> {
    face.iter().copied().find(|v| *v != edge[0] && *v != edge[1])
}
