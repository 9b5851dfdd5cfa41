//! Edge length regularizer
//!
//! Mean over unique edges of `(|v0 - v1| - target_length)^2`. With the
//! default target of zero this is the mean squared edge length, which keeps
//! triangles from stretching into slivers.

use super::{LossOutput, MeshRegularizer};
use meshfit_core::{MeshTopology, TriangleMesh};
use serde::{Deserialize, Serialize};

/// Penalty on edge lengths deviating from `target_length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeLoss {
    pub target_length: f32,
}

impl EdgeLoss {
    pub fn new(target_length: f32) -> Self {
        Self { target_length }
    }
}

impl MeshRegularizer for EdgeLoss {
    fn evaluate(&self, mesh: &TriangleMesh, topology: &MeshTopology) -> LossOutput {
        mesh_edge_loss(mesh, topology, self.target_length)
    }
}

/// Mean squared deviation of edge lengths from `target_length`.
pub fn mesh_edge_loss(mesh: &TriangleMesh, topology: &MeshTopology, target_length: f32) -> LossOutput {
    let mut out = LossOutput::zero(mesh.vertex_count());
    if topology.edges.is_empty() {
        return out;
    }
    let scale = 1.0 / topology.edge_count() as f32;

    let mut sum = 0.0f64;
    for &[a, b] in &topology.edges {
        let d = mesh.vertices[a] - mesh.vertices[b];
        if target_length == 0.0 {
            sum += d.norm_squared() as f64;
            let g = d * (2.0 * scale);
            out.grad[a] += g;
            out.grad[b] -= g;
        } else {
            let len = d.norm();
            let diff = len - target_length;
            sum += (diff * diff) as f64;
            // the length has no gradient at a collapsed edge
            if len > 0.0 {
                let g = d * (2.0 * scale * diff / len);
                out.grad[a] += g;
                out.grad[b] -= g;
            }
        }
    }
    out.value = (sum * scale as f64) as f32;
    out
}
