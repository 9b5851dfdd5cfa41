//! Normal consistency regularizer
//!
//! For every pair of faces sharing an edge `(v0, v1)`, with opposite vertices
//! `a` and `b`, compare `n0 = (v1 - v0) x (a - v0)` against
//! `n1 = (b - v0) x (v1 - v0)` and penalize `1 - cos(n0, n1)`. On a
//! consistently oriented mesh both are the outward face normals, so the term
//! is zero for coplanar neighbors and grows as the dihedral angle folds.

use super::{LossOutput, MeshRegularizer};
use meshfit_core::{MeshTopology, TriangleMesh, Vector3f};

/// Norms below this are clamped when normalizing face normals.
const NORM_EPS: f32 = 1e-6;

/// Penalty on the angle between normals of adjacent faces.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalConsistency;

impl MeshRegularizer for NormalConsistency {
    fn evaluate(&self, mesh: &TriangleMesh, topology: &MeshTopology) -> LossOutput {
        mesh_normal_consistency(mesh, topology)
    }
}

/// Mean of `1 - cos` between the normals of every adjacent face pair.
///
/// A mesh without adjacent faces has zero loss.
pub fn mesh_normal_consistency(mesh: &TriangleMesh, topology: &MeshTopology) -> LossOutput {
    let mut out = LossOutput::zero(mesh.vertex_count());
    if topology.face_pairs.is_empty() {
        return out;
    }
    let scale = 1.0 / topology.face_pairs.len() as f32;

    let mut sum = 0.0f64;
    for pair in &topology.face_pairs {
        let [i0, i1] = pair.edge;
        let [ia, ib] = pair.opposite;
        let v0 = mesh.vertices[i0];
        let e = mesh.vertices[i1] - v0;
        let pa = mesh.vertices[ia] - v0;
        let pb = mesh.vertices[ib] - v0;

        let n0 = e.cross(&pa);
        let n1 = pb.cross(&e);

        let (cos, dcos_dn0, dcos_dn1) = cosine_with_gradient(&n0, &n1);
        sum += (1.0 - cos) as f64;

        // d(1 - cos)/dn, scaled by the mean
        let g0 = dcos_dn0 * -scale;
        let g1 = dcos_dn1 * -scale;

        let grad_e = pa.cross(&g0) + g1.cross(&pb);
        let grad_pa = g0.cross(&e);
        let grad_pb = e.cross(&g1);

        out.grad[i1] += grad_e;
        out.grad[ia] += grad_pa;
        out.grad[ib] += grad_pb;
        out.grad[i0] -= grad_e + grad_pa + grad_pb;
    }
    out.value = (sum * scale as f64) as f32;
    out
}

/// Cosine similarity with clamped norms, and its gradient with respect to each argument.
fn cosine_with_gradient(x: &Vector3f, y: &Vector3f) -> (f32, Vector3f, Vector3f) {
    let nx = x.norm();
    let ny = y.norm();
    let cx = nx.max(NORM_EPS);
    let cy = ny.max(NORM_EPS);
    let cos = x.dot(y) / (cx * cy);

    let mut dx = y / (cx * cy);
    if nx > NORM_EPS {
        dx -= x * (cos / (nx * nx));
    }
    let mut dy = x / (cx * cy);
    if ny > NORM_EPS {
        dy -= y * (cos / (ny * ny));
    }
    (cos, dx, dy)
}
