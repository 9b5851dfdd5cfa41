//! Geometric regularizers on a deformed mesh
//!
//! Each regularizer evaluates a scalar penalty on the current vertex positions
//! and its gradient with respect to every vertex. The face topology is fixed
//! for the whole fit, so it is passed in precomputed.

pub mod edge;
pub mod laplacian;
pub mod normal;

pub use edge::{mesh_edge_loss, EdgeLoss};
pub use laplacian::{mesh_laplacian_smoothing, LaplacianMethod, LaplacianSmoothing};
pub use normal::{mesh_normal_consistency, NormalConsistency};

use meshfit_core::{MeshTopology, TriangleMesh, Vector3f};

/// Value of a loss term and its per-vertex gradient.
#[derive(Debug, Clone, Default)]
pub struct LossOutput {
    pub value: f32,
    pub grad: Vec<Vector3f>,
}

impl LossOutput {
    /// A zero loss with a zero gradient for `vertex_count` vertices.
    pub fn zero(vertex_count: usize) -> Self {
        Self {
            value: 0.0,
            grad: vec![Vector3f::zeros(); vertex_count],
        }
    }

    /// Add `weight * grad` into an accumulated gradient.
    pub fn accumulate_into(&self, weight: f32, total: &mut [Vector3f]) {
        for (t, g) in total.iter_mut().zip(&self.grad) {
            *t += g * weight;
        }
    }
}

/// A differentiable penalty on mesh geometry.
pub trait MeshRegularizer {
    /// Evaluate the penalty and its gradient at the current vertex positions.
    ///
    /// `topology` must have been built from `mesh`'s face list.
    fn evaluate(&self, mesh: &TriangleMesh, topology: &MeshTopology) -> LossOutput;
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use meshfit_core::Point3f;

    /// Central finite differences of `f` at every coordinate of `mesh`.
    pub fn numeric_gradient<F>(mesh: &TriangleMesh, h: f32, f: F) -> Vec<Vector3f>
    where
        F: Fn(&TriangleMesh) -> f32,
    {
        let mut grad = vec![Vector3f::zeros(); mesh.vertex_count()];
        for v in 0..mesh.vertex_count() {
            for axis in 0..3 {
                let mut plus = mesh.clone();
                plus.vertices[v][axis] += h;
                let mut minus = mesh.clone();
                minus.vertices[v][axis] -= h;
                grad[v][axis] = (f(&plus) - f(&minus)) / (2.0 * h);
            }
        }
        grad
    }

    pub fn assert_gradients_close(analytic: &[Vector3f], numeric: &[Vector3f], tol: f32) {
        assert_eq!(analytic.len(), numeric.len());
        for (v, (a, n)) in analytic.iter().zip(numeric).enumerate() {
            assert!(
                (a - n).norm() < tol,
                "vertex {}: analytic {:?} vs numeric {:?}",
                v,
                a,
                n
            );
        }
    }

    /// A slightly irregular closed octahedron, so no gradient vanishes by symmetry.
    pub fn bumpy_octahedron() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(1.1, 0.05, -0.02),
                Point3f::new(-0.9, 0.1, 0.03),
                Point3f::new(0.02, 1.2, 0.1),
                Point3f::new(-0.05, -0.95, 0.04),
                Point3f::new(0.1, -0.03, 1.05),
                Point3f::new(0.04, 0.08, -0.85),
            ],
            vec![
                [0, 2, 4],
                [2, 1, 4],
                [1, 3, 4],
                [3, 0, 4],
                [2, 0, 5],
                [1, 2, 5],
                [3, 1, 5],
                [0, 3, 5],
            ],
        )
    }
}
