//! Laplacian smoothing regularizer
//!
//! Every vertex gets a Laplacian vector `d_i = alpha_i * sum_j w_ij v_j - beta_i * v_i`
//! and the loss is the mean of `|d_i|` over all vertices. The methods differ
//! only in the weights:
//!
//! - `Uniform`: `w_ij = 1`, `alpha_i = 1 / deg_i`, `beta_i = 1`
//! - `Cot`: `w_ij = cot(a_ij) + cot(b_ij)`, `alpha_i = 1 / sum_j w_ij`, `beta_i = 1`
//! - `CotCurv`: cotangent weights scaled by `0.25 / area_i`, where `area_i` is
//!   the total area of the faces around vertex `i`
//!
//! Cotangent weights depend on the geometry but are held constant when
//! differentiating, so the gradient only flows through the positions.

use super::{LossOutput, MeshRegularizer};
use meshfit_core::{MeshTopology, TriangleMesh, Vector3f};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Heron's formula is clamped at this squared area.
const MIN_SQUARED_AREA: f32 = 1e-12;

/// Weighting scheme for the mesh Laplacian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaplacianMethod {
    #[default]
    Uniform,
    Cot,
    CotCurv,
}

impl fmt::Display for LaplacianMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaplacianMethod::Uniform => "uniform",
            LaplacianMethod::Cot => "cot",
            LaplacianMethod::CotCurv => "cotcurv",
        };
        f.write_str(name)
    }
}

impl FromStr for LaplacianMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(LaplacianMethod::Uniform),
            "cot" => Ok(LaplacianMethod::Cot),
            "cotcurv" => Ok(LaplacianMethod::CotCurv),
            other => Err(format!("unknown laplacian method '{}' (expected uniform, cot or cotcurv)", other)),
        }
    }
}

/// Penalty on each vertex's distance from the weighted average of its neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaplacianSmoothing {
    pub method: LaplacianMethod,
}

impl LaplacianSmoothing {
    pub fn new(method: LaplacianMethod) -> Self {
        Self { method }
    }
}

impl MeshRegularizer for LaplacianSmoothing {
    fn evaluate(&self, mesh: &TriangleMesh, topology: &MeshTopology) -> LossOutput {
        mesh_laplacian_smoothing(mesh, topology, self.method)
    }
}

/// Mean norm of the per-vertex Laplacian.
pub fn mesh_laplacian_smoothing(
    mesh: &TriangleMesh,
    topology: &MeshTopology,
    method: LaplacianMethod,
) -> LossOutput {
    let weights = LaplacianWeights::new(mesh, topology, method);
    weights.evaluate(mesh)
}

/// Frozen Laplacian weights: row `i` holds `(j, w_ij)` for each neighbor `j`.
#[derive(Debug, Clone)]
pub(crate) struct LaplacianWeights {
    rows: Vec<Vec<(usize, f32)>>,
    alpha: Vec<f32>,
    beta: Vec<f32>,
}

impl LaplacianWeights {
    pub(crate) fn new(mesh: &TriangleMesh, topology: &MeshTopology, method: LaplacianMethod) -> Self {
        match method {
            LaplacianMethod::Uniform => Self::uniform(topology),
            LaplacianMethod::Cot | LaplacianMethod::CotCurv => {
                let (rows, vertex_area) = cotangent_rows(mesh, topology);
                let row_sums: Vec<f32> = rows.iter().map(|r| r.iter().map(|(_, w)| w).sum()).collect();
                let (alpha, beta) = if method == LaplacianMethod::Cot {
                    // a non-positive row sum is left as is rather than inverted
                    let alpha = row_sums.iter().map(|&s| if s > 0.0 { 1.0 / s } else { s }).collect();
                    (alpha, vec![1.0; rows.len()])
                } else {
                    let inv_area: Vec<f32> = vertex_area
                        .iter()
                        .map(|&a| if a > 0.0 { 0.25 / a } else { 0.0 })
                        .collect();
                    let beta = inv_area.iter().zip(&row_sums).map(|(k, s)| k * s).collect();
                    (inv_area, beta)
                };
                Self { rows, alpha, beta }
            }
        }
    }

    fn uniform(topology: &MeshTopology) -> Self {
        let rows: Vec<Vec<(usize, f32)>> = topology
            .neighbors
            .iter()
            .map(|n| n.iter().map(|&j| (j, 1.0)).collect())
            .collect();
        // isolated vertices keep only the -v_i diagonal term
        let alpha = rows
            .iter()
            .map(|r| if r.is_empty() { 0.0 } else { 1.0 / r.len() as f32 })
            .collect();
        let beta = vec![1.0; rows.len()];
        Self { rows, alpha, beta }
    }

    /// Per-vertex Laplacian vectors at the given positions.
    pub(crate) fn laplacians(&self, mesh: &TriangleMesh) -> Vec<Vector3f> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let weighted = row
                    .iter()
                    .fold(Vector3f::zeros(), |acc, &(j, w)| acc + mesh.vertices[j].coords * w);
                weighted * self.alpha[i] - mesh.vertices[i].coords * self.beta[i]
            })
            .collect()
    }

    pub(crate) fn evaluate(&self, mesh: &TriangleMesh) -> LossOutput {
        let n = mesh.vertex_count();
        let mut out = LossOutput::zero(n);
        if n == 0 {
            return out;
        }
        let scale = 1.0 / n as f32;
        let mut sum = 0.0f64;

        for (i, d) in self.laplacians(mesh).into_iter().enumerate() {
            let norm = d.norm();
            sum += norm as f64;
            if norm == 0.0 {
                continue;
            }
            let u = d * (scale / norm);
            out.grad[i] -= u * self.beta[i];
            let a = self.alpha[i];
            for &(j, w) in &self.rows[i] {
                out.grad[j] += u * (a * w);
            }
        }
        out.value = (sum * scale as f64) as f32;
        out
    }
}

/// Cotangent weight rows aligned with the topology's neighbor lists, plus the
/// total incident face area of each vertex.
fn cotangent_rows(mesh: &TriangleMesh, topology: &MeshTopology) -> (Vec<Vec<(usize, f32)>>, Vec<f32>) {
    let mut rows: Vec<Vec<(usize, f32)>> = topology
        .neighbors
        .iter()
        .map(|n| n.iter().map(|&j| (j, 0.0)).collect())
        .collect();
    let mut vertex_area = vec![0.0f32; mesh.vertex_count()];

    let add = |rows: &mut Vec<Vec<(usize, f32)>>, i: usize, j: usize, w: f32| {
        if let Ok(pos) = topology.neighbors[i].binary_search(&j) {
            rows[i][pos].1 += w;
        }
    };

    for &[i0, i1, i2] in &mesh.faces {
        let (p0, p1, p2) = (mesh.vertices[i0], mesh.vertices[i1], mesh.vertices[i2]);
        let a2 = (p1 - p2).norm_squared();
        let b2 = (p0 - p2).norm_squared();
        let c2 = (p0 - p1).norm_squared();
        let (a, b, c) = (a2.sqrt(), b2.sqrt(), c2.sqrt());

        let s = 0.5 * (a + b + c);
        let area = (s * (s - a) * (s - b) * (s - c)).max(MIN_SQUARED_AREA).sqrt();

        // cotangent of the angle at each corner, weighting the opposite edge
        let cot0 = (b2 + c2 - a2) / (4.0 * area);
        let cot1 = (a2 + c2 - b2) / (4.0 * area);
        let cot2 = (a2 + b2 - c2) / (4.0 * area);

        for (i, j, w) in [(i1, i2, cot0), (i2, i0, cot1), (i0, i1, cot2)] {
            add(&mut rows, i, j, w);
            add(&mut rows, j, i, w);
        }
        for v in [i0, i1, i2] {
            vertex_area[v] += area;
        }
    }
    (rows, vertex_area)
}
