//! # meshfit Algorithms
//!
//! The numerical side of fitting a deformable mesh to a target surface.
//!
//! This crate provides the ico-sphere source mesh, area-weighted surface
//! sampling, the chamfer distance, edge/normal/Laplacian regularizers with
//! analytic gradients, first-order optimizers and the fitting loop that ties
//! them together.

pub mod chamfer;
pub mod fit;
pub mod loss;
pub mod nearest_neighbor;
pub mod optim;
pub mod primitives;
pub mod sampling;

// Re-export commonly used items
pub use chamfer::*;
pub use fit::*;
pub use loss::{
    mesh_edge_loss, mesh_laplacian_smoothing, mesh_normal_consistency, EdgeLoss, LaplacianMethod,
    LaplacianSmoothing, LossOutput, MeshRegularizer, NormalConsistency,
};
pub use nearest_neighbor::*;
pub use optim::*;
pub use primitives::*;
pub use sampling::*;
