//! Core data structures and traits for meshfit
//!
//! This crate provides the fundamental types shared by the fitting pipeline:
//! points, point clouds, triangle meshes with their edge/neighbor topology,
//! affine transforms and the center/scale normalization applied to target meshes.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod topology;
pub mod traits;
pub mod transform;
pub mod normalize;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use topology::*;
pub use traits::*;
pub use transform::*;
pub use normalize::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
