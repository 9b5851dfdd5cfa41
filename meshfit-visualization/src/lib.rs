//! Visualization of mesh fitting runs
//!
//! This crate renders file-based views of a fit:
//! - Vertex scatter snapshots of the deforming mesh
//! - Loss curves over the iterations
//! - Camera utilities for orbiting and projecting a scene
//!
//! Everything is written as standalone SVG documents.

pub mod camera;
pub mod plot;
pub mod scatter;
pub mod svg;

pub use camera::*;
pub use plot::*;
pub use scatter::*;
pub use svg::save_svg;
