//! I/O operations for meshes and fitting results
//!
//! This crate reads and writes triangle meshes in OBJ and PLY format, picking
//! the format from the file extension, and exports loss histories as CSV.

pub mod error;
pub mod history;
pub mod obj;
pub mod ply;

pub use error::*;
pub use history::HistoryTable;
pub use obj::{ObjReader, ObjWriter};
pub use ply::{PlyReader, PlyWriter};

use meshfit_core::{Result, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Mesh file formats, detected from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Ply,
}

impl MeshFormat {
    /// Detect the format from a path's extension, case-insensitively.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "ply" => Some(Self::Ply),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Ply => "ply",
        }
    }
}

fn detect(path: &Path) -> Result<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| {
        IoError::UnsupportedFormat {
            format: format!("{} (expected .obj or .ply)", path.display()),
        }
        .into()
    })
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Obj => ObjReader::read_mesh(path),
        MeshFormat::Ply => PlyReader::read_mesh(path),
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let result = match detect(path)? {
        MeshFormat::Obj => ObjWriter::write_mesh(mesh, path),
        MeshFormat::Ply => PlyWriter::write_mesh(mesh, path),
    };
    if result.is_ok() {
        log::info!("wrote {} vertices and {} faces to {}", mesh.vertex_count(), mesh.face_count(), path.display());
    }
    result
}
