//! OBJ format support
//!
//! Only geometry is read: vertex positions and faces. Polygons with more than
//! three corners are fan-triangulated around their first corner; faces with
//! fewer than three are an error. Texture
//! coordinates, normals and materials are ignored.

use crate::error::{open, IoError};
use crate::{MeshReader, MeshWriter};
use meshfit_core::{Point3f, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl ObjReader {
    /// Parse an OBJ document from any reader.
    pub fn read_from<R: Read>(input: R, origin: &str) -> Result<TriangleMesh> {
        let data = obj::ObjData::load_buf(input).map_err(|e| IoError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let vertices: Vec<Point3f> = data.position.iter().map(|p| Point3f::new(p[0], p[1], p[2])).collect();

        let mut faces = Vec::new();
        for object in &data.objects {
            for group in &object.groups {
                for poly in &group.polys {
                    let corners: Vec<usize> = poly.0.iter().map(|t| t.0).collect();
                    if corners.len() < 3 {
                        return Err(IoError::ParseError {
                            path: origin.to_string(),
                            message: format!("face with {} corners in object '{}'", corners.len(), object.name),
                        }
                        .into());
                    }
                    for i in 1..corners.len() - 1 {
                        faces.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
            }
        }

        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.validate()?;
        log::debug!(
            "read {} vertices and {} faces from {}",
            mesh.vertex_count(),
            mesh.face_count(),
            origin
        );
        Ok(mesh)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let file = open(path)?;
        Self::read_from(BufReader::new(file), &path.display().to_string())
    }
}

impl ObjWriter {
    /// Write `mesh` as OBJ text. Face indices are 1-based.
    pub fn write_to<W: Write>(mesh: &TriangleMesh, out: &mut W) -> Result<()> {
        writeln!(out, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
        for v in &mesh.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
            }
            for [a, b, c] in &mesh.faces {
                writeln!(out, "f {0}//{0} {1}//{1} {2}//{2}", a + 1, b + 1, c + 1)?;
            }
        } else {
            for [a, b, c] in &mesh.faces {
                writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
            }
        }
        Ok(())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
