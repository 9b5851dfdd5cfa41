//! PLY format support

use crate::error::{open, IoError};
use crate::{MeshReader, MeshWriter};
use meshfit_core::{Point3f, Result, TriangleMesh, Vector3f};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

impl PlyReader {
    /// Parse a PLY document (ASCII or binary) from any buffered reader.
    pub fn read_from<R: BufRead>(reader: &mut R, origin: &str) -> Result<TriangleMesh> {
        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(reader).map_err(|e| IoError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let mut vertices = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x", origin)?;
                let y = extract_property_value(vertex, "y", origin)?;
                let z = extract_property_value(vertex, "z", origin)?;
                vertices.push(Point3f::new(x, y, z));
            }
        }

        // polygons are fan-triangulated like OBJ faces
        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face, origin)?;
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
        }

        let normals = ply.payload.get("vertex").and_then(|vertex_element| {
            vertex_element
                .iter()
                .map(|vertex| {
                    Some(Vector3f::new(
                        extract_property_value(vertex, "nx", origin).ok()?,
                        extract_property_value(vertex, "ny", origin).ok()?,
                        extract_property_value(vertex, "nz", origin).ok()?,
                    ))
                })
                .collect::<Option<Vec<_>>>()
        });

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals {
            mesh.set_normals(normals);
        }
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

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let mut reader = BufReader::new(open(path)?);
        Self::read_from(&mut reader, &path.display().to_string())
    }
}

fn float_property(name: &str) -> PropertyDef {
    PropertyDef::new(name.to_string(), PropertyType::Scalar(ScalarType::Float))
}

fn vertex_element_def(count: usize, with_normals: bool) -> ElementDef {
    let mut element = ElementDef::new("vertex".to_string());
    element.count = count;
    for name in ["x", "y", "z"] {
        element.properties.add(float_property(name));
    }
    if with_normals {
        for name in ["nx", "ny", "nz"] {
            element.properties.add(float_property(name));
        }
    }
    element
}

fn vertex_payload(point: &Point3f, normal: Option<&Vector3f>) -> DefaultElement {
    let mut element = DefaultElement::new();
    element.insert("x".to_string(), Property::Float(point.x));
    element.insert("y".to_string(), Property::Float(point.y));
    element.insert("z".to_string(), Property::Float(point.z));
    if let Some(n) = normal {
        element.insert("nx".to_string(), Property::Float(n.x));
        element.insert("ny".to_string(), Property::Float(n.y));
        element.insert("nz".to_string(), Property::Float(n.z));
    }
    element
}

fn write_ply<W: Write>(out: &mut W, ply: &mut Ply<DefaultElement>) -> Result<()> {
    let writer = Writer::new();
    writer.write_ply(out, ply).map_err(|e| IoError::WriteError {
        message: e.to_string(),
    })?;
    Ok(())
}

impl PlyWriter {
    /// Write `mesh` as an ASCII PLY document.
    pub fn write_to<W: Write>(mesh: &TriangleMesh, out: &mut W) -> Result<()> {
        let normals = mesh.normals.as_ref().filter(|n| n.len() == mesh.vertex_count());

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.elements.add(vertex_element_def(mesh.vertex_count(), normals.is_some()));

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.face_count();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        let vertices = mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| vertex_payload(v, normals.map(|n| &n[i])))
            .collect();
        ply.payload.insert("vertex".to_string(), vertices);

        let faces = mesh
            .faces
            .iter()
            .map(|face| {
                let mut element = DefaultElement::new();
                let indices = face.iter().map(|&i| i as i32).collect();
                element.insert("vertex_indices".to_string(), Property::ListInt(indices));
                element
            })
            .collect();
        ply.payload.insert("face".to_string(), faces);

        write_ply(out, &mut ply)
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_to(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str, origin: &str) -> Result<f32> {
    let value = match element.get(name) {
        Some(Property::Float(val)) => *val,
        Some(Property::Double(val)) => *val as f32,
        Some(Property::Int(val)) => *val as f32,
        Some(Property::UInt(val)) => *val as f32,
        Some(Property::Short(val)) => *val as f32,
        Some(Property::UShort(val)) => *val as f32,
        _ => {
            return Err(IoError::ParseError {
                path: origin.to_string(),
                message: format!("property '{}' not found or not numeric", name),
            }
            .into())
        }
    };
    Ok(value)
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement, origin: &str) -> Result<Vec<usize>> {
    let indices: Vec<usize> = match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices.iter().map(|&i| i.max(0) as usize).collect(),
        Some(Property::ListUInt(indices)) => indices.iter().map(|&i| i as usize).collect(),
        Some(Property::ListUChar(indices)) => indices.iter().map(|&i| i as usize).collect(),
        Some(Property::ListUShort(indices)) => indices.iter().map(|&i| i as usize).collect(),
        _ => {
            return Err(IoError::ParseError {
                path: origin.to_string(),
                message: "face indices not found".to_string(),
            }
            .into())
        }
    };
    if indices.len() < 3 {
        return Err(IoError::ParseError {
            path: origin.to_string(),
            message: format!("face with {} corners", indices.len()),
        }
        .into());
    }
    Ok(indices)
}
