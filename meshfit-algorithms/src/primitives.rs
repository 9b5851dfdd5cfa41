//! Procedural source meshes
//!
//! The fitting loop starts from a unit ico-sphere: an icosahedron whose faces
//! are repeatedly split in four, with every new vertex pushed back onto the
//! unit sphere.

use meshfit_core::{Error, Point3f, Result, TriangleMesh};
use std::collections::HashMap;

/// Deepest subdivision level accepted by [`ico_sphere`].
///
/// Level 8 already has 655,362 vertices.
pub const MAX_ICO_SPHERE_LEVEL: usize = 8;

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Regular icosahedron inscribed in the unit sphere, outward-facing winding.
pub fn icosahedron() -> TriangleMesh {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let vertices = raw
        .iter()
        .map(|&[x, y, z]| project_to_sphere(Point3f::new(x, y, z)))
        .collect();
    TriangleMesh::from_vertices_and_faces(vertices, ICOSAHEDRON_FACES.to_vec())
}

/// Unit ico-sphere after `level` rounds of 1-to-4 subdivision.
///
/// Level `n` has `10 * 4^n + 2` vertices and `20 * 4^n` faces.
pub fn ico_sphere(level: usize) -> Result<TriangleMesh> {
    if level > MAX_ICO_SPHERE_LEVEL {
        return Err(Error::invalid_param(
            "level",
            level,
            "ico-sphere level must be at most 8",
        ));
    }
    let mut mesh = icosahedron();
    for _ in 0..level {
        mesh = subdivide_midpoints(&mesh);
        for v in &mut mesh.vertices {
            *v = project_to_sphere(*v);
        }
    }
    log::debug!(
        "ico-sphere level {}: {} vertices, {} faces",
        level,
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Split every triangle into four by inserting one vertex per edge midpoint.
///
/// Midpoints are shared between the two faces of an edge, so a closed input
/// stays closed. Winding is preserved.
pub fn subdivide_midpoints(mesh: &TriangleMesh) -> TriangleMesh {
    let mut vertices = mesh.vertices.clone();
    let mut faces = Vec::with_capacity(mesh.faces.len() * 4);
    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::with_capacity(mesh.faces.len() * 3 / 2);

    let mut midpoint = |a: usize, b: usize, vertices: &mut Vec<Point3f>| -> usize {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let mid = nalgebra::center(&vertices[a], &vertices[b]);
            vertices.push(mid);
            vertices.len() - 1
        })
    };

    for &[a, b, c] in &mesh.faces {
        let ab = midpoint(a, b, &mut vertices);
        let bc = midpoint(b, c, &mut vertices);
        let ca = midpoint(c, a, &mut vertices);
        faces.push([a, ab, ca]);
        faces.push([b, bc, ab]);
        faces.push([c, ca, bc]);
        faces.push([ab, bc, ca]);
    }

    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

#[inline]
fn project_to_sphere(p: Point3f) -> Point3f {
    Point3f::from(p.coords.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshfit_core::{centroid, MeshTopology};

    #[test]
    fn test_icosahedron() {
        let mesh = icosahedron();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 20);
        let topo = MeshTopology::from_mesh(&mesh).unwrap();
        assert_eq!(topo.edge_count(), 30);
        assert!(topo.is_closed());
    }

    #[test]
    fn test_level_counts() {
        for level in 0..=4 {
            let mesh = ico_sphere(level).unwrap();
            let scale = 4usize.pow(level as u32);
            assert_eq!(mesh.vertex_count(), 10 * scale + 2);
            assert_eq!(mesh.face_count(), 20 * scale);
        }
        assert!(ico_sphere(MAX_ICO_SPHERE_LEVEL + 1).is_err());
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = ico_sphere(3).unwrap();
        for v in &mesh.vertices {
            assert_relative_eq!(v.coords.norm(), 1.0, epsilon = 1e-5);
        }
        assert_relative_eq!(centroid(&mesh.vertices).unwrap(), Point3f::origin(), epsilon = 1e-5);
    }

    #[test]
    fn test_normals_face_outward() {
        let mesh = ico_sphere(2).unwrap();
        let normals = mesh.calculate_face_normals();
        for (f, n) in normals.iter().enumerate() {
            let [a, b, c] = mesh.face_vertices(f);
            let center = (a.coords + b.coords + c.coords) / 3.0;
            assert!(n.dot(&center) > 0.0, "face {} points inward", f);
        }
    }

    #[test]
    fn test_subdivision_stays_closed() {
        let mesh = ico_sphere(2).unwrap();
        let topo = MeshTopology::from_mesh(&mesh).unwrap();
        assert!(topo.is_closed());
        assert_eq!(topo.edge_count(), mesh.face_count() * 3 / 2);
    }
}
