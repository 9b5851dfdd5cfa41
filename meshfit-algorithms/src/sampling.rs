//! Uniform random sampling of points on a mesh surface
//!
//! Faces are drawn with probability proportional to their area and a point is
//! placed inside the chosen face with uniformly distributed barycentric
//! coordinates. Each sample remembers its face and weights, so a gradient with
//! respect to the sampled point can be pushed back onto the face's vertices:
//! the point is a fixed linear combination of them.

use meshfit_core::{Error, Point3f, PointCloud3f, Result, TriangleMesh, Vector3f};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Where a sampled point lies on the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub face: usize,
    /// Barycentric weights of the face's three vertices, summing to 1.
    pub weights: [f32; 3],
}

/// Points sampled from a surface together with their provenance.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSamples {
    pub points: PointCloud3f,
    pub samples: Vec<SurfaceSample>,
}

impl SurfaceSamples {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Accumulate per-point gradients into per-vertex gradients.
    ///
    /// `faces` must be the face list the samples were drawn from.
    pub fn backpropagate(
        &self,
        faces: &[[usize; 3]],
        point_grads: &[Vector3f],
        vertex_grads: &mut [Vector3f],
    ) {
        debug_assert_eq!(point_grads.len(), self.samples.len());
        for (sample, grad) in self.samples.iter().zip(point_grads) {
            let face = faces[sample.face];
            for (corner, w) in face.iter().zip(sample.weights) {
                vertex_grads[*corner] += grad * w;
            }
        }
    }
}

/// Area-weighted face sampler for one fixed mesh.
///
/// Building the sampler once amortizes the cumulative-area table when the
/// same surface is sampled every iteration, as the target mesh is.
#[derive(Debug, Clone)]
pub struct AreaSampler {
    faces: WeightedIndex<f32>,
    total_area: f32,
}

impl AreaSampler {
    pub fn new(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;
        let areas = mesh.face_areas();
        let total_area: f32 = areas.iter().sum();
        if !total_area.is_finite() || total_area <= 0.0 {
            return Err(Error::Algorithm(format!(
                "cannot sample a surface with total area {}",
                total_area
            )));
        }
        let faces = WeightedIndex::new(&areas)
            .map_err(|e| Error::Algorithm(format!("invalid face areas: {}", e)))?;
        Ok(Self { faces, total_area })
    }

    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    /// Draw `count` points from `mesh`, which must be the mesh the sampler was built on.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        mesh: &TriangleMesh,
        count: usize,
        rng: &mut R,
    ) -> SurfaceSamples {
        let mut points = PointCloud3f::with_capacity(count);
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let face = self.faces.sample(rng);
            let weights = random_barycentric(rng);
            points.push(interpolate(&mesh.face_vertices(face), &weights));
            samples.push(SurfaceSample { face, weights });
        }
        SurfaceSamples { points, samples }
    }
}

/// Draw `count` points uniformly from the surface of `mesh`.
pub fn sample_points_from_mesh<R: Rng + ?Sized>(
    mesh: &TriangleMesh,
    count: usize,
    rng: &mut R,
) -> Result<SurfaceSamples> {
    Ok(AreaSampler::new(mesh)?.sample(mesh, count, rng))
}

/// Uniform barycentric coordinates via the square-root parameterization.
fn random_barycentric<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let r1: f32 = rng.gen::<f32>().sqrt();
    let r2: f32 = rng.gen();
    [1.0 - r1, r1 * (1.0 - r2), r1 * r2]
}

#[inline]
fn interpolate(corners: &[Point3f; 3], weights: &[f32; 3]) -> Point3f {
    Point3f::from(
        corners[0].coords * weights[0] + corners[1].coords * weights[1] + corners[2].coords * weights[2],
    )
}
