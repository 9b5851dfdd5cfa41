//! Chamfer distance between two point clouds
//!
//! `d(X, Y) = mean_x min_y |x - y|^2 + mean_y min_x |y - x|^2`
//!
//! The first cloud is treated as fixed (the target samples) and the gradient
//! is returned only for the second (the samples of the mesh being fitted).

use crate::nearest_neighbor::SpatialIndex;
use meshfit_core::{Error, NearestNeighborSearch, Point3f, Result, Vector3f};
use rayon::prelude::*;

/// Value and gradient of the chamfer distance.
#[derive(Debug, Clone)]
pub struct ChamferOutput {
    /// Total distance, the sum of both directions.
    pub loss: f32,
    /// Mean squared distance from each fixed point to the moving cloud.
    pub fixed_to_moving: f32,
    /// Mean squared distance from each moving point to the fixed cloud.
    pub moving_to_fixed: f32,
    /// Gradient of `loss` with respect to each moving point.
    pub grad: Vec<Vector3f>,
}

/// Chamfer distance between `fixed` and `moving`, differentiated with respect to `moving`.
pub fn chamfer_distance(fixed: &[Point3f], moving: &[Point3f]) -> Result<ChamferOutput> {
    if fixed.is_empty() || moving.is_empty() {
        return Err(Error::InvalidData(format!(
            "chamfer distance needs non-empty clouds (got {} and {} points)",
            fixed.len(),
            moving.len()
        )));
    }

    let fixed_index = SpatialIndex::new(fixed);
    let moving_index = SpatialIndex::new(moving);

    let fixed_nn = nearest_all(fixed, &moving_index);
    let moving_nn = nearest_all(moving, &fixed_index);

    let n_fixed = fixed.len() as f32;
    let n_moving = moving.len() as f32;

    let fixed_to_moving = mean_distance(&fixed_nn);
    let moving_to_fixed = mean_distance(&moving_nn);

    let mut grad = vec![Vector3f::zeros(); moving.len()];

    // moving -> fixed term: each moving point is pulled toward its nearest fixed point
    for ((g, p), (j, _)) in grad.iter_mut().zip(moving).zip(&moving_nn) {
        *g += (p - fixed[*j]) * (2.0 / n_moving);
    }
    // fixed -> moving term: each fixed point pulls on the moving point closest to it
    for (q, (j, _)) in fixed.iter().zip(&fixed_nn) {
        grad[*j] += (moving[*j] - q) * (2.0 / n_fixed);
    }

    Ok(ChamferOutput {
        loss: fixed_to_moving + moving_to_fixed,
        fixed_to_moving,
        moving_to_fixed,
        grad,
    })
}

fn nearest_all(queries: &[Point3f], index: &SpatialIndex) -> Vec<(usize, f32)> {
    queries
        .par_iter()
        .map(|q| index.find_nearest(q).unwrap_or((0, f32::INFINITY)))
        .collect()
}

fn mean_distance(matches: &[(usize, f32)]) -> f32 {
    let sum: f64 = matches.iter().map(|(_, d)| *d as f64).sum();
    (sum / matches.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_cloud(rng: &mut StdRng, n: usize) -> Vec<Point3f> {
        (0..n)
            .map(|_| Point3f::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    #[test]
    fn test_identical_clouds() {
        let mut rng = StdRng::seed_from_u64(11);
        let cloud = random_cloud(&mut rng, 200);
        let out = chamfer_distance(&cloud, &cloud).unwrap();
        assert_relative_eq!(out.loss, 0.0);
        assert!(out.grad.iter().all(|g| g.norm() == 0.0));
    }

    #[test]
    fn test_translated_single_points() {
        let fixed = vec![Point3f::new(0.0, 0.0, 0.0)];
        let moving = vec![Point3f::new(0.0, 0.0, 2.0)];
        let out = chamfer_distance(&fixed, &moving).unwrap();
        assert_relative_eq!(out.fixed_to_moving, 4.0);
        assert_relative_eq!(out.moving_to_fixed, 4.0);
        assert_relative_eq!(out.loss, 8.0);
        // both directions contribute 2 * (p - q)
        assert_relative_eq!(out.grad[0], Vector3f::new(0.0, 0.0, 8.0));
    }

    #[test]
    fn test_asymmetric_sizes() {
        let fixed = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
        let moving = vec![Point3f::new(0.0, 0.0, 0.0)];
        let out = chamfer_distance(&fixed, &moving).unwrap();
        assert_relative_eq!(out.fixed_to_moving, 0.5);
        assert_relative_eq!(out.moving_to_fixed, 0.0);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(12);
        let fixed = random_cloud(&mut rng, 40);
        let moving = random_cloud(&mut rng, 30);
        let out = chamfer_distance(&fixed, &moving).unwrap();

        let h = 1e-3;
        for i in [0usize, 7, 19] {
            for axis in 0..3 {
                let mut plus = moving.clone();
                plus[i][axis] += h;
                let mut minus = moving.clone();
                minus[i][axis] -= h;
                let fd = (chamfer_distance(&fixed, &plus).unwrap().loss
                    - chamfer_distance(&fixed, &minus).unwrap().loss)
                    / (2.0 * h);
                assert!(
                    (fd - out.grad[i][axis]).abs() < 2e-3,
                    "point {} axis {}: analytic {} vs numeric {}",
                    i,
                    axis,
                    out.grad[i][axis],
                    fd
                );
            }
        }
    }

    #[test]
    fn test_empty_cloud_rejected() {
        assert!(chamfer_distance(&[], &[Point3f::origin()]).is_err());
    }
}
