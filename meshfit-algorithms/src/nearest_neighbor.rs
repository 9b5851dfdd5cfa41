//! Nearest neighbor search implementations

use meshfit_core::{to_array, NearestNeighborSearch, Point3f};
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f32; 3], usize>;

/// R*-tree backed nearest neighbor search.
///
/// Tolerates any number of coincident or coplanar points, which is common for
/// samples drawn from flat, axis-aligned faces.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    pub fn new(points: &[Point3f]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new(to_array(p), idx))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl NearestNeighborSearch for SpatialIndex {
    fn find_nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        let q = to_array(query);
        self.tree
            .nearest_neighbor(&q)
            .map(|item| (item.data, squared_distance(item.geom(), &q)))
    }

    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let q = to_array(query);
        self.tree
            .nearest_neighbor_iter(&q)
            .take(k)
            .map(|item| (item.data, squared_distance(item.geom(), &q)))
            .collect()
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, (point - query).norm_squared()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, (point - query).norm_squared()))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(k);
        distances
    }
}

#[inline]
fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point3f> = (0..500)
            .map(|_| Point3f::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let index = SpatialIndex::new(&points);
        let brute = BruteForceSearch::new(&points);
        assert_eq!(index.len(), 500);

        for _ in 0..50 {
            let q = Point3f::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5));
            let (_, d_tree) = index.find_nearest(&q).unwrap();
            let (_, d_brute) = brute.find_nearest(&q).unwrap();
            assert!((d_tree - d_brute).abs() < 1e-6);

            let k_tree = index.find_k_nearest(&q, 4);
            let k_brute = brute.find_k_nearest(&q, 4);
            assert_eq!(k_tree.len(), 4);
            for (a, b) in k_tree.iter().zip(&k_brute) {
                assert!((a.1 - b.1).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_coplanar_duplicates() {
        // Many samples with identical x must not trip the index.
        let points: Vec<Point3f> = (0..2000)
            .map(|i| Point3f::new(1.0, (i % 40) as f32 * 0.01, (i / 40) as f32 * 0.01))
            .collect();
        let index = SpatialIndex::new(&points);
        let (idx, dist) = index.find_nearest(&Point3f::new(1.2, 0.0, 0.0)).unwrap();
        assert_eq!(idx, 0);
        assert!((dist - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new(&[]);
        assert!(index.is_empty());
        assert!(index.find_nearest(&Point3f::origin()).is_none());
    }
}
