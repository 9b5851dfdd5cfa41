//! Benchmarks for one fitting iteration and its most expensive parts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use meshfit_algorithms::{chamfer_distance, ico_sphere, sample_points_from_mesh, FitConfig, MeshFitter};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn benchmark_chamfer(c: &mut Criterion) {
    let sphere = ico_sphere(4).expect("ico-sphere");
    let mut rng = StdRng::seed_from_u64(0);

    let mut group = c.benchmark_group("chamfer_distance");
    for &count in &[1000usize, 5000, 20000] {
        let a = sample_points_from_mesh(&sphere, count, &mut rng).expect("sampling");
        let b = sample_points_from_mesh(&sphere, count, &mut rng).expect("sampling");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |bench, _| {
            bench.iter(|| chamfer_distance(black_box(&a.points.points), black_box(&b.points.points)))
        });
    }
    group.finish();
}

fn benchmark_fit_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_step");
    group.sample_size(20);
    for &level in &[2usize, 3, 4] {
        let target = ico_sphere(level).expect("ico-sphere");
        let config = FitConfig::default().with_level(level).with_plot_period(0);
        let mut fitter = MeshFitter::new(target, config).expect("fitter");
        group.bench_with_input(BenchmarkId::new("level", level), &level, |bench, _| {
            bench.iter(|| fitter.step().expect("step"))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_chamfer, benchmark_fit_step);
criterion_main!(benches);
