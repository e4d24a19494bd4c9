use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use regate::nufft::nufft_adjoint;

/// Synthetic radial-style sample cloud in `[-n/2, n/2)³`.
fn random_samples(num: usize, n: usize, rng: &mut StdRng) -> (Array1<Complex64>, Array2<f64>) {
    let half = n as f64 / 2.0;
    let coord = Array2::from_shape_fn((num, 3), |_| rng.random_range(-half..half));
    let ksp = Array1::from_shape_fn(num, |_| {
        Complex64::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
    });
    (ksp, coord)
}

fn bench_adjoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("nufft_adjoint");
    let mut rng = StdRng::seed_from_u64(42);

    for &n in &[32usize, 64] {
        let (ksp, coord) = random_samples(20_000, n, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                nufft_adjoint(
                    black_box(ksp.view()),
                    black_box(coord.view()),
                    [n, n, n],
                    1.25,
                    4.0,
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(nufft_benches, bench_adjoint);
criterion_main!(nufft_benches);
