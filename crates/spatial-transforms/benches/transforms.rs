use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use spatial_transforms::{SpatialSmoother, SpectralScrambler};

fn field(ny: usize, nx: usize) -> Array2<f64> {
    Array2::from_shape_fn((ny, nx), |(y, x)| {
        if (y + x) % 17 == 0 {
            f64::NAN
        } else {
            (y as f64 * 0.1).sin() * (x as f64 * 0.05).cos()
        }
    })
}

fn bench_scramble(c: &mut Criterion) {
    let f = field(128, 256);
    let mut scrambler = SpectralScrambler::seeded(0);
    c.bench_function("scramble_2d 128x256", |b| {
        b.iter(|| scrambler.scramble_2d(black_box(f.view()), None))
    });
}

fn bench_smooth(c: &mut Criterion) {
    let f = field(128, 256);
    let smoother = SpatialSmoother::new(1.0).expect("valid stddev");
    c.bench_function("smooth 128x256 sigma=1", |b| {
        b.iter(|| smoother.smooth(black_box(f.view())))
    });
}

criterion_group!(benches, bench_scramble, bench_smooth);
criterion_main!(benches);
