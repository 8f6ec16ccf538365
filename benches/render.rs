use agg_heatmap::{Heatmap, OptionsPatch, PixelSurface, Point};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn scattered(n: usize, w: f64, h: f64) -> Vec<Point> {
    // Deterministic LCG so runs are comparable.
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .map(|_| {
            let sign = match (next() * 3.0) as u32 {
                0 => -1.0,
                1 => 0.0,
                _ => 1.0,
            };
            Point::new(next() * w, next() * h, next() * 4.0, sign)
        })
        .collect()
}

fn bench_brushes(c: &mut Criterion) {
    let mut group = c.benchmark_group("brush_rebuild");
    for radius in [5.0, 25.0, 60.0] {
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &r| {
            let mut hm = Heatmap::new(PixelSurface::new(1, 1));
            b.iter(|| {
                hm.set_options(OptionsPatch::new().radius(r).blur(r * 0.6));
                black_box(hm.brush(agg_heatmap::SignClass::Positive).width());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_512x512");
    for n in [100usize, 1_000, 10_000] {
        let points = scattered(n, 512.0, 512.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, pts| {
            let mut hm = Heatmap::new(PixelSurface::new(512, 512));
            hm.set_options(OptionsPatch::new().max(4.0).radius(12.0).blur(8.0))
                .set_points(pts.iter().copied());
            b.iter(|| {
                hm.draw();
                black_box(hm.surface().pixel(256, 256));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_brushes, bench_render);
criterion_main!(benches);
