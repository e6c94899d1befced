use criterion::{black_box, criterion_group, criterion_main, Criterion};
use retromode_core::{AffineMatrix, Color, FrameBuffer};
use retromode_render::{Compositor, FramedSprite, Resampler, Sprite};

fn checkerboard(width: u32, height: u32) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let px = if (x / 8 + y / 8) % 2 == 0 {
                [230, 200, 40, 255]
            } else {
                [20, 40, 160, 255]
            };
            fb.set_pixel(x, y, px);
        }
    }
    fb
}

fn build_scene() -> Compositor {
    let mut scene = Compositor::new(240, 160).with_background(&Color::BLACK);
    scene.add(Sprite::new(0, 0, checkerboard(240, 160)), 0.0).unwrap();

    let layer = scene.add(Sprite::new(200, 40, checkerboard(64, 64)), 1.0).unwrap();
    scene.set_wrapped(layer, true);

    for i in 0..16 {
        let sprite = FramedSprite::new(i * 14, 100, checkerboard(16, 64), 4);
        scene.add(sprite, 2.0).unwrap();
    }
    scene
}

fn bench_compositor(c: &mut Criterion) {
    let mut group = c.benchmark_group("retromode_compositor");

    group.bench_function("render_240x160_18_entries", |b| {
        let mut scene = build_scene();
        b.iter(|| {
            black_box(scene.render());
        });
    });

    group.finish();
}

fn bench_resampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("retromode_resampler");
    let image = checkerboard(240, 160);

    group.bench_function("rotate_about_center", |b| {
        b.iter(|| {
            let out = Resampler::new(&image)
                .rotate_degrees_about(120.0, 80.0, black_box(33.0))
                .unwrap()
                .apply();
            black_box(out);
        });
    });

    group.bench_function("rotate_unclipped", |b| {
        b.iter(|| {
            let out = Resampler::new(&image)
                .rotate_degrees(black_box(33.0))
                .unwrap()
                .apply_unclipped()
                .unwrap();
            black_box(out);
        });
    });

    group.bench_function("scanline_perspective", |b| {
        b.iter(|| {
            let out = Resampler::new(&image)
                .apply_scanlines(|row: u32| {
                    AffineMatrix::scaling(1.0 + row as f64 / 160.0, 1.0)
                })
                .unwrap();
            black_box(out);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compositor, bench_resampler);
criterion_main!(benches);
