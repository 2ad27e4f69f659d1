//! Stitching throughput for typical page heights.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageFormat, Rgba, RgbaImage};
use pagestitch::capture::{compute_capture_plan, ImageStitcher, Tile};
use std::hint::black_box;
use std::io::Cursor;

const WIDTH: u32 = 1366;
const HEIGHT: u32 = 768;
const OVERLAP: u32 = 100;

fn tiles_for(total_height: u32) -> Vec<Tile> {
    let plan = compute_capture_plan(total_height, HEIGHT, OVERLAP).unwrap();
    plan.offsets()
        .iter()
        .map(|&offset| {
            let img = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba([(offset % 256) as u8, 90, 160, 255]));
            let mut data = Vec::new();
            img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
                .unwrap();
            Tile { data, offset }
        })
        .collect()
}

fn bench_stitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch");
    group.sample_size(10);

    for total_height in [2_000u32, 8_000, 20_000] {
        let tiles = tiles_for(total_height);
        group.bench_with_input(
            BenchmarkId::from_parameter(total_height),
            &tiles,
            |b, tiles| {
                b.iter(|| ImageStitcher::stitch(black_box(tiles.clone()), total_height, WIDTH).unwrap())
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_stitch);
criterion_main!(benches);
