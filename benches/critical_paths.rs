//! Criterion benchmarks for Pixelrick critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Quantizer: nearest palette color search over whole images
//! - Blur: gaussian, motion and rotational kernels on the oversized canvas
//! - Edges: Sobel enhancement and isolated-pixel cleanup
//! - Compression: multi-pass JPEG simulation
//! - Pipeline: full and quick runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use pixelrick::blur::{create_oversized_canvas, gaussian_blur, motion_blur, rotational_blur};
use pixelrick::compression::simulate_jpeg;
use pixelrick::edge::{cleanup_isolated_pixels, enhance_edges};
use pixelrick::options::DitherType;
use pixelrick::quantize::{quantize_image, Quantizer};
use pixelrick::{Pipeline, ProcessingOptions};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Diagonal color ramp covering most of the RGB cube
fn make_ramp(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let r = (x * 255 / size.max(1)) as u8;
        let g = (y * 255 / size.max(1)) as u8;
        let b = ((x + y) * 127 / size.max(1)) as u8;
        Rgba([r, g, b, 255])
    })
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_quantizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantizer");

    for size in [16, 64, 256].iter() {
        let image = make_ramp(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(
            BenchmarkId::new("quantize_image", format!("{}x{}", size, size)),
            &image,
            |b, image| b.iter(|| quantize_image(black_box(image), &ProcessingOptions::default())),
        );
    }

    let dithered = ProcessingOptions {
        dithering_type: DitherType::Bayer8x8,
        dithering_intensity: 60,
        ..Default::default()
    };
    let image = make_ramp(64);
    group.bench_function("quantize_image_bayer8x8_64x64", |b| {
        b.iter(|| quantize_image(black_box(&image), &dithered))
    });

    group.finish();
}

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");

    for size in [32, 64].iter() {
        let (canvas, _) = create_oversized_canvas(&make_ramp(*size));
        let label = format!("{}x{}", size, size);
        group.bench_with_input(BenchmarkId::new("gaussian_r4", &label), &canvas, |b, canvas| {
            b.iter(|| gaussian_blur(black_box(canvas), 4.0))
        });
        group.bench_with_input(BenchmarkId::new("motion_l8", &label), &canvas, |b, canvas| {
            b.iter(|| motion_blur(black_box(canvas), 8.0))
        });
        group.bench_with_input(BenchmarkId::new("rotational_10", &label), &canvas, |b, canvas| {
            b.iter(|| rotational_blur(black_box(canvas), 10.0))
        });
    }

    group.finish();
}

fn bench_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("edges");
    let quantizer = Quantizer::from_options(&ProcessingOptions::default());
    let image = make_ramp(64);

    group.bench_function("enhance_edges_64x64", |b| {
        b.iter(|| enhance_edges(black_box(&image), 0.5, &quantizer))
    });

    let quantized = quantize_image(&image, &ProcessingOptions::default());
    group.bench_function("cleanup_isolated_64x64", |b| {
        b.iter(|| {
            let mut grid = quantized.clone();
            cleanup_isolated_pixels(black_box(&mut grid))
        })
    });

    group.finish();
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let image = make_ramp(64);

    for passes in [1u8, 3, 5].iter() {
        group.bench_with_input(BenchmarkId::new("simulate_jpeg", passes), passes, |b, passes| {
            b.iter(|| simulate_jpeg(black_box(&image), 75, *passes))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let source = make_ramp(64);
    group.bench_function("load_source_64", |b| {
        b.iter(|| {
            let mut pipeline = Pipeline::default();
            pipeline.load_source(black_box(source.clone()))
        })
    });

    let mut pipeline = Pipeline::default();
    if pipeline.load_source(source.clone()).is_ok() {
        group.bench_function("run_quick_64", |b| b.iter(|| pipeline.run_quick()));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_quantizer,
    bench_blur,
    bench_edges,
    bench_compression,
    bench_pipeline
);

criterion_main!(benches);
