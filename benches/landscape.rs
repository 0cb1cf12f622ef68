//! Criterion benchmarks for landscape generation, ticks and rendering.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use neuroscape::activation::{ActivationEngine, SignalFrame};
use neuroscape::config::{LandscapeConfig, Mode};
use neuroscape::landscape::{GeneratorSpec, Landscape};
use neuroscape::prng::Prng;
use neuroscape::projection::Rotation;
use neuroscape::render::Renderer;
use neuroscape::surface::{RecordingSurface, SvgSurface};

fn make_landscape(mode: Mode, seed: u64) -> Landscape {
    let spec = GeneratorSpec::for_mode(mode, &LandscapeConfig::default());
    Landscape::generate(&spec, &mut Prng::new(seed))
}

/// Generation cost per mode (node count and density differ).
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let cfg = LandscapeConfig::default();

    for mode in Mode::ALL {
        let spec = GeneratorSpec::for_mode(mode, &cfg);
        group.throughput(Throughput::Elements(spec.node_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(mode), &spec, |b, spec| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                black_box(Landscape::generate(spec, &mut Prng::new(seed)).connection_count())
            });
        });
    }

    group.finish();
}

/// One activation tick over the whole graph.
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    let engine = ActivationEngine::default();
    let frame = SignalFrame::standard([40.0, 30.0, 50.0, 25.0, 10.0]);

    for mode in Mode::ALL {
        let mut landscape = make_landscape(mode, 42);
        group.throughput(Throughput::Elements(landscape.node_count() as u64));
        group.bench_function(BenchmarkId::from_parameter(mode), |b| {
            let mut t = 0.0;
            b.iter(|| {
                t += 100.0;
                engine.apply(&mut landscape, Some(&frame), t);
                black_box(landscape.mean_activation())
            });
        });
    }

    group.finish();
}

/// Projection plus draw calls, against a recording and an SVG surface.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let cfg = LandscapeConfig::default();
    let mode = Mode::NeuralGalaxy;
    let mut landscape = make_landscape(mode, 7);
    ActivationEngine::default().apply(
        &mut landscape,
        Some(&SignalFrame::standard([60.0; 5])),
        250.0,
    );
    let renderer = Renderer::new(&cfg, mode);
    let rotation = Rotation::new(0.2, -0.35);

    group.bench_function("recording", |b| {
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        b.iter(|| black_box(renderer.render(&mut surface, &landscape, rotation)));
    });

    group.bench_function("svg", |b| {
        b.iter(|| {
            let mut surface = SvgSurface::new(1280.0, 720.0);
            renderer.render(&mut surface, &landscape, rotation);
            black_box(surface.to_document().len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_tick, bench_render);
criterion_main!(benches);
