use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rp_core::RasterBuffer;
use rp_pipeline::{PipelineConfig, PipelineRunner, StagePlan};
use rp_sched::Dispatch;

fn build_gradient_rgba(width: usize, height: usize) -> RasterBuffer {
    let mut data = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]);
        }
    }
    RasterBuffer::from_vec(width, height, 4, data).expect("valid raster")
}

fn bench_worker_scaling(c: &mut Criterion) {
    let img = build_gradient_rgba(1280, 1024);
    let view = img.as_view();

    let mut group = c.benchmark_group("standard_pipeline_rgba_1280x1024");
    group.sample_size(20);
    for dispatch in [Dispatch::Pooled, Dispatch::Spawned] {
        for workers in [1, 2, 4, 8] {
            let mut runner = PipelineRunner::new(PipelineConfig {
                workers,
                dispatch,
                capacity: img.data().len(),
                plan: StagePlan::standard(),
            })
            .expect("runner");

            let id = BenchmarkId::new(format!("{dispatch:?}").to_lowercase(), workers);
            group.bench_with_input(id, &workers, |b, _| {
                b.iter(|| {
                    let out = runner.process(black_box(&view)).expect("process");
                    black_box(out.data()[0]);
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_worker_scaling);
criterion_main!(benches);
