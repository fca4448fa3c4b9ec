//! Benchmarks for pipeline preflight and execution
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use microflow::data::{AttributeMatrixType, DataContainerArray, Geometry, ImageGeometry, TypedArray};
use microflow::filters::{ArrayCalculator, EmmpmFilter, SegmentationParams};
use microflow::pipeline::write_pipeline;
use microflow::{DataArrayPath, FilterManager, FilterPipeline, ObserverSet};

fn gray_image(side: usize) -> (DataContainerArray, DataArrayPath) {
    let values: Vec<u8> = (0..side * side)
        .map(|i| {
            let base: u8 = if i % side < side / 2 { 40 } else { 200 };
            base + (i % 7) as u8
        })
        .collect();
    let mut dca = DataContainerArray::new();
    let dc = dca.create_data_container("DC").unwrap();
    dc.set_geometry(Geometry::Image(ImageGeometry::with_dimensions([side, side, 1])));
    dc.create_attribute_matrix("CellData", &[side, side, 1], AttributeMatrixType::Cell)
        .unwrap()
        .add_array(TypedArray::from_vec("Gray", &[1], values).unwrap())
        .unwrap();
    (dca, DataArrayPath::new("DC", "CellData", "Gray"))
}

fn segmentation_pipeline(side: usize) -> FilterPipeline {
    let (dca, input) = gray_image(side);
    let mut pipeline = FilterPipeline::with_name("Bench");
    *pipeline.initial_data_mut() = dca;
    pipeline.push_back(
        EmmpmFilter::new()
            .with_input(input.clone())
            .with_output(input.with_array_name("Segmented"))
            .with_params(SegmentationParams {
                num_classes: 2,
                em_iterations: 5,
                mpm_iterations: 2,
                beta: 1.0,
            }),
    );
    pipeline.push_back(
        ArrayCalculator::new()
            .with_input(input.with_array_name("Segmented"))
            .with_expression("value * 255.0"),
    );
    pipeline
}

fn bench_preflight(c: &mut Criterion) {
    let mut group = c.benchmark_group("preflight");
    for side in [32usize, 128] {
        let mut pipeline = segmentation_pipeline(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| black_box(pipeline.preflight_pipeline()))
        });
    }
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    group.sample_size(20);
    for side in [32usize, 128] {
        let mut pipeline = segmentation_pipeline(side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| black_box(pipeline.execute()))
        });
    }
    group.finish();
}

fn bench_document_round_trip(c: &mut Criterion) {
    let manager = FilterManager::with_builtins();
    let document = write_pipeline(&segmentation_pipeline(8));
    c.bench_function("document_round_trip", |b| {
        b.iter(|| {
            let pipeline =
                microflow::pipeline::read_pipeline(black_box(&document), &manager, ObserverSet::new())
                    .unwrap();
            black_box(write_pipeline(&pipeline))
        })
    });
}

criterion_group!(benches, bench_preflight, bench_execute, bench_document_round_trip);
criterion_main!(benches);
