//! Criterion microbenches for annotation decoding and encoding.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - annotation XML decoding (from_voc_xml_str, from_voc_xml_slice)
//! - annotation XML encoding (to_voc_xml_string), including the rotated-box
//!   back-transform
//! - detector label export (to_yolo_label_string)
//! - convex perimeter of a 3D octagon

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use rotolabel::ir::io_voc_xml::{from_voc_xml_slice, from_voc_xml_str, to_voc_xml_string};
use rotolabel::ir::io_yolo::to_yolo_label_string;
use rotolabel::ir::{convex_perimeter, AnnotationDocument, ShapeKind};

// Include test fixtures at compile time (no file I/O during benchmark)
const SAMPLE_FIXTURE: &str = include_str!("../tests/fixtures/sample_rotated.xml");

/// The sample repeated until it holds `copies` times as many shapes.
fn large_document(copies: usize) -> AnnotationDocument {
    let sample = from_voc_xml_str(SAMPLE_FIXTURE).expect("Failed to parse sample fixture");
    let shapes = (0..copies).flat_map(|_| sample.shapes.clone()).collect();
    sample.with_shapes(shapes)
}

fn bench_decode_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("voc_decode");
    group.throughput(Throughput::Bytes(SAMPLE_FIXTURE.len() as u64));

    group.bench_function("from_voc_xml_str", |b| {
        b.iter(|| {
            let doc = from_voc_xml_str(black_box(SAMPLE_FIXTURE)).unwrap();
            black_box(doc)
        })
    });

    group.finish();
}

fn bench_decode_slice(c: &mut Criterion) {
    let bytes = SAMPLE_FIXTURE.as_bytes();
    let mut group = c.benchmark_group("voc_decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("from_voc_xml_slice", |b| {
        b.iter(|| {
            let doc = from_voc_xml_slice(black_box(bytes)).unwrap();
            black_box(doc)
        })
    });

    group.finish();
}

/// Encode a document with 400 shapes of all four kinds.
fn bench_encode(c: &mut Criterion) {
    let doc = large_document(100);

    let mut group = c.benchmark_group("voc_encode");
    group.throughput(Throughput::Elements(doc.shapes.len() as u64));

    group.bench_function("to_voc_xml_string", |b| {
        b.iter(|| {
            let xml = to_voc_xml_string(black_box(&doc)).unwrap();
            black_box(xml)
        })
    });

    group.finish();
}

fn bench_detector_export(c: &mut Criterion) {
    let doc = large_document(100);
    let labels: Vec<String> = ["person", "car", "sign", "truck"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut group = c.benchmark_group("detector_export");
    group.throughput(Throughput::Elements(doc.shapes.len() as u64));

    group.bench_function("to_yolo_label_string", |b| {
        b.iter(|| {
            let text = to_yolo_label_string(black_box(&doc.shapes), doc.size, &labels).unwrap();
            black_box(text)
        })
    });

    group.finish();
}

fn bench_octagon_perimeter(c: &mut Criterion) {
    let doc = from_voc_xml_str(SAMPLE_FIXTURE).expect("Failed to parse sample fixture");
    let octagon = doc
        .shapes
        .iter()
        .find(|shape| shape.kind() == ShapeKind::Octagon3D)
        .expect("sample has an octagon");

    c.bench_function("convex_perimeter_octagon", |b| {
        b.iter(|| black_box(convex_perimeter(black_box(octagon.points()))))
    });
}

criterion_group!(
    benches,
    bench_decode_str,
    bench_decode_slice,
    bench_encode,
    bench_detector_export,
    bench_octagon_perimeter,
);
criterion_main!(benches);
