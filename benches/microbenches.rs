//! Criterion microbenches for vocyolo format parsing and writing.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeMap;
use std::hint::black_box;
use std::path::Path;

use vocyolo::voc::{parse_voc_str, to_voc_xml_string};
use vocyolo::yolo::{parse_yolo_str, to_yolo_string, YoloWriteOptions};

// Small inline fixtures so benchmarks need no file I/O.
const VOC_FIXTURE: &str = r#"<annotation>
  <folder>JPEGImages</folder>
  <filename>img1.jpg</filename>
  <path>/data/img1.jpg</path>
  <source><database>Unknown</database></source>
  <size><width>640</width><height>480</height><depth>3</depth></size>
  <segmented>0</segmented>
  <object>
    <name>person</name>
    <pose>Unspecified</pose>
    <truncated>0</truncated>
    <difficult>0</difficult>
    <conf>0.92</conf>
    <bndbox><xmin>12</xmin><ymin>30</ymin><xmax>180</xmax><ymax>410</ymax></bndbox>
  </object>
  <object>
    <name>bicycle</name>
    <pose>Left</pose>
    <truncated>1</truncated>
    <difficult>0</difficult>
    <bndbox><xmin>200</xmin><ymin>220</ymin><xmax>560</xmax><ymax>470</ymax></bndbox>
  </object>
</annotation>"#;

const YOLO_FIXTURE: &str = "0 0.150000 0.458333 0.262500 0.791667 0.92\n\
                            1 0.593750 0.718750 0.562500 0.520833 0\n\
                            0 0.500000 0.500000 0.250000 0.250000 0.5\n";

fn labels() -> Vec<String> {
    vec!["person".to_string(), "bicycle".to_string()]
}

fn label_map() -> BTreeMap<String, u32> {
    labels()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, idx as u32))
        .collect()
}

/// Benchmark VOC XML parsing from string.
fn bench_voc_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("voc_parse");
    group.throughput(Throughput::Bytes(VOC_FIXTURE.len() as u64));

    group.bench_function("parse_voc_str", |b| {
        b.iter(|| {
            let set = parse_voc_str(black_box(VOC_FIXTURE), Path::new("bench.xml")).unwrap();
            black_box(set)
        })
    });

    group.finish();
}

/// Benchmark VOC XML writing.
fn bench_voc_write(c: &mut Criterion) {
    let set = parse_voc_str(VOC_FIXTURE, Path::new("bench.xml")).expect("parse fixture");

    let mut group = c.benchmark_group("voc_write");
    group.throughput(Throughput::Elements(set.boxes.len() as u64));

    group.bench_function("to_voc_xml_string", |b| {
        b.iter(|| {
            let xml = to_voc_xml_string(black_box(&set));
            black_box(xml)
        })
    });

    group.finish();
}

/// Benchmark YOLO TXT parsing from string.
fn bench_yolo_parse(c: &mut Criterion) {
    let names = labels();

    let mut group = c.benchmark_group("yolo_parse");
    group.throughput(Throughput::Bytes(YOLO_FIXTURE.len() as u64));

    group.bench_function("parse_yolo_str", |b| {
        b.iter(|| {
            let set = parse_yolo_str(
                black_box(YOLO_FIXTURE),
                Path::new("bench.txt"),
                &names,
                640,
                480,
                3,
            )
            .unwrap();
            black_box(set)
        })
    });

    group.finish();
}

/// Benchmark YOLO TXT writing.
fn bench_yolo_write(c: &mut Criterion) {
    let names = labels();
    let map = label_map();
    let set = parse_yolo_str(YOLO_FIXTURE, Path::new("bench.txt"), &names, 640, 480, 3)
        .expect("parse fixture");

    let mut group = c.benchmark_group("yolo_write");
    group.throughput(Throughput::Elements(set.boxes.len() as u64));

    group.bench_function("to_yolo_string", |b| {
        b.iter(|| {
            let out = to_yolo_string(black_box(&set), &map, &YoloWriteOptions::default()).unwrap();
            black_box(out)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_voc_parse,
    bench_voc_write,
    bench_yolo_parse,
    bench_yolo_write
);
criterion_main!(benches);
