//! Benchmarks for split planning and manifest resolution
//!
//! Covers the pure work done before any external process starts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tbtools_av::timecode::{parse_frame_count, parse_lines};
use tbtools_av::{ClipPlan, SplitTarget};
use tbtools_scene::manifest::parse_manifest;

fn frame_list(scenes: usize) -> String {
    (0..scenes)
        .map(|i| (24 + (i % 7) * 12).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn manifest_json(scenes: usize) -> String {
    let records = (0..scenes)
        .map(|i| {
            format!(
                r#"{{"scene_id": "C{:03}", "animatic": {{"path": "C{:03}.mp4"}}, "nodes": [{{"type": "PEG", "name": "Root"}}]}}"#,
                i + 1,
                i + 1
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"project": {{"root_path": "/proj", "paths": {{"scenes": "scenes", "animatics": "animatics"}}}}, "scenes": [{records}]}}"#
    )
}

fn bench_frame_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_plan");
    let target = SplitTarget::new("/shows/ep01/master.mp4", "/shows/ep01/clips", 1);

    for scenes in [10usize, 100, 1000] {
        let text = frame_list(scenes);
        group.throughput(Throughput::Elements(scenes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scenes), &text, |b, text| {
            b.iter(|| {
                let counts: Vec<u64> = parse_lines(black_box(text))
                    .iter()
                    .map(|line| parse_frame_count(line).unwrap())
                    .collect();
                ClipPlan::from_frame_counts(&target, &counts, 23.976, true).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_manifest_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_resolution");

    for scenes in [10usize, 100, 1000] {
        let json = manifest_json(scenes);
        group.throughput(Throughput::Elements(scenes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scenes), &json, |b, json| {
            b.iter(|| {
                let manifest = parse_manifest(black_box(json)).unwrap();
                manifest
                    .scenes
                    .iter()
                    .map(|scene| {
                        manifest.resolve_scene_dir(scene).unwrap();
                        manifest.resolve_animatic(scene)
                    })
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame_plan, bench_manifest_resolution);
criterion_main!(benches);
