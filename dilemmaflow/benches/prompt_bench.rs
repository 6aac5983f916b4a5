//! Benchmarks for prompt construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dilemmaflow::catalog::StageCatalog;
use dilemmaflow::core::StageRecord;
use dilemmaflow::prompt::{build_refinement_prompt, prior_outputs};

fn sample_log(catalog: &StageCatalog) -> Vec<StageRecord> {
    let response = "{\"items\": [\"lorem ipsum dolor sit amet\"]}\n".repeat(40);
    catalog
        .iter()
        .map(|stage| StageRecord::new(stage.name(), "prompt", response.clone()))
        .collect()
}

fn prompt_benchmark(c: &mut Criterion) {
    let catalog = StageCatalog::dilemma_triangle();
    let log = sample_log(&catalog);
    let story = "A neighbourhood bakery that turns unsold bread into beer. ".repeat(20);
    let template = catalog
        .get(catalog.last_index())
        .and_then(|stage| stage.template())
        .cloned()
        .expect("last stage has a template");

    c.bench_function("prior_outputs", |b| {
        b.iter(|| prior_outputs(black_box(&log)));
    });

    c.bench_function("render_last_stage", |b| {
        let prior = prior_outputs(&log);
        b.iter(|| template.render(black_box(&story), black_box(&prior)));
    });

    c.bench_function("refinement_prompt", |b| {
        let response = log[1].response().to_string();
        b.iter(|| build_refinement_prompt(black_box("Make it shorter"), black_box(&response)));
    });
}

criterion_group!(benches, prompt_benchmark);
criterion_main!(benches);
