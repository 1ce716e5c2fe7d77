use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rst_analysis::{reconcile, HarvestCache};
use rst_config::declarations::parse_declarations;
use rst_config::{ConfigurationArtifact, HarvestOutput};
use rst_test_utils::{ProjectFixture, RecordingExecutor};
use rst_types::{Diagnostic, SymbolDefinition, SymbolRegistry};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::hint::black_box;
use std::path::Path;

/// A prolog declaring `count` linkable substitutions, half of them through a
/// mirrored target.
fn sample_prolog(count: usize) -> String {
    let mut prolog = String::new();
    for i in 0..count {
        if i % 2 == 0 {
            let _ = writeln!(prolog, ".. |badge{i}| replace:: `Badge {i} <https://ci.example.org/{i}>`_");
        } else {
            let _ = writeln!(prolog, ".. |badge{i}| image:: https://ci.example.org/{i}.svg");
            let _ = writeln!(prolog, "   :alt: badge {i}");
            let _ = writeln!(prolog, ".. _badge{i}: https://ci.example.org/{i}");
        }
    }
    prolog
}

/// Raw diagnostics for a document with `count` combined references, every
/// fourth of them undeclared.
fn sample_diagnostics(count: usize) -> Vec<Diagnostic> {
    let path = Path::new("docs/index.rst");
    (0..count)
        .flat_map(|i| {
            let name = if i % 4 == 0 {
                format!("bogus{i}")
            } else {
                format!("badge{i}")
            };
            [
                Diagnostic::undefined_substitution(path, i + 1, &name),
                Diagnostic::unknown_target(path, i + 1, &name),
            ]
        })
        .collect()
}

fn sample_registry(count: usize) -> SymbolRegistry {
    SymbolRegistry::from_definitions(None, parse_declarations(&sample_prolog(count)))
}

fn bench_parse_declarations(c: &mut Criterion) {
    let prolog = sample_prolog(500);
    c.bench_function("parse_declarations_500", |b| {
        b.iter(|| black_box(parse_declarations(black_box(&prolog))));
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let registry = sample_registry(1000);
    c.bench_function("reconcile_1000_combined_references", |b| {
        b.iter_batched(
            || sample_diagnostics(1000),
            |raw| black_box(reconcile(raw, &registry)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_reconcile_roles(c: &mut Criterion) {
    let registry = SymbolRegistry::from_definitions(
        None,
        (0..200).map(|i| SymbolDefinition::role(format!("role{i}"))),
    );
    let path = Path::new("docs/index.rst");
    c.bench_function("reconcile_400_roles", |b| {
        b.iter_batched(
            || {
                (0..400)
                    .map(|i| Diagnostic::unknown_role(path, i + 1, &format!("role{i}")))
                    .collect::<Vec<_>>()
            },
            |raw| black_box(reconcile(raw, &registry)),
            BatchSize::SmallInput,
        );
    });
}

/// Harvest benchmarks
fn bench_harvest_cold(c: &mut Criterion) {
    let fixture = ProjectFixture::new().artifact("docs");
    let conf = fixture.path("docs/conf.py");
    let output = HarvestOutput {
        text_blocks: BTreeMap::from([("rst_prolog".to_string(), sample_prolog(200))]),
        ..HarvestOutput::default()
    };
    let executor = RecordingExecutor::new().script(&conf, output);
    let artifact = ConfigurationArtifact::at(&conf);

    c.bench_function("harvest_cold", |b| {
        b.iter_batched(
            HarvestCache::new,
            |cache| black_box(cache.get_or_harvest(&executor, &artifact)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_harvest_warm(c: &mut Criterion) {
    let fixture = ProjectFixture::new().artifact("docs");
    let conf = fixture.path("docs/conf.py");
    let output = HarvestOutput {
        text_blocks: BTreeMap::from([("rst_prolog".to_string(), sample_prolog(200))]),
        ..HarvestOutput::default()
    };
    let executor = RecordingExecutor::new().script(&conf, output);
    let artifact = ConfigurationArtifact::at(&conf);
    let cache = HarvestCache::new();
    let _ = cache.get_or_harvest(&executor, &artifact);

    c.bench_function("harvest_warm", |b| {
        // Should only re-read the marker and clone the shared registry
        b.iter(|| black_box(cache.get_or_harvest(&executor, &artifact.refreshed())));
    });
}

criterion_group!(
    benches,
    bench_parse_declarations,
    bench_reconcile,
    bench_reconcile_roles,
    bench_harvest_cold,
    bench_harvest_warm,
);
criterion_main!(benches);
