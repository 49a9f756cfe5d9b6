//! Resolver benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dtf_core::ResolverConfig;
use dtf_resolver::resolve_source;
use serde_json::{json, Map, Value};

const KDA_DOC: &str = include_str!("../../../tests/fixtures/kda.tokens.json");

/// A palette of `n` colors, each with a dark override, an alpha step and an alias.
fn palette(n: usize) -> Value {
    let mut colors = Map::new();
    colors.insert("$type".into(), json!("color"));
    for i in 0..n {
        let shade = (i % 256) as u8;
        colors.insert(
            format!("c{i}"),
            json!({
                "$value": format!("#{shade:02x}{shade:02x}ff"),
                "$extensions": {
                    "mode": { "dark": format!("#ff{shade:02x}{shade:02x}") },
                    "alpha": { "50": { "$value": 50 } }
                }
            }),
        );
        colors.insert(format!("ref{i}"), json!({ "$value": format!("{{palette.c{i}}}") }));
    }
    json!({ "palette": Value::Object(colors) })
}

fn resolve_fixture(c: &mut Criterion) {
    let doc: Value = serde_json::from_str(KDA_DOC).unwrap();
    let config = ResolverConfig::default();
    c.bench_function("resolve_fixture", |b| {
        b.iter(|| resolve_source(black_box(&doc), &config))
    });
}

fn resolve_palette(c: &mut Criterion) {
    let doc = palette(500);
    let config = ResolverConfig::default();
    c.bench_function("resolve_palette_500", |b| {
        b.iter(|| resolve_source(black_box(&doc), &config))
    });
}

criterion_group!(benches, resolve_fixture, resolve_palette);
criterion_main!(benches);
