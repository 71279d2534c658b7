//! Parser throughput benchmark
//!
//! Compares the two backends and the function cache on generated programs
//! of increasing size:
//! - `validate`: check-only walk, no tree
//! - `parse_lazy`: full tree for the top level, nested bodies checked
//! - `parse_eager`: full tree everywhere
//! - `parse_warm_cache`: full tree with every nested body served from the cache

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sable_parser::{FunctionCache, ParserOptions, parse, parse_with_cache, validate};
use std::hint::black_box;
use std::time::Duration;

/// A program with `decl_count` top-level declarations of mixed shape.
fn generate_js_file(decl_count: usize) -> String {
    let mut src = String::with_capacity(decl_count * 300);
    src.push_str("// Generated JavaScript for the parser benchmark\n\n");

    for i in 0..decl_count {
        match i % 4 {
            0 => src.push_str(&format!(
                r#"function process{i}(input, count) {{
    var accumulated = "";
    for (var j = 0; j < count; j++) {{
        accumulated += input;
    }}
    var total = accumulated.length * count;
    if (total > 100) {{
        return {{ result: accumulated.slice(0, 100), total: 100 }};
    }}
    return {{ result: accumulated, total: total }};
}}

"#
            )),
            1 => src.push_str(&format!(
                r#"class Service{i} {{
    constructor(name) {{ this.name = name; this.items = []; }}
    add(item) {{ this.items.push(item); return this.items.length; }}
    get size() {{ return this.items.length; }}
    static create() {{ return new Service{i}("default"); }}
}}

"#
            )),
            2 => src.push_str(&format!(
                r#"var handlers{i} = [1, 2, 3].map((x) => x * {i} + 1).filter(x => x % 2 === 0);
var config{i} = {{ name: "item{i}", enabled: true, pattern: /item\d+/g, tags: ["a", "b"] }};

"#
            )),
            _ => src.push_str(&format!(
                r#"var {{ left{i}, right{i} = 2 }} = config{prev};
switch (left{i}) {{
    case 1: right{i}++; break;
    default: try {{ right{i} = `value ${{left{i}}}`; }} catch (e) {{ throw e; }}
}}

"#,
                prev = i.saturating_sub(1),
            )),
        }
    }
    src
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("backends");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(30);

    let lazy = ParserOptions::default();
    let eager = ParserOptions {
        eager_function_bodies: true,
        ..ParserOptions::default()
    };

    for decl_count in [10, 100, 1000] {
        let source = generate_js_file(decl_count);
        let label = format!("{decl_count}_decls");
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::new("validate", &label), &source, |b, src| {
            b.iter(|| black_box(validate(src, &lazy).is_ok()));
        });
        group.bench_with_input(BenchmarkId::new("parse_lazy", &label), &source, |b, src| {
            b.iter(|| black_box(parse(src, &lazy).map(|output| output.arena.len())));
        });
        group.bench_with_input(BenchmarkId::new("parse_eager", &label), &source, |b, src| {
            b.iter(|| black_box(parse(src, &eager).map(|output| output.arena.len())));
        });
        group.bench_with_input(
            BenchmarkId::new("parse_warm_cache", &label),
            &source,
            |b, src| {
                let mut cache = FunctionCache::new();
                let _ = parse_with_cache(src, &lazy, &mut cache);
                b.iter(|| {
                    black_box(parse_with_cache(src, &lazy, &mut cache).map(|output| output.arena.len()))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
