use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pathway_core::{RegistryBuilder, Resolver, ResolverConfig};

fn build_resolver() -> Resolver {
    let registry = RegistryBuilder::new()
        .entity("catalog.product", "products")
        .relation("catalog.product", "translations", "catalog.product_translation")
        .entity("catalog.product_translation", "product_translations")
        .relation("catalog.product_translation", "comments", "social.comment")
        .entity("social.comment", "comments")
        .build()
        .expect("benchmark registry is valid");
    Resolver::new(Arc::new(registry), ResolverConfig::default())
        .expect("default config is valid")
}

const PATHS: &[(&str, &[&str])] = &[
    ("plain", &["catalog", "product", "42"]),
    ("pivot", &["catalog", "product", "42", "translations", "7"]),
    (
        "chain",
        &["catalog", "product", "42", "translations", "7", "comments", "9"],
    ),
];

fn benchmark_resolve_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_cold");
    let resolver = build_resolver();

    for (name, path) in PATHS {
        group.bench_with_input(BenchmarkId::from_parameter(name), path, |b, p| {
            b.iter(|| {
                resolver.flush_cache();
                let target = resolver
                    .resolve(black_box(*p))
                    .expect("benchmark paths resolve");
                black_box(target.is_pivot);
            });
        });
    }

    group.finish();
}

fn benchmark_resolve_warm(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_warm");
    let resolver = build_resolver();

    for (name, path) in PATHS {
        resolver.resolve(*path).expect("benchmark paths resolve");
        group.bench_with_input(BenchmarkId::from_parameter(name), path, |b, p| {
            b.iter(|| {
                let target = resolver
                    .resolve(black_box(*p))
                    .expect("benchmark paths resolve");
                black_box(target.is_pivot);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_resolve_cold, benchmark_resolve_warm);
criterion_main!(benches);
