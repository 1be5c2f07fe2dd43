use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use ftdex::{FullTextIndexer, Indexer, IndexerConfig, MaintenanceConfig, MatchMode, TextDocument};

const VOCABULARY: &[&str] = &[
    "filesystem", "posting", "trigram", "wildcard", "maintenance", "document", "storage",
    "library", "catalogue", "archive", "manuscript", "collection",
];

struct BenchEnv {
    _tmp: TempDir,
    indexer: FullTextIndexer,
}

fn build_env(doc_count: usize) -> BenchEnv {
    let tmp = TempDir::new().unwrap();
    let config = IndexerConfig::new(tmp.path()).with_maintenance(MaintenanceConfig {
        idle_interval_ms: 60_000,
        drain_pause_ms: 60_000,
    });
    let indexer = FullTextIndexer::open(config).unwrap();

    for i in 0..doc_count {
        let text = format!(
            "{} {} {} entry {}",
            VOCABULARY[i % VOCABULARY.len()],
            VOCABULARY[(i / 3) % VOCABULARY.len()],
            VOCABULARY[(i * 7) % VOCABULARY.len()],
            i
        );
        indexer.index(&TextDocument::new(text), i as u64).unwrap();
    }
    indexer.flush().unwrap();
    BenchEnv { _tmp: tmp, indexer }
}

fn bench_query_modes(c: &mut Criterion) {
    let counts = [1_000usize, 10_000];
    let envs: Vec<(usize, BenchEnv)> = counts.iter().map(|&n| (n, build_env(n))).collect();

    for (mode, text) in [
        (MatchMode::Exact, "posting archive"),
        (MatchMode::Prefix, "arch"),
        (MatchMode::Infix, "log"),
    ] {
        let mut group = c.benchmark_group(format!("query_{}", mode));
        for (count, env) in envs.iter() {
            group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
                b.iter(|| black_box(env.indexer.process_query(text, mode).unwrap()));
            });
        }
        group.finish();
    }
}

fn bench_cold_cache(c: &mut Criterion) {
    let env = build_env(10_000);
    c.bench_function("query_cold_cache", |b| {
        b.iter(|| {
            env.indexer.clear_cache();
            black_box(env.indexer.process_query("storage", MatchMode::Exact).unwrap())
        });
    });
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    group.sample_size(10);
    group.bench_function("index_1000_docs", |b| {
        b.iter(|| black_box(build_env(1_000)));
    });
    group.finish();
}

criterion_group!(benches, bench_query_modes, bench_cold_cache, bench_indexing);
criterion_main!(benches);
