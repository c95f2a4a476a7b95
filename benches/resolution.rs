//! Performance benchmarks for graph construction
//!
//! - Scanning a synthetic corpus from disk (worker pool, header parsing, extraction)
//! - Index build + resolution + health over already scanned nodes
//! - Resolution alone against a prebuilt index
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use docgraph_core::{
    config::GraphConfig,
    health::compute_health,
    index::KnowledgeIndex,
    pipeline::{assemble, scan},
    resolver::resolve_all,
};
use std::path::Path;
use tempfile::TempDir;

const DOCUMENTS: usize = 500;
const KINDS: [&str; 5] = ["guides", "architecture", "reference", "history", "knowledge"];

/// Each document links to its neighbours by id, path, title and normalized title, and carries
/// one broken link and one shared-title (ambiguous) link.
fn setup_corpus() -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    for i in 0..DOCUMENTS {
        let kind = KINDS[i % KINDS.len()];
        let next = (i + 1) % DOCUMENTS;
        let prev = (i + DOCUMENTS - 1) % DOCUMENTS;
        let body = format!(
            "# Document {i}\n\n\
             See [[doc-{next:04}]] and [previous](../{prev_kind}/doc-{prev:04}.md#top).\n\
             Also [[Document Title {next}]], [[document title {prev}]] and [[Shared]].\n\
             Missing: [[Nothing Here {i}]]. Code: [[code:src/lib.rs::item_{i}]].\n",
            prev_kind = KINDS[prev % KINDS.len()],
        );
        let content = format!(
            "---\nid: doc-{i:04}\ntitle: Document Title {i}\naliases:\n  - Shared\n---\n{body}"
        );
        let path = dir.path().join(kind).join(format!("doc-{i:04}.md"));
        write(&path, &content)?;
    }
    write(&dir.path().join("src").join("lib.rs"), "")?;
    Ok(dir)
}

fn write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

fn bench_scan(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let corpus = setup_corpus().unwrap();
    let config = GraphConfig::new(corpus.path());

    c.bench_function("scan_corpus", |b| {
        b.to_async(&rt)
            .iter(|| async { scan(&config).await.unwrap().nodes.len() });
    });
}

fn bench_assemble(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let corpus = setup_corpus().unwrap();
    let scanned = rt
        .block_on(scan(&GraphConfig::new(corpus.path())))
        .unwrap();

    c.bench_function("index_resolve_health", |b| {
        b.iter(|| assemble(scanned.clone()).report.overall);
    });
}

fn bench_resolve_only(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let corpus = setup_corpus().unwrap();
    let scanned = rt
        .block_on(scan(&GraphConfig::new(corpus.path())))
        .unwrap();
    let index = KnowledgeIndex::build(&scanned.root, &scanned.nodes);

    c.bench_function("resolve_all", |b| {
        b.iter(|| resolve_all(&scanned.nodes, &index).len());
    });

    let resolved = resolve_all(&scanned.nodes, &index);
    c.bench_function("compute_health", |b| {
        b.iter(|| compute_health(&resolved).valid_edges);
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(30)  // Scanning touches the filesystem
        .measurement_time(std::time::Duration::from_secs(10));
    targets =
        bench_scan,
        bench_assemble,
        bench_resolve_only
}

criterion_main!(benches);
