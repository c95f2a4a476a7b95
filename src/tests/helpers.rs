//! Shared test utilities for graph testing

use crate::{
    codec::{parse_document, ReferenceExtractor},
    properties::{DocKind, DocNode, DocStatus, Reference, ReferenceKind},
    resolver::PathProbe,
};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Helper function to create an unresolved node under the `/corpus` root
pub fn doc_node(id: &str, title: &str, rel_path: &str) -> DocNode {
    DocNode {
        id: id.to_string(),
        kind: DocKind::Knowledge,
        status: DocStatus::Active,
        title: title.to_string(),
        aliases: Vec::new(),
        path: format!("/corpus/{rel_path}"),
        rel_path: rel_path.to_string(),
        content_hash: String::new(),
        references: Vec::new(),
    }
}

/// Append one unresolved reference per `(kind, raw_target)` pair, on consecutive lines
pub fn with_refs(mut node: DocNode, refs: &[(ReferenceKind, &str)]) -> DocNode {
    for (kind, raw) in refs {
        let context = match kind {
            ReferenceKind::Plain => format!("[link]({raw})"),
            ReferenceKind::AliasedWikiLink => format!("[[{raw}|label]]"),
            ReferenceKind::WikiLink | ReferenceKind::CodeReference => format!("[[{raw}]]"),
        };
        let line = node.references.len() + 1;
        let mut reference = Reference::new(node.id.clone(), *raw, *kind, line, context);
        if *kind == ReferenceKind::AliasedWikiLink {
            reference = reference.with_label("label");
        }
        node.references.push(reference);
    }
    node
}

/// Parse `(rel_path, content)` pairs as documents under `/corpus`, panicking on bad fixtures
pub fn parse_corpus(documents: &[(&str, &str)]) -> Vec<DocNode> {
    let extractor = ReferenceExtractor::new().unwrap();
    let root = Path::new("/corpus");
    documents
        .iter()
        .map(|(rel, content)| {
            parse_document(root, &root.join(rel), content, &extractor)
                .unwrap_or_else(|d| panic!("fixture {rel} failed to parse: {d}"))
        })
        .collect()
}

/// A [PathProbe] that only knows a fixed set of paths
#[derive(Debug, Clone, Default)]
pub struct StaticProbe(BTreeSet<PathBuf>);

impl StaticProbe {
    pub fn with(paths: &[&str]) -> StaticProbe {
        StaticProbe(paths.iter().map(PathBuf::from).collect())
    }
}

impl PathProbe for StaticProbe {
    fn exists(&self, path: &Path) -> bool {
        self.0.contains(path)
    }
}
