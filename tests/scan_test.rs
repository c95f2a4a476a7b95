//! Document scanning against real directories: enumeration rules, diagnostics, ordering.

mod common;

use std::{path::PathBuf, sync::Arc};
use test_log::test;

use docgraph_core::{
    codec::{DocumentScanner, DocumentSource, Enumeration, ScanDiagnostic, WalkdirSource},
    config::GraphConfig,
    DocGraphError,
};

use common::write_doc;

fn doc(id: &str, body: &str) -> String {
    format!("---\nid: {id}\ntitle: {id}\n---\n{body}")
}

#[test(tokio::test)]
async fn bad_documents_become_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_doc(root, "good.md", doc("good", "[[bad]]\n"));
    write_doc(root, "binary.md", [0xffu8, 0xfe, 0x00, 0x61]);
    write_doc(root, "yaml-list.md", "---\n- just\n- a list\n---\n");
    write_doc(root, "numeric-id.md", "---\nid: 42\n---\n");

    let scanner = DocumentScanner::new(&GraphConfig::new(root)).unwrap();
    let output = scanner.scan().await.unwrap();

    let ids: Vec<&str> = output.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["good"]);
    assert_eq!(output.nodes[0].references.len(), 1);

    let paths: Vec<&str> = output.diagnostics.iter().map(|d| d.path()).collect();
    assert_eq!(
        paths,
        vec!["binary.md", "numeric-id.md", "yaml-list.md"]
    );
    assert!(matches!(
        output.diagnostics[0],
        ScanDiagnostic::Unreadable { .. }
    ));
    assert!(output.diagnostics[1..]
        .iter()
        .all(|d| matches!(d, ScanDiagnostic::InvalidHeader { .. })));
}

#[test(tokio::test)]
async fn enumeration_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_doc(root, "a.md", doc("a", ""));
    write_doc(root, "b.MARKDOWN", doc("b", ""));
    write_doc(root, "c.txt", doc("c", ""));
    write_doc(root, "vendor/d.md", doc("d", ""));
    write_doc(root, ".git/e.md", doc("e", ""));
    write_doc(root, "nested/deeper/f.markdown", doc("f", ""));
    write_doc(
        root,
        "docgraph.toml",
        "extensions = [\".md\", \"markdown\"]\nexclude = [\"vendor\"]\n",
    );

    let config = GraphConfig::discover(root).unwrap();
    assert_eq!(config.extensions, vec!["md", "markdown"]);
    let output = DocumentScanner::new(&config).unwrap().scan().await.unwrap();
    let rel: Vec<&str> = output.nodes.iter().map(|n| n.rel_path.as_str()).collect();
    assert_eq!(rel, vec!["a.md", "b.MARKDOWN", "nested/deeper/f.markdown"]);
    assert!(output.diagnostics.is_empty());
}

#[test(tokio::test)]
async fn duplicate_ids_keep_first_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_doc(root, "b/dup.md", doc("dup", ""));
    write_doc(root, "a/dup.md", doc("dup", ""));
    write_doc(root, "c/other.md", doc("other", ""));

    let output = DocumentScanner::new(&GraphConfig::new(root))
        .unwrap()
        .scan()
        .await
        .unwrap();
    let rel: Vec<&str> = output.nodes.iter().map(|n| n.rel_path.as_str()).collect();
    assert_eq!(rel, vec!["a/dup.md", "c/other.md"]);
    assert_eq!(
        output.diagnostics,
        vec![ScanDiagnostic::DuplicateId {
            id: "dup".to_string(),
            path: "b/dup.md".to_string(),
            kept: "a/dup.md".to_string(),
        }]
    );
}

/// Hands back a fixed file list, in reverse order, plus a missing file.
struct FixedSource {
    files: Vec<PathBuf>,
}

impl DocumentSource for FixedSource {
    fn enumerate(&self) -> Result<Enumeration, DocGraphError> {
        Ok(Enumeration {
            files: self.files.iter().rev().cloned().collect(),
            diagnostics: Vec::new(),
        })
    }
}

#[test(tokio::test)]
async fn custom_sources_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let mut files = Vec::new();
    for i in 0..20 {
        let rel = format!("n{i:02}.md");
        write_doc(&root, &rel, doc(&format!("id-{:02}", 19 - i), ""));
        files.push(root.join(rel));
    }
    files.push(root.join("missing.md"));

    let scanner =
        DocumentScanner::with_source(&root, Arc::new(FixedSource { files }), 4).unwrap();
    let output = scanner.scan().await.unwrap();
    let ids: Vec<String> = output.nodes.iter().map(|n| n.id.clone()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("id-{i:02}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(
        output.diagnostics.iter().map(|d| d.path()).collect::<Vec<_>>(),
        vec!["missing.md"]
    );
}

#[test(tokio::test)]
async fn walkdir_source_rejects_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let source = WalkdirSource::new(dir.path().join("nope"), &GraphConfig::default());
    assert!(matches!(
        source.enumerate(),
        Err(DocGraphError::NotFound(_))
    ));
}
