//! One full cycle over a corpus: scan, index, resolve, score.
//!
//! The stages are also usable on their own (see [crate::codec::DocumentScanner],
//! [crate::index::KnowledgeIndex::build], [crate::resolver::resolve_all] and
//! [crate::health::compute_health]); [run_cycle] chains them and packs the result into a
//! [GraphSnapshot] that collaborators can persist and reload.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    codec::{DocumentScanner, ScanDiagnostic, ScanOutput},
    config::GraphConfig,
    error::DocGraphError,
    health::{compute_health, HealthReport},
    index::KnowledgeIndex,
    paths::os_path_to_string,
    properties::DocNode,
    resolver::resolve_all,
};

/// Everything a cycle produced, in interchange form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Canonical content root, `/`-separated
    pub root: String,
    /// Resolved nodes in ascending id order
    pub nodes: Vec<DocNode>,
    pub report: HealthReport,
    #[serde(default)]
    pub diagnostics: Vec<ScanDiagnostic>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String, DocGraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<GraphSnapshot, DocGraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot as JSON. The file is replaced in one step so readers never see a
    /// partial snapshot.
    pub async fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DocGraphError> {
        let path = path.as_ref();
        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");
        tokio::fs::write(&staging, self.to_json()?).await?;
        tokio::fs::rename(&staging, path).await?;
        tracing::debug!("Wrote graph snapshot to {:?}", path);
        Ok(())
    }

    pub async fn read_from<P: AsRef<Path>>(path: P) -> Result<GraphSnapshot, DocGraphError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        GraphSnapshot::from_json(&json)
    }

    /// Look up a node by id. Snapshots read from elsewhere need not be sorted.
    pub fn find_node(&self, id: &str) -> Option<&DocNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// Scan the corpus described by `config` into unresolved nodes.
pub async fn scan(config: &GraphConfig) -> Result<ScanOutput, DocGraphError> {
    DocumentScanner::new(config)?.scan().await
}

/// Index, resolve and score an already scanned corpus.
pub fn assemble(output: ScanOutput) -> GraphSnapshot {
    let ScanOutput {
        root,
        nodes,
        diagnostics,
    } = output;
    let index = KnowledgeIndex::build(&root, &nodes);
    let mut resolved = resolve_all(&nodes, &index);
    resolved.sort_by(|a, b| a.id.cmp(&b.id));
    let report = compute_health(&resolved);
    GraphSnapshot {
        root: os_path_to_string(&root),
        nodes: resolved,
        report,
        diagnostics,
    }
}

/// Run scan, index, resolve and health over the corpus described by `config`.
///
/// Only setup failures are errors: a missing content root or an enumeration failure at the root.
/// Per-document problems end up in [GraphSnapshot::diagnostics] and failed references in the
/// report.
#[tracing::instrument(skip_all, fields(root = ?config.root))]
pub async fn run_cycle(config: &GraphConfig) -> Result<GraphSnapshot, DocGraphError> {
    let snapshot = assemble(scan(config).await?);
    let report = &snapshot.report;
    tracing::info!(
        "Cycle complete: {} nodes, {} valid / {} broken / {} ambiguous edges, {} orphans, \
         overall {:.1} ({}), {} diagnostics",
        report.total_nodes,
        report.valid_edges,
        report.broken_edges,
        report.ambiguous_edges,
        report.orphans.len(),
        report.overall,
        report.tier,
        snapshot.diagnostics.len()
    );
    Ok(snapshot)
}
