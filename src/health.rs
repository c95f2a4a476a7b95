//! Health scoring over a fully resolved node list.
//!
//! Two scores, both percentages in `[0, 100]`:
//!
//! - **link health**: `100 * valid / total` over every reference in the corpus
//! - **connectivity**: `100 * connected / nodes`, where a node is connected when it has at least
//!   one valid outbound edge or at least one valid inbound edge from another document
//!
//! Both are 100 for an empty corpus. The overall score blends them with the fixed weights
//! [LINK_HEALTH_WEIGHT] and [CONNECTIVITY_WEIGHT], and [HealthTier::from_score] classifies it.
//!
//! Code-reference edges point at source files rather than documents: a valid one counts towards
//! link health and makes its source node connected, but never gives any node an inbound edge.

use petgraph::{algo::connected_components, graph::UnGraph};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::{Display, Formatter},
};

use crate::properties::{DocNode, Reference, ReferenceKind, Strategy};

pub const LINK_HEALTH_WEIGHT: f64 = 0.5;
pub const CONNECTIVITY_WEIGHT: f64 = 0.5;

/// Lowest overall score classified as [HealthTier::Healthy]
pub const HEALTHY_THRESHOLD: f64 = 80.0;
/// Lowest overall score classified as [HealthTier::Warning]
pub const WARNING_THRESHOLD: f64 = 60.0;

/// Key used in [HealthReport::strategy_counts] for references that were never resolved.
pub const UNRESOLVED_KEY: &str = "unresolved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    pub fn from_score(score: f64) -> HealthTier {
        if score >= HEALTHY_THRESHOLD {
            HealthTier::Healthy
        } else if score >= WARNING_THRESHOLD {
            HealthTier::Warning
        } else {
            HealthTier::Critical
        }
    }
}

impl Display for HealthTier {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let s = match self {
            HealthTier::Healthy => "healthy",
            HealthTier::Warning => "warning",
            HealthTier::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// A reference that did not become a valid edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkIssue {
    pub source: String,
    pub raw_target: String,
    pub line: usize,
    pub kind: ReferenceKind,
}

impl From<&Reference> for LinkIssue {
    fn from(reference: &Reference) -> Self {
        LinkIssue {
            source: reference.source.clone(),
            raw_target: reference.raw_target.clone(),
            line: reference.line,
            kind: reference.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub valid_edges: usize,
    /// Broken, unresolved, or pointing at a node outside the corpus
    pub broken_edges: usize,
    pub ambiguous_edges: usize,
    /// Valid code-reference edges (included in `valid_edges`)
    pub code_reference_edges: usize,
    pub connected_nodes: usize,
    /// Ids with no valid inbound or outbound edge, ascending
    pub orphans: Vec<String>,
    pub link_health: f64,
    pub connectivity: f64,
    pub overall: f64,
    pub tier: HealthTier,
    /// Weakly connected components of the valid document-to-document edge graph
    pub component_count: usize,
    pub strategy_counts: BTreeMap<String, usize>,
    pub broken: Vec<LinkIssue>,
    pub ambiguous: Vec<LinkIssue>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Aggregate the health metrics of `nodes`.
///
/// `nodes` should already be resolved; a reference without a resolution counts as broken.
pub fn compute_health(nodes: &[DocNode]) -> HealthReport {
    let mut graph = UnGraph::<&str, ()>::new_undirected();
    let positions: HashMap<&str, _> = nodes
        .iter()
        .map(|node| (node.id.as_str(), graph.add_node(node.id.as_str())))
        .collect();

    let mut connected: BTreeSet<&str> = BTreeSet::new();
    let mut strategy_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut broken = Vec::new();
    let mut ambiguous = Vec::new();
    let mut total_edges = 0;
    let mut valid_edges = 0;
    let mut code_reference_edges = 0;

    for node in nodes {
        for reference in &node.references {
            total_edges += 1;
            let key = reference
                .strategy
                .map(|s| s.as_str())
                .unwrap_or(UNRESOLVED_KEY);
            *strategy_counts.entry(key.to_string()).or_default() += 1;

            if reference.strategy == Some(Strategy::Ambiguous) {
                ambiguous.push(LinkIssue::from(reference));
                continue;
            }
            let Some(target) = reference.target.as_deref().filter(|_| reference.valid) else {
                broken.push(LinkIssue::from(reference));
                continue;
            };

            if reference.kind == ReferenceKind::CodeReference {
                code_reference_edges += 1;
            } else {
                let Some(&to) = positions.get(target) else {
                    tracing::debug!(
                        "Valid reference from '{}' points outside the corpus: '{}'",
                        node.id,
                        target
                    );
                    broken.push(LinkIssue::from(reference));
                    continue;
                };
                if target != node.id {
                    connected.insert(target);
                }
                graph.add_edge(positions[node.id.as_str()], to, ());
            }
            valid_edges += 1;
            connected.insert(node.id.as_str());
        }
    }

    let orphans: Vec<String> = nodes
        .iter()
        .filter(|node| !connected.contains(node.id.as_str()))
        .map(|node| node.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let connected_nodes = nodes
        .iter()
        .filter(|node| connected.contains(node.id.as_str()))
        .count();

    let link_health = percentage(valid_edges, total_edges);
    let connectivity = percentage(connected_nodes, nodes.len());
    let overall = LINK_HEALTH_WEIGHT * link_health + CONNECTIVITY_WEIGHT * connectivity;
    let tier = HealthTier::from_score(overall);

    tracing::debug!(
        "Health: {} nodes, {}/{} valid edges, {} orphans, overall {:.1} ({})",
        nodes.len(),
        valid_edges,
        total_edges,
        orphans.len(),
        overall,
        tier
    );

    HealthReport {
        total_nodes: nodes.len(),
        total_edges,
        valid_edges,
        broken_edges: broken.len(),
        ambiguous_edges: ambiguous.len(),
        code_reference_edges,
        connected_nodes,
        orphans,
        link_health,
        connectivity,
        overall,
        tier,
        component_count: connected_components(&graph),
        strategy_counts,
        broken,
        ambiguous,
    }
}
