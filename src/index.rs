//! The knowledge index: a primary id lookup plus three reverse lookups, built in one pass over
//! the full node list.
//!
//! The index is an ordinary value. Build it once per cycle, hand `&KnowledgeIndex` to whoever
//! needs it, and rebuild it from scratch when the corpus changes; there is no incremental update
//! and nothing mutates it after [`KnowledgeIndex::build`] returns.
//!
//! ## Tie-break rules
//!
//! - **Duplicate ids**: nodes are visited in `(id, rel_path)` order and the first one wins. The
//!   rest are left out and listed by [`KnowledgeIndex::duplicates`].
//! - **Normalized-title collisions**: when two titles normalize to the same key, the node with
//!   the lowest id (byte order) owns the key.
//!
//! Neither rule depends on the order of the input slice.

use serde::{Deserialize, Serialize};
use std::{
    collections::{hash_map::Entry, HashMap},
    iter::once,
    path::{Path, PathBuf},
};

use crate::properties::DocNode;

/// Normalize title text for fuzzy matching.
///
/// Lowercases, deletes everything that is not a letter, digit, whitespace or hyphen, then
/// deletes all whitespace.
///
/// ```
/// # use docgraph_core::index::normalize_title;
/// assert_eq!(normalize_title("Fase 01"), "fase01");
/// assert_eq!(normalize_title("Introduction: Part 1"), "introductionpart1");
/// ```
pub fn normalize_title(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// A node that lost its id to an earlier node during [`KnowledgeIndex::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub id: String,
    pub rel_path: String,
    pub kept: String,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    root: PathBuf,
    /// Ids in ascending order
    order: Vec<String>,
    by_id: HashMap<String, DocNode>,
    by_path: HashMap<String, String>,
    by_alias: HashMap<String, Vec<String>>,
    by_normalized: HashMap<String, String>,
    duplicates: Vec<DuplicateEntry>,
}

impl KnowledgeIndex {
    /// Build all four lookups from `nodes`. O(nodes + aliases) after sorting.
    pub fn build(root: impl AsRef<Path>, nodes: &[DocNode]) -> KnowledgeIndex {
        let mut ordered: Vec<&DocNode> = nodes.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.rel_path.cmp(&b.rel_path)));

        let mut index = KnowledgeIndex {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        };
        for node in ordered {
            if let Some(kept) = index.by_id.get(&node.id) {
                tracing::warn!(
                    "Index: duplicate id '{}' at {} ignored (kept {})",
                    node.id,
                    node.rel_path,
                    kept.rel_path
                );
                index.duplicates.push(DuplicateEntry {
                    id: node.id.clone(),
                    rel_path: node.rel_path.clone(),
                    kept: kept.rel_path.clone(),
                });
                continue;
            }
            index.insert(node);
        }
        tracing::debug!(
            "Index built: {} nodes, {} paths, {} alias keys, {} normalized keys",
            index.by_id.len(),
            index.by_path.len(),
            index.by_alias.len(),
            index.by_normalized.len()
        );
        index
    }

    fn insert(&mut self, node: &DocNode) {
        let id = node.id.clone();

        for path in [&node.rel_path, &node.path] {
            if path.is_empty() {
                continue;
            }
            self.by_path
                .entry(path.clone())
                .or_insert_with(|| id.clone());
        }

        for text in once(&node.title).chain(node.aliases.iter()) {
            let ids = self.by_alias.entry(text.clone()).or_default();
            if !ids.contains(&id) {
                ids.push(id.clone());
                ids.sort();
            }
        }

        let key = normalize_title(&node.title);
        if !key.is_empty() {
            match self.by_normalized.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(id.clone());
                }
                Entry::Occupied(mut slot) => {
                    tracing::debug!(
                        "Index: normalized title '{}' shared by '{}' and '{}'",
                        slot.key(),
                        slot.get(),
                        id
                    );
                    if id < *slot.get() {
                        slot.insert(id.clone());
                    }
                }
            }
        }

        self.order.push(id.clone());
        self.by_id.insert(id, node.clone());
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Indexed nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &DocNode> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn duplicates(&self) -> &[DuplicateEntry] {
        &self.duplicates
    }

    pub fn find_by_id(&self, id: &str) -> Option<&DocNode> {
        self.by_id.get(id)
    }

    /// Exact match against both the absolute and the root-relative form of every node path.
    pub fn find_by_path(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    /// Every id whose title or declared alias equals `text` verbatim, in ascending order.
    pub fn find_by_alias(&self, text: &str) -> &[String] {
        self.by_alias
            .get(text)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The single id owning the normalized form of `text`.
    pub fn find_by_normalized_title(&self, text: &str) -> Option<&str> {
        let key = normalize_title(text);
        if key.is_empty() {
            return None;
        }
        self.by_normalized.get(&key).map(String::as_str)
    }
}
