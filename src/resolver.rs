//! Link resolution: turning raw reference text into validated graph edges.
//!
//! Each reference runs through a fixed, ordered list of stages. A stage applies to some
//! [ReferenceKind]s only; the first stage that reaches a definitive outcome ends the run, and a
//! reference that no stage claims is [Strategy::Broken].
//!
//! | # | Stage | Kinds | Outcome |
//! |---|---|---|---|
//! | 0 | code path | code-reference | `code-reference` (target = path as written) or `broken` |
//! | 1 | direct id | all others | `id` |
//! | 2 | path | plain, wiki-link | `path` |
//! | 3 | alias/title | wiki-link, aliased wiki-link | `alias`, or terminal `ambiguous` on more than one match |
//! | 4 | normalized title | all others | `fuzzy` |
//! | - | fallback | all | `broken` |
//!
//! Path interpretations are tried in order: relative to the source document's directory (only
//! for text starting with `./` or `../`), relative to the content root (a leading `/` is read as
//! the root), and finally as an absolute filesystem path, accepted only if it exists on disk.
//!
//! Resolution never mutates its input. [LinkResolver::resolve_all] returns new node snapshots,
//! and running it again over the same nodes and index gives identical output.

use std::path::{Path, PathBuf};

use crate::{
    index::KnowledgeIndex,
    paths::{is_document_relative, join, normalize, strip_fragment, string_to_os_path},
    properties::{DocNode, Reference, ReferenceKind, Resolution, Strategy},
};

/// Filesystem existence check. The resolver performs no other I/O.
pub trait PathProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// [PathProbe] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

static FS_PROBE: FsProbe = FsProbe;

/// One way to read a path-like reference target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathCandidate {
    /// Normalized, relative to the content root
    Rooted(String),
    /// Normalized absolute path; only usable if it exists on disk
    Absolute(String),
}

enum Step {
    Done(Resolution),
    Next,
}

struct Stage {
    name: &'static str,
    applies: fn(ReferenceKind) -> bool,
    run: fn(&LinkResolver<'_>, &DocNode, &Reference) -> Step,
}

const STAGES: &[Stage] = &[
    Stage {
        name: "code",
        applies: |kind| kind == ReferenceKind::CodeReference,
        run: by_code_path,
    },
    Stage {
        name: "id",
        applies: |kind| kind != ReferenceKind::CodeReference,
        run: by_id,
    },
    Stage {
        name: "path",
        applies: |kind| matches!(kind, ReferenceKind::Plain | ReferenceKind::WikiLink),
        run: by_path,
    },
    Stage {
        name: "alias",
        applies: |kind| kind.is_wiki(),
        run: by_alias,
    },
    Stage {
        name: "fuzzy",
        applies: |kind| kind != ReferenceKind::CodeReference,
        run: by_normalized_title,
    },
];

/// Resolves references against a borrowed [KnowledgeIndex].
pub struct LinkResolver<'a> {
    index: &'a KnowledgeIndex,
    probe: &'a dyn PathProbe,
}

impl<'a> LinkResolver<'a> {
    pub fn new(index: &'a KnowledgeIndex) -> LinkResolver<'a> {
        LinkResolver {
            index,
            probe: &FS_PROBE,
        }
    }

    pub fn with_probe(index: &'a KnowledgeIndex, probe: &'a dyn PathProbe) -> LinkResolver<'a> {
        LinkResolver { index, probe }
    }

    /// Run the stage list for one reference of `node`.
    pub fn resolve(&self, node: &DocNode, reference: &Reference) -> Resolution {
        for stage in STAGES.iter().filter(|stage| (stage.applies)(reference.kind)) {
            if let Step::Done(resolution) = (stage.run)(self, node, reference) {
                tracing::trace!(
                    "{} -> '{}' settled by {} stage as {}",
                    node.id,
                    reference.raw_target,
                    stage.name,
                    resolution.strategy
                );
                return resolution;
            }
        }
        tracing::debug!(
            "Broken reference in '{}' (line {}): '{}'",
            node.id,
            reference.line,
            reference.raw_target
        );
        Resolution::broken()
    }

    /// A snapshot of `node` with every reference resolved.
    pub fn resolve_node(&self, node: &DocNode) -> DocNode {
        let references = node
            .references
            .iter()
            .map(|reference| reference.resolved(self.resolve(node, reference)))
            .collect();
        node.with_references(references)
    }

    pub fn resolve_all(&self, nodes: &[DocNode]) -> Vec<DocNode> {
        nodes.iter().map(|node| self.resolve_node(node)).collect()
    }

    fn disk_path(&self, candidate: &PathCandidate) -> PathBuf {
        match candidate {
            PathCandidate::Rooted(rel) => self.index.root().join(string_to_os_path(rel)),
            PathCandidate::Absolute(abs) => string_to_os_path(abs),
        }
    }
}

fn by_id(resolver: &LinkResolver<'_>, _node: &DocNode, reference: &Reference) -> Step {
    match resolver.index.find_by_id(&reference.raw_target) {
        Some(found) => Step::Done(Resolution::found(Strategy::Id, found.id.clone())),
        None => Step::Next,
    }
}

fn by_path(resolver: &LinkResolver<'_>, node: &DocNode, reference: &Reference) -> Step {
    for candidate in path_candidates(node, &reference.raw_target) {
        let hit = match &candidate {
            PathCandidate::Rooted(rel) => resolver.index.find_by_path(rel),
            PathCandidate::Absolute(abs) => {
                if resolver.probe.exists(&string_to_os_path(abs)) {
                    resolver.index.find_by_path(abs)
                } else {
                    None
                }
            }
        };
        if let Some(id) = hit {
            return Step::Done(Resolution::found(Strategy::Path, id));
        }
    }
    Step::Next
}

fn by_alias(resolver: &LinkResolver<'_>, _node: &DocNode, reference: &Reference) -> Step {
    match resolver.index.find_by_alias(&reference.raw_target) {
        [] => Step::Next,
        [only] => Step::Done(Resolution::found(Strategy::Alias, only.clone())),
        many => {
            tracing::warn!(
                "Ambiguous reference '{}' in '{}' (line {}): {} nodes match ({})",
                reference.raw_target,
                reference.source,
                reference.line,
                many.len(),
                many.join(", ")
            );
            Step::Done(Resolution::ambiguous())
        }
    }
}

fn by_normalized_title(
    resolver: &LinkResolver<'_>,
    _node: &DocNode,
    reference: &Reference,
) -> Step {
    match resolver.index.find_by_normalized_title(&reference.raw_target) {
        Some(id) => Step::Done(Resolution::found(Strategy::Fuzzy, id)),
        None => Step::Next,
    }
}

/// Code references never fall through to the document stages.
fn by_code_path(resolver: &LinkResolver<'_>, node: &DocNode, reference: &Reference) -> Step {
    let Some((path, _symbol)) = reference.code_parts() else {
        return Step::Done(Resolution::broken());
    };
    let found = path_candidates(node, path)
        .iter()
        .any(|candidate| resolver.probe.exists(&resolver.disk_path(candidate)));
    if found {
        Step::Done(Resolution::found(Strategy::CodeReference, path))
    } else {
        tracing::debug!(
            "Code reference in '{}' (line {}) points at missing path '{}'",
            node.id,
            reference.line,
            path
        );
        Step::Done(Resolution::broken())
    }
}

/// Interpretations of a path-like target, in the order they are tried.
fn path_candidates(node: &DocNode, raw: &str) -> Vec<PathCandidate> {
    let target = strip_fragment(raw).trim();
    if target.is_empty() {
        return Vec::new();
    }
    let mut candidates = Vec::with_capacity(3);
    if is_document_relative(target) {
        if let Some(rel) = join(node.rel_dir(), target) {
            candidates.push(PathCandidate::Rooted(rel));
        }
    }
    if let Some(rel) = normalize(target.trim_start_matches('/')).filter(|rel| !rel.is_empty()) {
        let candidate = PathCandidate::Rooted(rel);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    if target.starts_with('/') {
        if let Some(abs) = normalize(target) {
            candidates.push(PathCandidate::Absolute(abs));
        }
    }
    candidates
}

/// Resolve every reference of every node against `index`, using the real filesystem for
/// existence checks.
pub fn resolve_all(nodes: &[DocNode], index: &KnowledgeIndex) -> Vec<DocNode> {
    LinkResolver::new(index).resolve_all(nodes)
}
