/// [crate::properties] contains the graph data model: documents ([DocNode]) and the references
/// ([Reference]) they make to one another.
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::DocGraphError;

/// The closed set of document kinds a governed document may declare.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DocKind {
    Guide,
    Architecture,
    Reference,
    History,
    #[default]
    Knowledge,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Guide => "guide",
            DocKind::Architecture => "architecture",
            DocKind::Reference => "reference",
            DocKind::History => "history",
            DocKind::Knowledge => "knowledge",
        }
    }

    /// Infer a kind from a directory name such as `guides` or `architecture`.
    pub fn from_dir_name(name: &str) -> Option<DocKind> {
        DocKind::from_str(name).ok()
    }
}

impl FromStr for DocKind {
    type Err = DocGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guide" | "guides" => Ok(DocKind::Guide),
            "architecture" | "architectures" => Ok(DocKind::Architecture),
            "reference" | "references" => Ok(DocKind::Reference),
            "history" | "histories" => Ok(DocKind::History),
            "knowledge" => Ok(DocKind::Knowledge),
            other => Err(DocGraphError::Header(format!("unknown document kind '{other}'"))),
        }
    }
}

impl Display for DocKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DocStatus {
    Draft,
    #[default]
    Active,
    Deprecated,
    Archived,
}

impl FromStr for DocStatus {
    type Err = DocGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(DocStatus::Draft),
            "active" => Ok(DocStatus::Active),
            "deprecated" => Ok(DocStatus::Deprecated),
            "archived" => Ok(DocStatus::Archived),
            other => Err(DocGraphError::Header(format!(
                "unknown document status '{other}'"
            ))),
        }
    }
}

impl Display for DocStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let s = match self {
            DocStatus::Draft => "draft",
            DocStatus::Active => "active",
            DocStatus::Deprecated => "deprecated",
            DocStatus::Archived => "archived",
        };
        write!(f, "{s}")
    }
}

/// The lexical form a reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `[label](target)`
    Plain,
    /// `[[target]]`
    WikiLink,
    /// `[[target|label]]`
    AliasedWikiLink,
    /// `[[code:path::symbol]]`
    CodeReference,
}

impl ReferenceKind {
    pub fn is_wiki(&self) -> bool {
        matches!(self, ReferenceKind::WikiLink | ReferenceKind::AliasedWikiLink)
    }
}

/// Which resolution strategy produced a reference's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Id,
    Path,
    Alias,
    Fuzzy,
    CodeReference,
    Ambiguous,
    Broken,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Path => "path",
            Strategy::Alias => "alias",
            Strategy::Fuzzy => "fuzzy",
            Strategy::CodeReference => "code-reference",
            Strategy::Ambiguous => "ambiguous",
            Strategy::Broken => "broken",
        }
    }

    /// Terminal failures never carry a target.
    pub fn is_failure(&self) -> bool {
        matches!(self, Strategy::Ambiguous | Strategy::Broken)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The terminal outcome of resolving one [Reference].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub strategy: Strategy,
    pub target: Option<String>,
}

impl Resolution {
    pub fn found(strategy: Strategy, target: impl Into<String>) -> Resolution {
        Resolution {
            strategy,
            target: Some(target.into()),
        }
    }

    pub fn ambiguous() -> Resolution {
        Resolution {
            strategy: Strategy::Ambiguous,
            target: None,
        }
    }

    pub fn broken() -> Resolution {
        Resolution {
            strategy: Strategy::Broken,
            target: None,
        }
    }
}

/// One directed reference from a document.
///
/// Extraction fills in everything up to `context`; the resolution fields stay empty until a
/// [crate::resolver::LinkResolver] produces a new snapshot through [Reference::resolved].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Id of the node the reference was found in
    pub source: String,
    /// Target text exactly as written (for code references, including the `code:` prefix)
    pub raw_target: String,
    pub kind: ReferenceKind,
    /// Display text, when the syntax carries one separate from the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 1-based line in the source file
    pub line: usize,
    /// Trimmed source line the reference appeared on
    pub context: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub valid: bool,
}

impl Reference {
    pub fn new(
        source: impl Into<String>,
        raw_target: impl Into<String>,
        kind: ReferenceKind,
        line: usize,
        context: impl Into<String>,
    ) -> Reference {
        Reference {
            source: source.into(),
            raw_target: raw_target.into(),
            kind,
            label: None,
            line,
            context: context.into(),
            target: None,
            strategy: None,
            valid: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Reference {
        self.label = Some(label.into());
        self
    }

    /// Returns a copy of this reference carrying `resolution`.
    ///
    /// Validity is derived here and nowhere else: valid iff a target exists and the strategy is
    /// not a terminal failure.
    pub fn resolved(&self, resolution: Resolution) -> Reference {
        let target = if resolution.strategy.is_failure() {
            None
        } else {
            resolution.target
        };
        Reference {
            valid: target.is_some(),
            target,
            strategy: Some(resolution.strategy),
            ..self.clone()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.strategy.is_some()
    }

    /// Splits a code reference into its path and optional symbol on the first `::`.
    pub fn code_parts(&self) -> Option<(&str, Option<&str>)> {
        if self.kind != ReferenceKind::CodeReference {
            return None;
        }
        let spec = self.raw_target.strip_prefix("code:")?;
        Some(match spec.split_once("::") {
            Some((path, symbol)) => (path, Some(symbol)),
            None => (spec, None),
        })
    }
}

/// One governed document in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocNode {
    pub id: String,
    pub kind: DocKind,
    pub status: DocStatus,
    pub title: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Canonical absolute location, `/`-separated
    pub path: String,
    /// Location relative to the content root, `/`-separated
    pub rel_path: String,
    /// Lowercase hex SHA-256 of the file contents
    #[serde(default)]
    pub content_hash: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl DocNode {
    /// The node's directory relative to the content root (empty at the root).
    pub fn rel_dir(&self) -> &str {
        self.rel_path
            .rfind('/')
            .map(|idx| &self.rel_path[..idx])
            .unwrap_or("")
    }

    /// Returns a snapshot of this node with its references replaced.
    pub fn with_references(&self, references: Vec<Reference>) -> DocNode {
        DocNode {
            references,
            ..self.clone()
        }
    }

    pub fn valid_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.valid)
    }
}
