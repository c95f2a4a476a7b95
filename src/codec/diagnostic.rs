//! Diagnostic types for document scanning.
//!
//! A document that cannot be turned into a graph node is recorded here and left out of the node
//! sequence. Diagnostics never abort a scan; they are handed to the caller next to the nodes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Why a document was left out of the graph.
///
/// # Examples
///
/// ```
/// # use docgraph_core::codec::ScanDiagnostic;
/// let diagnostic = ScanDiagnostic::InvalidHeader {
///     path: "guides/setup.md".to_string(),
///     message: "missing required field 'id'".to_string(),
/// };
/// assert_eq!(diagnostic.path(), "guides/setup.md");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScanDiagnostic {
    /// The file could not be read, or is not UTF-8 text
    Unreadable { path: String, message: String },

    /// The header block is missing, unterminated, unparsable, or lacks a required field
    InvalidHeader { path: String, message: String },

    /// Another document already claimed this id; `kept` is the path of the document that did
    DuplicateId {
        id: String,
        path: String,
        kept: String,
    },

    /// A directory entry could not be enumerated
    Enumeration { path: String, message: String },
}

impl ScanDiagnostic {
    /// Root-relative path of the affected document
    pub fn path(&self) -> &str {
        match self {
            ScanDiagnostic::Unreadable { path, .. }
            | ScanDiagnostic::InvalidHeader { path, .. }
            | ScanDiagnostic::DuplicateId { path, .. }
            | ScanDiagnostic::Enumeration { path, .. } => path,
        }
    }
}

impl Display for ScanDiagnostic {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ScanDiagnostic::Unreadable { path, message } => {
                write!(f, "{path}: unreadable: {message}")
            }
            ScanDiagnostic::InvalidHeader { path, message } => {
                write!(f, "{path}: invalid header: {message}")
            }
            ScanDiagnostic::DuplicateId { id, path, kept } => {
                write!(f, "{path}: duplicate id '{id}' (already used by {kept})")
            }
            ScanDiagnostic::Enumeration { path, message } => {
                write!(f, "{path}: could not enumerate: {message}")
            }
        }
    }
}
