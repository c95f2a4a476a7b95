//! Document parsing: turning files into unresolved graph nodes.
//!
//! ## Key Components
//!
//! - [`DocumentScanner`] - reads every document of a corpus on a bounded worker pool
//! - [`DocumentSource`] trait - the file enumeration seam ([`WalkdirSource`] walks a directory)
//! - [`ReferenceExtractor`] - pulls raw references out of a document body
//! - [`header`] - splits and validates the structured header block
//! - [`ScanDiagnostic`] - why a document was left out of the graph
//!
//! Scanning never aborts because of a single document: unreadable files and invalid headers are
//! collected as diagnostics and the remaining documents carry on.

pub mod diagnostic;
pub mod header;
pub mod references;
pub mod scanner;

pub use diagnostic::ScanDiagnostic;
pub use references::ReferenceExtractor;
pub use scanner::{
    parse_document, DocumentScanner, DocumentSource, Enumeration, ScanOutput, WalkdirSource,
};
