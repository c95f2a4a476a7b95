//! # docgraph-core
//!
//! A Rust library that turns a corpus of documentation files into a knowledge graph, validates
//! every cross-document reference, and scores the health of the result.
//!
//! ## Overview
//!
//! Each document starts with a structured header (YAML or TOML between `---` lines) naming at
//! least its `id`. The body is free text that refers to other documents in four ways:
//!
//! - plain links: `[label](../guides/setup.md)`
//! - wiki links: `[[Setup]]`
//! - aliased wiki links: `[[Setup|the setup guide]]`
//! - code references: `[[code:src/index.rs::KnowledgeIndex]]`
//!
//! A cycle runs four stages over the whole corpus:
//!
//! 1. **Scan** ([`codec`]): read every matching file on a bounded worker pool, parse its
//!    header, extract its raw references. Bad documents become diagnostics, not errors.
//! 2. **Index** ([`index`]): build the id, path, alias and normalized-title lookups.
//! 3. **Resolve** ([`resolver`]): run each reference through an ordered list of strategies
//!    (id, path, alias, fuzzy title) until one settles it, or mark it `ambiguous`/`broken`.
//! 4. **Score** ([`health`]): link health, connectivity, orphans, and a classification tier.
//!
//! ## Architecture
//!
//! - **[`properties`]**: the data model (`DocNode`, `Reference`, `Strategy`, ...)
//! - **[`codec`]**: header parsing, reference extraction, the `DocumentScanner`
//! - **[`index`]**: `KnowledgeIndex`, read-only after construction
//! - **[`resolver`]**: `LinkResolver` and the `PathProbe` filesystem seam
//! - **[`health`]**: `compute_health` and `HealthReport`
//! - **[`pipeline`]**: `run_cycle` and the serializable `GraphSnapshot`
//! - **[`config`]**: `GraphConfig`, optionally read from `docgraph.toml`
//! - **[`paths`]**: lexical, OS-independent path helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgraph_core::{config::GraphConfig, pipeline::run_cycle};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ./docs/docgraph.toml if it exists
//!     let config = GraphConfig::discover("./docs")?;
//!     let snapshot = run_cycle(&config).await?;
//!
//!     println!(
//!         "{} nodes, overall {:.1} ({})",
//!         snapshot.report.total_nodes, snapshot.report.overall, snapshot.report.tier
//!     );
//!     for issue in &snapshot.report.broken {
//!         println!("{}:{} broken link '{}'", issue.source, issue.line, issue.raw_target);
//!     }
//!     for diagnostic in &snapshot.diagnostics {
//!         println!("skipped {}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Running the stages separately
//!
//! ```rust,no_run
//! # use docgraph_core::{config::GraphConfig, pipeline};
//! use docgraph_core::{health::compute_health, index::KnowledgeIndex, resolver::resolve_all};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let config = GraphConfig::new("./docs");
//! let scanned = pipeline::scan(&config).await?;
//! let index = KnowledgeIndex::build(&scanned.root, &scanned.nodes);
//! let resolved = resolve_all(&scanned.nodes, &index);
//! let report = compute_health(&resolved);
//! assert_eq!(report.total_nodes, index.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The library logs through `tracing` and never installs a subscriber. Ambiguous references and
//! excluded documents are reported at `warn`, broken references at `debug`, and each cycle
//! ends with an `info` summary.

pub mod codec;
pub mod config;
pub mod error;
pub mod health;
pub mod index;
pub mod paths;
pub mod pipeline;
pub mod properties;
pub mod resolver;
#[cfg(test)]
mod tests;

pub use error::*;
