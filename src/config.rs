use crate::error::DocGraphError;
use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

/// File name looked up in the content root by [GraphConfig::discover].
pub const CONFIG_FILE_NAME: &str = "docgraph.toml";

/// Settings for one scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Content root. Relative values are resolved against the directory holding the config file.
    pub root: PathBuf,
    /// File extensions (without the dot) that mark a file as a document
    pub extensions: Vec<String>,
    /// Directory names skipped during enumeration
    pub exclude: Vec<String>,
    /// Maximum number of documents read concurrently
    pub workers: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            root: PathBuf::from("."),
            extensions: vec!["md".to_string()],
            exclude: Vec::new(),
            workers: 8,
        }
    }
}

impl GraphConfig {
    /// Defaults rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GraphConfig {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn parse(content: &str) -> Result<Self, DocGraphError> {
        let config: GraphConfig = toml::from_str(content)?;
        config.validated()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocGraphError> {
        let path = path.as_ref();
        tracing::debug!("Reading config from: {:?}", path);
        let content = read_to_string(path)?;
        let mut config = GraphConfig::parse(&content)?;
        if config.root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.root = base.join(&config.root);
        }
        Ok(config)
    }

    /// Reads `<root>/docgraph.toml` when present, otherwise returns defaults rooted at `root`.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self, DocGraphError> {
        let candidate = root.as_ref().join(CONFIG_FILE_NAME);
        if !candidate.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(GraphConfig::new(root.as_ref()));
        }
        GraphConfig::from_file(candidate)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn validated(mut self) -> Result<Self, DocGraphError> {
        if self.extensions.is_empty() {
            return Err(DocGraphError::Config(
                "at least one document extension is required".to_string(),
            ));
        }
        self.extensions = self
            .extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();
        Ok(self)
    }
}
