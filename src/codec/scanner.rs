use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    sync::{mpsc::unbounded_channel, Semaphore},
    task::{Id, JoinError, JoinSet},
};
use walkdir::{DirEntry, WalkDir};

use crate::{
    codec::{
        diagnostic::ScanDiagnostic,
        header::{parse_header, split_header},
        references::ReferenceExtractor,
    },
    config::GraphConfig,
    error::DocGraphError,
    paths::os_path_to_string,
    properties::{DocKind, DocNode},
};

/// Files found under a content root, plus the entries that could not be visited.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// Supplies the document files of a corpus.
///
/// Paths must be absolute and live under the scanner's content root. Order does not matter; the
/// scanner normalizes it.
pub trait DocumentSource: Send + Sync {
    fn enumerate(&self) -> Result<Enumeration, DocGraphError>;
}

/// Walks the content root recursively, keeping files whose extension matches the configuration.
///
/// Hidden entries and directories named in `exclude` are skipped, along with everything below
/// them.
#[derive(Debug, Clone)]
pub struct WalkdirSource {
    root: PathBuf,
    config: GraphConfig,
}

impl WalkdirSource {
    pub fn new(root: impl Into<PathBuf>, config: &GraphConfig) -> WalkdirSource {
        WalkdirSource {
            root: root.into(),
            config: config.clone(),
        }
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return true;
        }
        entry.file_type().is_dir() && self.config.exclude.iter().any(|ex| *ex == name)
    }
}

impl DocumentSource for WalkdirSource {
    fn enumerate(&self) -> Result<Enumeration, DocGraphError> {
        if !self.root.is_dir() {
            return Err(DocGraphError::NotFound(format!(
                "content root {:?} is not a directory",
                self.root
            )));
        }
        let mut enumeration = Enumeration::default();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| !self.is_skipped(e))
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.config.matches_extension(entry.path())
                    {
                        enumeration.files.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => return Err(DocGraphError::from(e)),
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| relative_to(&self.root, p))
                        .unwrap_or_default();
                    tracing::warn!("Skipping unreadable entry {}: {}", path, e);
                    enumeration.diagnostics.push(ScanDiagnostic::Enumeration {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }
        enumeration.files.sort();
        Ok(enumeration)
    }
}

/// Result of scanning a corpus: nodes in canonical order plus the documents left out.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub root: PathBuf,
    pub nodes: Vec<DocNode>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// Reads every enumerated document and turns it into an unresolved [DocNode].
///
/// Documents are read on a bounded pool of tokio tasks. Workers only read and parse; each
/// finished node is sent back over a channel and the single aggregation step orders the whole
/// set by `(id, rel_path)` before anything downstream sees it, so scheduling never shows up in
/// the output. When two documents claim the same id the first in that order keeps it and the
/// other is reported as [ScanDiagnostic::DuplicateId].
pub struct DocumentScanner {
    root: PathBuf,
    workers: usize,
    source: Arc<dyn DocumentSource>,
    extractor: Arc<ReferenceExtractor>,
}

impl DocumentScanner {
    /// Scanner over `config.root`, enumerating with a [WalkdirSource].
    pub fn new(config: &GraphConfig) -> Result<Self, DocGraphError> {
        let root = config.root.canonicalize()?;
        let source = WalkdirSource::new(&root, config);
        DocumentScanner::with_source(root, Arc::new(source), config.worker_count())
    }

    /// Scanner with a custom enumeration seam.
    pub fn with_source(
        root: impl AsRef<Path>,
        source: Arc<dyn DocumentSource>,
        workers: usize,
    ) -> Result<Self, DocGraphError> {
        Ok(DocumentScanner {
            root: root.as_ref().to_path_buf(),
            workers: workers.max(1),
            source,
            extractor: Arc::new(ReferenceExtractor::new()?),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[tracing::instrument(skip_all, fields(root = ?self.root))]
    pub async fn scan(&self) -> Result<ScanOutput, DocGraphError> {
        let Enumeration { files, diagnostics } = self.source.enumerate()?;
        tracing::debug!("Scanning {} candidate documents", files.len());

        let diagnostics = Arc::new(Mutex::new(diagnostics));
        let permits = Arc::new(Semaphore::new(self.workers));
        let (tx, mut rx) = unbounded_channel::<DocNode>();
        let mut tasks = JoinSet::new();
        let mut spawned: HashMap<Id, PathBuf> = HashMap::with_capacity(files.len());

        for path in files {
            let task_path = path.clone();
            let tx = tx.clone();
            let permits = permits.clone();
            let diagnostics = diagnostics.clone();
            let extractor = self.extractor.clone();
            let root = self.root.clone();
            let handle = tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                match read_document(&root, &path, &extractor).await {
                    Ok(node) => {
                        if tx.send(node).is_err() {
                            tracing::debug!("Scan aggregator gone, dropping {:?}", path);
                        }
                    }
                    Err(diagnostic) => {
                        tracing::warn!("Excluding document: {}", diagnostic);
                        diagnostics.lock().push(diagnostic);
                    }
                }
            });
            spawned.insert(handle.id(), task_path);
        }
        drop(tx);

        let mut nodes = Vec::new();
        while let Some(node) = rx.recv().await {
            nodes.push(node);
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                let diagnostic = worker_failure(&self.root, &spawned, e);
                tracing::warn!("Excluding document: {}", diagnostic);
                diagnostics.lock().push(diagnostic);
            }
        }

        let mut diagnostics = std::mem::take(&mut *diagnostics.lock());
        let nodes = canonical_order(nodes, &mut diagnostics);
        diagnostics.sort();
        tracing::info!(
            "Scanned {} documents ({} excluded)",
            nodes.len(),
            diagnostics.len()
        );
        Ok(ScanOutput {
            root: self.root.clone(),
            nodes,
            diagnostics,
        })
    }
}

/// Diagnostic for a worker that panicked or was cancelled, naming the file it was reading.
fn worker_failure(root: &Path, spawned: &HashMap<Id, PathBuf>, e: JoinError) -> ScanDiagnostic {
    let path = spawned
        .get(&e.id())
        .map(|path| relative_to(root, path))
        .unwrap_or_default();
    ScanDiagnostic::Unreadable {
        path,
        message: format!("scan worker failed: {e}"),
    }
}

async fn read_document(
    root: &Path,
    path: &Path,
    extractor: &ReferenceExtractor,
) -> Result<DocNode, ScanDiagnostic> {
    tracing::debug!("Reading {:?}", path);
    let unreadable = |message: String| ScanDiagnostic::Unreadable {
        path: relative_to(root, path),
        message,
    };
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| unreadable(DocGraphError::from(e).to_string()))?;
    let content =
        String::from_utf8(bytes).map_err(|e| unreadable(format!("not UTF-8 text: {e}")))?;
    parse_document(root, path, &content, extractor)
}

/// Turn one document's text into an unresolved node.
///
/// Pure apart from its inputs: `path` is only used to derive the node's locations, title
/// fallback and kind fallback.
pub fn parse_document(
    root: &Path,
    path: &Path,
    content: &str,
    extractor: &ReferenceExtractor,
) -> Result<DocNode, ScanDiagnostic> {
    let rel_path = relative_to(root, path);
    let invalid = |e: DocGraphError| ScanDiagnostic::InvalidHeader {
        path: rel_path.clone(),
        message: e.to_string(),
    };

    let split = split_header(content).map_err(invalid)?;
    let header = split
        .header
        .ok_or_else(|| invalid(DocGraphError::Header("no header block".to_string())))?;
    let fields = parse_header(header).map_err(invalid)?;

    let title = fields.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| rel_path.clone())
    });
    let kind = fields.kind.unwrap_or_else(|| infer_kind(&rel_path));
    let references = extractor.extract(&fields.id, split.body, split.body_line_offset);

    Ok(DocNode {
        id: fields.id,
        kind,
        status: fields.status.unwrap_or_default(),
        title,
        aliases: fields.aliases,
        path: os_path_to_string(path),
        rel_path,
        content_hash: hex::encode(Sha256::digest(content.as_bytes())),
        references,
    })
}

/// Kind named by the nearest ancestor directory, falling back to [DocKind::Knowledge].
fn infer_kind(rel_path: &str) -> DocKind {
    let mut dirs: Vec<&str> = rel_path.split('/').collect();
    dirs.pop();
    dirs.iter()
        .rev()
        .find_map(|dir| DocKind::from_dir_name(dir))
        .unwrap_or_default()
}

fn relative_to(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => os_path_to_string(rel),
        Err(_) => os_path_to_string(path),
    }
}

/// Sort by `(id, rel_path)` and drop all but the first node per id.
fn canonical_order(mut nodes: Vec<DocNode>, diagnostics: &mut Vec<ScanDiagnostic>) -> Vec<DocNode> {
    nodes.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.rel_path.cmp(&b.rel_path)));
    let mut kept: Vec<DocNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match kept.last() {
            Some(prev) if prev.id == node.id => {
                tracing::warn!(
                    "Duplicate id '{}' in {} (already used by {})",
                    node.id,
                    node.rel_path,
                    prev.rel_path
                );
                diagnostics.push(ScanDiagnostic::DuplicateId {
                    id: node.id,
                    path: node.rel_path,
                    kept: prev.rel_path.clone(),
                });
            }
            _ => kept.push(node),
        }
    }
    kept
}
