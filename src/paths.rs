//! Lexical path helpers.
//!
//! Paths inside the graph are always `/`-separated strings, independent of the host OS, so the
//! same corpus yields the same index keys everywhere. Nothing here touches the filesystem.

use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR},
};

/// Utility function to replace separators and convert to unicode (via to_string_lossy) on os path.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    let res = os_path_ref
        .as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from("".to_string()),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/");
    if res.is_empty() && os_path_ref.as_ref().has_root() {
        return "/".to_string();
    }
    res
}

pub fn string_to_os_path(path_string: &str) -> PathBuf {
    PathBuf::from(path_string.replace('/', MAIN_SEPARATOR_STR))
}

/// Drop a trailing `#fragment`, if any.
pub fn strip_fragment(target: &str) -> &str {
    match target.find('#') {
        Some(idx) => &target[..idx],
        None => target,
    }
}

/// Whether the text is written relative to the current document (`./x` or `../x`).
pub fn is_document_relative(target: &str) -> bool {
    target.starts_with("./") || target.starts_with("../")
}

/// Collapse `.` and `..` components and repeated separators.
///
/// Absolute paths keep their leading `/`. Returns None when `..` would climb above the start of
/// the path, since such a path cannot name anything inside the corpus.
pub fn normalize(path: &str) -> Option<String> {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        Some(format!("/{joined}"))
    } else {
        Some(joined)
    }
}

/// Join `rel` onto directory `dir` and normalize the result.
///
/// An absolute `rel` is returned normalized, ignoring `dir`.
pub fn join(dir: &str, rel: &str) -> Option<String> {
    if rel.starts_with('/') || dir.is_empty() {
        return normalize(rel);
    }
    normalize(&format!("{dir}/{rel}"))
}
