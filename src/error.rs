use std::io;

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use walkdir::Error as WalkdirError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DocGraphError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid document header: {0}")]
    Header(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DocGraphError {
    fn from(src: toml::de::Error) -> DocGraphError {
        DocGraphError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for DocGraphError {
    fn from(src: JsonError) -> DocGraphError {
        DocGraphError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for DocGraphError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DocGraphError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => DocGraphError::PermissionDenied,
            _ => DocGraphError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<WalkdirError> for DocGraphError {
    fn from(x: WalkdirError) -> Self {
        let path = x.path().map(|p| format!("{p:?}")).unwrap_or_default();
        match x.into_io_error() {
            Some(io_error) => DocGraphError::from(io_error),
            None => DocGraphError::Io(format!("directory walk failed at {path}")),
        }
    }
}

impl From<RegexError> for DocGraphError {
    fn from(x: RegexError) -> Self {
        DocGraphError::Serialization(format!("Regex parse failed: {x}"))
    }
}
