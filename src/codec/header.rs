//! Structured header (frontmatter) handling.
//!
//! A document may open with a `---` line, followed by a metadata block and a closing `---` (or
//! `...`) line. The block is read as YAML first and as TOML when that fails, and only the few
//! fields the graph consumes are pulled out of it; anything else in the header is ignored.

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::{
    error::DocGraphError,
    properties::{DocKind, DocStatus},
};

/// A document split into its header block and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: Option<&'a str>,
    pub body: &'a str,
    /// Number of file lines preceding the body
    pub body_line_offset: usize,
}

/// Header fields consumed by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub id: String,
    pub title: Option<String>,
    pub aliases: Vec<String>,
    pub kind: Option<DocKind>,
    pub status: Option<DocStatus>,
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

fn is_closing_fence(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed == "---" || trimmed == "..."
}

/// Separate the leading header block from the body.
///
/// Text that does not open with a fence line has no header. An opening fence without a closing
/// one is an error.
pub fn split_header(text: &str) -> Result<SplitDocument<'_>, DocGraphError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(SplitDocument {
            header: None,
            body: text,
            body_line_offset: 0,
        });
    };
    if !is_fence(first) {
        return Ok(SplitDocument {
            header: None,
            body: text,
            body_line_offset: 0,
        });
    }

    let header_start = first.len();
    let mut offset = header_start;
    let mut line_count = 1;
    for line in lines {
        line_count += 1;
        if is_closing_fence(line) {
            return Ok(SplitDocument {
                header: Some(&text[header_start..offset]),
                body: &text[offset + line.len()..],
                body_line_offset: line_count,
            });
        }
        offset += line.len();
    }
    Err(DocGraphError::Header(
        "header block is missing its closing '---' line".to_string(),
    ))
}

/// Parse a header block into a JSON-like tree, trying YAML then TOML.
pub fn parse_metadata(raw: &str) -> Result<Map<String, Value>, DocGraphError> {
    let yaml_error = match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => {
            tracing::debug!("Parsed header as YAML");
            return Ok(map);
        }
        Ok(Value::Null) => {
            return Err(DocGraphError::Header("header block is empty".to_string()));
        }
        Ok(_) => "YAML header is not a key/value mapping".to_string(),
        Err(e) => format!("{e}"),
    };
    match toml::from_str::<toml::Table>(raw) {
        Ok(table) => {
            tracing::debug!("Parsed header as TOML");
            match serde_json::to_value(table)? {
                Value::Object(map) => Ok(map),
                _ => Err(DocGraphError::Header(
                    "TOML header is not a table".to_string(),
                )),
            }
        }
        Err(toml_error) => Err(DocGraphError::Header(format!(
            "header is neither YAML ({yaml_error}) nor TOML ({toml_error})"
        ))),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Result<Option<String>, DocGraphError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(DocGraphError::Header(format!(
            "field '{key}' must be a string, found {other}"
        ))),
    }
}

fn string_list_field(map: &Map<String, Value>, key: &str) -> Result<Vec<String>, DocGraphError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(DocGraphError::Header(format!(
                    "field '{key}' must only contain strings, found {other}"
                ))),
            })
            .filter(|item| !matches!(item, Ok(s) if s.is_empty()))
            .collect(),
        Some(other) => Err(DocGraphError::Header(format!(
            "field '{key}' must be a list of strings, found {other}"
        ))),
    }
}

/// Read an optional descriptive field. A value that is not a string or does not parse counts
/// as absent; only `id`, `title` and `aliases` can invalidate a header.
fn hint_field<T: FromStr>(map: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    let (key, raw) = keys
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))?;
    let parsed = raw.as_str().and_then(|s| T::from_str(s).ok());
    if parsed.is_none() {
        tracing::debug!("Ignoring unrecognised header field '{key}': {raw}");
    }
    parsed
}

/// Validate and extract the consumed fields from a header block.
pub fn parse_header(raw: &str) -> Result<HeaderFields, DocGraphError> {
    let map = parse_metadata(raw)?;

    let id = string_field(&map, "id")?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DocGraphError::Header("missing required field 'id'".to_string()))?;
    let title = match string_field(&map, "title")? {
        Some(title) => Some(title),
        None => string_field(&map, "name")?,
    }
    .filter(|title| !title.is_empty());
    let aliases = string_list_field(&map, "aliases")?;
    let kind = hint_field::<DocKind>(&map, &["type", "kind"]);
    let status = hint_field::<DocStatus>(&map, &["status"]);

    Ok(HeaderFields {
        id,
        title,
        aliases,
        kind,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_reports_body_offset() {
        let text = "---\nid: kno-001\ntitle: Intro\n---\n# Intro\n[[Setup]]\n";
        let split = split_header(text).unwrap();
        assert_eq!(split.header, Some("id: kno-001\ntitle: Intro\n"));
        assert_eq!(split.body, "# Intro\n[[Setup]]\n");
        assert_eq!(split.body_line_offset, 4);
    }

    #[test]
    fn split_without_header_keeps_whole_text() {
        let split = split_header("# Title\nbody\n").unwrap();
        assert_eq!(split.header, None);
        assert_eq!(split.body_line_offset, 0);
        assert_eq!(split.body, "# Title\nbody\n");
    }

    #[test]
    fn split_accepts_dot_terminator_and_crlf() {
        let split = split_header("---\r\nid: a\r\n...\r\nbody").unwrap();
        assert_eq!(split.header, Some("id: a\r\n"));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn unterminated_header_is_an_error() {
        assert!(split_header("---\nid: a\nbody\n").is_err());
    }

    #[test]
    fn yaml_header_fields() {
        let fields = parse_header(
            "id: kno-002\ntitle: Setup\naliases: [Installation, Getting Started]\ntype: guides\nstatus: draft\nowner:\n  team: docs\n",
        )
        .unwrap();
        assert_eq!(fields.id, "kno-002");
        assert_eq!(fields.title.as_deref(), Some("Setup"));
        assert_eq!(fields.aliases, vec!["Installation", "Getting Started"]);
        assert_eq!(fields.kind, Some(DocKind::Guide));
        assert_eq!(fields.status, Some(DocStatus::Draft));
    }

    #[test]
    fn toml_header_falls_back() {
        let fields =
            parse_header("id = \"test-network\"\nname = \"Test Network\"\naliases = \"TN\"\n")
                .unwrap();
        assert_eq!(fields.id, "test-network");
        assert_eq!(fields.title.as_deref(), Some("Test Network"));
        assert_eq!(fields.aliases, vec!["TN"]);
    }

    #[test]
    fn unknown_kind_and_status_are_treated_as_absent() {
        let fields =
            parse_header("id: tut-001\ntitle: Tutorial\ntype: tutorial\nstatus: finished\n")
                .unwrap();
        assert_eq!(fields.id, "tut-001");
        assert_eq!(fields.kind, None);
        assert_eq!(fields.status, None);

        let fields = parse_header("id: a\ntype: [guide]\nkind: reference\nstatus: 3\n").unwrap();
        assert_eq!(fields.kind, None);
        assert_eq!(fields.status, None);

        // `kind` is read when `type` is missing
        let fields = parse_header("id: a\nkind: Architecture\n").unwrap();
        assert_eq!(fields.kind, Some(DocKind::Architecture));
    }

    #[test]
    fn empty_single_alias_is_dropped() {
        let fields = parse_header("id: a\naliases: \"\"\n").unwrap();
        assert!(fields.aliases.is_empty());
        let fields = parse_header("id: a\naliases: \"  \"\n").unwrap();
        assert!(fields.aliases.is_empty());
    }

    #[test]
    fn invalid_headers_are_rejected() {
        assert!(parse_header("title: No id here\n").is_err());
        assert!(parse_header("id: 42\n").is_err());
        assert!(parse_header("id: a\naliases: [1, 2]\n").is_err());
        assert!(parse_header("").is_err());
        assert!(parse_header(": : :\n[[[").is_err());
    }
}
