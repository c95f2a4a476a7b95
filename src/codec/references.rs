//! Reference extraction from document bodies.
//!
//! Four lexical forms are recognised:
//!
//! | Form | Kind |
//! |---|---|
//! | `[label](target)` | [ReferenceKind::Plain] |
//! | `[[target]]` | [ReferenceKind::WikiLink] |
//! | `[[target\|label]]` | [ReferenceKind::AliasedWikiLink] |
//! | `[[code:path::symbol]]` | [ReferenceKind::CodeReference] |
//!
//! In an aliased wiki-link the graph target is always the text left of the first `|`; the right
//! side is only the display label. External links (`http://`, `https://`, `mailto:` and similar)
//! are dropped, as is anything inside code blocks or inline code spans. Extraction works line by
//! line, so malformed syntax on one line never affects the rest of the document.

use pulldown_cmark::{Event as MdEvent, Options, Parser as MdParser, Tag as MdTag};
use regex::Regex;
use std::ops::Range;

use crate::{
    error::DocGraphError,
    paths::strip_fragment,
    properties::{Reference, ReferenceKind},
};

/// Longest context string kept on a [Reference], in characters.
pub const CONTEXT_WIDTH: usize = 120;

const CODE_PREFIX: &str = "code:";

/// Compiled patterns for the reference forms. Build once, then reuse across documents.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    wiki: Regex,
    plain: Regex,
    external: Regex,
}

impl ReferenceExtractor {
    pub fn new() -> Result<ReferenceExtractor, DocGraphError> {
        Ok(ReferenceExtractor {
            wiki: Regex::new(r"\[\[([^\[\]\n]+)\]\]")?,
            plain: Regex::new(r"(!?)\[([^\[\]\n]*)\]\(([^()\n]*)\)")?,
            external: Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*://|mailto:|tel:|data:)")?,
        })
    }

    pub fn is_external(&self, target: &str) -> bool {
        self.external.is_match(target.trim())
    }

    /// Extract every reference in `body`.
    ///
    /// `line_offset` is the number of file lines preceding the body (the header block), so the
    /// reported line numbers refer to the whole file. The result is an owned list in document
    /// order; extraction is a pure function of its inputs.
    pub fn extract(&self, source_id: &str, body: &str, line_offset: usize) -> Vec<Reference> {
        let masked = code_ranges(body);
        let mut references = Vec::new();
        let mut line_start = 0;
        for (idx, raw_line) in body.split_inclusive('\n').enumerate() {
            let line = raw_line.trim_end_matches(['\n', '\r']);
            let line_no = line_offset + idx + 1;
            let in_code = |pos: usize| {
                let abs = line_start + pos;
                masked.iter().any(|range| range.contains(&abs))
            };
            self.extract_line(source_id, line, line_no, &in_code, &mut references);
            line_start += raw_line.len();
        }
        references
    }

    fn extract_line(
        &self,
        source_id: &str,
        line: &str,
        line_no: usize,
        in_code: &dyn Fn(usize) -> bool,
        out: &mut Vec<Reference>,
    ) {
        let context = context_of(line);
        let mut wiki_spans: Vec<Range<usize>> = Vec::new();
        let mut found: Vec<(usize, Reference)> = Vec::new();

        for caps in self.wiki.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            wiki_spans.push(whole.range());
            if in_code(whole.start()) {
                continue;
            }
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if let Some(reference) = self.wiki_reference(source_id, inner, line_no, &context) {
                found.push((whole.start(), reference));
            }
        }

        for caps in self.plain.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let overlaps_wiki = wiki_spans
                .iter()
                .any(|span| span.start < whole.end() && whole.start() < span.end);
            let is_image = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            if overlaps_wiki || is_image || in_code(whole.start()) {
                continue;
            }
            let label = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let dest = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            if let Some(reference) = self.plain_reference(source_id, label, dest, line_no, &context)
            {
                found.push((whole.start(), reference));
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        out.extend(found.into_iter().map(|(_, reference)| reference));
    }

    fn wiki_reference(
        &self,
        source_id: &str,
        inner: &str,
        line_no: usize,
        context: &str,
    ) -> Option<Reference> {
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target.trim(), Some(label.trim())),
            None => (inner.trim(), None),
        };
        if target.is_empty() || self.is_external(target) {
            return None;
        }
        if let Some(code) = target.strip_prefix(CODE_PREFIX) {
            let path = code.split_once("::").map(|(path, _)| path).unwrap_or(code);
            if path.trim().is_empty() {
                return None;
            }
            let reference = Reference::new(
                source_id,
                target,
                ReferenceKind::CodeReference,
                line_no,
                context,
            );
            return Some(match label.filter(|l| !l.is_empty()) {
                Some(label) => reference.with_label(label),
                None => reference,
            });
        }
        match label {
            Some(label) => Some(
                Reference::new(
                    source_id,
                    target,
                    ReferenceKind::AliasedWikiLink,
                    line_no,
                    context,
                )
                .with_label(label),
            ),
            None => Some(Reference::new(
                source_id,
                target,
                ReferenceKind::WikiLink,
                line_no,
                context,
            )),
        }
    }

    fn plain_reference(
        &self,
        source_id: &str,
        label: &str,
        dest: &str,
        line_no: usize,
        context: &str,
    ) -> Option<Reference> {
        let dest = dest.trim();
        // `<dest with spaces>` or `dest "title"`
        let dest = match dest.strip_prefix('<') {
            Some(rest) => rest.split('>').next().unwrap_or_default(),
            None => dest.split_whitespace().next().unwrap_or_default(),
        };
        if self.is_external(dest) {
            return None;
        }
        let target = strip_fragment(dest).trim();
        if target.is_empty() {
            return None;
        }
        let reference = Reference::new(source_id, target, ReferenceKind::Plain, line_no, context);
        Some(if label.trim().is_empty() {
            reference
        } else {
            reference.with_label(label.trim())
        })
    }
}

/// Byte ranges of code blocks and inline code spans in `body`.
fn code_ranges(body: &str) -> Vec<Range<usize>> {
    MdParser::new_ext(body, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            MdEvent::Start(MdTag::CodeBlock(_)) | MdEvent::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

fn context_of(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= CONTEXT_WIDTH {
        return trimmed.to_string();
    }
    let mut context: String = trimmed.chars().take(CONTEXT_WIDTH).collect();
    context.push('…');
    context
}
