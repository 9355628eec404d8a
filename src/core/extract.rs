//! Tag extraction and anchor resolution.
//!
//! Turns the comment spans of one file into [`Candidate`] records. A span only
//! becomes a candidate when it carries at least one SCIS tag, so ordinary
//! `TODO:` or `Note:` comments are ignored.

use std::{
    collections::{BTreeSet, HashSet},
    sync::LazyLock,
};

use regex::Regex;

use super::{
    language::CommentSyntax,
    locate::{CommentKind, CommentSpan, locate},
    record::{Anchor, MetadataRecord},
    vocabulary::{self as tags, TagValue, is_scis_tag},
};

/// `NAME: value` on a cleaned comment line. Leading decoration left over from
/// doc-comment markers (`///`, `//!`, `##`) is tolerated.
static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s*/!#;-]*([A-Z][A-Z0-9_]*)\s*:(.*)$").expect("valid tag regex")
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:class|struct|enum|union|def|fn|func|function|namespace|interface|trait|impl|mod|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("valid declaration regex")
});

static CALLABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*)*)\s*\(")
        .expect("valid callable regex")
});

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "catch", "elif", "match", "assert",
];

/// A parsed tag line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

pub fn parse_tag_line(line: &str) -> Option<TagLine<'_>> {
    let caps = TAG_LINE.captures(line)?;
    let name = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str().trim();
    Some(TagLine { name, value })
}

/// A record as written in the source, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub record: MetadataRecord,
    /// Every tag name that appeared, including those with empty values.
    pub seen_tags: BTreeSet<String>,
    /// Tags written more than once in the block. The last value wins.
    pub repeated_tags: BTreeSet<String>,
}

impl Candidate {
    pub fn has_tag(&self, name: &str) -> bool {
        self.seen_tags.contains(name)
    }
}

/// Per-file extraction settings.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    pub syntax: &'a CommentSyntax,
    /// How many lines after a comment are searched for the documented code.
    pub symbol_lookahead: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(syntax: &'a CommentSyntax, symbol_lookahead: usize) -> Self {
        Self {
            syntax,
            symbol_lookahead,
        }
    }

    /// Extract all candidates of one file, in source order.
    pub fn extract(&self, file: &str, text: &str) -> Vec<Candidate> {
        let spans: Vec<CommentSpan<'_>> = locate(text, self.syntax).collect();
        if spans.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = text.lines().collect();
        let comment_only = comment_only_lines(&spans, &lines);

        spans
            .iter()
            .filter_map(|span| {
                let tag_lines: Vec<TagLine<'_>> =
                    span.body_lines().filter_map(parse_tag_line).collect();
                if !tag_lines.iter().any(|tag| is_scis_tag(tag.name)) {
                    return None;
                }

                let anchor = self.resolve_anchor(file, span, &lines, &comment_only);
                Some(build_candidate(anchor, span, &tag_lines))
            })
            .collect()
    }

    /// The anchor is the first code line after the comment. A trailing
    /// comment documents the code it shares a line with.
    fn resolve_anchor(
        &self,
        file: &str,
        span: &CommentSpan<'_>,
        lines: &[&str],
        comment_only: &HashSet<usize>,
    ) -> Anchor {
        if !span.owns_line {
            let anchor = Anchor::new(file, span.start_line);
            return match lines.get(span.start_line - 1).and_then(|l| symbol_of(l)) {
                Some(symbol) => anchor.with_symbol(symbol),
                None => anchor,
            };
        }

        if let Some(rest) = code_after_close(span, lines) {
            let anchor = Anchor::new(file, span.end_line);
            return match symbol_of(rest) {
                Some(symbol) => anchor.with_symbol(symbol),
                None => anchor,
            };
        }

        let last = span
            .end_line
            .saturating_add(self.symbol_lookahead)
            .min(lines.len());
        for line_no in (span.end_line + 1)..=last {
            let Some(line) = lines.get(line_no - 1) else {
                break;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || comment_only.contains(&line_no) || is_attribute(trimmed) {
                continue;
            }

            let anchor = Anchor::new(file, line_no);
            return match symbol_of(trimmed) {
                Some(symbol) => anchor.with_symbol(symbol),
                None => anchor,
            };
        }

        Anchor::new(file, span.start_line)
    }
}

/// Code that follows a block comment's closer on its last line.
fn code_after_close<'l>(span: &CommentSpan<'_>, lines: &[&'l str]) -> Option<&'l str> {
    if !matches!(span.kind, CommentKind::Block { .. }) {
        return None;
    }
    let tail = span.text.lines().last()?.trim_start();
    let line: &'l str = *lines.get(span.end_line - 1)?;
    let rest = line.trim_start().strip_prefix(tail)?.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Lines fully covered by comments that start their line.
fn comment_only_lines(spans: &[CommentSpan<'_>], lines: &[&str]) -> HashSet<usize> {
    let mut covered = HashSet::new();
    for span in spans.iter().filter(|s| s.owns_line) {
        covered.extend(span.start_line..span.end_line);

        let tail = span.text.lines().last().unwrap_or_default().trim();
        if lines
            .get(span.end_line - 1)
            .is_some_and(|line| line.trim_end().ends_with(tail))
        {
            covered.insert(span.end_line);
        }
    }
    covered
}

/// Decorators and attributes: `@Override`, `#[inline]`, `[[nodiscard]]`.
fn is_attribute(line: &str) -> bool {
    line.starts_with('@') || line.starts_with("#[") || line.starts_with("[[")
}

/// Best-effort name of the declaration on a line of code.
fn symbol_of(line: &str) -> Option<String> {
    if let Some(caps) = DECLARATION.captures(line) {
        return Some(caps[1].to_string());
    }

    CALLABLE
        .captures_iter(line)
        .map(|caps| caps[1].to_string())
        .find(|name| !CONTROL_KEYWORDS.contains(&name.as_str()))
}

fn build_candidate(anchor: Anchor, span: &CommentSpan<'_>, tag_lines: &[TagLine<'_>]) -> Candidate {
    let mut record = MetadataRecord::new(anchor);
    record.comment_lines = (span.start_line, span.end_line);

    let mut seen_tags = BTreeSet::new();
    let mut repeated_tags = BTreeSet::new();

    for tag in tag_lines {
        if !seen_tags.insert(tag.name.to_string()) {
            repeated_tags.insert(tag.name.to_string());
        }
        apply_tag(&mut record, tag);
    }

    Candidate {
        record,
        seen_tags,
        repeated_tags,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
}

fn apply_tag(record: &mut MetadataRecord, tag: &TagLine<'_>) {
    let value = tag.value;
    match tag.name {
        tags::AI_PHASE => record.phase = non_empty(value),
        tags::AI_STATUS => record.status = (!value.is_empty()).then(|| TagValue::parse(value)),
        tags::AI_COMPLEXITY => {
            record.complexity = (!value.is_empty()).then(|| TagValue::parse(value))
        }
        tags::AI_NOTE => record.note = non_empty(value),
        tags::AI_DEPENDENCIES => record.dependencies = split_list(value).collect(),
        tags::AI_COMMIT => record.commit = non_empty(value),
        tags::AI_COMMIT_HISTORY => record.commit_history = split_list(value).collect(),
        tags::SOURCE_API_REF => record.source_api_ref = non_empty(value),
        tags::TARGET_API_REF => record.target_api_ref = non_empty(value),
        other => {
            record
                .extra_fields
                .insert(other.to_string(), value.to_string());
        }
    }
}
