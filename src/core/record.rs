//! Parsed metadata records.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

use super::vocabulary::{Complexity, Status, TagValue};

/// Source location a metadata block documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Anchor {
    /// Path relative to the scan root, `/`-separated.
    pub file: String,
    /// 1-based line of the documented code (or of the comment when nothing follows it).
    pub line: usize,
    /// Name taken from the first declaration after the comment.
    pub symbol: Option<String>,
}

impl Anchor {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Uniqueness key: file and line, the symbol does not participate.
    pub fn key(&self) -> AnchorKey {
        AnchorKey {
            file: self.file.clone(),
            line: self.line,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorKey {
    pub file: String,
    pub line: usize,
}

/// One parsed SCIS comment block.
///
/// `commit_history` is kept exactly as written. The convention lists the
/// most recent prior commit first; nothing in the engine depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub anchor: Anchor,
    /// Lines of the comment block itself.
    pub comment_lines: (usize, usize),
    pub phase: Option<String>,
    pub status: Option<TagValue<Status>>,
    pub complexity: Option<TagValue<Complexity>>,
    pub note: Option<String>,
    pub dependencies: BTreeSet<String>,
    pub commit: Option<String>,
    pub commit_history: Vec<String>,
    pub source_api_ref: Option<String>,
    pub target_api_ref: Option<String>,
    pub extra_fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    pub fn new(anchor: Anchor) -> Self {
        Self {
            comment_lines: (anchor.line, anchor.line),
            anchor,
            phase: None,
            status: None,
            complexity: None,
            note: None,
            dependencies: BTreeSet::new(),
            commit: None,
            commit_history: Vec::new(),
            source_api_ref: None,
            target_api_ref: None,
            extra_fields: BTreeMap::new(),
        }
    }

    /// Phase name, treating an empty value as absent.
    pub fn phase_name(&self) -> Option<&str> {
        self.phase.as_deref().filter(|p| !p.is_empty())
    }

    pub fn valid_status(&self) -> Option<Status> {
        self.status.as_ref().and_then(TagValue::valid)
    }

    pub fn valid_complexity(&self) -> Option<Complexity> {
        self.complexity.as_ref().and_then(TagValue::valid)
    }

    pub fn is_production_ready(&self) -> bool {
        self.valid_status()
            .is_some_and(Status::is_production_ready)
    }

    pub fn is_high_risk(&self) -> bool {
        self.valid_complexity()
            .is_some_and(Complexity::is_high_risk)
    }
}
