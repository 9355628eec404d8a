//! Schema validation.
//!
//! Validation annotates a record with errors and warnings; it never rewrites
//! or drops fields. Per-record rules run on each candidate independently (and
//! therefore in parallel). The cross-file duplicate-anchor rule runs in
//! [`admit`], which must be called in a single, deterministic order.

use super::{
    extract::Candidate,
    record::MetadataRecord,
    store::RecordStore,
    vocabulary::{Complexity, Status, TagValue},
};

/// A schema violation attached to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidStatus(String),
    InvalidComplexity(String),
    MissingPhase,
    /// Another block already claimed this anchor. Carries the first line of
    /// that block's comment.
    DuplicateAnchor { first_comment_line: usize },
}

/// Non-blocking findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    MissingTag(String),
    DuplicateTag(String),
}

/// A record together with everything validation found wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    record: MetadataRecord,
    errors: Vec<SchemaError>,
    warnings: Vec<SchemaWarning>,
}

impl ValidatedRecord {
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    pub fn errors(&self) -> &[SchemaError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-record rules.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    recommended_tags: &'a [String],
}

impl<'a> Validator<'a> {
    pub fn new(recommended_tags: &'a [String]) -> Self {
        Self { recommended_tags }
    }

    pub fn validate(&self, candidate: Candidate) -> ValidatedRecord {
        let mut errors = Vec::new();
        let record = &candidate.record;

        if let Some(TagValue::Invalid(raw)) = &record.status {
            errors.push(SchemaError::InvalidStatus(raw.clone()));
        }
        if let Some(TagValue::Invalid(raw)) = &record.complexity {
            errors.push(SchemaError::InvalidComplexity(raw.clone()));
        }
        if record.phase_name().is_none() {
            errors.push(SchemaError::MissingPhase);
        }

        let mut warnings: Vec<SchemaWarning> = self
            .recommended_tags
            .iter()
            .filter(|tag| !candidate.has_tag(tag))
            .map(|tag| SchemaWarning::MissingTag(tag.clone()))
            .collect();
        warnings.extend(
            candidate
                .repeated_tags
                .iter()
                .map(|tag| SchemaWarning::DuplicateTag(tag.clone())),
        );

        ValidatedRecord {
            record: candidate.record,
            errors,
            warnings,
        }
    }
}

/// Serialized admission into the store. Attaches `DuplicateAnchor` when the
/// anchor is already taken; returns whether it was.
pub fn admit(store: &mut RecordStore, mut validated: ValidatedRecord) -> bool {
    let first = store
        .get_by_anchor(&validated.record.anchor)
        .map(|first| first.record.comment_lines.0);

    if let Some(first_comment_line) = first {
        validated
            .errors
            .push(SchemaError::DuplicateAnchor { first_comment_line });
    }

    let duplicate = store.insert(validated);
    debug_assert_eq!(duplicate, first.is_some());
    duplicate
}

/// Lists accepted by `AI_STATUS` / `AI_COMPLEXITY`, for diagnostics.
pub fn allowed_statuses() -> String {
    Status::ALL.map(Status::as_str).join(", ")
}

pub fn allowed_complexities() -> String {
    Complexity::ALL.map(Complexity::as_str).join(", ")
}
