//! Schema rule.
//!
//! Converts the errors and warnings validation attached to each record into
//! issues located at the record's anchor.

use crate::{
    core::{RecordStore, SchemaError, SchemaWarning, ValidatedRecord},
    issues::{
        DuplicateAnchorIssue, DuplicateTagIssue, InvalidComplexityIssue, InvalidStatusIssue,
        Issue, MissingPhaseIssue, MissingTagIssue, RecordContext,
    },
};

pub fn check_schema_issues(store: &RecordStore) -> Vec<Issue> {
    store.iter().flat_map(record_issues).collect()
}

pub fn record_context(validated: &ValidatedRecord) -> RecordContext {
    let record = validated.record();
    RecordContext::new(&record.anchor, record.comment_lines.0, record.phase_name())
}

fn record_issues(validated: &ValidatedRecord) -> Vec<Issue> {
    let context = record_context(validated);

    let errors = validated.errors().iter().map(|error| match error {
        SchemaError::InvalidStatus(value) => Issue::InvalidStatus(InvalidStatusIssue {
            context: context.clone(),
            value: value.clone(),
        }),
        SchemaError::InvalidComplexity(value) => {
            Issue::InvalidComplexity(InvalidComplexityIssue {
                context: context.clone(),
                value: value.clone(),
            })
        }
        SchemaError::MissingPhase => Issue::MissingPhase(MissingPhaseIssue {
            context: context.clone(),
        }),
        SchemaError::DuplicateAnchor { first_comment_line } => {
            Issue::DuplicateAnchor(DuplicateAnchorIssue {
                context: context.clone(),
                first_comment_line: *first_comment_line,
            })
        }
    });

    let warnings = validated.warnings().iter().map(|warning| match warning {
        SchemaWarning::MissingTag(tag) => Issue::MissingTag(MissingTagIssue {
            context: context.clone(),
            tag: tag.clone(),
        }),
        SchemaWarning::DuplicateTag(tag) => Issue::DuplicateTag(DuplicateTagIssue {
            context: context.clone(),
            tag: tag.clone(),
        }),
    });

    errors.chain(warnings).collect()
}
