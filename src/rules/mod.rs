//! Rules turning scan results into user-facing issues.
//!
//! Pure functions: each takes only the part of a [`ScanOutcome`] it needs and
//! returns issues ready for reporting.
//!
//! ## Module Structure
//!
//! - `schema`: per-record schema errors and tag warnings
//! - `dependency`: dangling references, self-dependencies and cycles
//! - `scan`: files that could not be read

pub mod dependency;
pub mod scan;
pub mod schema;

use crate::{core::ScanOutcome, issues::Issue};

pub use dependency::check_dependency_issues;
pub use scan::check_file_read_issues;
pub use schema::check_schema_issues;

/// Every issue of a scan, sorted by file, line and rule.
pub fn collect_issues(outcome: &ScanOutcome) -> Vec<Issue> {
    let mut issues = check_schema_issues(&outcome.store);
    issues.extend(check_dependency_issues(&outcome.graph, &outcome.store));
    issues.extend(
        check_file_read_issues(&outcome.failures)
            .into_iter()
            .map(Issue::FileRead),
    );
    issues.sort();
    issues
}
