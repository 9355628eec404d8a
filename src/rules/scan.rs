//! Files the scan had to skip.

use crate::{core::file_scanner::FileFailure, issues::FileReadIssue};

pub fn check_file_read_issues(failures: &[FileFailure]) -> Vec<FileReadIssue> {
    failures
        .iter()
        .map(|failure| FileReadIssue {
            file_path: failure.path.clone(),
            reason: failure.reason.clone(),
        })
        .collect()
}
