use std::path::PathBuf;

use super::super::{args::OutputFormat, exit_status::ExitStatus};
use crate::report::ScanReport;

#[derive(Debug)]
pub enum CommandSummary {
    Check(CheckSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct CheckSummary {
    pub report: ScanReport,
    pub format: OutputFormat,
    pub hide_phases: bool,
    /// Export files written, in the order they were written.
    pub written: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
}

/// Result of running scis commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// If true, exit code 1 is returned when the report has blocking errors.
    /// If false, always exit 0 (audit runs).
    pub exit_on_errors: bool,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        let blocking = match &self.summary {
            CommandSummary::Check(summary) => summary.report.has_blocking_errors(),
            CommandSummary::Init(_) => false,
        };
        if self.exit_on_errors && blocking {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
