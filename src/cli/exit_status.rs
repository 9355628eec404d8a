use std::process::ExitCode;

/// Process exit status of a `scis` run.
///
/// - `Success` (0): scan completed, no errors, or an audit run
/// - `Failure` (1): gated scan found schema or dependency errors
/// - `Error` (2): the scan could not run (bad config, unreadable root)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::{
        cli::{
            args::OutputFormat,
            commands::{CheckSummary, CommandResult, CommandSummary, InitSummary},
        },
        config::Config,
        core::ScanContext,
        report::ScanReport,
        rules::collect_issues,
    };

    fn check_result(source: &str, exit_on_errors: bool) -> CommandResult {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.c"), source).unwrap();
        let outcome = ScanContext::new(dir.path(), Config::default(), false)
            .unwrap()
            .scan()
            .unwrap();
        let issues = collect_issues(&outcome);
        CommandResult {
            summary: CommandSummary::Check(CheckSummary {
                report: ScanReport::build(&outcome, &issues, None),
                format: OutputFormat::Human,
                hide_phases: false,
                written: Vec::new(),
            }),
            exit_on_errors,
        }
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn gate_follows_blocking_errors() {
        let invalid = "// AI_PHASE: A\n// AI_STATUS: BOGUS\nint a(void);\n";
        let result = check_result(invalid, true);
        let CommandSummary::Check(summary) = &result.summary else {
            panic!("expected check summary");
        };
        assert!(summary.report.has_blocking_errors());
        assert_eq!(result.exit_status(), ExitStatus::Failure);

        assert_eq!(check_result(invalid, false).exit_status(), ExitStatus::Success);
    }

    #[test]
    fn warnings_do_not_block() {
        // Missing recommended tags are warnings only.
        let result = check_result("// AI_PHASE: A\nint a(void);\n", true);
        assert_eq!(result.exit_status(), ExitStatus::Success);
    }

    #[test]
    fn init_never_fails_the_gate() {
        let result = CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path: ".scisrc.json".into(),
            }),
            exit_on_errors: true,
        };
        assert_eq!(result.exit_status(), ExitStatus::Success);
    }
}
