//! Prints command results to the terminal.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use super::{
    args::OutputFormat,
    commands::{CheckSummary, CommandResult, CommandSummary, InitSummary},
};
use crate::report::{SUCCESS_MARK, report_to};

pub fn print(result: &CommandResult) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match &result.summary {
        CommandSummary::Check(summary) => print_check(summary, &mut writer),
        CommandSummary::Init(summary) => {
            print_init(summary, &mut writer);
            Ok(())
        }
    }
}

fn print_check<W: Write>(summary: &CheckSummary, writer: &mut W) -> Result<()> {
    match summary.format {
        OutputFormat::Json => {
            let json = summary
                .report
                .to_json()
                .context("Failed to serialize report")?;
            writeln!(writer, "{}", json)?;
        }
        OutputFormat::Human => {
            report_to(&summary.report, !summary.hide_phases, writer);
        }
    }

    // Keep stdout clean for JSON consumers.
    for path in &summary.written {
        eprintln!("{} Wrote {}", SUCCESS_MARK.green(), path.display());
    }
    Ok(())
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path.display()).green()
    );
}
