use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use tracing::debug;

use super::super::args::CheckCommand;
use super::{CheckSummary, CommandResult, CommandSummary};
use crate::{
    config::{ConfigLoadResult, load_config},
    core::ScanContext,
    report::{ScanReport, export},
    rules::collect_issues,
};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let ConfigLoadResult { mut config, path } = load_config(&cmd.path)?;
    match &path {
        Some(path) => debug!(config = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }

    if let Some(lookahead) = cmd.symbol_lookahead {
        config.symbol_lookahead = lookahead;
    }
    let gate = config.gate && !cmd.audit;

    let ctx = ScanContext::new(&cmd.path, config, cmd.verbose)?;
    let outcome = ctx.scan()?;
    let issues = collect_issues(&outcome);
    let report = ScanReport::build(&outcome, &issues, cmd.repository.clone());

    let written = write_exports(&cmd, &report)?;

    Ok(CommandResult {
        exit_on_errors: gate,
        summary: CommandSummary::Check(CheckSummary {
            report,
            format: cmd.format,
            hide_phases: cmd.no_phases,
            written,
        }),
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_exports(cmd: &CheckCommand, report: &ScanReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(path) = &cmd.output {
        let json = report.to_json().context("Failed to serialize report")?;
        write_file(path, &json)?;
        written.push(path.clone());
    }
    if let Some(path) = &cmd.csv {
        write_file(path, &export::render_csv(report)?)?;
        written.push(path.clone());
    }
    if let Some(path) = &cmd.markdown {
        write_file(path, &export::render_markdown(report))?;
        written.push(path.clone());
    }
    if let Some(path) = &cmd.dot {
        write_file(path, &export::render_dot(report))?;
        written.push(path.clone());
    }
    if let Some(path) = &cmd.trace {
        write_file(path, &export::render_trace(report)?)?;
        written.push(path.clone());
    }

    Ok(written)
}
