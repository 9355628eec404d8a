//! File exports: CSV, Markdown, Graphviz DOT and the JSON trace artifact.
//!
//! All of them render from the same [`ScanReport`] as the terminal and JSON
//! output, and carry no timestamps.

use std::{collections::BTreeMap, fmt::Write as _, io::Write};

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{PhaseSummary, ScanReport};
use crate::core::{MetadataRecord, Status};

pub const TRACE_SCHEMA_VERSION: &str = "scis-trace/1";

/// Phases sampled into a trace artifact.
const TRACE_SAMPLE_PHASES: usize = 5;

const CSV_HEADER: [&str; 11] = [
    "File",
    "Line",
    "Symbol",
    "Phase",
    "Status",
    "Complexity",
    "Note",
    "Dependencies",
    "Commit",
    "Source_API",
    "Target_API",
];

/// One row per record, in report order.
pub fn write_csv<W: Write>(report: &ScanReport, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for entry in &report.records {
        let record = &entry.record;
        let line = record.anchor.line.to_string();
        let status = record
            .status
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let complexity = record
            .complexity
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let dependencies = record
            .dependencies
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        csv.write_record([
            record.anchor.file.as_str(),
            line.as_str(),
            record.anchor.symbol.as_deref().unwrap_or(""),
            record.phase.as_deref().unwrap_or(""),
            status.as_str(),
            complexity.as_str(),
            record.note.as_deref().unwrap_or(""),
            dependencies.as_str(),
            record.commit.as_deref().unwrap_or(""),
            record.source_api_ref.as_deref().unwrap_or(""),
            record.target_api_ref.as_deref().unwrap_or(""),
        ])?;
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn render_csv(report: &ScanReport) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(report, &mut buffer)?;
    String::from_utf8(buffer).context("CSV output is not valid UTF-8")
}

pub fn render_markdown(report: &ScanReport) -> String {
    let mut out = String::new();
    let counts = &report.counts;

    let _ = writeln!(out, "# SCIS Metadata Report\n");
    if let Some(repository) = &report.repository {
        let _ = writeln!(out, "Repository: `{}`\n", repository);
    }

    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "- Files scanned: {}", counts.files_scanned);
    let _ = writeln!(
        out,
        "- Files with metadata: {} ({:.1}%)",
        counts.files_with_metadata,
        report.coverage_percent()
    );
    let _ = writeln!(out, "- Metadata blocks: {}", counts.records);
    let _ = writeln!(out, "- Phases: {}", counts.phases);
    let _ = writeln!(out, "- Errors: {}", counts.errors);
    let _ = writeln!(out, "- Warnings: {}", counts.warnings);
    if report.cancelled {
        let _ = writeln!(out, "- Scan cancelled: results are partial");
    }
    out.push('\n');

    let _ = writeln!(out, "## Phase Distribution\n");
    for phase in report.phases.iter().filter(|p| p.defined) {
        let _ = writeln!(
            out,
            "### {} ({} {})\n",
            phase.name,
            phase.records,
            if phase.records == 1 { "block" } else { "blocks" }
        );
        for entry in report
            .records
            .iter()
            .filter(|e| e.record.phase_name() == Some(phase.name.as_str()))
        {
            let record = &entry.record;
            let _ = writeln!(out, "- **{}**", record.anchor);
            if let Some(status) = &record.status {
                let _ = writeln!(out, "  - Status: {}", status);
            }
            if let Some(complexity) = &record.complexity {
                let _ = writeln!(out, "  - Complexity: {}", complexity);
            }
            if let Some(note) = &record.note {
                let _ = writeln!(out, "  - Note: {}", note);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Dependency Graph\n");
    let mut any_edges = false;
    for phase in report.phases.iter().filter(|p| !p.dependencies.is_empty()) {
        any_edges = true;
        let _ = writeln!(
            out,
            "- **{}** depends on: {}",
            phase.name,
            phase.dependencies.join(", ")
        );
    }
    if !any_edges {
        let _ = writeln!(out, "No dependencies declared.");
    }
    out.push('\n');

    let flagged: Vec<&PhaseSummary> = report
        .phases
        .iter()
        .filter(|p| p.at_risk || p.blocked || !p.defined)
        .collect();
    if !flagged.is_empty() {
        let _ = writeln!(out, "## Attention\n");
        for phase in flagged {
            let mut reasons = Vec::new();
            if !phase.defined {
                reasons.push("undefined");
            }
            if phase.at_risk {
                reasons.push("at risk");
            }
            if phase.blocked {
                reasons.push("blocked");
            }
            let _ = writeln!(out, "- **{}**: {}", phase.name, reasons.join(", "));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Files\n");
    let mut files: Vec<(&str, usize)> = Vec::new();
    for entry in &report.records {
        let file = entry.record.anchor.file.as_str();
        match files.last_mut() {
            Some((last, count)) if *last == file => *count += 1,
            _ => files.push((file, 1)),
        }
    }
    for (file, count) in files {
        let _ = writeln!(out, "### {}\n", file);
        let _ = writeln!(out, "{} metadata block(s)\n", count);
    }

    out
}

fn node_color(status: Option<Status>) -> &'static str {
    match status {
        Some(Status::Implemented) => "green",
        Some(Status::Partial) => "yellow",
        Some(Status::NotStarted) => "lightgray",
        Some(Status::Fixed) => "lightgreen",
        Some(Status::Deprecated) => "orange",
        None => "white",
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Phase dependency graph in Graphviz DOT.
pub fn render_dot(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph SCIS_Dependencies {{");
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  node [shape=box];");
    out.push('\n');

    for phase in &report.phases {
        if phase.defined {
            let _ = writeln!(
                out,
                "  {} [style=filled, fillcolor={}];",
                quote(&phase.name),
                node_color(phase.predominant_status)
            );
        } else {
            let _ = writeln!(out, "  {} [style=dashed];", quote(&phase.name));
        }
    }
    out.push('\n');

    for phase in &report.phases {
        for dependency in &phase.dependencies {
            let _ = writeln!(out, "  {} -> {};", quote(&phase.name), quote(dependency));
        }
    }
    let _ = writeln!(out, "}}");

    out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceArtifact<'a> {
    schema_version: &'static str,
    event_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<&'a str>,
    metadata_summary: TraceSummary<'a>,
    /// First block of each of the first few defined phases.
    sample_metadata: Vec<&'a MetadataRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceSummary<'a> {
    total_blocks: usize,
    files_processed: usize,
    errors: usize,
    warnings: usize,
    phases: Vec<&'a str>,
    phase_counts: BTreeMap<&'a str, usize>,
}

/// Compact debugging artifact: what was scanned and a sample of what was
/// found.
pub fn render_trace(report: &ScanReport) -> Result<String> {
    let counts = &report.counts;
    let defined: Vec<&PhaseSummary> = report.phases.iter().filter(|p| p.defined).collect();

    let sample_metadata = defined
        .iter()
        .take(TRACE_SAMPLE_PHASES)
        .filter_map(|phase| {
            report
                .records
                .iter()
                .find(|e| e.record.phase_name() == Some(phase.name.as_str()))
                .map(|e| &e.record)
        })
        .collect();

    let trace = TraceArtifact {
        schema_version: TRACE_SCHEMA_VERSION,
        event_type: if report.has_blocking_errors() {
            "validation_error"
        } else {
            "validation_success"
        },
        repository: report.repository.as_deref(),
        metadata_summary: TraceSummary {
            total_blocks: counts.records,
            files_processed: counts.files_scanned,
            errors: counts.errors,
            warnings: counts.warnings,
            phases: defined.iter().map(|p| p.name.as_str()).collect(),
            phase_counts: defined
                .iter()
                .map(|p| (p.name.as_str(), p.records))
                .collect(),
        },
        sample_metadata,
    };

    serde_json::to_string_pretty(&trace).context("Failed to serialize trace artifact")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::{config::Config, core::ScanContext, rules::collect_issues};

    fn report_for(files: &[(&str, &str)]) -> ScanReport {
        let dir = tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let config = Config {
            recommended_tags: Vec::new(),
            ..Default::default()
        };
        let outcome = ScanContext::new(dir.path(), config, false)
            .unwrap()
            .scan()
            .unwrap();
        let issues = collect_issues(&outcome);
        ScanReport::build(&outcome, &issues, None)
    }

    fn sample() -> ScanReport {
        report_for(&[
            (
                "mmu.c",
                concat!(
                    "// AI_PHASE: PAGING\n",
                    "// AI_STATUS: PARTIAL\n",
                    "// AI_COMPLEXITY: HIGH\n",
                    "// AI_NOTE: walks, \"four\" levels\n",
                    "// AI_DEPENDENCIES: BOOT, ALLOC\n",
                    "int map_page(void);\n",
                ),
            ),
            (
                "boot.c",
                "// AI_PHASE: BOOT\n// AI_STATUS: IMPLEMENTED\n// AI_COMMIT: b2c3d4e\nvoid boot(void);\n",
            ),
        ])
    }

    #[test]
    fn test_dot_export() {
        insta::assert_snapshot!(render_dot(&sample()), @r#"
        digraph SCIS_Dependencies {
          rankdir=LR;
          node [shape=box];

          "ALLOC" [style=dashed];
          "BOOT" [style=filled, fillcolor=green];
          "PAGING" [style=filled, fillcolor=yellow];

          "PAGING" -> "ALLOC";
          "PAGING" -> "BOOT";
        }
        "#);
    }

    #[test]
    fn test_csv_export() {
        let csv = render_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "File,Line,Symbol,Phase,Status,Complexity,Note,Dependencies,Commit,Source_API,Target_API"
        );
        assert_eq!(lines[1], "boot.c,4,boot,BOOT,IMPLEMENTED,,,,b2c3d4e,,");
        assert_eq!(
            lines[2],
            "mmu.c,6,map_page,PAGING,PARTIAL,HIGH,\"walks, \"\"four\"\" levels\",\"ALLOC, BOOT\",,,"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_markdown_export() {
        let markdown = render_markdown(&sample());

        assert!(markdown.starts_with("# SCIS Metadata Report\n\n## Summary\n"));
        assert!(markdown.contains("- Files with metadata: 2 (100.0%)"));
        assert!(markdown.contains("### PAGING (1 block)\n\n- **mmu.c:6**\n  - Status: PARTIAL\n"));
        assert!(markdown.contains("- **PAGING** depends on: ALLOC, BOOT"));
        assert!(markdown.contains("- **ALLOC**: undefined"));
        assert!(markdown.contains("### boot.c\n\n1 metadata block(s)\n"));
        assert!(!markdown.contains("### ALLOC"));
    }

    #[test]
    fn test_exports_are_stable() {
        let first = sample();
        let second = sample();
        assert_eq!(render_markdown(&first), render_markdown(&second));
        assert_eq!(render_dot(&first), render_dot(&second));
        assert_eq!(render_csv(&first).unwrap(), render_csv(&second).unwrap());
    }

    #[test]
    fn test_trace_artifact() {
        let trace: serde_json::Value =
            serde_json::from_str(&render_trace(&sample()).unwrap()).unwrap();

        assert_eq!(trace["schemaVersion"], TRACE_SCHEMA_VERSION);
        assert_eq!(trace["eventType"], "validation_success");
        assert!(trace.get("repository").is_none());
        assert_eq!(
            trace["metadataSummary"],
            serde_json::json!({
                "totalBlocks": 2,
                "filesProcessed": 2,
                "errors": 0,
                "warnings": 0,
                "phases": ["BOOT", "PAGING"],
                "phaseCounts": { "BOOT": 1, "PAGING": 1 }
            })
        );

        let samples = trace["sampleMetadata"].as_array().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0]["phase"], "BOOT");
        assert_eq!(samples[1]["anchor"]["symbol"], "map_page");
    }

    #[test]
    fn test_trace_marks_failed_scans() {
        let report = report_for(&[("a.c", "// AI_PHASE: A\n// AI_STATUS: BOGUS\nint a(void);\n")]);
        let trace: serde_json::Value =
            serde_json::from_str(&render_trace(&report).unwrap()).unwrap();
        assert_eq!(trace["eventType"], "validation_error");
    }

    #[test]
    fn test_dot_quotes_phase_names() {
        assert_eq!(quote("A\"B"), "\"A\\\"B\"");
    }
}
