//! Human-readable report.
//!
//! Three labelled sections mirror the structured report: schema errors,
//! dependency errors and the phase table. Warnings follow the errors. Issues
//! are printed cargo-style and a one-line summary closes the report.
//! Everything is rendered from a [`ScanReport`].

use std::io::Write;

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::model::{PhaseSummary, ReportIssue, ScanReport};
use crate::issues::Severity;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

const PHASE_HEADERS: [&str; 5] = ["PHASE", "RECORDS", "STATUS", "COMPLEXITY", "FLAGS"];

/// Print the report to a custom writer.
pub fn report_to<W: Write>(report: &ScanReport, show_phases: bool, writer: &mut W) {
    let max_line_width = report
        .all_issues()
        .filter_map(|i| i.line)
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);

    let sections = [
        ("Schema errors", &report.schema_errors),
        ("Dependency errors", &report.dependency_errors),
        ("Warnings", &report.warnings),
    ];
    for (title, issues) in sections {
        if issues.is_empty() {
            continue;
        }
        print_heading(title, issues.len(), writer);
        for issue in issues {
            print_issue(issue, writer, max_line_width);
        }
    }

    if show_phases && !report.phases.is_empty() {
        print_heading("Phases", report.phases.len(), writer);
        print_phase_table(&report.phases, writer);
    }

    print_summary(report, writer);
}

fn print_heading<W: Write>(title: &str, count: usize, writer: &mut W) {
    let _ = writeln!(writer, "{}\n", format!("{} ({})", title, count).bold());
}

fn print_issue<W: Write>(issue: &ReportIssue, writer: &mut W, max_line_width: usize) {
    let severity_str = match issue.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message,
        issue.rule.to_string().dimmed().cyan()
    );

    let location = match (issue.line, &issue.symbol) {
        (Some(line), Some(symbol)) => format!("{}:{} ({})", issue.file, line, symbol),
        (Some(line), None) => format!("{}:{}", issue.file, line),
        (None, _) => issue.file.clone(),
    };
    let _ = writeln!(writer, "  {} {}", "-->".blue(), location);

    if let Some(details) = &issue.details {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = &issue.hint {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn phase_flags(phase: &PhaseSummary) -> String {
    let mut flags = Vec::new();
    if !phase.defined {
        flags.push("undefined");
    }
    if phase.production_ready {
        flags.push("ready");
    }
    if phase.at_risk {
        flags.push("at-risk");
    } else if phase.high_risk {
        flags.push("high-risk");
    }
    if phase.blocked {
        flags.push("blocked");
    }
    flags.join(",")
}

fn phase_row(phase: &PhaseSummary) -> [String; 5] {
    let status = phase
        .status_mix
        .iter()
        .map(|(status, count)| format!("{}={}", status, count))
        .collect::<Vec<_>>()
        .join(" ");
    [
        phase.name.clone(),
        phase.records.to_string(),
        if status.is_empty() { "-".to_string() } else { status },
        if phase.complexities.is_empty() {
            "-".to_string()
        } else {
            phase.complexities.join(",")
        },
        phase_flags(phase),
    ]
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(cell));
    format!("{}{}", cell, " ".repeat(fill))
}

fn print_phase_table<W: Write>(phases: &[PhaseSummary], writer: &mut W) {
    let rows: Vec<[String; 5]> = phases.iter().map(phase_row).collect();

    let mut widths = PHASE_HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let header = PHASE_HEADERS
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(writer, "{}", header.trim_end().bold());

    for (row, phase) in rows.iter().zip(phases) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, width))
            .collect::<Vec<_>>()
            .join("  ");
        let line = line.trim_end();
        if phase.at_risk || phase.blocked || !phase.defined {
            let _ = writeln!(writer, "{}", line.yellow());
        } else {
            let _ = writeln!(writer, "{}", line);
        }
    }
    let _ = writeln!(writer);
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn print_summary<W: Write>(report: &ScanReport, writer: &mut W) {
    let counts = &report.counts;

    if report.cancelled {
        let _ = writeln!(
            writer,
            "{} scan cancelled, results are partial",
            "warning:".bold().yellow()
        );
    }

    let total_problems = counts.errors + counts.warnings;
    if total_problems == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} {}, {} metadata {} in {} {} - no issues found",
                counts.files_scanned,
                plural(counts.files_scanned, "file", "files"),
                counts.records,
                plural(counts.records, "block", "blocks"),
                counts.phases,
                plural(counts.phases, "phase", "phases"),
            )
            .green()
        );
        return;
    }

    let mark = if counts.errors > 0 {
        FAILURE_MARK.red()
    } else {
        FAILURE_MARK.yellow()
    };
    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {}) in {} metadata {}",
        mark,
        total_problems,
        plural(total_problems, "problem", "problems"),
        counts.errors,
        plural(counts.errors, "error", "errors").red(),
        counts.warnings,
        plural(counts.warnings, "warning", "warnings").yellow(),
        counts.records,
        plural(counts.records, "block", "blocks"),
    );
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::{config::Config, core::ScanContext, rules::collect_issues};

    fn strip_ansi(s: &str) -> String {
        let mut result = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until 'm'
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    fn render(files: &[(&str, &str)], show_phases: bool) -> String {
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
        let report = ScanReport::build(&outcome, &issues, None);

        let mut output = Vec::new();
        report_to(&report, show_phases, &mut output);
        strip_ansi(&String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_clean_tree() {
        let output = render(
            &[("a.c", "// AI_PHASE: A\n// AI_STATUS: IMPLEMENTED\nint a();\n")],
            false,
        );
        assert_eq!(
            output,
            "\u{2713} Checked 1 file, 1 metadata block in 1 phase - no issues found\n"
        );
    }

    #[test]
    fn test_sections_are_labelled_in_order() {
        let output = render(
            &[
                (
                    "a.c",
                    "// AI_PHASE: A\n// AI_STATUS: DONE\n// AI_DEPENDENCIES: GHOST\nint a();\n",
                ),
                ("b.c", "// AI_PHASE: B\n// AI_STATUS: IMPLEMENTED\n// AI_STATUS: FIXED\nint b();\n"),
            ],
            true,
        );

        let schema = output.find("Schema errors (1)\n\nerror: invalid AI_STATUS").unwrap();
        let dependency = output
            .find("Dependency errors (1)\n\nerror: phase A depends on undefined phase GHOST")
            .unwrap();
        let warnings = output.find("Warnings (1)\n\nwarning: tag AI_STATUS").unwrap();
        let phases = output.find("Phases (3)\n\nPHASE").unwrap();
        assert!(schema < dependency && dependency < warnings && warnings < phases);
    }

    #[test]
    fn test_issue_format() {
        let output = render(
            &[("a.c", "// AI_PHASE: A\n// AI_STATUS: DONE\nint alpha();\n")],
            false,
        );

        assert!(output.contains("error: invalid AI_STATUS value \"DONE\"  invalid-status"));
        assert!(output.contains("  --> a.c:3 (alpha)"));
        assert!(output.contains("= hint: expected one of IMPLEMENTED"));
        assert!(output.contains("\u{2718} 1 problem (1 error, 0 warnings) in 1 metadata block"));
    }

    #[test]
    fn test_errors_sorted_by_file_then_line() {
        let output = render(
            &[
                ("b.c", "// AI_PHASE: B\n// AI_STATUS: X\nint b();\n"),
                (
                    "a.c",
                    "// AI_PHASE: A2\n// AI_COMPLEXITY: Y\nint a2();\n\n// AI_PHASE: A1\n// AI_STATUS: Z\nint a1();\n",
                ),
            ],
            false,
        );

        let a3 = output.find("a.c:3").unwrap();
        let a7 = output.find("a.c:7").unwrap();
        let b3 = output.find("b.c:3").unwrap();
        assert!(a3 < a7 && a7 < b3);
    }

    #[test]
    fn test_phase_table() {
        let output = render(
            &[
                (
                    "a.c",
                    "// AI_PHASE: APP\n// AI_STATUS: PARTIAL\n// AI_COMPLEXITY: HIGH\n// AI_DEPENDENCIES: DRIVER\nint app();\n",
                ),
                ("b.c", "// AI_PHASE: DRIVER\n// AI_STATUS: FIXED\nint drv();\n"),
            ],
            true,
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Phases (2)");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "PHASE   RECORDS  STATUS     COMPLEXITY  FLAGS");
        assert_eq!(lines[3], "APP     1        PARTIAL=1  HIGH        at-risk");
        assert_eq!(lines[4], "DRIVER  1        FIXED=1    -           ready");
    }

    #[test]
    fn test_file_level_warning_has_no_line() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.c"), "// AI_PHASE: A\nint a();\n").unwrap();
        let config = Config {
            max_file_size: 4,
            ..Default::default()
        };
        let outcome = ScanContext::new(dir.path(), config, false)
            .unwrap()
            .scan()
            .unwrap();
        let issues = collect_issues(&outcome);
        let report = ScanReport::build(&outcome, &issues, None);

        let mut output = Vec::new();
        report_to(&report, false, &mut output);
        let output = strip_ansi(&String::from_utf8(output).unwrap());

        assert!(output.starts_with("Warnings (1)\n\nwarning: "));
        assert!(output.contains("  --> big.c\n"));
        assert!(output.contains("(0 errors, 1 warning)"));
    }
}
