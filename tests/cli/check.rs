use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

const KERNEL_MMU: &str = r#"
/*
 * AI_PHASE: PAGING
 * AI_STATUS: PARTIAL
 * AI_COMPLEXITY: HIGH
 * AI_NOTE: four-level walk only
 * AI_DEPENDENCIES: BOOT
 * AI_COMMIT: b2c3d4e
 * AI_COMMIT_HISTORY: a1b2c3d, e4f5a6b
 */
int map_page(unsigned long va, unsigned long pa);
"#;

const KERNEL_BOOT: &str = r#"
// AI_PHASE: BOOT
// AI_STATUS: IMPLEMENTED
// AI_COMPLEXITY: MEDIUM
// AI_NOTE: early console
// AI_DEPENDENCIES:
// AI_COMMIT: 9f8e7d6
void boot_main(void);
"#;

fn kernel_tree() -> Result<CliTest> {
    let test = CliTest::with_file("kernel/mmu.c", KERNEL_MMU)?;
    test.write_file("kernel/boot.c", KERNEL_BOOT)?;
    Ok(test)
}

#[test]
fn test_clean_tree_passes() -> Result<()> {
    let test = kernel_tree()?;

    assert_cmd_snapshot!(test.check_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Phases (2)

    PHASE   RECORDS  STATUS         COMPLEXITY  FLAGS
    BOOT    1        IMPLEMENTED=1  MEDIUM      ready
    PAGING  1        PARTIAL=1      HIGH        at-risk

    ✓ Checked 2 files, 2 metadata blocks in 2 phases - no issues found

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_invalid_status_fails_gate() -> Result<()> {
    let test = kernel_tree()?;
    test.write_file(
        "drivers/uart.py",
        "# AI_PHASE: UART\n# AI_STATUS: DONE\n# AI_COMPLEXITY: LOW\n# AI_NOTE: polling\n# AI_DEPENDENCIES: BOOT\n# AI_COMMIT: 1234abc\ndef uart_init():\n    pass\n",
    )?;

    let mut cmd = test.check_command();
    cmd.arg("--no-phases");

    assert_cmd_snapshot!(cmd, @r#"
    success: false
    exit_code: 1
    ----- stdout -----
    Schema errors (1)

    error: invalid AI_STATUS value "DONE"  invalid-status
      --> drivers/uart.py:7 (uart_init)
      = hint: expected one of IMPLEMENTED, PARTIAL, NOT_STARTED, FIXED, DEPRECATED

    ✘ 1 problem (1 error, 0 warnings) in 3 metadata blocks

    ----- stderr -----
    "#);

    Ok(())
}

#[test]
fn test_audit_mode_exits_zero() -> Result<()> {
    let test = CliTest::with_file(
        "a.c",
        "// AI_PHASE: A\n// AI_STATUS: BOGUS\nint a(void);\n",
    )?;

    let gated = test.check_command().output()?;
    assert_eq!(gated.status.code(), Some(1));

    let audit = test.check_command().arg("--audit").output()?;
    assert_eq!(audit.status.code(), Some(0));
    assert!(stdout(&audit).contains("invalid-status"));

    Ok(())
}

#[test]
fn test_config_disables_gate() -> Result<()> {
    let test = CliTest::with_file(
        "a.c",
        "// AI_PHASE: A\n// AI_DEPENDENCIES: GHOST\nint a(void);\n",
    )?;
    test.write_file(".scisrc.json", r#"{ "gate": false }"#)?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("dangling-dependency"));

    Ok(())
}

#[test]
fn test_cycle_reported_once() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("a.c", "// AI_PHASE: A\n// AI_DEPENDENCIES: B\nint a(void);\n")?;
    test.write_file("b.c", "// AI_PHASE: B\n// AI_DEPENDENCIES: C\nint b(void);\n")?;
    test.write_file("c.c", "// AI_PHASE: C\n// AI_DEPENDENCIES: A\nint c(void);\n")?;

    let output = test
        .check_command()
        .args(["--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_str(&stdout(&output))?;
    let errors = report["dependencyErrors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["rule"], "dependency-cycle");
    assert_eq!(errors[0]["file"], "a.c");

    Ok(())
}

#[test]
fn test_json_report_shape() -> Result<()> {
    let test = kernel_tree()?;

    let output = test
        .check_command()
        .args(["--format", "json", "--repository", "acme/kernel"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(report["schemaVersion"], "scis-report/1");
    assert_eq!(report["repository"], "acme/kernel");
    assert_eq!(report["passed"], true);
    assert_eq!(report["counts"]["records"], 2);

    let paging = &report["records"][1];
    assert_eq!(paging["anchor"]["file"], "kernel/mmu.c");
    assert_eq!(paging["anchor"]["line"], 11);
    assert_eq!(paging["anchor"]["symbol"], "map_page");
    assert_eq!(paging["commentLines"], serde_json::json!([2, 10]));
    assert_eq!(
        paging["commitHistory"],
        serde_json::json!(["a1b2c3d", "e4f5a6b"])
    );

    let phases: Vec<&str> = report["phases"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(phases, vec!["BOOT", "PAGING"]);

    Ok(())
}

#[test]
fn test_exports_written() -> Result<()> {
    let test = kernel_tree()?;

    let output = test
        .check_command()
        .args([
            "--output",
            "report.json",
            "--csv",
            "report.csv",
            "--markdown",
            "report.md",
            "--dot",
            "graph.dot",
            "--trace",
            "trace.json",
        ])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Wrote graph.dot"));

    let json: Value = serde_json::from_str(&test.read_file("report.json")?)?;
    assert_eq!(json["counts"]["filesWithMetadata"], 2);

    let csv = test.read_file("report.csv")?;
    assert!(csv.starts_with("File,Line,Symbol,Phase,"));
    assert_eq!(csv.lines().count(), 3);

    assert!(test.read_file("report.md")?.contains("- **PAGING** depends on: BOOT"));
    assert!(test.read_file("graph.dot")?.contains("  \"PAGING\" -> \"BOOT\";"));

    let trace: Value = serde_json::from_str(&test.read_file("trace.json")?)?;
    assert_eq!(trace["eventType"], "validation_success");
    assert_eq!(
        trace["metadataSummary"]["phases"],
        serde_json::json!(["BOOT", "PAGING"])
    );

    Ok(())
}

#[test]
fn test_reruns_are_byte_identical() -> Result<()> {
    let test = kernel_tree()?;

    let first = test.check_command().args(["--format", "json"]).output()?;
    let second = test.check_command().args(["--format", "json"]).output()?;

    assert_eq!(first.stdout, second.stdout);

    Ok(())
}

#[test]
fn test_missing_root_is_fatal() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.check_command().arg("does-not-exist").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: "));

    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
    let test = CliTest::with_file("a.c", "int a;\n")?;
    test.write_file(".scisrc.json", r#"{ "ignores": ["[unclosed"] }"#)?;

    let output = test.check_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid glob pattern"));

    Ok(())
}

#[test]
fn test_missing_recommended_tags_warn_without_failing() -> Result<()> {
    let test = CliTest::with_file("a.c", "// AI_PHASE: A\nint a(void);\n")?;

    let output = test.check_command().output()?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert!(out.contains("warning: "));
    assert!(out.contains("missing-tag"));
    assert!(out.contains("(0 errors, 5 warnings)"));

    Ok(())
}

#[test]
fn test_no_phases_hides_table() -> Result<()> {
    let test = kernel_tree()?;

    let mut cmd = test.check_command();
    cmd.arg("--no-phases");

    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Checked 2 files, 2 metadata blocks in 2 phases - no issues found

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_single_file_root() -> Result<()> {
    let test = kernel_tree()?;

    let output = test
        .check_command()
        .args(["kernel/boot.c", "--format", "json"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(report["counts"]["filesScanned"], 1);
    assert_eq!(report["counts"]["records"], 1);
    assert_eq!(report["records"][0]["anchor"]["file"], "boot.c");
    assert_eq!(report["records"][0]["phase"], "BOOT");

    Ok(())
}

#[test]
fn test_block_comments_sharing_a_line_with_code() -> Result<()> {
    let test = CliTest::with_file(
        "x.c",
        "/* AI_PHASE: A */ int a(void);\n/* AI_PHASE: B */ int b(void);\n",
    )?;

    let output = test.check_command().args(["--format", "json"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(report["schemaErrors"], serde_json::json!([]));
    assert_eq!(report["records"][0]["anchor"]["line"], 1);
    assert_eq!(report["records"][0]["anchor"]["symbol"], "a");
    assert_eq!(report["records"][1]["anchor"]["line"], 2);
    assert_eq!(report["records"][1]["anchor"]["symbol"], "b");

    Ok(())
}

#[test]
fn test_huge_symbol_lookahead() -> Result<()> {
    let test = kernel_tree()?;

    let output = test
        .check_command()
        .args(["--symbol-lookahead", &usize::MAX.to_string()])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).is_empty());

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("--help");

    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    A fast CLI tool for auditing SCIS metadata comments in source trees

    Usage: scis [COMMAND]

    Commands:
      check  Validate SCIS metadata comments and the phase dependency graph
      init   Initialize a new .scisrc.json configuration file
      help   Print this message or the help of the given subcommand(s)

    Options:
      -h, --help     Print help
      -V, --version  Print version

    ----- stderr -----
    ");

    Ok(())
}
