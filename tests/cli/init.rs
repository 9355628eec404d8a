use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "languages",
        "denyDirs",
        "ignores",
        "gate",
        "symbolLookahead",
        "maxFileSize",
        "recommendedTags",
    ] {
        assert!(
            parsed.get(field).is_some(),
            "Config should have '{}' field",
            field
        );
    }
    assert_eq!(parsed["gate"], true);

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("init");

    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .scisrc.json

    ----- stderr -----
    ");
    assert!(test.root().join(".scisrc.json").exists());

    let content = test.read_file(".scisrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".scisrc.json", "{}")?;

    let mut cmd = test.command();
    cmd.arg("init");

    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: .scisrc.json already exists
    ");
    assert_eq!(test.read_file(".scisrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;

    test.write_file(
        "src/app.c",
        "// AI_PHASE: APP\n// AI_STATUS: IMPLEMENTED\n// AI_COMPLEXITY: LOW\n// AI_NOTE: entry\n// AI_DEPENDENCIES:\n// AI_COMMIT: abc1234\nint main(void);\n",
    )?;

    let output = test.check_command().output()?;
    assert!(
        output.status.success(),
        "Check command should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(())
}
