use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{
    language::{Language, LanguageTable, default_languages},
    vocabulary::{AI_COMMIT, AI_COMPLEXITY, AI_DEPENDENCIES, AI_NOTE, AI_STATUS},
};

pub const CONFIG_FILE_NAME: &str = ".scisrc.json";

/// Build output and dependency caches that never carry first-party metadata.
pub const DEFAULT_DENY_DIRS: &[&str] = &[
    ".git",
    "build",
    "target",
    "node_modules",
    "__pycache__",
    "dist",
    ".venv",
    "venv",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
    #[serde(default = "default_deny_dirs")]
    pub deny_dirs: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Exit non-zero when errors are found.
    #[serde(default = "default_gate")]
    pub gate: bool,
    #[serde(default = "default_symbol_lookahead")]
    pub symbol_lookahead: usize,
    /// Files larger than this many bytes are skipped with a warning.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_recommended_tags")]
    pub recommended_tags: Vec<String>,
}

fn default_deny_dirs() -> Vec<String> {
    DEFAULT_DENY_DIRS.iter().map(|d| d.to_string()).collect()
}

fn default_gate() -> bool {
    true
}

fn default_symbol_lookahead() -> usize {
    5
}

fn default_max_file_size() -> u64 {
    4 * 1024 * 1024
}

fn default_recommended_tags() -> Vec<String> {
    [AI_STATUS, AI_COMPLEXITY, AI_NOTE, AI_DEPENDENCIES, AI_COMMIT]
        .map(String::from)
        .to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            deny_dirs: default_deny_dirs(),
            ignores: Vec::new(),
            gate: default_gate(),
            symbol_lookahead: default_symbol_lookahead(),
            max_file_size: default_max_file_size(),
            recommended_tags: default_recommended_tags(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores`, unusable
    /// comment delimiters, or an extension claimed by two languages.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if let Some(dir) = self.deny_dirs.iter().find(|d| d.contains(['/', '\\'])) {
            bail!(
                "Invalid entry in 'denyDirs': \"{}\" (use a directory name, not a path)",
                dir
            );
        }

        self.language_table().context("Invalid 'languages'")?;

        Ok(())
    }

    pub fn language_table(&self) -> Result<LanguageTable> {
        LanguageTable::new(self.languages.clone())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the config came from, `None` when using defaults.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config
                .validate()
                .with_context(|| format!("Invalid config file: {:?}", path))?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
