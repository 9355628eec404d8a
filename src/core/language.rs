//! Language comment syntaxes and the extension lookup table.
//!
//! A language is nothing more than the comment delimiters the locator needs.
//! The set is configuration (`languages` in `.scisrc.json`); the defaults cover
//! C-family, hash-comment and dash-comment languages.

use std::{collections::HashMap, path::Path};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Opening and closing delimiter of a block comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockDelimiters {
    pub open: String,
    pub close: String,
}

impl BlockDelimiters {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

/// Comment delimiters of one language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSyntax {
    #[serde(default)]
    pub line_comments: Vec<String>,
    #[serde(default)]
    pub block_comments: Vec<BlockDelimiters>,
}

impl CommentSyntax {
    pub fn c_style() -> Self {
        Self {
            line_comments: vec!["//".to_string()],
            block_comments: vec![BlockDelimiters::new("/*", "*/")],
        }
    }

    pub fn hash_style() -> Self {
        Self {
            line_comments: vec!["#".to_string()],
            block_comments: Vec::new(),
        }
    }

    pub fn dash_style() -> Self {
        Self {
            line_comments: vec!["--".to_string()],
            block_comments: Vec::new(),
        }
    }
}

/// A named language and the file extensions mapped onto it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub extensions: Vec<String>,
    #[serde(flatten)]
    pub syntax: CommentSyntax,
}

impl Language {
    fn new(name: &str, extensions: &[&str], syntax: CommentSyntax) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            syntax,
        }
    }
}

pub fn default_languages() -> Vec<Language> {
    vec![
        Language::new(
            "c-style",
            &[
                "c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "cu", "cuh", "rs", "go", "java",
                "js", "jsx", "ts", "tsx", "cs", "swift", "kt",
            ],
            CommentSyntax::c_style(),
        ),
        Language::new(
            "hash",
            &["py", "pyi", "sh", "rb", "pl", "toml", "yaml", "yml"],
            CommentSyntax::hash_style(),
        ),
        Language::new("dash", &["lua", "sql"], CommentSyntax::dash_style()),
    ]
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Extension to language lookup built from the configured languages.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    languages: Vec<Language>,
    by_extension: HashMap<String, usize>,
}

impl LanguageTable {
    /// Build the table, rejecting ambiguous or unusable definitions.
    pub fn new(languages: Vec<Language>) -> Result<Self> {
        let mut by_extension = HashMap::new();

        for (idx, language) in languages.iter().enumerate() {
            let syntax = &language.syntax;
            if syntax.line_comments.is_empty() && syntax.block_comments.is_empty() {
                bail!("Language '{}' defines no comment delimiters", language.name);
            }
            if syntax.line_comments.iter().any(|m| m.trim().is_empty())
                || syntax
                    .block_comments
                    .iter()
                    .any(|b| b.open.trim().is_empty() || b.close.trim().is_empty())
            {
                bail!("Language '{}' has an empty comment delimiter", language.name);
            }

            for ext in &language.extensions {
                let ext = normalize_extension(ext);
                if let Some(&other) = by_extension.get(&ext) {
                    let other: &Language = &languages[other];
                    bail!(
                        "Extension '.{}' is claimed by both '{}' and '{}'",
                        ext,
                        other.name,
                        language.name
                    );
                }
                by_extension.insert(ext, idx);
            }
        }

        Ok(Self {
            languages,
            by_extension,
        })
    }

    pub fn for_extension(&self, ext: &str) -> Option<&Language> {
        self.by_extension
            .get(&normalize_extension(ext))
            .map(|&idx| &self.languages[idx])
    }

    /// Language for a path, or `None` for file types the scan ignores.
    pub fn for_path(&self, path: &Path) -> Option<&Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.for_extension(ext))
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        // The built-in set has no conflicts.
        Self::new(default_languages()).unwrap_or_else(|_| Self {
            languages: Vec::new(),
            by_extension: HashMap::new(),
        })
    }
}
