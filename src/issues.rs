//! Issue types for scan results.
//!
//! Every finding the engine can report, in a shape the reporters can render
//! directly. Engine-level errors (`SchemaError`, `DependencyError`,
//! `FileFailure`) are converted into these by the functions in `rules`.

use enum_dispatch::enum_dispatch;
use serde::Serialize;

use crate::core::{
    Anchor,
    validate::{allowed_complexities, allowed_statuses},
};

// ============================================================
// Severity, Rule and Category
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Which report section an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Schema,
    Dependency,
    Scan,
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    InvalidStatus,
    InvalidComplexity,
    MissingPhase,
    DuplicateAnchor,
    DanglingDependency,
    SelfDependency,
    DependencyCycle,
    FileRead,
    MissingTag,
    DuplicateTag,
}

impl Rule {
    pub fn category(self) -> Category {
        match self {
            Rule::InvalidStatus | Rule::InvalidComplexity | Rule::MissingPhase => Category::Schema,
            Rule::DuplicateAnchor | Rule::MissingTag | Rule::DuplicateTag => Category::Schema,
            Rule::DanglingDependency | Rule::SelfDependency | Rule::DependencyCycle => {
                Category::Dependency
            }
            Rule::FileRead => Category::Scan,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::InvalidStatus => write!(f, "invalid-status"),
            Rule::InvalidComplexity => write!(f, "invalid-complexity"),
            Rule::MissingPhase => write!(f, "missing-phase"),
            Rule::DuplicateAnchor => write!(f, "duplicate-anchor"),
            Rule::DanglingDependency => write!(f, "dangling-dependency"),
            Rule::SelfDependency => write!(f, "self-dependency"),
            Rule::DependencyCycle => write!(f, "dependency-cycle"),
            Rule::FileRead => write!(f, "file-read"),
            Rule::MissingTag => write!(f, "missing-tag"),
            Rule::DuplicateTag => write!(f, "duplicate-tag"),
        }
    }
}

impl Serialize for Rule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================
// Location
// ============================================================

/// The record an issue is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    pub file_path: String,
    /// Anchor line.
    pub line: usize,
    pub symbol: Option<String>,
    /// First line of the metadata comment itself.
    pub comment_line: usize,
    pub phase: Option<String>,
}

impl RecordContext {
    pub fn new(anchor: &Anchor, comment_line: usize, phase: Option<&str>) -> Self {
        Self {
            file_path: anchor.file.clone(),
            line: anchor.line,
            symbol: anchor.symbol.clone(),
            comment_line,
            phase: phase.map(String::from),
        }
    }
}

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// A metadata record.
    Record(&'a RecordContext),
    /// File-level only (for FileRead - no line context).
    File { path: &'a str },
}

impl ReportLocation<'_> {
    pub fn file_path(&self) -> &str {
        match self {
            ReportLocation::Record(ctx) => &ctx.file_path,
            ReportLocation::File { path } => path,
        }
    }

    /// 0 for file-level issues.
    pub fn line(&self) -> usize {
        match self {
            ReportLocation::Record(ctx) => ctx.line,
            ReportLocation::File { .. } => 0,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            ReportLocation::Record(ctx) => ctx.symbol.as_deref(),
            ReportLocation::File { .. } => None,
        }
    }
}

// ============================================================
// Issue Types - Schema
// ============================================================

/// `AI_STATUS` value outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatusIssue {
    pub context: RecordContext,
    pub value: String,
}

impl InvalidStatusIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::InvalidStatus
    }
}

/// `AI_COMPLEXITY` value outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidComplexityIssue {
    pub context: RecordContext,
    pub value: String,
}

impl InvalidComplexityIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::InvalidComplexity
    }
}

/// Record without an `AI_PHASE`; it cannot take part in dependency analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPhaseIssue {
    pub context: RecordContext,
}

impl MissingPhaseIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::MissingPhase
    }
}

/// Second or later block documenting the same file and line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateAnchorIssue {
    pub context: RecordContext,
    pub first_comment_line: usize,
}

impl DuplicateAnchorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::DuplicateAnchor
    }
}

/// Recommended tag absent from a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTagIssue {
    pub context: RecordContext,
    pub tag: String,
}

impl MissingTagIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MissingTag
    }
}

/// Tag written more than once in one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTagIssue {
    pub context: RecordContext,
    pub tag: String,
}

impl DuplicateTagIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::DuplicateTag
    }
}

// ============================================================
// Issue Types - Dependency Graph
// ============================================================

/// Dependency on a phase no record defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependencyIssue {
    pub context: RecordContext,
    pub phase: String,
    pub target: String,
}

impl DanglingDependencyIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::DanglingDependency
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfDependencyIssue {
    pub context: RecordContext,
    pub phase: String,
}

impl SelfDependencyIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::SelfDependency
    }
}

/// A dependency cycle, reported once at the first record of its smallest phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycleIssue {
    pub context: RecordContext,
    pub path: Vec<String>,
}

impl DependencyCycleIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::DependencyCycle
    }

    /// `A -> B -> C -> A`
    pub fn cycle_display(&self) -> String {
        let mut phases: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if let Some(first) = self.path.first() {
            phases.push(first);
        }
        phases.join(" -> ")
    }
}

// ============================================================
// Issue Types - Scan
// ============================================================

/// File that could not be read; skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReadIssue {
    pub file_path: String,
    pub reason: String,
}

impl FileReadIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::FileRead
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// A finding produced by a scan.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    InvalidStatus(InvalidStatusIssue),
    InvalidComplexity(InvalidComplexityIssue),
    MissingPhase(MissingPhaseIssue),
    DuplicateAnchor(DuplicateAnchorIssue),
    MissingTag(MissingTagIssue),
    DuplicateTag(DuplicateTagIssue),
    DanglingDependency(DanglingDependencyIssue),
    SelfDependency(SelfDependencyIssue),
    DependencyCycle(DependencyCycleIssue),
    FileRead(FileReadIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::InvalidStatus(_) => InvalidStatusIssue::severity(),
            Issue::InvalidComplexity(_) => InvalidComplexityIssue::severity(),
            Issue::MissingPhase(_) => MissingPhaseIssue::severity(),
            Issue::DuplicateAnchor(_) => DuplicateAnchorIssue::severity(),
            Issue::MissingTag(_) => MissingTagIssue::severity(),
            Issue::DuplicateTag(_) => DuplicateTagIssue::severity(),
            Issue::DanglingDependency(_) => DanglingDependencyIssue::severity(),
            Issue::SelfDependency(_) => SelfDependencyIssue::severity(),
            Issue::DependencyCycle(_) => DependencyCycleIssue::severity(),
            Issue::FileRead(_) => FileReadIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::InvalidStatus(_) => InvalidStatusIssue::rule(),
            Issue::InvalidComplexity(_) => InvalidComplexityIssue::rule(),
            Issue::MissingPhase(_) => MissingPhaseIssue::rule(),
            Issue::DuplicateAnchor(_) => DuplicateAnchorIssue::rule(),
            Issue::MissingTag(_) => MissingTagIssue::rule(),
            Issue::DuplicateTag(_) => DuplicateTagIssue::rule(),
            Issue::DanglingDependency(_) => DanglingDependencyIssue::rule(),
            Issue::SelfDependency(_) => SelfDependencyIssue::rule(),
            Issue::DependencyCycle(_) => DependencyCycleIssue::rule(),
            Issue::FileRead(_) => FileReadIssue::rule(),
        }
    }

    pub fn category(&self) -> Category {
        self.rule().category()
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported.
///
/// Implemented by all issue types; `enum_dispatch` forwards the calls on the
/// `Issue` enum.
#[enum_dispatch]
pub trait Report {
    /// Get the location for this issue.
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    /// Severity level.
    fn report_severity(&self) -> Severity;

    /// Rule identifier.
    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for InvalidStatusIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("invalid AI_STATUS value \"{}\"", self.value)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some(format!("expected one of {}", allowed_statuses()))
    }
}

impl Report for InvalidComplexityIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("invalid AI_COMPLEXITY value \"{}\"", self.value)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some(format!("expected one of {}", allowed_complexities()))
    }
}

impl Report for MissingPhaseIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        "metadata block has no AI_PHASE".to_string()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some("records without a phase are left out of dependency analysis".to_string())
    }
}

impl Report for DuplicateAnchorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!(
            "{}:{} is already documented by the block at line {}",
            self.context.file_path, self.context.line, self.first_comment_line
        )
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("this block starts at line {}", self.context.comment_line))
    }
}

impl Report for MissingTagIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("missing recommended tag {}", self.tag)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DuplicateTagIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("tag {} appears more than once", self.tag)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("the last value is kept".to_string())
    }
}

impl Report for DanglingDependencyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!(
            "phase {} depends on undefined phase {}",
            self.phase, self.target
        )
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some(format!(
            "no scanned file declares AI_PHASE: {}",
            self.target
        ))
    }
}

impl Report for SelfDependencyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("phase {} depends on itself", self.phase)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DependencyCycleIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Record(&self.context)
    }

    fn message(&self) -> String {
        format!("dependency cycle through {} phases", self.path.len())
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.cycle_display())
    }
}

impl Report for FileReadIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.reason.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<String> {
        Some("the file was skipped".to_string())
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: file_path, line, rule, message
        let (a, b) = (self.location(), other.location());
        a.file_path()
            .cmp(b.file_path())
            .then_with(|| a.line().cmp(&b.line()))
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
