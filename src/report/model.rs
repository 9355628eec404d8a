//! Structured scan report.
//!
//! The single in-memory result every output format renders from. It carries
//! no timestamps, so an unchanged tree always produces identical output.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    core::{Complexity, MetadataRecord, PhaseNode, ScanOutcome, Status, graph::UNSPECIFIED},
    issues::{Category, Issue, Report, Rule, Severity},
};

/// Version of the structured report shape. Bumped on breaking changes.
pub const REPORT_SCHEMA_VERSION: &str = "scis-report/1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub schema_version: String,
    pub root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// No errors were found.
    pub passed: bool,
    pub cancelled: bool,
    pub counts: Counts,
    pub schema_errors: Vec<ReportIssue>,
    pub dependency_errors: Vec<ReportIssue>,
    pub warnings: Vec<ReportIssue>,
    pub phases: Vec<PhaseSummary>,
    pub records: Vec<RecordEntry>,
    pub distribution: Distribution,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub files_scanned: usize,
    pub files_with_metadata: usize,
    pub records: usize,
    pub valid_records: usize,
    pub phases: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIssue {
    pub rule: Rule,
    pub severity: Severity,
    pub file: String,
    /// Absent for file-level issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&Issue> for ReportIssue {
    fn from(issue: &Issue) -> Self {
        let location = issue.location();
        let line = location.line();
        Self {
            rule: issue.rule(),
            severity: issue.severity(),
            file: location.file_path().to_string(),
            line: (line > 0).then_some(line),
            symbol: location.symbol().map(String::from),
            message: issue.message(),
            details: issue.details(),
            hint: issue.hint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub name: String,
    /// At least one record declares this phase.
    pub defined: bool,
    pub records: usize,
    pub status_mix: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predominant_status: Option<Status>,
    pub complexities: Vec<String>,
    pub dependencies: Vec<String>,
    pub commits: Vec<String>,
    pub production_ready: bool,
    pub high_risk: bool,
    pub blocked: bool,
    pub at_risk: bool,
}

impl From<&PhaseNode> for PhaseSummary {
    fn from(node: &PhaseNode) -> Self {
        Self {
            name: node.name.clone(),
            defined: node.is_defined(),
            records: node.records.len(),
            status_mix: node.status_mix.clone(),
            predominant_status: node.predominant_status(),
            complexities: node
                .complexities
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            dependencies: node.dependencies.iter().cloned().collect(),
            commits: node.commits.iter().cloned().collect(),
            production_ready: node.production_ready,
            high_risk: node.high_risk,
            blocked: node.blocked,
            at_risk: node.at_risk(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntry {
    #[serde(flatten)]
    pub record: MetadataRecord,
    pub valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub by_status: BTreeMap<String, usize>,
    pub by_complexity: BTreeMap<String, usize>,
    pub by_phase: BTreeMap<String, usize>,
}

/// A record singled out by the implementation-status analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedRecord {
    pub file: String,
    pub line: usize,
    pub phase: String,
    pub status: String,
    pub complexity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// HIGH/CRITICAL records that are PARTIAL or NOT_STARTED.
    pub high_risk_incomplete: Vec<FlaggedRecord>,
    /// Phases with a CRITICAL record marked IMPLEMENTED.
    pub critical_implemented: Vec<String>,
    pub deprecated_phases: Vec<String>,
    pub at_risk_phases: Vec<String>,
    pub blocked_phases: Vec<String>,
}

fn status_key(record: &MetadataRecord) -> String {
    record
        .status
        .as_ref()
        .map_or_else(|| UNSPECIFIED.to_string(), ToString::to_string)
}

fn complexity_key(record: &MetadataRecord) -> String {
    record
        .complexity
        .as_ref()
        .map_or_else(|| UNSPECIFIED.to_string(), ToString::to_string)
}

impl ScanReport {
    /// Build the report. `issues` must come from the same outcome.
    pub fn build(outcome: &ScanOutcome, issues: &[Issue], repository: Option<String>) -> Self {
        let mut schema_errors = Vec::new();
        let mut dependency_errors = Vec::new();
        let mut warnings = Vec::new();

        let mut sorted: Vec<&Issue> = issues.iter().collect();
        sorted.sort();
        for issue in sorted {
            let entry = ReportIssue::from(issue);
            match (issue.severity(), issue.category()) {
                (Severity::Warning, _) | (_, Category::Scan) => warnings.push(entry),
                (Severity::Error, Category::Schema) => schema_errors.push(entry),
                (Severity::Error, Category::Dependency) => dependency_errors.push(entry),
            }
        }

        let mut records: Vec<RecordEntry> = outcome
            .store
            .iter()
            .map(|validated| RecordEntry {
                record: validated.record().clone(),
                valid: validated.is_valid(),
            })
            .collect();
        records.sort_by(|a, b| {
            a.record
                .anchor
                .cmp(&b.record.anchor)
                .then_with(|| a.record.comment_lines.cmp(&b.record.comment_lines))
        });

        let phases: Vec<PhaseSummary> = outcome.graph.nodes().map(PhaseSummary::from).collect();
        let distribution = distribution(records.iter().map(|r| &r.record));
        let analysis = analysis(&records, &phases);

        let errors = schema_errors.len() + dependency_errors.len();
        let counts = Counts {
            files_scanned: outcome.files_scanned,
            files_with_metadata: outcome.files_with_metadata,
            records: records.len(),
            valid_records: records.iter().filter(|r| r.valid).count(),
            phases: phases.iter().filter(|p| p.defined).count(),
            errors,
            warnings: warnings.len(),
        };

        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            root: outcome.root.display().to_string(),
            repository,
            passed: errors == 0,
            cancelled: outcome.cancelled,
            counts,
            schema_errors,
            dependency_errors,
            warnings,
            phases,
            records,
            distribution,
            analysis,
        }
    }

    /// Whether a gating run should fail.
    pub fn has_blocking_errors(&self) -> bool {
        self.counts.errors > 0
    }

    /// All errors then all warnings, each group in file/line order.
    pub fn all_issues(&self) -> impl Iterator<Item = &ReportIssue> {
        self.schema_errors
            .iter()
            .chain(&self.dependency_errors)
            .chain(&self.warnings)
    }

    /// Share of scanned files carrying metadata, in percent.
    pub fn coverage_percent(&self) -> f64 {
        if self.counts.files_scanned == 0 {
            return 0.0;
        }
        self.counts.files_with_metadata as f64 * 100.0 / self.counts.files_scanned as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn distribution<'a>(records: impl Iterator<Item = &'a MetadataRecord>) -> Distribution {
    let mut distribution = Distribution::default();
    for record in records {
        *distribution.by_status.entry(status_key(record)).or_default() += 1;
        *distribution
            .by_complexity
            .entry(complexity_key(record))
            .or_default() += 1;
        if let Some(phase) = record.phase_name() {
            *distribution.by_phase.entry(phase.to_string()).or_default() += 1;
        }
    }
    distribution
}

fn analysis(records: &[RecordEntry], phases: &[PhaseSummary]) -> Analysis {
    let mut analysis = Analysis::default();

    for entry in records {
        let record = &entry.record;
        let phase = record.phase_name().unwrap_or(UNSPECIFIED);
        let status = record.valid_status();

        if record.is_high_risk() && status.is_some_and(Status::is_incomplete) {
            analysis.high_risk_incomplete.push(FlaggedRecord {
                file: record.anchor.file.clone(),
                line: record.anchor.line,
                phase: phase.to_string(),
                status: status_key(record),
                complexity: complexity_key(record),
            });
        }
        if status == Some(Status::Implemented)
            && record.valid_complexity() == Some(Complexity::Critical)
        {
            analysis.critical_implemented.push(phase.to_string());
        }
        if status == Some(Status::Deprecated) {
            analysis.deprecated_phases.push(phase.to_string());
        }
    }
    analysis.critical_implemented.sort();
    analysis.critical_implemented.dedup();
    analysis.deprecated_phases.sort();
    analysis.deprecated_phases.dedup();

    analysis.at_risk_phases = phases
        .iter()
        .filter(|p| p.at_risk)
        .map(|p| p.name.clone())
        .collect();
    analysis.blocked_phases = phases
        .iter()
        .filter(|p| p.blocked)
        .map(|p| p.name.clone())
        .collect();

    analysis
}
