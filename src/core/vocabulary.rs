//! SCIS tag vocabulary.
//!
//! Tag names and the two closed value sets (`AI_STATUS`, `AI_COMPLEXITY`)
//! live here and nowhere else. Everything that needs to know whether a value
//! is legal goes through [`Status::from_str`] / [`Complexity::from_str`].

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

pub const AI_PHASE: &str = "AI_PHASE";
pub const AI_STATUS: &str = "AI_STATUS";
pub const AI_COMPLEXITY: &str = "AI_COMPLEXITY";
pub const AI_NOTE: &str = "AI_NOTE";
pub const AI_DEPENDENCIES: &str = "AI_DEPENDENCIES";
pub const AI_COMMIT: &str = "AI_COMMIT";
pub const AI_COMMIT_HISTORY: &str = "AI_COMMIT_HISTORY";
pub const SOURCE_API_REF: &str = "SOURCE_API_REF";
pub const TARGET_API_REF: &str = "TARGET_API_REF";

/// Tags mapped onto typed fields of a record.
pub const CORE_TAGS: &[&str] = &[
    AI_PHASE,
    AI_STATUS,
    AI_COMPLEXITY,
    AI_NOTE,
    AI_DEPENDENCIES,
    AI_COMMIT,
    AI_COMMIT_HISTORY,
    SOURCE_API_REF,
    TARGET_API_REF,
];

/// Tags that belong to the convention but are kept as opaque extra fields.
pub const EXTENDED_TAGS: &[&str] = &[
    "AI_PATTERN",
    "AI_STRATEGY",
    "AI_VERSION",
    "AI_CHANGE",
    "AI_TRAIN_HASH",
    "AI_CONTEXT",
    "AI_METADATA",
    "COMPILER_ERR",
    "RUNTIME_ERR",
    "FIX_REASON",
    "HUMAN_OVERRIDE",
    "AI_ASSIGNED_TO",
    "AI_TIMEOUT",
    "AI_MAX_RETRIES",
];

/// Prefix shared by every AI-authored tag, known or not.
pub const AI_TAG_PREFIX: &str = "AI_";

/// Whether a tag name marks a comment as SCIS metadata.
///
/// Any `AI_*` tag counts, so blocks written against a newer vocabulary are
/// still picked up.
pub fn is_scis_tag(name: &str) -> bool {
    name.starts_with(AI_TAG_PREFIX) || CORE_TAGS.contains(&name) || EXTENDED_TAGS.contains(&name)
}

/// Error returned when a string is not a member of a closed value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

/// `AI_STATUS` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Implemented,
    Partial,
    NotStarted,
    Fixed,
    Deprecated,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Implemented,
        Status::Partial,
        Status::NotStarted,
        Status::Fixed,
        Status::Deprecated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Implemented => "IMPLEMENTED",
            Status::Partial => "PARTIAL",
            Status::NotStarted => "NOT_STARTED",
            Status::Fixed => "FIXED",
            Status::Deprecated => "DEPRECATED",
        }
    }

    /// Statuses that count towards production readiness.
    pub fn is_production_ready(self) -> bool {
        matches!(self, Status::Implemented | Status::Fixed)
    }

    pub fn is_incomplete(self) -> bool {
        matches!(self, Status::Partial | Status::NotStarted)
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `AI_COMPLEXITY` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Complexity {
    Low,
    Medium,
    High,
    Critical,
}

impl Complexity {
    pub const ALL: [Complexity; 4] = [
        Complexity::Low,
        Complexity::Medium,
        Complexity::High,
        Complexity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Low => "LOW",
            Complexity::Medium => "MEDIUM",
            Complexity::High => "HIGH",
            Complexity::Critical => "CRITICAL",
        }
    }

    pub fn is_high_risk(self) -> bool {
        matches!(self, Complexity::High | Complexity::Critical)
    }
}

impl FromStr for Complexity {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Complexity::ALL
            .into_iter()
            .find(|complexity| complexity.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag value checked against a closed set, keeping the raw text either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue<T> {
    Valid(T),
    Invalid(String),
}

impl<T: FromStr> TagValue<T> {
    pub fn parse(raw: &str) -> Self {
        match raw.parse() {
            Ok(value) => TagValue::Valid(value),
            Err(_) => TagValue::Invalid(raw.to_string()),
        }
    }
}

impl<T: Copy> TagValue<T> {
    pub fn valid(&self) -> Option<T> {
        match self {
            TagValue::Valid(value) => Some(*value),
            TagValue::Invalid(_) => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for TagValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Valid(value) => write!(f, "{}", value),
            TagValue::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl<T: fmt::Display> Serialize for TagValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
