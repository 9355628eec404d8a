//! Scan engine: comment location, tag extraction, validation, the record
//! store and the dependency graph.

pub mod context;
pub mod extract;
pub mod file_scanner;
pub mod graph;
pub mod language;
pub mod locate;
pub mod record;
pub mod store;
pub mod validate;
pub mod vocabulary;

pub use context::{CancelFlag, ScanContext, ScanError, ScanOutcome};
pub use graph::{DependencyError, DependencyGraph, PhaseNode};
pub use record::{Anchor, MetadataRecord};
pub use store::RecordStore;
pub use validate::{SchemaError, SchemaWarning, ValidatedRecord};
pub use vocabulary::{Complexity, Status, TagValue};
