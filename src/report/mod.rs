//! Scan report and its renderers.
//!
//! [`ScanReport`] is built once per scan; the terminal output, JSON and the
//! file exports are all projections of it.

pub mod export;
pub mod human;
pub mod model;

pub use human::{SUCCESS_MARK, report_to};
pub use model::{REPORT_SCHEMA_VERSION, ScanReport};
