//! SCIS - structured comment metadata checker
//!
//! Scans a source tree for SCIS metadata blocks (`AI_PHASE`, `AI_STATUS`,
//! `AI_DEPENDENCIES`, ...) embedded in comments, validates each block against
//! the tag vocabulary, and checks the phase dependency graph they describe
//! for dangling references, self-dependencies and cycles.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Scan engine (locate, extract, validate, store, graph)
//! - `issues`: Issue type definitions
//! - `report`: Structured report and its renderers
//! - `rules`: Conversion of engine findings into issues

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod report;
pub mod rules;
