//! Testing infrastructure for yalf tests.
//!
//! - `TraceBuilder`: fluent construction of well-formed (or deliberately
//!   malformed) event streams
//! - `assertions`: checks over rendered report text
//! - `fixtures`: writing event streams to temporary files for CLI tests

pub mod assertions;
pub mod builder;
pub mod fixtures;

pub use builder::TraceBuilder;
