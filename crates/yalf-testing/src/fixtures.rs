//! Event stream fixtures on disk.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::TraceBuilder;

/// A temporary directory holding one JSONL trace file.
///
/// The directory is removed when the fixture is dropped.
pub struct TraceFile {
    _dir: TempDir,
    path: PathBuf,
}

impl TraceFile {
    pub fn write(builder: &TraceBuilder) -> Result<Self> {
        Self::write_raw(&builder.to_jsonl())
    }

    pub fn write_raw(content: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("trace.jsonl");
        fs::write(&path, content)?;
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// A sibling path inside the fixture directory, e.g. for output files
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.path.with_file_name(name)
    }
}
