//! Interpreter specification loading.
//!
//! The specification is a fixed text resource describing, to the model, how
//! it should behave as a CPL interpreter. It is read once per run and shared
//! read-only across every program processed in that run.

use crate::error::Result;
use cpl_error::Error;
use std::path::{Path, PathBuf};

/// The interpreter specification text, cached for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct InterpreterSpec {
    text: String,
}

impl InterpreterSpec {
    /// Load the specification from a file, as UTF-8 text.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("spec::load")
                .with_context("path", path.display().to_string())
        })?;
        Ok(Self { text })
    }

    /// Wrap already-loaded specification text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The specification text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Default location of the specification: `interpreter/interpreter.cpl`
    /// next to the running executable.
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().map_err(|e| {
            Error::from(e).with_operation("spec::default_path")
        })?;
        let dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(dir.join("interpreter").join("interpreter.cpl"))
    }
}
