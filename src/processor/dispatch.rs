//! # Output Dispatch
//!
//! Decides what happens with a document once the pipeline has run: compares
//! the result with the original and lists, writes, diffs or streams it.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::FileIO;
use crate::diff::DiffEngine;
use crate::verbose_log;

/// Which actions to take for a changed document.
///
/// The flags are independent: every flag that is set fires, in the order
/// list, overwrite, diff. With no flag set the formatted document is
/// streamed instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputActions {
  /// Print the names of changed documents.
  pub list: bool,
  /// Replace changed files on disk.
  pub overwrite: bool,
  /// Print a unified diff for changed documents.
  pub diff: bool,
}

impl OutputActions {
  pub const fn any(&self) -> bool {
    self.list || self.overwrite || self.diff
  }
}

/// Result of processing one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The pipeline output equals the original bytes.
  Unchanged,
  /// The pipeline output differs from the original bytes.
  Changed,
}

/// Routes pipeline output to the requested sinks.
pub struct Dispatcher<'a> {
  actions: OutputActions,
  diff_engine: &'a dyn DiffEngine,
  file_mode: Option<u32>,
}

impl<'a> Dispatcher<'a> {
  pub const fn new(actions: OutputActions, diff_engine: &'a dyn DiffEngine, file_mode: Option<u32>) -> Self {
    Self {
      actions,
      diff_engine,
      file_mode,
    }
  }

  /// Dispatches one document.
  ///
  /// # Parameters
  ///
  /// * `name` - Display name used for listing and the diff banner
  /// * `path` - File to overwrite; `None` for standard input
  /// * `original` - Bytes as read
  /// * `formatted` - Pipeline output
  /// * `out` - Sink for names, diffs and streamed documents
  pub fn dispatch(
    &self,
    name: &str,
    path: Option<&Path>,
    original: &[u8],
    formatted: &[u8],
    out: &mut dyn Write,
  ) -> Result<Outcome> {
    if original == formatted {
      debug!("{} is unchanged", name);
      if !self.actions.any() {
        out.write_all(formatted)?;
      }
      return Ok(Outcome::Unchanged);
    }

    debug!("{} changed", name);

    if self.actions.list {
      writeln!(out, "{name}")?;
    }

    if self.actions.overwrite {
      let path = path.with_context(|| format!("cannot overwrite {name}"))?;
      FileIO::write_atomic(path, formatted, self.file_mode)?;
      verbose_log!("Formatted {}", name);
    }

    if self.actions.diff {
      let data = self.diff_engine.diff(original, formatted).context("computing diff")?;
      writeln!(out, "diff {name} hdrfmt/{name}")?;
      out.write_all(&data)?;
    }

    if !self.actions.any() {
      out.write_all(formatted)?;
    }

    Ok(Outcome::Changed)
  }
}
