//! # Diff Module
//!
//! This module produces unified diffs between a document's original bytes and
//! the bytes the pipeline produced.
//!
//! Two engines are available:
//! - [`TextDiffEngine`] computes the diff in process with the `similar`
//!   crate. This is the default.
//! - [`ExternalDiffEngine`] writes both buffers to temporary files and runs an
//!   external `diff -u`.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use similar::{ChangeTag, TextDiff};
use tempfile::NamedTempFile;
use tracing::debug;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Errors produced while computing a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
  /// A temporary file for one side of the diff could not be created or
  /// written.
  #[error("Failed to write temporary file")]
  TempFile(#[source] std::io::Error),

  /// The diff tool could not be started.
  #[error("Failed to run '{program}'")]
  Spawn { program: String, source: std::io::Error },

  /// The diff tool failed without printing anything.
  #[error("'{program}' exited with {status} and no output")]
  Failed { program: String, status: ExitStatus },

  /// The in-process diff could not be serialized.
  #[error("Failed to render diff")]
  Render(#[source] std::io::Error),
}

/// Computes unified diffs.
pub trait DiffEngine {
  /// Returns the unified diff turning `old` into `new`; empty when they are
  /// equal.
  fn diff(&self, old: &[u8], new: &[u8]) -> Result<Vec<u8>, DiffError>;
}

/// In-process, line based unified diff.
///
/// Works on raw bytes, so documents that are not valid UTF-8 diff exactly.
/// Lines end at `\n` only; a `\r` anywhere is ordinary content, which keeps
/// the output applicable with `patch`.
pub struct TextDiffEngine {
  old_label: String,
  new_label: String,
}

impl Default for TextDiffEngine {
  fn default() -> Self {
    Self::new("original", "formatted")
  }
}

impl TextDiffEngine {
  pub fn new(old_label: impl Into<String>, new_label: impl Into<String>) -> Self {
    Self {
      old_label: old_label.into(),
      new_label: new_label.into(),
    }
  }
}

impl DiffEngine for TextDiffEngine {
  fn diff(&self, old: &[u8], new: &[u8]) -> Result<Vec<u8>, DiffError> {
    if old == new {
      return Ok(Vec::new());
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let diff = TextDiff::from_slices(&old_lines, &new_lines);

    let mut out = Vec::new();
    self.render(&diff, &mut out).map_err(DiffError::Render)?;
    Ok(out)
  }
}

impl TextDiffEngine {
  fn render<'a>(&self, diff: &TextDiff<'a, 'a, 'a, [u8]>, out: &mut Vec<u8>) -> std::io::Result<()> {
    writeln!(out, "--- {}", self.old_label)?;
    writeln!(out, "+++ {}", self.new_label)?;

    let mut unified = diff.unified_diff();
    unified.context_radius(CONTEXT_LINES);
    for hunk in unified.iter_hunks() {
      writeln!(out, "{}", hunk.header())?;
      for change in hunk.iter_changes() {
        let sign: &[u8] = match change.tag() {
          ChangeTag::Equal => b" ",
          ChangeTag::Delete => b"-",
          ChangeTag::Insert => b"+",
        };
        let line = change.value();
        out.write_all(sign)?;
        out.write_all(line)?;
        if !line.ends_with(b"\n") {
          out.write_all(b"\n\\ No newline at end of file\n")?;
        }
      }
    }
    Ok(())
  }
}

/// Splits `data` after every `\n`, keeping the terminators. A final line
/// without one is kept as is.
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
  data.split_inclusive(|b| *b == b'\n').collect()
}

/// Shells out to an external unified diff tool.
///
/// Each side is materialized in its own temporary file which is removed when
/// the call returns, whatever the outcome.
pub struct ExternalDiffEngine {
  program: String,
  /// Where the temporary files go; the system temp directory when unset.
  temp_dir: Option<PathBuf>,
}

impl Default for ExternalDiffEngine {
  fn default() -> Self {
    Self::new("diff", None)
  }
}

impl ExternalDiffEngine {
  pub fn new(program: impl Into<String>, temp_dir: Option<PathBuf>) -> Self {
    Self {
      program: program.into(),
      temp_dir,
    }
  }

  fn write_temp(&self, content: &[u8]) -> Result<NamedTempFile, DiffError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("hdrfmt");
    let mut file = match self.temp_dir {
      Some(ref dir) => builder.tempfile_in(dir),
      None => builder.tempfile(),
    }
    .map_err(DiffError::TempFile)?;
    file.write_all(content).map_err(DiffError::TempFile)?;
    file.flush().map_err(DiffError::TempFile)?;
    Ok(file)
  }
}

impl DiffEngine for ExternalDiffEngine {
  fn diff(&self, old: &[u8], new: &[u8]) -> Result<Vec<u8>, DiffError> {
    let old_file = self.write_temp(old)?;
    let new_file = self.write_temp(new)?;

    debug!(
      "Running {} -u {} {}",
      self.program,
      old_file.path().display(),
      new_file.path().display()
    );

    let output = Command::new(&self.program)
      .arg("-u")
      .arg(old_file.path())
      .arg(new_file.path())
      .output()
      .map_err(|e| DiffError::Spawn {
        program: self.program.clone(),
        source: e,
      })?;

    let mut data = output.stdout;
    data.extend_from_slice(&output.stderr);

    // diff exits 1 when the inputs differ; any output at all means it ran.
    if data.is_empty() && !output.status.success() {
      return Err(DiffError::Failed {
        program: self.program.clone(),
        status: output.status,
      });
    }

    Ok(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identical_inputs_have_empty_diff() -> Result<(), DiffError> {
    let engine = TextDiffEngine::default();
    assert!(engine.diff(b"package main\n", b"package main\n")?.is_empty());
    assert!(engine.diff(b"", b"")?.is_empty());
    Ok(())
  }

  #[test]
  fn test_header_insertion_hunk() -> Result<(), DiffError> {
    let engine = TextDiffEngine::default();
    let diff = engine.diff(b"package main\n", b"// H1\n// H2\npackage main\n")?;
    let diff = String::from_utf8(diff).expect("utf-8 diff");

    assert!(diff.starts_with("--- original\n+++ formatted\n"));
    assert!(diff.contains("@@ -1 +1,3 @@\n"));
    assert!(diff.contains("+// H1\n+// H2\n package main\n"));
    Ok(())
  }

  #[test]
  fn test_missing_newline_marker() -> Result<(), DiffError> {
    let diff = TextDiffEngine::default().diff(b"a", b"a\n")?;
    let diff = String::from_utf8(diff).expect("utf-8 diff");
    assert!(diff.contains("\\ No newline at end of file"));
    Ok(())
  }

  #[test]
  fn test_non_utf8_input() -> Result<(), DiffError> {
    let diff = TextDiffEngine::default().diff(b"\xff\xfe\n", b"\xff\xfd\n")?;
    assert!(diff.windows(3).any(|w| w == b"-\xff\xfe"));
    assert!(diff.windows(3).any(|w| w == b"+\xff\xfd"));
    Ok(())
  }

  #[test]
  fn test_carriage_return_is_line_content() -> Result<(), DiffError> {
    let diff = TextDiffEngine::default().diff(b"a\rb\n", b"x\n")?;
    assert_eq!(diff, b"--- original\n+++ formatted\n@@ -1 +1 @@\n-a\rb\n+x\n");

    let diff = TextDiffEngine::default().diff(b"a\r", b"b\n")?;
    assert_eq!(
      diff,
      b"--- original\n+++ formatted\n@@ -1 +1 @@\n-a\r\n\\ No newline at end of file\n+b\n"
    );
    Ok(())
  }

  fn scratch_engine(program: &str) -> (tempfile::TempDir, ExternalDiffEngine) {
    let scratch = tempfile::TempDir::new().expect("create temp dir");
    let engine = ExternalDiffEngine::new(program, Some(scratch.path().to_path_buf()));
    (scratch, engine)
  }

  fn assert_empty(dir: &tempfile::TempDir) {
    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).expect("read dir").collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
  }

  #[cfg(unix)]
  #[test]
  fn test_external_engine_reports_spawn_failure() {
    let (scratch, engine) = scratch_engine("hdrfmt-no-such-diff");
    let err = engine.diff(b"a\n", b"b\n").expect_err("should fail");
    assert!(matches!(err, DiffError::Spawn { .. }));
    assert_empty(&scratch);
  }

  #[cfg(unix)]
  #[test]
  fn test_external_engine_failure_without_output() {
    let (scratch, engine) = scratch_engine("false");
    let err = engine.diff(b"a\n", b"b\n").expect_err("should fail");
    assert!(matches!(err, DiffError::Failed { .. }));
    assert_empty(&scratch);
  }

  #[cfg(unix)]
  #[test]
  fn test_external_engine_output_wins_over_status() -> Result<(), DiffError> {
    // echo prints its arguments and exits 0.
    let (scratch, engine) = scratch_engine("echo");
    let data = engine.diff(b"a\n", b"b\n")?;
    assert!(data.starts_with(b"-u "));
    assert_empty(&scratch);
    Ok(())
  }

  #[cfg(unix)]
  #[test]
  fn test_external_engine_removes_temp_files_after_diff() -> Result<(), DiffError> {
    let (scratch, engine) = scratch_engine("diff");
    match engine.diff(b"a\n", b"b\n") {
      Ok(data) => assert!(!data.is_empty()),
      // No diff installed on this machine.
      Err(DiffError::Spawn { .. }) => {}
      Err(e) => return Err(e),
    }
    assert_empty(&scratch);
    Ok(())
  }
}
