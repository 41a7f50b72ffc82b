//! # Header Module
//!
//! This module owns the license header: how it is represented, where it is
//! found on disk, and how it is put in front of a document.
//!
//! The module includes:
//! - [`Header`], the immutable line sequence resolved for one file
//! - [`HeaderLocator`] for discovering header files by walking up the
//!   directory tree
//! - [`HeaderInjector`], the pipeline stage that prepends the header when a
//!   document does not already start with it
//!
//! ## Example
//!
//! ```rust
//! use hdrfmt::header::{Header, inject_header};
//!
//! let header = Header::new(["// H1", "// H2"]);
//! let injected = inject_header(&header, b"package main\n");
//! assert_eq!(injected, b"// H1\n// H2\npackage main\n");
//!
//! // Injecting again leaves the document untouched.
//! assert_eq!(inject_header(&header, &injected), injected);
//! ```

mod detection;
mod injector;
mod locator;

use std::path::{Path, PathBuf};

pub use detection::{HeaderDetector, PrefixLineDetector, document_lines};
pub use injector::{HeaderInjector, inject_header};
pub use locator::{DEFAULT_ALTERNATE_FILE_NAME, DEFAULT_FILE_NAME, DEFAULT_SENTINEL_DIR, HeaderLocator};

/// Errors raised while resolving a header for a file.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
  /// The header file exists (or was requested) but could not be read.
  #[error("Failed to read license header '{path}'")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The current directory could not be determined while building absolute
  /// search paths.
  #[error("Failed to resolve current directory")]
  CurrentDir(#[source] std::io::Error),
}

/// A license banner as an ordered list of lines.
///
/// Lines never contain `\n` and never end in `\r`; both normalizations are
/// applied on construction so that a header prepended through
/// [`to_bytes`](Self::to_bytes) is always recognized again by the line
/// scanner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
  lines: Vec<String>,
}

impl Header {
  /// Builds a header from individual lines.
  ///
  /// Embedded newlines split a line in two.
  pub fn new<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let lines = lines
      .into_iter()
      .flat_map(|line| line.as_ref().split('\n').map(normalize_line).collect::<Vec<_>>())
      .collect();
    Self { lines }
  }

  /// Parses the text of a header file.
  ///
  /// The text is split on every `\n`, so a file ending in a newline yields a
  /// trailing empty line. That line becomes the blank separator between the
  /// banner and the rest of the document.
  pub fn parse(text: &str) -> Self {
    Self {
      lines: text.split('\n').map(normalize_line).collect(),
    }
  }

  /// Inverse of [`to_bytes`](Self::to_bytes).
  ///
  /// Every line of the blob is expected to be newline terminated; a missing
  /// final newline is tolerated.
  pub fn from_bytes(blob: &[u8]) -> Self {
    if blob.is_empty() {
      return Self::default();
    }
    let text = String::from_utf8_lossy(blob);
    let text = text.strip_suffix('\n').unwrap_or(&text);
    Self::parse(text)
  }

  /// Reads and parses a header file.
  ///
  /// The file is read as raw bytes; invalid UTF-8 sequences are replaced with
  /// U+FFFD rather than rejected.
  pub fn load(path: &Path) -> Result<Self, HeaderError> {
    let bytes = std::fs::read(path).map_err(|e| HeaderError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;
    Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
  }

  /// The header lines, used for comparison against a document's leading
  /// lines.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// The injectable form: every line followed by a newline.
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut blob = Vec::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
    for line in &self.lines {
      blob.extend_from_slice(line.as_bytes());
      blob.push(b'\n');
    }
    blob
  }
}

fn normalize_line(line: &str) -> String {
  line.trim_end_matches('\r').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_keeps_trailing_blank_line() {
    let header = Header::parse("// Licensed to Example\n// under Apache 2.0\n");
    assert_eq!(header.lines(), ["// Licensed to Example", "// under Apache 2.0", ""]);
    assert_eq!(header.to_bytes(), b"// Licensed to Example\n// under Apache 2.0\n\n");
  }

  #[test]
  fn test_parse_strips_carriage_returns() {
    let header = Header::parse("// a\r\n// b\r\n");
    assert_eq!(header.lines(), ["// a", "// b", ""]);
  }

  #[test]
  fn test_new_splits_embedded_newlines() {
    let header = Header::new(["// a\n// b", "// c\r"]);
    assert_eq!(header.lines(), ["// a", "// b", "// c"]);
  }

  #[test]
  fn test_bytes_round_trip() {
    for header in [
      Header::new(["// H1", "// H2"]),
      Header::parse("// H1\n// H2\n"),
      Header::new([""]),
      Header::new(["", "", "x"]),
      Header::default(),
    ] {
      assert_eq!(Header::from_bytes(&header.to_bytes()), header);
    }
  }

  #[test]
  fn test_load_missing_file() {
    let err = Header::load(Path::new("/nonexistent/.go_license_header")).expect_err("should fail");
    assert!(matches!(err, HeaderError::ReadError { .. }));
    assert!(err.to_string().contains("/nonexistent/.go_license_header"));
  }

  #[test]
  fn test_load_accepts_non_utf8_header() {
    let temp = tempfile::TempDir::new().expect("create temp dir");
    let path = temp.path().join(".go_license_header");
    std::fs::write(&path, b"// Copyright \xa9 Example\n").expect("write");

    let header = Header::load(&path).expect("latin-1 header loads");
    assert_eq!(header.lines(), ["// Copyright \u{FFFD} Example", ""]);
  }
}
