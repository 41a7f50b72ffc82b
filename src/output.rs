//! # Output Module
//!
//! This module centralizes the user-facing messages that are not document
//! output: per-file errors and the run summary.
//!
//! ## Design Goals
//!
//! - **Scriptable**: stdout only ever carries documents, listed names and
//!   diffs; everything here goes to stderr
//! - **Progressive**: the summary appears with `-v`, never with `-q`

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::processor::RunSummary;

/// Print a per-file failure as `<name>: <error chain>`.
///
/// Errors are shown even in quiet mode.
pub fn print_file_error(name: &str, err: &anyhow::Error) {
  eprintln!("{}: {:#}", name, err);
}

/// Print the processing summary.
///
/// Format: "Summary: N processed, M changed, K failed"
/// Only shown in verbose mode.
pub fn print_summary(summary: &RunSummary) {
  if is_quiet() || !is_verbose() {
    return;
  }

  eprintln!("{}", format_summary(summary));
}

fn format_summary(summary: &RunSummary) -> String {
  let processed_str = summary.processed.if_supports_color(Stream::Stderr, |s| s.cyan());
  let changed_str = if summary.changed > 0 {
    summary
      .changed
      .if_supports_color(Stream::Stderr, |s| s.yellow())
      .to_string()
  } else {
    summary.changed.if_supports_color(Stream::Stderr, |s| s.cyan()).to_string()
  };
  let failed_str = if summary.failed > 0 {
    summary.failed.if_supports_color(Stream::Stderr, |s| s.red()).to_string()
  } else {
    summary.failed.if_supports_color(Stream::Stderr, |s| s.dimmed()).to_string()
  };

  format!(
    "Summary: {} processed, {} changed, {} failed",
    processed_str, changed_str, failed_str
  )
}
