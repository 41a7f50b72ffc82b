//! # Formatter Module
//!
//! A formatter turns the bytes of one document into new bytes. The header
//! injector and the external reformatter are both formatters, chained by a
//! [`Pipeline`] in a fixed order: header first, reformatting second, so the
//! reformatter sees the final text layout.

mod command;

use std::path::Path;

use anyhow::Result;
pub use command::{CommandFormatter, DEFAULT_COMMAND, FormatError, FormatterCommand, ReformatOptions};
use tracing::trace;

use crate::header::{Header, HeaderInjector};

/// A document transformation.
///
/// `target` is the path the document should be treated as living at; it may
/// differ from the path the bytes were read from. Implementations must not
/// keep state between calls beyond what they were configured with.
pub trait Formatter {
  /// Short name used in diagnostics.
  fn name(&self) -> &str;

  fn format(&self, target: &Path, src: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Formatter for F
where
  F: Fn(&Path, &[u8]) -> Result<Vec<u8>>,
{
  fn name(&self) -> &str {
    "custom"
  }

  fn format(&self, target: &Path, src: &[u8]) -> Result<Vec<u8>> {
    self(target, src)
  }
}

/// Runs `stages` in order, each over the previous stage's output.
///
/// The first error aborts the chain and is returned as is; `src` is never
/// modified.
pub fn apply_formatters(stages: &[&dyn Formatter], target: &Path, src: &[u8]) -> Result<Vec<u8>> {
  let mut contents = src.to_vec();
  for stage in stages {
    trace!("Applying {} to {}", stage.name(), target.display());
    contents = stage.format(target, &contents)?;
  }
  Ok(contents)
}

/// The fixed `[header, reformat]` chain for one document.
///
/// Either stage may be missing: no header is injected when none was
/// resolved, and reformatting can be switched off.
pub struct Pipeline<'a> {
  header: Option<HeaderInjector>,
  reformatter: Option<&'a dyn Formatter>,
}

impl<'a> Pipeline<'a> {
  pub fn new(header: Option<Header>, reformatter: Option<&'a dyn Formatter>) -> Self {
    Self {
      header: header.map(HeaderInjector::new),
      reformatter,
    }
  }

  pub fn stages(&self) -> Vec<&dyn Formatter> {
    let mut stages: Vec<&dyn Formatter> = Vec::with_capacity(2);
    if let Some(ref header) = self.header {
      stages.push(header);
    }
    if let Some(reformatter) = self.reformatter {
      stages.push(reformatter);
    }
    stages
  }

  pub fn apply(&self, target: &Path, src: &[u8]) -> Result<Vec<u8>> {
    apply_formatters(&self.stages(), target, src)
  }
}
