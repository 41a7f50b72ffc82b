use std::path::Path;

use anyhow::Result;
use tracing::trace;

use super::{Header, HeaderDetector, PrefixLineDetector};
use crate::formatter::Formatter;

/// Returns `document` with `header` in front of it, unless the document
/// already starts with the header.
///
/// Injection always happens at byte offset 0. Shebangs, build constraints and
/// foreign license banners are not looked past.
pub fn inject_header(header: &Header, document: &[u8]) -> Vec<u8> {
  HeaderInjector::new(header.clone()).inject(document)
}

/// Pipeline stage that makes sure a document starts with a header.
///
/// The header and its byte form are fixed at construction, so every check and
/// every injection for the file being processed sees the same header.
pub struct HeaderInjector {
  header: Header,
  blob: Vec<u8>,
  detector: Box<dyn HeaderDetector>,
}

impl HeaderInjector {
  pub fn new(header: Header) -> Self {
    Self::with_detector(header, Box::new(PrefixLineDetector))
  }

  pub fn with_detector(header: Header, detector: Box<dyn HeaderDetector>) -> Self {
    let blob = header.to_bytes();
    Self { header, blob, detector }
  }

  pub fn inject(&self, document: &[u8]) -> Vec<u8> {
    if self.detector.contains_header(document, &self.header) {
      trace!("Header already present");
      return document.to_vec();
    }

    let mut out = Vec::with_capacity(self.blob.len() + document.len());
    out.extend_from_slice(&self.blob);
    out.extend_from_slice(document);
    out
  }
}

impl Formatter for HeaderInjector {
  fn name(&self) -> &str {
    "license-header"
  }

  fn format(&self, _target: &Path, src: &[u8]) -> Result<Vec<u8>> {
    Ok(self.inject(src))
  }
}
