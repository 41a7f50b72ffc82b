//! # Header Detection
//!
//! Interfaces and implementations for deciding whether a document already
//! carries a header. The detector is a trait so the injector does not depend
//! on one particular matching strategy.

use super::Header;

/// Trait for header detectors.
///
/// Implementations decide whether `document` already starts with `header`.
pub trait HeaderDetector {
  fn contains_header(&self, document: &[u8], header: &Header) -> bool;
}

/// Exact, line-for-line prefix matching.
///
/// The document's leading lines (as produced by [`document_lines`]) must
/// equal the header lines in order. There is no fuzzy matching and no
/// whitespace normalization besides dropping trailing carriage returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixLineDetector;

impl HeaderDetector for PrefixLineDetector {
  fn contains_header(&self, document: &[u8], header: &Header) -> bool {
    let mut lines = document_lines(document);
    header
      .lines()
      .iter()
      .all(|expected| lines.next().is_some_and(|line| line == expected.as_bytes()))
  }
}

/// Splits a document into lines the way a line scanner reads them.
///
/// Lines are separated by `\n`; trailing `\r` bytes are dropped; a trailing
/// newline does not produce a final empty line; an empty document has no
/// lines.
pub fn document_lines(document: &[u8]) -> impl Iterator<Item = &[u8]> {
  let body = document.strip_suffix(b"\n").unwrap_or(document);
  let empty = document.is_empty();
  body
    .split(|b| *b == b'\n')
    .filter(move |_| !empty)
    .map(trim_carriage_returns)
}

fn trim_carriage_returns(mut line: &[u8]) -> &[u8] {
  while let [rest @ .., b'\r'] = line {
    line = rest;
  }
  line
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(document: &[u8]) -> Vec<&[u8]> {
    document_lines(document).collect()
  }

  #[test]
  fn test_document_lines() {
    assert!(lines(b"").is_empty());
    assert_eq!(lines(b"\n"), vec![b"" as &[u8]]);
    assert_eq!(lines(b"a"), vec![b"a" as &[u8]]);
    assert_eq!(lines(b"a\n"), vec![b"a" as &[u8]]);
    assert_eq!(lines(b"a\n\n"), vec![b"a" as &[u8], b""]);
    assert_eq!(lines(b"a\r\nb\r\r\nc"), vec![b"a" as &[u8], b"b", b"c"]);
  }

  #[test]
  fn test_prefix_detector_matches_leading_lines() {
    let detector = PrefixLineDetector;
    let header = Header::new(["// H1", "// H2"]);

    assert!(detector.contains_header(b"// H1\n// H2\npackage main\n", &header));
    assert!(detector.contains_header(b"// H1\r\n// H2\r\npackage main\r\n", &header));
    assert!(detector.contains_header(b"// H1\n// H2", &header));
  }

  #[test]
  fn test_prefix_detector_rejects_partial_or_shifted_header() {
    let detector = PrefixLineDetector;
    let header = Header::new(["// H1", "// H2"]);

    assert!(!detector.contains_header(b"", &header));
    assert!(!detector.contains_header(b"// H1\n", &header));
    assert!(!detector.contains_header(b"\n// H1\n// H2\n", &header));
    assert!(!detector.contains_header(b"// H1 \n// H2\n", &header));
    assert!(!detector.contains_header(b"package main\n// H1\n// H2\n", &header));
  }

  #[test]
  fn test_trailing_blank_line_must_be_present() {
    let detector = PrefixLineDetector;
    let header = Header::parse("// H1\n");

    assert!(detector.contains_header(b"// H1\n\npackage main\n", &header));
    assert!(!detector.contains_header(b"// H1\npackage main\n", &header));
    // Only two lines are read from "// H1\n\n", which is enough.
    assert!(detector.contains_header(b"// H1\n\n", &header));
    assert!(!detector.contains_header(b"// H1\n", &header));
  }

  #[test]
  fn test_empty_header_is_always_present() {
    assert!(PrefixLineDetector.contains_header(b"anything", &Header::default()));
  }
}
