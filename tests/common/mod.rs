#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Checks if an external `diff` is available on the system.
pub fn is_diff_available() -> bool {
  Command::new("diff").arg("--version").output().is_ok_and(|o| o.status.success())
}

/// Checks if GNU `patch` is available on the system.
pub fn is_patch_available() -> bool {
  Command::new("patch").arg("--version").output().is_ok_and(|o| o.status.success())
}

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> Result<()> {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Builds a tree of files under `root` from `(relative path, content)` pairs.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> Result<()> {
  for (rel, content) in files {
    write_file(root, rel, content)?;
  }
  Ok(())
}

/// Reads a file as UTF-8 text.
pub fn read(root: &Path, rel: &str) -> Result<String> {
  let path = root.join(rel);
  fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn split_lines(data: &[u8]) -> Vec<&[u8]> {
  data.split_inclusive(|b| *b == b'\n').collect()
}

fn parse_range(range: &str) -> Result<(usize, usize)> {
  match range.split_once(',') {
    Some((start, len)) => Ok((start.parse()?, len.parse()?)),
    None => Ok((range.parse()?, 1)),
  }
}

/// Parses `@@ -a,b +c,d @@` into `(a, b, c, d)`.
fn parse_hunk_header(line: &[u8]) -> Result<(usize, usize, usize, usize)> {
  let text = std::str::from_utf8(line)?;
  let mut parts = text.split_whitespace();
  let (Some("@@"), Some(old), Some(new)) = (parts.next(), parts.next(), parts.next()) else {
    bail!("malformed hunk header: {text}");
  };
  let old = old.strip_prefix('-').context("old range must start with '-'")?;
  let new = new.strip_prefix('+').context("new range must start with '+'")?;
  let (old_start, old_len) = parse_range(old)?;
  let (new_start, new_len) = parse_range(new)?;
  Ok((old_start, old_len, new_start, new_len))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LastLine {
  Old,
  New,
  Both,
}

/// Applies a unified diff to `original`, byte for byte.
///
/// File headers and anything before the first hunk are ignored. The
/// `\ No newline at end of file` marker strips the newline of the line it
/// follows on the new side.
pub fn apply_unified_patch(original: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
  let old_lines = split_lines(original);
  let patch_lines = split_lines(patch);
  let mut out = Vec::with_capacity(original.len());
  let mut next_old = 0;
  let mut i = 0;

  while i < patch_lines.len() {
    if !patch_lines[i].starts_with(b"@@ ") {
      i += 1;
      continue;
    }

    let (old_start, old_len, _, new_len) = parse_hunk_header(patch_lines[i])?;
    let hunk_start = if old_len == 0 { old_start } else { old_start - 1 };
    if hunk_start < next_old || hunk_start > old_lines.len() {
      bail!("hunk starting at line {old_start} is out of order");
    }
    out.extend(old_lines[next_old..hunk_start].concat());
    next_old = hunk_start;
    i += 1;

    let (mut old_seen, mut new_seen) = (0, 0);
    let mut last = LastLine::Both;
    while i < patch_lines.len() && (old_seen < old_len || new_seen < new_len || patch_lines[i].starts_with(b"\\")) {
      let line = patch_lines[i];
      match line.first() {
        Some(b' ') | Some(b'\n') => {
          out.extend_from_slice(line.get(1..).unwrap_or_default());
          if line == b"\n" {
            out.push(b'\n');
          }
          next_old += 1;
          old_seen += 1;
          new_seen += 1;
          last = LastLine::Both;
        }
        Some(b'-') => {
          next_old += 1;
          old_seen += 1;
          last = LastLine::Old;
        }
        Some(b'+') => {
          out.extend_from_slice(&line[1..]);
          new_seen += 1;
          last = LastLine::New;
        }
        Some(b'\\') => {
          if last != LastLine::Old && out.last() == Some(&b'\n') {
            out.pop();
          }
        }
        _ => bail!("unexpected line in hunk: {:?}", String::from_utf8_lossy(line)),
      }
      i += 1;
    }
  }

  if next_old < old_lines.len() {
    out.extend(old_lines[next_old..].concat());
  }
  Ok(out)
}
