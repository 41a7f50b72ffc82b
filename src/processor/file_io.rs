//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor.
//! Documents are handled as raw bytes; nothing here assumes UTF-8.

use std::io::{Read, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Reads a whole file.
  pub fn read_all(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
  }

  /// Drains a reader, typically standard input.
  pub fn read_stream(name: &str, input: &mut dyn Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    input
      .read_to_end(&mut buf)
      .with_context(|| format!("Failed to read {name}"))?;
    Ok(buf)
  }

  /// Replaces the content of `path`.
  ///
  /// The new content is written to a temporary file in the same directory and
  /// renamed over the original, so readers never observe a partial file. The
  /// original permissions are kept unless `mode` is given (Unix only).
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file to replace
  /// * `content` - Bytes to write
  /// * `mode` - Permission bits for the replaced file
  pub fn write_atomic(path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut temp =
      NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp
      .write_all(content)
      .and_then(|()| temp.flush())
      .with_context(|| format!("Failed to write file: {}", path.display()))?;

    #[cfg(unix)]
    let configured = mode.map(permissions_from_mode);
    #[cfg(not(unix))]
    let configured: Option<std::fs::Permissions> = {
      let _ = mode;
      None
    };
    let permissions = configured.or_else(|| std::fs::metadata(path).ok().map(|m| m.permissions()));
    if let Some(permissions) = permissions {
      std::fs::set_permissions(temp.path(), permissions)
        .with_context(|| format!("Failed to set permissions for {}", path.display()))?;
    }

    temp
      .persist(path)
      .map_err(|e| e.error)
      .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
  }
}

#[cfg(unix)]
fn permissions_from_mode(mode: u32) -> std::fs::Permissions {
  use std::os::unix::fs::PermissionsExt as _;
  std::fs::Permissions::from_mode(mode)
}
