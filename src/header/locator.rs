//! # Header Locator
//!
//! Finds the header file that applies to a target path by walking up the
//! directory tree, from the target's directory (or the current directory)
//! toward a search root.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::HeaderError;
use crate::processor::absolutize_path;

/// Header file name looked up in every ancestor directory.
pub const DEFAULT_FILE_NAME: &str = ".go_license_header";

/// Header file name used once the walk has crossed the sentinel directory.
pub const DEFAULT_ALTERNATE_FILE_NAME: &str = ".go_xpack_license_header";

/// Directory name that switches the walk to the alternate header file name.
pub const DEFAULT_SENTINEL_DIR: &str = "x-pack";

/// Walks directory ancestry looking for header files.
///
/// The locator only looks at paths and directory structure; it never reads
/// the documents it resolves headers for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocator {
  file_name: String,
  alternate_file_name: String,
  sentinel_dir: String,
}

impl Default for HeaderLocator {
  fn default() -> Self {
    Self::new(DEFAULT_FILE_NAME, DEFAULT_ALTERNATE_FILE_NAME, DEFAULT_SENTINEL_DIR)
  }
}

impl HeaderLocator {
  pub fn new(file_name: impl Into<String>, alternate_file_name: impl Into<String>, sentinel_dir: impl Into<String>) -> Self {
    Self {
      file_name: file_name.into(),
      alternate_file_name: alternate_file_name.into(),
      sentinel_dir: sentinel_dir.into(),
    }
  }

  /// Resolves the header file for `target`.
  ///
  /// * `search_root` - upper boundary of the walk; the current directory when
  ///   `None`
  /// * `search_from_cwd` - start in the current directory instead of the
  ///   directory containing `target`
  ///
  /// Returns `Ok(None)` when no header file exists between the start and the
  /// root (inclusive) or the filesystem root.
  pub fn locate(
    &self,
    target: &Path,
    search_root: Option<&Path>,
    search_from_cwd: bool,
  ) -> Result<Option<PathBuf>, HeaderError> {
    let root = match search_root {
      Some(root) => absolutize_path(root).map_err(HeaderError::CurrentDir)?,
      None => std::env::current_dir().map_err(HeaderError::CurrentDir)?,
    };

    let start = if search_from_cwd {
      std::env::current_dir().map_err(HeaderError::CurrentDir)?
    } else {
      let target = absolutize_path(target).map_err(HeaderError::CurrentDir)?;
      match target.parent() {
        Some(parent) => parent.to_path_buf(),
        None => target,
      }
    };

    Ok(self.walk(&start, &root))
  }

  /// Walks from `start` up to and including `root`, or up to the filesystem
  /// root if `root` is never met.
  ///
  /// Both paths must be absolute.
  pub fn walk(&self, start: &Path, root: &Path) -> Option<PathBuf> {
    debug!("Searching header from {} up to {}", start.display(), root.display());

    let mut expected = self.file_name.as_str();
    let mut dir = Some(start);

    while let Some(current) = dir {
      // Sticky: every directory checked from here on uses the alternate name.
      if current.file_name().is_some_and(|name| name == self.sentinel_dir.as_str()) {
        expected = self.alternate_file_name.as_str();
      }

      let candidate = current.join(expected);
      trace!("Checking {}", candidate.display());
      if candidate.metadata().is_ok_and(|m| m.is_file()) {
        debug!("Found header file {}", candidate.display());
        return Some(candidate);
      }

      if current == root {
        break;
      }
      dir = current.parent();
    }

    debug!("No header file found for {}", start.display());
    None
  }
}
