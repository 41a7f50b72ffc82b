//! # File Collector Module
//!
//! This module provides utilities for collecting source files from
//! directories and for path normalization.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

/// Extensions recognized when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["go"];

/// File collector for directory traversal.
///
/// The `FileCollector` decides which files inside a directory tree are source
/// files. Files named explicitly on the command line bypass it.
#[derive(Debug, Clone)]
pub struct FileCollector {
  extensions: Vec<String>,
}

impl Default for FileCollector {
  fn default() -> Self {
    Self::new(DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect())
  }
}

impl FileCollector {
  /// Creates a collector accepting the given extensions (without the dot).
  pub const fn new(extensions: Vec<String>) -> Self {
    Self { extensions }
  }

  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }

  /// Whether `path` carries one of the recognized extensions.
  pub fn has_source_extension(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(OsStr::to_str)
      .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
  }

  /// Whether a file found during traversal should be processed: its name must
  /// not start with `.` and its extension must be recognized.
  pub fn is_source_file(&self, path: &Path) -> bool {
    let hidden = path
      .file_name()
      .is_some_and(|name| name.as_encoded_bytes().starts_with(b"."));
    !hidden && self.has_source_extension(path)
  }

  /// Walks `dir` recursively in lexical order, yielding source files and
  /// traversal errors as they are met.
  ///
  /// Hidden directories are descended into; only file names are filtered.
  /// Symbolic links are not followed.
  pub fn traverse_directory<'a>(&'a self, dir: &Path) -> impl Iterator<Item = walkdir::Result<PathBuf>> + 'a {
    debug!("Scanning directory: {}", dir.display());
    WalkDir::new(dir)
      .sort_by_file_name()
      .into_iter()
      .filter_map(move |entry| match entry {
        Ok(entry) if entry.file_type().is_file() && self.is_source_file(entry.path()) => {
          trace!("Collected {}", entry.path().display());
          Some(Ok(entry.into_path()))
        }
        Ok(_) => None,
        Err(e) => Some(Err(e)),
      })
  }
}

/// Chooses the path a document is formatted as.
///
/// Without `srcdir` the target is the file itself. With it, the document is
/// treated as living in another place:
/// - if `srcdir` is an existing regular file, or does not exist as a
///   directory and carries a recognized extension, it is the target itself;
/// - otherwise the target is `srcdir` joined with the file's base name.
pub fn resolve_target(filename: &Path, srcdir: Option<&Path>, collector: &FileCollector) -> PathBuf {
  let Some(srcdir) = srcdir else {
    return filename.to_path_buf();
  };

  let is_file = srcdir.metadata().is_ok_and(|m| m.is_file());
  let is_dir = srcdir.metadata().is_ok_and(|m| m.is_dir());
  if is_file || (!is_dir && collector.has_source_extension(srcdir)) {
    return srcdir.to_path_buf();
  }

  match filename.file_name() {
    Some(base) => srcdir.join(base),
    None => srcdir.to_path_buf(),
  }
}

/// Converts a potentially relative path to an absolute, lexically normalized
/// path.
///
/// # Parameters
///
/// * `path` - The path to absolutize
///
/// # Returns
///
/// The absolute path, or the error from reading the current directory.
pub fn absolutize_path(path: &Path) -> std::io::Result<PathBuf> {
  if path.is_absolute() {
    Ok(normalize_path(path))
  } else {
    Ok(normalize_path(&std::env::current_dir()?.join(path)))
  }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; leading `..` of a relative path is
/// kept.
///
/// # Examples
/// - `/a/b/../c` -> `/a/c`
/// - `/a/./b/` -> `/a/b`
/// - `/..` -> `/`
/// - `../a/b` -> `../a/b`
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match normalized.components().next_back() {
        Some(Component::Normal(_)) => {
          normalized.pop();
        }
        Some(Component::RootDir | Component::Prefix(_)) => {}
        Some(Component::ParentDir | Component::CurDir) | None => normalized.push(".."),
      },
      other => normalized.push(other.as_os_str()),
    }
  }

  if normalized.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    normalized
  }
}
