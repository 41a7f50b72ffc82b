//! # Processor Module
//!
//! This module contains the core functionality for processing files and
//! directories: resolving the header for each file, running the formatter
//! pipeline and dispatching the result.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - File reading and writing operations
//! - [`file_collector`] - Directory traversal, target resolution and path
//!   normalization
//! - [`dispatch`] - Change detection and output actions
//!
//! The [`Processor`] struct is the main entry point for all file operations,
//! orchestrating the submodules to provide a cohesive API.

mod dispatch;
mod file_collector;
mod file_io;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
pub use dispatch::{Dispatcher, Outcome, OutputActions};
pub use file_collector::{DEFAULT_EXTENSIONS, FileCollector, absolutize_path, normalize_path, resolve_target};
pub use file_io::FileIO;
use tracing::{debug, trace};

use crate::diff::{DiffEngine, TextDiffEngine};
use crate::formatter::{Formatter, Pipeline};
use crate::header::{Header, HeaderLocator};
use crate::output;

/// Display name of a document read from standard input.
pub const STDIN_NAME: &str = "<standard input>";

/// Per-invocation settings, fixed before the first file is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
  /// Header file used for every document, bypassing the directory search.
  pub header_path: Option<PathBuf>,
  /// Start the header search in the current directory instead of the
  /// document's directory.
  pub search_from_cwd: bool,
  /// Upper boundary of the header search; the current directory when unset.
  pub search_root: Option<PathBuf>,
  /// Format documents as if they lived in this directory (or at this path).
  pub src_dir: Option<PathBuf>,
  /// What to do with changed documents.
  pub actions: OutputActions,
  /// Ask the reformatter to report all errors.
  pub all_errors: bool,
}

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub settings: Settings,
  pub locator: HeaderLocator,
  pub collector: FileCollector,

  // Optional components
  pub reformatter: Option<Box<dyn Formatter>>,
  pub diff_engine: Option<Box<dyn DiffEngine>>,
  pub file_mode: Option<u32>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with the given settings and defaults for
  /// everything else: default header file names, `.go` files, no
  /// reformatting and the in-process diff engine.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     reformatter: Some(Box::new(formatter)),
  ///     ..ProcessorConfig::new(settings)
  /// }
  /// ```
  pub fn new(settings: Settings) -> Self {
    Self {
      settings,
      locator: HeaderLocator::default(),
      collector: FileCollector::default(),
      reformatter: None,
      diff_engine: None,
      file_mode: None,
    }
  }
}

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
  /// Documents that went through the pipeline, successfully or not.
  pub processed: usize,
  /// Documents whose formatted output differs from the input.
  pub changed: usize,
  /// Documents or paths that failed.
  pub failed: usize,
}

impl RunSummary {
  pub const fn is_success(&self) -> bool {
    self.failed == 0
  }

  fn record(&mut self, result: &Result<Outcome>) {
    self.processed += 1;
    match result {
      Ok(Outcome::Changed) => self.changed += 1,
      Ok(Outcome::Unchanged) => {}
      Err(_) => self.failed += 1,
    }
  }
}

/// Processor for handling header injection and reformatting.
///
/// The `Processor` is responsible for:
/// - Walking directories for source files
/// - Resolving the header that applies to each file
/// - Running the `[header, reformat]` pipeline
/// - Listing, writing, diffing or streaming the result
///
/// Files are processed one at a time, in the order they are given.
pub struct Processor {
  settings: Settings,

  /// Finds header files by walking up from each document
  locator: HeaderLocator,

  /// Decides which files inside directories are processed
  collector: FileCollector,

  /// External reformatter, if reformatting is enabled
  reformatter: Option<Box<dyn Formatter>>,

  diff_engine: Box<dyn DiffEngine>,

  /// Permission bits for overwritten files
  file_mode: Option<u32>,

  /// Header files already loaded, keyed by path
  header_cache: RefCell<HashMap<PathBuf, Header>>,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  pub fn new(config: ProcessorConfig) -> Self {
    Self {
      settings: config.settings,
      locator: config.locator,
      collector: config.collector,
      reformatter: config.reformatter,
      diff_engine: config.diff_engine.unwrap_or_else(|| Box::new(TextDiffEngine::default())),
      file_mode: config.file_mode,
      header_cache: RefCell::new(HashMap::new()),
    }
  }

  /// Processes positional paths in order.
  ///
  /// Directories are walked for source files; anything else is processed as
  /// a single file regardless of its extension. Failures are reported on
  /// stderr as `<name>: <error>` and counted; processing always continues.
  ///
  /// # Parameters
  ///
  /// * `paths` - Files and directories to process
  /// * `out` - Sink for listed names, diffs and streamed documents
  pub fn run(&self, paths: &[PathBuf], out: &mut dyn Write) -> RunSummary {
    let mut summary = RunSummary::default();

    for path in paths {
      match path.metadata() {
        Err(e) => {
          output::print_file_error(&path.display().to_string(), &anyhow::Error::new(e));
          summary.failed += 1;
        }
        Ok(metadata) if metadata.is_dir() => self.process_directory(path, out, &mut summary),
        Ok(_) => {
          let result = self.process_file(path, out);
          report_failure(&path.display().to_string(), &result);
          summary.record(&result);
        }
      }
    }

    debug!(
      "Processed {} files: {} changed, {} failed",
      summary.processed, summary.changed, summary.failed
    );
    summary
  }

  fn process_directory(&self, dir: &Path, out: &mut dyn Write, summary: &mut RunSummary) {
    for entry in self.collector.traverse_directory(dir) {
      match entry {
        Ok(file) => {
          let result = self.process_file(&file, out);
          report_failure(&file.display().to_string(), &result);
          summary.record(&result);
        }
        Err(e) => {
          let name = e.path().unwrap_or(dir).display().to_string();
          output::print_file_error(&name, &anyhow::Error::new(e));
          summary.failed += 1;
        }
      }
    }
  }

  /// Reads standard input (or any reader) as one document and streams,
  /// lists or diffs the result under the name `<standard input>`.
  pub fn process_reader(&self, input: &mut dyn Read, out: &mut dyn Write) -> RunSummary {
    let mut summary = RunSummary::default();
    let result = self.process_stream(input, out);
    report_failure(STDIN_NAME, &result);
    summary.record(&result);
    summary
  }

  fn process_stream(&self, input: &mut dyn Read, out: &mut dyn Write) -> Result<Outcome> {
    anyhow::ensure!(!self.settings.actions.overwrite, "cannot use --write with standard input");
    let src = FileIO::read_stream(STDIN_NAME, input)?;
    let target = resolve_target(Path::new(STDIN_NAME), self.settings.src_dir.as_deref(), &self.collector);
    self.process_document(STDIN_NAME, None, &target, &src, out)
  }

  /// Processes one file from disk.
  pub fn process_file(&self, path: &Path, out: &mut dyn Write) -> Result<Outcome> {
    let src = FileIO::read_all(path)?;
    let target = resolve_target(path, self.settings.src_dir.as_deref(), &self.collector);
    self.process_document(&path.display().to_string(), Some(path), &target, &src, out)
  }

  /// Runs the pipeline over `src` and dispatches the result.
  ///
  /// # Parameters
  ///
  /// * `name` - Display name for listing, diff banners and errors
  /// * `path` - Where the document is stored; `None` when it cannot be
  ///   overwritten
  /// * `target` - Path the document is formatted as and the header is
  ///   resolved for
  /// * `src` - Document bytes
  /// * `out` - Output sink
  pub fn process_document(
    &self,
    name: &str,
    path: Option<&Path>,
    target: &Path,
    src: &[u8],
    out: &mut dyn Write,
  ) -> Result<Outcome> {
    trace!("Processing {} as {}", name, target.display());

    let header = self.resolve_header(target)?;
    let pipeline = Pipeline::new(header, self.reformatter.as_deref());
    let formatted = pipeline.apply(target, src)?;

    let dispatcher = Dispatcher::new(self.settings.actions, self.diff_engine.as_ref(), self.file_mode);
    dispatcher.dispatch(name, path, src, &formatted, out)
  }

  /// Resolves the header for `target`.
  ///
  /// An explicit header path always wins; otherwise the locator searches the
  /// directory tree. `Ok(None)` means no header applies.
  pub fn resolve_header(&self, target: &Path) -> Result<Option<Header>> {
    let path = match self.settings.header_path {
      Some(ref explicit) => explicit.clone(),
      None => {
        let located = self
          .locator
          .locate(target, self.settings.search_root.as_deref(), self.settings.search_from_cwd)?;
        match located {
          Some(path) => path,
          None => return Ok(None),
        }
      }
    };

    if let Some(header) = self.header_cache.borrow().get(&path) {
      return Ok(Some(header.clone()));
    }

    let header = Header::load(&path).context("resolving license header")?;
    debug!("Loaded {} header lines from {}", header.len(), path.display());
    self.header_cache.borrow_mut().insert(path, header.clone());
    Ok(Some(header))
  }
}

fn report_failure(name: &str, result: &Result<Outcome>) {
  if let Err(e) = result {
    output::print_file_error(name, e);
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;
  use crate::header::DEFAULT_FILE_NAME;

  fn processor(settings: Settings) -> Processor {
    Processor::new(ProcessorConfig::new(settings))
  }

  #[test]
  fn test_explicit_header_wins() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    fs::write(root.join(DEFAULT_FILE_NAME), "// located\n")?;
    fs::write(root.join("explicit.txt"), "// explicit\n")?;

    let processor = processor(Settings {
      header_path: Some(root.join("explicit.txt")),
      search_root: Some(root.to_path_buf()),
      ..Settings::default()
    });

    let header = processor.resolve_header(&root.join("main.go"))?;
    assert_eq!(header, Some(Header::parse("// explicit\n")));
    Ok(())
  }

  #[test]
  fn test_missing_header_still_formats() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    let upper = |_: &Path, src: &[u8]| -> Result<Vec<u8>> { Ok(src.to_ascii_uppercase()) };

    let processor = Processor::new(ProcessorConfig {
      reformatter: Some(Box::new(upper)),
      ..ProcessorConfig::new(Settings {
        search_root: Some(root.to_path_buf()),
        ..Settings::default()
      })
    });

    let target = root.join("main.go");
    assert_eq!(processor.resolve_header(&target)?, None);

    let mut out = Vec::new();
    let outcome = processor.process_document("main.go", None, &target, b"package main\n", &mut out)?;
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(out, b"PACKAGE MAIN\n");
    Ok(())
  }

  #[test]
  fn test_unreadable_explicit_header_fails_file() {
    let processor = processor(Settings {
      header_path: Some(PathBuf::from("/nonexistent/header")),
      ..Settings::default()
    });
    let err = processor
      .process_document("a.go", None, Path::new("a.go"), b"package a\n", &mut Vec::new())
      .expect_err("should fail");
    assert!(format!("{err:#}").contains("/nonexistent/header"));
  }

  #[test]
  fn test_header_cache_reuses_loaded_header() -> Result<()> {
    let temp = TempDir::new()?;
    let header_path = temp.path().join("h.txt");
    fs::write(&header_path, "// one\n")?;

    let processor = processor(Settings {
      header_path: Some(header_path.clone()),
      ..Settings::default()
    });
    let first = processor.resolve_header(Path::new("a.go"))?;
    fs::write(&header_path, "// two\n")?;
    assert_eq!(processor.resolve_header(Path::new("b.go"))?, first);
    Ok(())
  }

  #[test]
  fn test_run_counts_outcomes() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    fs::create_dir_all(root.join("pkg"))?;
    fs::write(root.join(DEFAULT_FILE_NAME), "// H\n")?;
    fs::write(root.join("pkg/a.go"), "// H\n\npackage pkg\n")?;
    fs::write(root.join("pkg/b.go"), "package pkg\n")?;
    fs::write(root.join("pkg/notes.txt"), "text\n")?;

    let processor = processor(Settings {
      search_root: Some(root.to_path_buf()),
      actions: OutputActions {
        list: true,
        ..OutputActions::default()
      },
      ..Settings::default()
    });

    let mut out = Vec::new();
    let summary = processor.run(&[root.join("pkg"), root.join("missing.go")], &mut out);

    assert_eq!(
      summary,
      RunSummary {
        processed: 2,
        changed: 1,
        failed: 1
      }
    );
    assert!(!summary.is_success());
    assert_eq!(String::from_utf8(out)?, format!("{}\n", root.join("pkg/b.go").display()));
    Ok(())
  }

  #[test]
  fn test_stdin_rejects_write() {
    let processor = processor(Settings {
      actions: OutputActions {
        overwrite: true,
        ..OutputActions::default()
      },
      ..Settings::default()
    });
    let mut input: &[u8] = b"package main\n";
    let summary = processor.process_reader(&mut input, &mut Vec::new());
    assert_eq!(summary.failed, 1);
  }

  #[test]
  fn test_srcdir_drives_header_search() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path();
    fs::create_dir_all(root.join("elsewhere"))?;
    fs::create_dir_all(root.join("input"))?;
    fs::write(root.join("elsewhere").join(DEFAULT_FILE_NAME), "// elsewhere\n")?;
    fs::write(root.join("input/main.go"), "package main\n")?;

    let processor = processor(Settings {
      search_root: Some(root.to_path_buf()),
      src_dir: Some(root.join("elsewhere")),
      ..Settings::default()
    });

    let mut out = Vec::new();
    processor.process_file(&root.join("input/main.go"), &mut out)?;
    assert_eq!(out, b"// elsewhere\n\npackage main\n");
    Ok(())
  }
}
