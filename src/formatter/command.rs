//! External reformatter driven through a subprocess.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::Result;
use tracing::debug;

use super::Formatter;

/// Reformatter invoked when nothing else is configured.
pub const DEFAULT_COMMAND: &str = "goimports";

/// Errors from running the external reformatter.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
  /// The reformatter could not be started or talked to.
  #[error("Failed to run formatter '{program}'")]
  Spawn { program: String, source: std::io::Error },

  /// The reformatter rejected the document.
  #[error("formatter failed ({status}) on {target}: {stderr}")]
  Rejected {
    target: PathBuf,
    status: ExitStatus,
    stderr: String,
  },

  /// The reformatter exited before reading the whole document, so its output
  /// cannot stand in for it.
  #[error("formatter '{program}' did not read all of {target}")]
  Incomplete {
    program: String,
    target: PathBuf,
    source: std::io::Error,
  },
}

/// Options handed to the reformatter for every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReformatOptions {
  /// Report all errors instead of only the first few.
  pub all_errors: bool,
  /// Import path prefix to group after third-party imports.
  pub local_prefix: Option<String>,
}

/// How to spell the reformatter invocation.
///
/// Each `*_arg` is optional: when unset, the matching option is not passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterCommand {
  pub program: String,
  pub args: Vec<String>,
  pub all_errors_arg: Option<String>,
  pub local_arg: Option<String>,
  pub srcdir_arg: Option<String>,
}

impl Default for FormatterCommand {
  fn default() -> Self {
    Self {
      program: DEFAULT_COMMAND.to_string(),
      args: Vec::new(),
      all_errors_arg: Some("-e".to_string()),
      local_arg: Some("-local".to_string()),
      srcdir_arg: Some("-srcdir".to_string()),
    }
  }
}

/// Pipes documents through an external formatter on stdin/stdout.
///
/// Layout policy (tabs, comment handling, accepting fragments) belongs to the
/// external tool; this type only shapes the invocation and collects output.
pub struct CommandFormatter {
  command: FormatterCommand,
  options: ReformatOptions,
}

impl CommandFormatter {
  pub const fn new(command: FormatterCommand, options: ReformatOptions) -> Self {
    Self { command, options }
  }

  /// Full argument list for formatting `target`.
  pub fn args_for(&self, target: &Path) -> Vec<String> {
    let mut args = self.command.args.clone();
    if self.options.all_errors
      && let Some(ref flag) = self.command.all_errors_arg
    {
      args.push(flag.clone());
    }
    if let (Some(flag), Some(prefix)) = (&self.command.local_arg, &self.options.local_prefix) {
      args.push(flag.clone());
      args.push(prefix.clone());
    }
    if let Some(ref flag) = self.command.srcdir_arg {
      args.push(flag.clone());
      args.push(target.to_string_lossy().into_owned());
    }
    args
  }

  fn spawn_error(&self, source: std::io::Error) -> FormatError {
    FormatError::Spawn {
      program: self.command.program.clone(),
      source,
    }
  }
}

impl Formatter for CommandFormatter {
  fn name(&self) -> &str {
    &self.command.program
  }

  fn format(&self, target: &Path, src: &[u8]) -> Result<Vec<u8>> {
    let args = self.args_for(target);
    debug!("Running {} {:?}", self.command.program, args);

    let mut child = Command::new(&self.command.program)
      .args(&args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| self.spawn_error(e))?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
      self.spawn_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin not captured"))
    })?;

    // Feed stdin from a second thread so a large document cannot deadlock
    // against a full stdout pipe.
    let output = std::thread::scope(|scope| {
      let writer = scope.spawn(move || {
        let result = stdin.write_all(src);
        drop(stdin);
        result
      });
      let output = child.wait_with_output();
      let written = writer
        .join()
        .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
      (output, written)
    });

    let (output, written) = output;
    let output = output.map_err(|e| self.spawn_error(e))?;

    if !output.status.success() {
      return Err(
        FormatError::Rejected {
          target: target.to_path_buf(),
          status: output.status,
          stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        }
        .into(),
      );
    }

    written.map_err(|e| FormatError::Incomplete {
      program: self.command.program.clone(),
      target: target.to_path_buf(),
      source: e,
    })?;

    Ok(output.stdout)
  }
}
