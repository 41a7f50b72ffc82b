//! # Format Command
//!
//! This module implements the only command: resolve headers, reformat, and
//! list, write, diff or stream the results.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::{Config, load_config};
use crate::diff::{DiffEngine, ExternalDiffEngine, TextDiffEngine};
use crate::formatter::{CommandFormatter, Formatter, ReformatOptions};
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::print_summary;
use crate::processor::{OutputActions, Processor, ProcessorConfig, STDIN_NAME, Settings};

/// Arguments for the format command
#[derive(Args, Debug, Default)]
pub struct FormatArgs {
  /// Files or directories to process. Directories are walked recursively.
  /// Reads standard input when empty.
  #[arg(required = false, value_name = "PATH")]
  pub paths: Vec<PathBuf>,

  /// List files whose formatting differs
  #[arg(short, long)]
  pub list: bool,

  /// Display diffs instead of rewriting files
  #[arg(short, long)]
  pub diff: bool,

  /// Write result to (source) file instead of stdout
  #[arg(short, long)]
  pub write: bool,

  /// Report all errors (not just the first 10 on different lines)
  #[arg(short = 'e', long)]
  pub all_errors: bool,

  /// Choose imports as if the source code is from this directory (or file)
  #[arg(long, value_name = "DIR")]
  pub srcdir: Option<PathBuf>,

  /// License header file to use for every file
  #[arg(long, value_name = "FILE")]
  pub license: Option<PathBuf>,

  /// Search for the license header starting in the current directory
  #[arg(long)]
  pub licwd: bool,

  /// Stop the license header search at this directory (default: first entry
  /// of the configured root variable, $GOPATH)
  #[arg(long, value_name = "DIR")]
  pub search_root: Option<PathBuf>,

  /// Put imports beginning with this string after 3rd-party packages
  #[arg(long, value_name = "PREFIX")]
  pub local: Option<String>,

  /// Only inject license headers; skip the external formatter
  #[arg(long)]
  pub no_reformat: bool,

  /// Use this program for diffs instead of the built-in diff
  #[arg(long, value_name = "CMD")]
  pub diff_tool: Option<String>,

  /// Path to config file (default: .hdrfmt.toml in the current directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl FormatArgs {
  /// Builds the per-run settings. Flags win over the environment.
  pub fn settings(&self, config: &Config) -> Settings {
    Settings {
      header_path: self.license.clone(),
      search_from_cwd: self.licwd,
      search_root: self
        .search_root
        .clone()
        .or_else(|| root_from_env(&config.header.root_env)),
      src_dir: self.srcdir.clone(),
      actions: OutputActions {
        list: self.list,
        overwrite: self.write,
        diff: self.diff,
      },
      all_errors: self.all_errors,
    }
  }

  fn reformatter(&self, config: &Config, settings: &Settings) -> Option<Box<dyn Formatter>> {
    if self.no_reformat {
      return None;
    }
    let options = ReformatOptions {
      all_errors: settings.all_errors,
      local_prefix: self.local.clone(),
    };
    Some(Box::new(CommandFormatter::new(config.formatter_command(), options)))
  }

  fn diff_engine(&self, config: &Config) -> Box<dyn DiffEngine> {
    match self.diff_tool.as_ref().or(config.output.diff_command.as_ref()) {
      Some(program) => Box::new(ExternalDiffEngine::new(program.clone(), None)),
      None => Box::new(TextDiffEngine::default()),
    }
  }
}

/// First entry of the path list in the environment variable `name`.
fn root_from_env(name: &str) -> Option<PathBuf> {
  let value = std::env::var_os(name)?;
  std::env::split_paths(&value).find(|path| !path.as_os_str().is_empty())
}

/// Run the format command with the given arguments
pub fn run_format(args: FormatArgs) -> Result<ExitCode> {
  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  // Set verbose mode for output formatting and verbose_log! macro
  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let current_dir = std::env::current_dir().context("Failed to determine current directory")?;
  let config = load_config(args.config.as_deref(), &current_dir, args.no_config)?;

  let settings = args.settings(&config);
  debug!("Settings: {:?}", settings);
  if let Some(ref root) = settings.search_root {
    debug!("License header search root: {}", root.display());
  }

  let processor = Processor::new(ProcessorConfig {
    locator: config.locator(),
    collector: config.collector(),
    reformatter: args.reformatter(&config, &settings),
    diff_engine: Some(args.diff_engine(&config)),
    file_mode: config.file_mode()?,
    ..ProcessorConfig::new(settings)
  });

  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  let summary = if args.paths.is_empty() {
    debug!("Reading {}", STDIN_NAME);
    processor.process_reader(&mut std::io::stdin().lock(), &mut out)
  } else {
    processor.run(&args.paths, &mut out)
  };
  out.flush().context("Failed to flush standard output")?;

  print_summary(&summary);

  Ok(if summary.is_success() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
