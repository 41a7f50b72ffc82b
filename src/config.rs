//! # Configuration Module
//!
//! This module provides configuration support for hdrfmt: header file names,
//! the reformatter invocation, which files are collected from directories,
//! and how output files are written.
//!
//! Configuration can be specified in a `.hdrfmt.toml` file or via the
//! `HDRFMT_CONFIG` environment variable. Command-line flags override it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::formatter::FormatterCommand;
use crate::header::{DEFAULT_ALTERNATE_FILE_NAME, DEFAULT_FILE_NAME, DEFAULT_SENTINEL_DIR, HeaderLocator};
use crate::processor::{DEFAULT_EXTENSIONS, FileCollector};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".hdrfmt.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "HDRFMT_CONFIG";

/// Environment variable whose first entry bounds the header search by default.
pub const DEFAULT_ROOT_ENV: &str = "GOPATH";

/// Header file lookup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HeaderConfig {
  /// Header file name looked up in each ancestor directory.
  pub file_name: String,

  /// Header file name used below the sentinel directory.
  pub alternate_file_name: String,

  /// Directory name that switches to `alternate_file_name`.
  pub sentinel_dir: String,

  /// Environment variable holding the default search root (a path list; the
  /// first entry is used).
  pub root_env: String,
}

impl Default for HeaderConfig {
  fn default() -> Self {
    Self {
      file_name: DEFAULT_FILE_NAME.to_string(),
      alternate_file_name: DEFAULT_ALTERNATE_FILE_NAME.to_string(),
      sentinel_dir: DEFAULT_SENTINEL_DIR.to_string(),
      root_env: DEFAULT_ROOT_ENV.to_string(),
    }
  }
}

/// External reformatter invocation.
///
/// An empty `*-arg` value stops that option from being passed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FormatterConfig {
  pub command: String,
  pub args: Vec<String>,
  pub all_errors_arg: String,
  pub local_arg: String,
  pub srcdir_arg: String,
}

impl Default for FormatterConfig {
  fn default() -> Self {
    let command = FormatterCommand::default();
    Self {
      command: command.program,
      args: command.args,
      all_errors_arg: command.all_errors_arg.unwrap_or_default(),
      local_arg: command.local_arg.unwrap_or_default(),
      srcdir_arg: command.srcdir_arg.unwrap_or_default(),
    }
  }
}

/// Which files are collected when walking directories.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilesConfig {
  /// Extensions without the leading dot.
  pub extensions: Vec<String>,
}

impl Default for FilesConfig {
  fn default() -> Self {
    Self {
      extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
    }
  }
}

/// How results are written.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
  /// Octal permission bits for overwritten files; unset keeps the original
  /// permissions.
  pub file_mode: Option<String>,

  /// External diff program; unset uses the built-in diff.
  pub diff_command: Option<String>,
}

/// Main configuration struct for hdrfmt.
///
/// This struct is loaded from a `.hdrfmt.toml` file. Every section and key is
/// optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub header: HeaderConfig,
  pub formatter: FormatterConfig,
  pub files: FilesConfig,
  pub output: OutputConfig,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}'")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}'")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A value is out of range or malformed.
  #[error("Invalid value for '{key}': {message}")]
  InvalidValue { key: String, message: String },
}

impl ConfigError {
  fn invalid(key: &str, message: impl Into<String>) -> Self {
    Self::InvalidValue {
      key: key.to_string(),
      message: message.into(),
    }
  }
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read,
  /// parsed or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;
    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Header file and directory names are non-empty plain names
  /// - The formatter command is non-empty
  /// - Extensions are non-empty and don't include the leading dot
  /// - `file-mode` is an octal number no greater than `7777`
  pub fn validate(&self) -> Result<(), ConfigError> {
    for (key, name) in [
      ("header.file-name", &self.header.file_name),
      ("header.alternate-file-name", &self.header.alternate_file_name),
      ("header.sentinel-dir", &self.header.sentinel_dir),
    ] {
      if name.is_empty() {
        return Err(ConfigError::invalid(key, "cannot be empty"));
      }
      if name.contains(['/', '\\']) {
        return Err(ConfigError::invalid(key, "must be a name, not a path"));
      }
    }

    if self.formatter.command.trim().is_empty() {
      return Err(ConfigError::invalid("formatter.command", "cannot be empty"));
    }

    if self.files.extensions.is_empty() {
      return Err(ConfigError::invalid("files.extensions", "at least one extension is required"));
    }
    for ext in &self.files.extensions {
      if ext.is_empty() {
        return Err(ConfigError::invalid("files.extensions", "extension cannot be empty"));
      }
      if ext.starts_with('.') {
        return Err(ConfigError::invalid(
          "files.extensions",
          format!("'{ext}' should not include leading dot"),
        ));
      }
    }

    self.file_mode()?;
    Ok(())
  }

  /// Parsed `output.file-mode`.
  pub fn file_mode(&self) -> Result<Option<u32>, ConfigError> {
    self.output.file_mode.as_deref().map(parse_file_mode).transpose()
  }

  /// The header locator described by the `[header]` section.
  pub fn locator(&self) -> HeaderLocator {
    HeaderLocator::new(
      &self.header.file_name,
      &self.header.alternate_file_name,
      &self.header.sentinel_dir,
    )
  }

  /// The reformatter invocation described by the `[formatter]` section.
  pub fn formatter_command(&self) -> FormatterCommand {
    let flag = |arg: &String| Some(arg.clone()).filter(|arg| !arg.is_empty());
    FormatterCommand {
      program: self.formatter.command.clone(),
      args: self.formatter.args.clone(),
      all_errors_arg: flag(&self.formatter.all_errors_arg),
      local_arg: flag(&self.formatter.local_arg),
      srcdir_arg: flag(&self.formatter.srcdir_arg),
    }
  }

  /// The directory file collector described by the `[files]` section.
  pub fn collector(&self) -> FileCollector {
    FileCollector::new(self.files.extensions.clone())
  }
}

/// Parses octal permission bits such as `644` or `0o755`.
pub fn parse_file_mode(value: &str) -> Result<u32, ConfigError> {
  let digits = value.trim_start_matches("0o");
  let mode = u32::from_str_radix(digits, 8)
    .map_err(|e| ConfigError::invalid("output.file-mode", format!("'{value}' is not an octal number: {e}")))?;
  if mode > 0o7777 {
    return Err(ConfigError::invalid(
      "output.file-mode",
      format!("'{value}' is larger than 7777"),
    ));
  }
  Ok(mode)
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `HDRFMT_CONFIG` environment variable
/// 3. `.hdrfmt.toml` in the current directory
///
/// An explicit path is returned even when it does not exist, so that loading
/// it reports the error.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `current_dir` - The directory to look for `.hdrfmt.toml` in
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, current_dir: &Path) -> Option<PathBuf> {
  // 1. Explicit path from CLI takes highest priority
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  // 2. Check environment variable
  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  // 3. Check the current directory
  let local_config = current_dir.join(DEFAULT_CONFIG_FILENAME);
  if local_config.is_file() {
    verbose_log!("Using config: {}", local_config.display());
    return Some(local_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or return the defaults.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `current_dir` - The directory to look for `.hdrfmt.toml` in
/// * `no_config` - If true, skip config file discovery and use defaults
pub fn load_config(explicit_path: Option<&Path>, current_dir: &Path, no_config: bool) -> Result<Config> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(Config::default());
  }

  match discover_config_path(explicit_path, current_dir) {
    Some(path) => Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display())),
    None => Ok(Config::default()),
  }
}
