//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod format;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use format::{FormatArgs, run_format};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Format standard input and print the result
  hdrfmt < main.go

  # List files whose header or formatting is off
  hdrfmt -l .

  # Fix files in place
  hdrfmt -w pkg/ cmd/main.go

  # Show what would change, using a specific header file
  hdrfmt -d --license LICENSE_HEADER pkg/

  # Only inject headers, without running the reformatter
  hdrfmt -w --no-reformat pkg/

  # Format stdin as if it were pkg/server/main.go
  hdrfmt --srcdir pkg/server/main.go < main.go
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub format_args: FormatArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_flags() {
    let cli = Cli::try_parse_from(["hdrfmt", "-l", "-d", "-e", "--licwd", "--local", "example.com/x", "a.go", "pkg"])
      .expect("valid arguments");
    let args = cli.format_args;
    assert!(args.list && args.diff && args.all_errors && args.licwd);
    assert!(!args.write);
    assert_eq!(args.local.as_deref(), Some("example.com/x"));
    assert_eq!(args.paths, [PathBuf::from("a.go"), PathBuf::from("pkg")]);
  }

  #[test]
  fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["hdrfmt", "-q", "-v"]).is_err());
  }
}
