//! # hdrfmt
//!
//! Ensures source files start with their license header, then reformats them.

use std::process::ExitCode;

use anyhow::Result;
use hdrfmt::cli::{Cli, run_format};

fn main() -> Result<ExitCode> {
  let cli = Cli::parse_args();
  run_format(cli.format_args)
}
