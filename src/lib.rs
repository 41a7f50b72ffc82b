//! # hdrfmt
//!
//! A source formatter front-end that makes sure every file starts with the
//! license header that applies to it, then hands the file to an external
//! formatter.
//!
//! `hdrfmt` looks for a header file by walking up from each source file's
//! directory, prepends the header when the file does not already start with
//! it, and pipes the result through a reformatter (`goimports` by default).
//! The result is streamed, listed, written back or shown as a diff.
//!
//! ## Features
//!
//! * Directory-scoped header files, with an alternate header below a sentinel
//!   directory (`x-pack` by default)
//! * Idempotent injection: a file that already starts with its header is left
//!   alone
//! * Fixed `[header, reformat]` pipeline with an external formatter
//! * List, write, diff or stream modes, matching the usual `gofmt` flags
//! * Built-in unified diffs, or an external `diff -u`
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use hdrfmt::processor::{OutputActions, Processor, ProcessorConfig, Settings};
//!
//! let settings = Settings {
//!   search_root: Some(PathBuf::from("/src")),
//!   actions: OutputActions {
//!     list: true,
//!     ..OutputActions::default()
//!   },
//!   ..Settings::default()
//! };
//!
//! // No reformatter: only headers are checked.
//! let processor = Processor::new(ProcessorConfig::new(settings));
//! let summary = processor.run(&[PathBuf::from("/src/pkg")], &mut std::io::stdout());
//! println!("{} files need a header", summary.changed);
//! ```
//!
//! ## Modules
//!
//! * [`header`] - Header representation, discovery and injection
//! * [`formatter`] - The formatter pipeline and the external reformatter
//! * [`processor`] - File collection, processing and output dispatch
//! * [`diff`] - Unified diff engines
//! * [`config`] - `.hdrfmt.toml` configuration
//! * [`logging`] - Logging utilities for verbose output

pub mod cli;
pub mod config;
pub mod diff;
pub mod formatter;
pub mod header;
pub mod logging;
pub mod output;
pub mod processor;
