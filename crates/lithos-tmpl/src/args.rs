// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Command-line arguments.
//!
//! Besides the usual `--data`/`-d` spellings, the Go flag style `-data X` and
//! `-data=X` is accepted so existing `tmpl` invocations keep working.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;

use crate::format::DEFAULT_GOFMT;
use crate::render::MissingKey;

/// Render Go text/template files against JSON data.
///
/// Each `<name>.tmpl` is rendered to `<name>` next to it, with the same
/// permissions. Go outputs get a "DO NOT EDIT" banner.
#[derive(Parser, Clone, Debug)]
#[command(name = "lithos-tmpl", version)]
pub struct Args {
    /// Template data: inline JSON, `@path` to read a JSON file, or `@-` for stdin
    #[arg(short = 'd', long, value_name = "JSON|@PATH", env = "LITHOS_TMPL_DATA")]
    pub data: Option<String>,

    /// Pipe generated Go sources through gofmt
    #[arg(long)]
    pub gofmt: bool,

    /// Formatter binary used by --gofmt
    #[arg(long, value_name = "BIN", env = "LITHOS_TMPL_GOFMT", default_value = DEFAULT_GOFMT)]
    pub gofmt_bin: PathBuf,

    /// What a lookup of an absent map key does: fail, or render as empty
    #[arg(long, value_enum, value_name = "MODE", default_value_t = MissingKey::Error)]
    pub missing_key: MissingKey,

    /// Render templates without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Template files to render, each ending in `.tmpl`
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

impl Args {
    /// Parses the process arguments, exiting with a usage message on failure.
    pub fn parse_compat() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Parses `args` (including the binary name) after Go-style flag rewriting.
    pub fn try_parse_compat<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// Default log level implied by `-v` and `-q`.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Rewrites Go-style `-data` flags into `--data`.
///
/// Arguments after a bare `--` are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut positional_only = false;
    for arg in args {
        let arg: OsString = arg.into();
        if positional_only {
            normalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("--") => {
                positional_only = true;
                normalized.push(arg);
            }
            Some("-data") => normalized.push(OsString::from("--data")),
            Some(flag) if flag.starts_with("-data=") => {
                normalized.push(OsString::from(format!("-{flag}")));
            }
            _ => normalized.push(arg),
        }
    }
    normalized
}
