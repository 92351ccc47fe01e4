#![forbid(unsafe_code)]
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Renders Go `text/template` files against JSON data.
//!
//! `lithos-tmpl` is the command-line front end of the Lithos templating stack.
//! Every `<name>.tmpl` given on the command line is rendered with
//! [`lithos_gotmpl_core`] and the Go builtin helpers, then written to `<name>`
//! with the template's permission bits. Go outputs are prefixed with a
//! "DO NOT EDIT" banner naming the template. A template that looks up a map
//! key the data does not have fails, as with Go's `missingkey=error`.
//!
//! ```no_run
//! use lithos_tmpl::{Invocation, Runner};
//! use serde_json::json;
//!
//! let invocation = Invocation::new(vec!["model.go.tmpl".into()], json!({"name": "User"}))?;
//! let written = Runner::new().run(&invocation)?;
//! assert_eq!(written, vec![std::path::PathBuf::from("model.go")]);
//! # Ok::<(), lithos_tmpl::Error>(())
//! ```

pub mod args;
pub mod data;
mod error;
pub mod format;
pub mod logging;
pub mod output;
mod render;
mod runner;
mod strict;
mod telemetry;

use std::path::PathBuf;

pub use args::Args;
pub use data::DataSource;
pub use error::{Error, Result};
pub use format::GoFormatter;
pub use render::{MissingKey, Renderer};
pub use runner::{Invocation, Runner};

/// Loads the data named by `args` and renders every template path in order.
///
/// Returns the written output paths, or the first error encountered.
pub fn run(args: &Args) -> Result<Vec<PathBuf>> {
    let invocation = Invocation::from_args(args)?;
    Runner::from_args(args).run(&invocation)
}
