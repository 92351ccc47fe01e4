// SPDX-License-Identifier: Apache-2.0 OR MIT
//! The per-file pipeline: read, render, compose, optionally format, write.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::args::Args;
use crate::data::DataSource;
use crate::error::{Error, Result};
use crate::format::GoFormatter;
use crate::output::{compose, output_path};
use crate::render::Renderer;
use crate::telemetry;

/// Template paths plus the data they are rendered against.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    paths: Vec<PathBuf>,
    data: Value,
}

impl Invocation {
    /// Builds an invocation, rejecting an empty path list.
    pub fn new(paths: Vec<PathBuf>, data: Value) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::NoPaths);
        }
        Ok(Self { paths, data })
    }

    /// Builds an invocation from parsed arguments, loading `--data`.
    pub fn from_args(args: &Args) -> Result<Self> {
        Self::from_args_with_stdin(args, std::io::stdin().lock())
    }

    /// Like [`Invocation::from_args`], reading `@-` data from `stdin`.
    pub fn from_args_with_stdin<R: Read>(args: &Args, stdin: R) -> Result<Self> {
        if args.paths.is_empty() {
            return Err(Error::NoPaths);
        }
        let data = DataSource::parse(args.data.as_deref()).load_from(stdin)?;
        Self::new(args.paths.clone(), data)
    }

    /// Template paths in processing order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Root context handed to every template.
    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Renders template files to their sibling output files, one at a time.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    renderer: Renderer,
    formatter: Option<GoFormatter>,
    dry_run: bool,
}

impl Runner {
    /// Creates a runner with Go's builtin helpers, no formatter, writing files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures a runner from `--gofmt`, `--gofmt-bin`, `--missing-key` and
    /// `--dry-run`.
    pub fn from_args(args: &Args) -> Self {
        let mut runner = Self::new()
            .with_renderer(Renderer::new().missing_key(args.missing_key))
            .dry_run(args.dry_run);
        if args.gofmt {
            runner = runner.with_formatter(GoFormatter::new(&args.gofmt_bin));
        }
        runner
    }

    /// Uses `renderer` to compile and execute templates.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Formats Go outputs with `formatter` before writing them.
    pub fn with_formatter(mut self, formatter: GoFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// When set, everything runs except the final write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Processes every path in order and returns the output paths.
    ///
    /// Stops at the first failing path; outputs written before it stay on disk.
    pub fn run(&self, invocation: &Invocation) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::with_capacity(invocation.paths.len());
        for path in &invocation.paths {
            outputs.push(self.process(path, &invocation.data)?);
        }
        Ok(outputs)
    }

    /// Renders a single template file and writes its output.
    pub fn process(&self, template: &Path, data: &Value) -> Result<PathBuf> {
        let started = Instant::now();
        let result = self.process_file(template, data);
        telemetry::record_file(template, started.elapsed(), result.is_ok());
        result
    }

    fn process_file(&self, template: &Path, data: &Value) -> Result<PathBuf> {
        let output = output_path(template).ok_or_else(|| Error::MissingSuffix {
            path: template.to_path_buf(),
        })?;

        let permissions = fs::metadata(template)
            .map_err(|e| Error::read(template, e))?
            .permissions();
        let bytes = fs::read(template).map_err(|e| Error::read(template, e))?;
        let source = String::from_utf8(bytes).map_err(|_| Error::Encoding {
            path: template.to_path_buf(),
        })?;

        let body = self.renderer.render(template, &source, data)?;
        let mut content = compose(template, &output, body);
        if let Some(formatter) = &self.formatter {
            if GoFormatter::applies_to(&output) {
                content = formatter.format(&output, &content)?;
            }
        }

        if self.dry_run {
            warn!(
                template = %template.display(),
                output = %output.display(),
                "dry run, not writing"
            );
            return Ok(output);
        }

        write_output(&output, content.as_bytes(), permissions)
            .map_err(|e| Error::write(&output, e))?;
        info!(
            template = %template.display(),
            output = %output.display(),
            bytes = content.len(),
            "wrote rendered template"
        );
        Ok(output)
    }
}

/// Writes `content` to `path` so that it never carries wider permissions
/// than `permissions`, even between creation and the final chmod.
#[cfg(unix)]
fn write_output(path: &Path, content: &[u8], permissions: fs::Permissions) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(permissions.mode() & 0o777)
        .open(path)?;
    // `mode` only applies on creation and is masked by the umask; an existing
    // output keeps its old bits until this call.
    file.set_permissions(permissions)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_output(path: &Path, content: &[u8], permissions: fs::Permissions) -> io::Result<()> {
    fs::write(path, content)?;
    fs::set_permissions(path, permissions)
}
