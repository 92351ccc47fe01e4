// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Optional `gofmt` pass over generated Go sources.

use std::ffi::OsStr;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// Default formatter binary, looked up on `PATH`.
pub const DEFAULT_GOFMT: &str = "gofmt";

/// Pipes Go sources through an external `gofmt`-compatible binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFormatter {
    program: PathBuf,
}

impl Default for GoFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_GOFMT)
    }
}

impl GoFormatter {
    /// Creates a formatter that runs `program` with the source on stdin.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the binary this formatter spawns.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Reports whether `output` is a Go source this formatter should touch.
    pub fn applies_to(output: &Path) -> bool {
        output.extension() == Some(OsStr::new("go"))
    }

    /// Formats `source`, destined for `output`, and returns the formatter's stdout.
    ///
    /// A spawn failure, a non-zero exit or non UTF-8 output is reported as
    /// [`Error::Format`] against `output`.
    pub fn format(&self, output: &Path, source: &str) -> Result<String> {
        debug!(
            program = %self.program.display(),
            output = %output.display(),
            "formatting generated Go source"
        );
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::format(output, format!("spawn {}: {e}", self.program.display()))
            })?;

        // gofmt reads all of stdin before writing, so feeding it up front cannot stall.
        // A broken pipe means the child exited early; its exit status says why.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(source.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(Error::format(output, format!("write stdin: {e}")));
                }
                _ => {}
            }
        }

        let result = child
            .wait_with_output()
            .map_err(|e| Error::format(output, format!("wait: {e}")))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", result.status),
                detail => detail.to_string(),
            };
            return Err(Error::format(output, message));
        }
        String::from_utf8(result.stdout)
            .map_err(|_| Error::format(output, "output is not valid UTF-8"))
    }
}
