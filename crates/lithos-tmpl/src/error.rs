// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::io;
use std::path::{Path, PathBuf};

use lithos_gotmpl_core::Error as TemplateError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for a `lithos-tmpl` invocation.
///
/// Per-template variants carry the template path so the message printed by
/// the binary always names the file that stopped the run. Parse and render
/// failures keep the engine's error as their source.
#[derive(Debug, Error)]
pub enum Error {
    /// The invocation named no template files.
    #[error("no template paths given")]
    NoPaths,

    /// The `@path` data file or stdin could not be read.
    #[error("read data from {origin}: {source}")]
    ReadData {
        /// The file path, or `stdin`.
        origin: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The data text is not valid JSON.
    #[error("decode data: {0}")]
    DecodeData(#[source] serde_json::Error),

    /// A template file or its metadata could not be read.
    #[error("{}: read: {source}", .path.display())]
    Read {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A template file is not UTF-8 text.
    #[error("{}: template is not valid UTF-8", .path.display())]
    Encoding {
        /// Template path.
        path: PathBuf,
    },

    /// A template path has no output name to derive.
    #[error("{}: template file name must end in .tmpl", .path.display())]
    MissingSuffix {
        /// Template path.
        path: PathBuf,
    },

    /// The template source is malformed.
    #[error("{}: {source}", .path.display())]
    Parse {
        /// Template path.
        path: PathBuf,
        /// Engine parse error.
        #[source]
        source: TemplateError,
    },

    /// Executing the template against the data failed, including lookups of
    /// map keys the data does not have.
    #[error("{}: {source}", .path.display())]
    Render {
        /// Template path.
        path: PathBuf,
        /// Engine render error.
        #[source]
        source: TemplateError,
    },

    /// The Go formatter could not be run or rejected the output.
    #[error("{}: gofmt: {message}", .path.display())]
    Format {
        /// Output path.
        path: PathBuf,
        /// Formatter stderr, or how it exited.
        message: String,
    },

    /// The output file could not be written or given its permissions.
    #[error("{}: write: {source}", .path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(path: &Path, message: impl Into<String>) -> Self {
        Error::Format {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns the file the error is about, if it concerns a single file.
    ///
    /// Write and format errors report the output path; every other per-file
    /// error reports the template path.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::NoPaths | Error::ReadData { .. } | Error::DecodeData(_) => None,
            Error::Read { path, .. }
            | Error::Encoding { path }
            | Error::MissingSuffix { path }
            | Error::Parse { path, .. }
            | Error::Render { path, .. }
            | Error::Format { path, .. }
            | Error::Write { path, .. } => Some(path),
        }
    }
}
