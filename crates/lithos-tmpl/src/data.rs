// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Loading the JSON value templates are rendered against.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Where the template data comes from, as spelled on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// No data given; templates see `null` as their root context.
    Empty,
    /// JSON text passed directly as the flag value.
    Inline(String),
    /// `@path`: JSON read from a file.
    File(PathBuf),
    /// `@-`: JSON read from standard input.
    Stdin,
}

impl DataSource {
    /// Interprets the raw `--data` flag value.
    pub fn parse(flag: Option<&str>) -> Self {
        match flag {
            None | Some("") => DataSource::Empty,
            Some("@-") => DataSource::Stdin,
            Some(value) => match value.strip_prefix('@') {
                Some(path) => DataSource::File(PathBuf::from(path)),
                None => DataSource::Inline(value.to_string()),
            },
        }
    }

    /// Loads and decodes the data, reading the process stdin for `@-`.
    pub fn load(&self) -> Result<Value> {
        self.load_from(io::stdin().lock())
    }

    /// Loads and decodes the data, using `stdin` as the source for `@-`.
    pub fn load_from<R: Read>(&self, mut stdin: R) -> Result<Value> {
        let text = match self {
            DataSource::Empty => return Ok(Value::Null),
            DataSource::Inline(text) => Cow::Borrowed(text.as_str()),
            DataSource::File(path) => {
                debug!(path = %path.display(), "reading template data file");
                let text = fs::read_to_string(path).map_err(|source| Error::ReadData {
                    origin: path.display().to_string(),
                    source,
                })?;
                Cow::Owned(text)
            }
            DataSource::Stdin => {
                debug!("reading template data from stdin");
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .map_err(|source| Error::ReadData {
                        origin: "stdin".to_string(),
                        source,
                    })?;
                Cow::Owned(text)
            }
        };
        decode(&text)
    }
}

/// Decodes JSON text into a generic value. Blank text decodes to `null`.
pub fn decode(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(Error::DecodeData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn parses_flag_forms() {
        assert_eq!(DataSource::parse(None), DataSource::Empty);
        assert_eq!(DataSource::parse(Some("")), DataSource::Empty);
        assert_eq!(DataSource::parse(Some("@-")), DataSource::Stdin);
        assert_eq!(
            DataSource::parse(Some("@data/values.json")),
            DataSource::File(PathBuf::from("data/values.json"))
        );
        assert_eq!(
            DataSource::parse(Some(r#"{"foo":"bar"}"#)),
            DataSource::Inline(r#"{"foo":"bar"}"#.to_string())
        );
    }

    #[test]
    fn inline_json_decodes_to_map() {
        let value = DataSource::parse(Some(r#"{"foo":"bar"}"#))
            .load_from(io::empty())
            .unwrap();
        assert_eq!(value, json!({"foo": "bar"}));
    }

    #[test]
    fn file_json_decodes_to_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"foo":"bar"}"#).unwrap();

        let flag = format!("@{}", path.display());
        let value = DataSource::parse(Some(&flag))
            .load_from(io::empty())
            .unwrap();
        assert_eq!(value, json!({"foo": "bar"}));
    }

    #[test]
    fn stdin_json_decodes_to_array() {
        let value = DataSource::Stdin
            .load_from(Cursor::new(r#"["apple", "pear"]"#))
            .unwrap();
        assert_eq!(value, json!(["apple", "pear"]));
    }

    #[test]
    fn empty_sources_decode_to_null() {
        assert_eq!(
            DataSource::Empty.load_from(io::empty()).unwrap(),
            Value::Null
        );
        assert_eq!(
            DataSource::Stdin.load_from(Cursor::new("  \n")).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DataSource::File(dir.path().join("nope.json"));
        let err = source.load_from(io::empty()).unwrap_err();
        assert!(matches!(err, Error::ReadData { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = DataSource::Inline("{\"foo\":".into())
            .load_from(io::empty())
            .unwrap_err();
        assert!(matches!(err, Error::DecodeData(_)));
    }
}
