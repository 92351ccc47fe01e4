// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::fmt;
use std::path::Path;

use lithos_gotmpl_core::{text_template_functions, FunctionRegistry, Template};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::strict;

/// What a field lookup does when the map has no such key.
///
/// Mirrors Go's `missingkey` template option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingKey {
    /// Fail the template with a render error.
    #[default]
    Error,
    /// Render the missing value as empty text.
    Zero,
}

/// Compiles and executes Go templates with a fixed helper registry.
#[derive(Clone)]
pub struct Renderer {
    functions: FunctionRegistry,
    missing_key: MissingKey,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("missing_key", &self.missing_key)
            .finish_non_exhaustive()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer with Go's `text/template` builtin helpers.
    pub fn new() -> Self {
        Self::with_functions(text_template_functions())
    }

    /// Creates a renderer backed by a custom helper registry.
    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self {
            functions,
            missing_key: MissingKey::default(),
        }
    }

    /// Sets how lookups of absent map keys are handled.
    pub fn missing_key(mut self, missing_key: MissingKey) -> Self {
        self.missing_key = missing_key;
        self
    }

    /// Returns the helper registry templates are compiled with.
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parses `source` into a template named after `path`.
    pub fn compile(&self, path: &Path, source: &str) -> Result<Template> {
        let name = path.display().to_string();
        let template = Template::parse_with_functions(&name, source, self.functions.clone())
            .map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(template = %name, "parsed template");
        Ok(template)
    }

    /// Compiles `source` and executes it with `data` as the root context.
    pub fn render(&self, path: &Path, source: &str, data: &Value) -> Result<String> {
        let template = self.compile(path, source)?;
        let rendered = match self.missing_key {
            MissingKey::Error => strict::render(&template, data),
            MissingKey::Zero => template.render(data),
        };
        rendered.map_err(|source| Error::Render {
            path: path.to_path_buf(),
            source,
        })
    }
}
