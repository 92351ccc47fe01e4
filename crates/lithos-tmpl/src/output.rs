// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Output path derivation and the generated-file banner.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Suffix stripped from a template path to obtain its output path.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Output extensions that receive the generated-file banner.
pub const BANNER_EXTENSIONS: &[&str] = &["go"];

/// Tool name written into the banner.
pub const TOOL_NAME: &str = "lithos-tmpl";

/// Project URL written into the banner.
pub const PROJECT_URL: &str = "https://github.com/hans-d/lithos-gotmpl-rs";

/// Derives the output path by stripping one trailing [`TEMPLATE_SUFFIX`] from
/// the file name, keeping the parent directory.
///
/// Returns `None` when the file name lacks the suffix or would be empty once
/// it is stripped.
pub fn output_path(template: &Path) -> Option<PathBuf> {
    let name = template.file_name()?.to_str()?;
    let stem = name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(template.with_file_name(stem))
}

/// Reports whether `output` has one of the [`BANNER_EXTENSIONS`].
pub fn wants_banner(output: &Path) -> bool {
    output
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| BANNER_EXTENSIONS.contains(&ext))
}

/// Renders the "do not edit" banner naming the originating template.
pub fn banner(template: &Path) -> String {
    format!(
        "// Generated by {TOOL_NAME}\n// {PROJECT_URL}\n//\n// DO NOT EDIT!\n// Source: {}\n",
        template.display()
    )
}

/// Builds the final file content: the banner, one blank line, then `body`
/// for outputs that want a banner; `body` unchanged otherwise.
pub fn compose(template: &Path, output: &Path, body: String) -> String {
    if !wants_banner(output) {
        return body;
    }
    let mut content = banner(template);
    content.reserve(body.len() + 1);
    content.push('\n');
    content.push_str(&body);
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_template_suffix() {
        assert_eq!(
            output_path(Path::new("a.tmpl")),
            Some(PathBuf::from("a"))
        );
        assert_eq!(
            output_path(Path::new("src/model.go.tmpl")),
            Some(PathBuf::from("src/model.go"))
        );
        assert_eq!(
            output_path(Path::new("x.tmpl.tmpl")),
            Some(PathBuf::from("x.tmpl"))
        );
    }

    #[test]
    fn rejects_paths_without_suffix() {
        assert_eq!(output_path(Path::new("main.go")), None);
        assert_eq!(output_path(Path::new("dir/.tmpl")), None);
        assert_eq!(output_path(Path::new("tmpl")), None);
    }

    #[test]
    fn banner_only_for_go_outputs() {
        assert!(wants_banner(Path::new("pkg/model.go")));
        assert!(!wants_banner(Path::new("README.md")));
        assert!(!wants_banner(Path::new("go")));
    }

    #[test]
    fn compose_prepends_banner_and_blank_line() {
        let content = compose(
            Path::new("pkg/model.go.tmpl"),
            Path::new("pkg/model.go"),
            "package pkg\n".to_string(),
        );
        assert_eq!(
            content,
            "// Generated by lithos-tmpl\n\
             // https://github.com/hans-d/lithos-gotmpl-rs\n\
             //\n\
             // DO NOT EDIT!\n\
             // Source: pkg/model.go.tmpl\n\
             \n\
             package pkg\n"
        );
    }

    #[test]
    fn compose_leaves_other_outputs_untouched() {
        let body = "hello".to_string();
        assert_eq!(
            compose(Path::new("a.txt.tmpl"), Path::new("a.txt"), body),
            "hello"
        );
    }
}
