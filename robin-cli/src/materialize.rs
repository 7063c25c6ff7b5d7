//! Template tree materialization
//!
//! Walks a [`TemplateSource`] and reproduces it below a target directory,
//! rendering every file through minijinja with the [`VariableContext`].
//! Files without placeholders render to themselves.
//!
//! Only `{{ ... }}` is template syntax. Jinja blocks and comments are moved
//! to delimiters that do not occur in text files, so `{%`, `{#` and friends
//! in shell scripts, stylesheets or docs are plain text.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};

use crate::context::VariableContext;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::planner::output_path;
use crate::source::{walk, TemplateEntry, TemplatePath, TemplateSource};

const BLOCK_DELIMITERS: (&str, &str) = ("\u{0}{%", "%}\u{0}");
const COMMENT_DELIMITERS: (&str, &str) = ("\u{0}{#", "#}\u{0}");

/// What a materialization produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Directories created
    pub directories: usize,
    /// Files rendered and written
    pub files: usize,
}

/// Renders a template tree into a target directory
pub struct Materializer<'a> {
    env: Environment<'static>,
    context: &'a VariableContext,
}

impl<'a> Materializer<'a> {
    /// Create a materializer for `context`
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::TemplateEngine`] if the placeholder syntax
    /// cannot be configured.
    pub fn new(context: &'a VariableContext) -> ScaffoldResult<Self> {
        let mut env = Environment::new();
        env.set_syntax(placeholder_syntax()?);

        // Generated sources, not HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        Ok(Self { env, context })
    }

    /// Render every entry of `source` below `target_root`.
    ///
    /// `target_root` must already exist. Nothing is removed on failure: the
    /// entries written before the failing one stay on disk.
    ///
    /// # Errors
    ///
    /// Returns the first walk, render, or write error, naming the template
    /// path or output path it concerns.
    pub fn materialize<S>(&self, source: &S, target_root: &Path) -> ScaffoldResult<Summary>
    where
        S: TemplateSource + ?Sized,
    {
        tracing::info!(
            source = %source.describe(),
            target = %target_root.display(),
            "materializing template"
        );
        tracing::debug!(
            variables = ?self.context.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            "template variables"
        );

        let mut summary = Summary::default();
        walk(source, |entry| self.materialize_entry(source, entry, target_root, &mut summary))?;

        tracing::info!(
            directories = summary.directories,
            files = summary.files,
            "template materialized"
        );
        Ok(summary)
    }

    fn materialize_entry<S>(
        &self,
        source: &S,
        entry: &TemplateEntry,
        target_root: &Path,
        summary: &mut Summary,
    ) -> ScaffoldResult<()>
    where
        S: TemplateSource + ?Sized,
    {
        let Some(output) = output_path(target_root, &entry.path) else {
            return Ok(());
        };

        if entry.is_dir() {
            tracing::debug!(path = %entry.path, "creating directory");
            fs::create_dir_all(&output).map_err(|source| ScaffoldError::OutputWrite {
                path: output.clone(),
                source,
            })?;
            summary.directories += 1;
            return Ok(());
        }

        tracing::debug!(path = %entry.path, "rendering file");
        let raw = source
            .read(&entry.path)
            .map_err(|source| ScaffoldError::TemplateWalk {
                path: entry.path.clone(),
                source,
            })?;
        let rendered = self.render(&entry.path, raw.into_owned())?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&output)
            .map_err(|source| ScaffoldError::OutputWrite {
                path: output.clone(),
                source,
            })?;
        file.write_all(rendered.as_bytes())
            .map_err(|source| ScaffoldError::OutputWrite {
                path: output.clone(),
                source,
            })?;

        summary.files += 1;
        Ok(())
    }

    /// Render one template file.
    ///
    /// # Errors
    ///
    /// - [`ScaffoldError::TemplateEncoding`] if the content is not UTF-8
    /// - [`ScaffoldError::TemplateParse`] on template syntax errors
    /// - [`ScaffoldError::TemplateRender`] on undefined placeholders and
    ///   other evaluation errors
    pub fn render(&self, path: &TemplatePath, raw: Vec<u8>) -> ScaffoldResult<String> {
        let text = String::from_utf8(raw).map_err(|source| ScaffoldError::TemplateEncoding {
            path: path.clone(),
            source,
        })?;

        self.env
            .render_named_str(path.as_str(), &text, self.context)
            .map_err(|source| {
                if source.kind() == ErrorKind::SyntaxError {
                    ScaffoldError::TemplateParse {
                        path: path.clone(),
                        source,
                    }
                } else {
                    ScaffoldError::TemplateRender {
                        path: path.clone(),
                        source,
                    }
                }
            })
    }
}

fn placeholder_syntax() -> ScaffoldResult<SyntaxConfig> {
    SyntaxConfig::builder()
        .variable_delimiters("{{", "}}")
        .block_delimiters(BLOCK_DELIMITERS.0, BLOCK_DELIMITERS.1)
        .comment_delimiters(COMMENT_DELIMITERS.0, COMMENT_DELIMITERS.1)
        .build()
        .map_err(|source| ScaffoldError::TemplateEngine { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use tempfile::TempDir;

    fn context() -> VariableContext {
        [("Name", "World"), ("Id", "app")].into_iter().collect()
    }

    fn path(raw: &str) -> TemplatePath {
        TemplatePath::parse(raw).unwrap()
    }

    #[test]
    fn test_render_substitutes() {
        let ctx = context();
        let materializer = Materializer::new(&ctx).unwrap();
        let out = materializer
            .render(&path("f.txt"), b"hi {{ Name }}".to_vec())
            .unwrap();
        assert_eq!(out, "hi World");
    }

    #[test]
    fn test_render_is_identity_without_placeholders() {
        let ctx = context();
        let materializer = Materializer::new(&ctx).unwrap();
        let raw = "line one\n<b>&amp;</b>\n\nend\n";
        let out = materializer.render(&path("f.txt"), raw.as_bytes().to_vec()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_jinja_blocks_and_comments_are_plain_text() {
        let ctx = context();
        let materializer = Materializer::new(&ctx).unwrap();
        for raw in [
            "n=${#args[@]}\necho done\n",
            "width: 100%; {% raw\n",
            "a {# keep me #} b\n",
            "{% if x %}{{ Name }}{% endif %}",
            "${#x} {% foo {#",
        ] {
            let out = materializer
                .render(&path("run.sh"), raw.as_bytes().to_vec())
                .unwrap();
            assert_eq!(out, raw.replace("{{ Name }}", "World"));
        }
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let ctx: VariableContext = [("Name", "<World & Co>")].into_iter().collect();
        let materializer = Materializer::new(&ctx).unwrap();
        let out = materializer
            .render(&path("index.html"), b"<h1>{{ Name }}</h1>".to_vec())
            .unwrap();
        assert_eq!(out, "<h1><World & Co></h1>");
    }

    #[test]
    fn test_undefined_placeholder_is_render_error() {
        let ctx = VariableContext::new();
        let materializer = Materializer::new(&ctx).unwrap();
        let err = materializer
            .render(&path("a/b.txt"), b"{{ Missing }}".to_vec())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateRender { .. }));
        assert!(err.to_string().contains("a/b.txt"));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let ctx = context();
        let materializer = Materializer::new(&ctx).unwrap();
        let err = materializer
            .render(&path("bad.txt"), b"{{ Name ".to_vec())
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateParse { .. }));
    }

    #[test]
    fn test_binary_content_is_encoding_error() {
        let ctx = context();
        let materializer = Materializer::new(&ctx).unwrap();
        let err = materializer
            .render(&path("logo.png"), vec![0x89, 0x50, 0xff, 0xfe])
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateEncoding { .. }));
    }

    #[test]
    fn test_materialize_counts_entries() {
        let temp = TempDir::new().unwrap();
        let source = MemorySource::new()
            .with_file("package.json", "{\"name\": \"{{ Id }}\"}\n")
            .unwrap()
            .with_file("src/page.tsx", "export {};\n")
            .unwrap()
            .with_dir("public")
            .unwrap();

        let ctx = context();
        let summary = Materializer::new(&ctx)
            .unwrap()
            .materialize(&source, temp.path())
            .unwrap();

        assert_eq!(summary, Summary { directories: 2, files: 2 });
        assert_eq!(
            fs::read_to_string(temp.path().join("package.json")).unwrap(),
            "{\"name\": \"app\"}\n"
        );
        assert!(temp.path().join("public").is_dir());
    }

    #[test]
    fn test_failed_render_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let source = MemorySource::new()
            .with_file("a/b.txt", "{{ Missing }}")
            .unwrap();

        let ctx = VariableContext::new();
        let err = Materializer::new(&ctx)
            .unwrap()
            .materialize(&source, temp.path())
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::TemplateRender { ref path, .. } if path.as_str() == "a/b.txt"));
        assert!(!temp.path().join("a").join("b.txt").exists());
    }

    #[test]
    fn test_existing_output_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("x.txt"), "keep").unwrap();
        let source = MemorySource::new().with_file("x.txt", "new").unwrap();

        let ctx = context();
        let err = Materializer::new(&ctx)
            .unwrap()
            .materialize(&source, temp.path())
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::OutputWrite { .. }));
        assert_eq!(fs::read_to_string(temp.path().join("x.txt")).unwrap(), "keep");
    }
}
