//! Template rendering with minijinja.
//!
//! Layouts are rendered from source handed in by the caller (see
//! [`LayoutCache`](crate::LayoutCache)). Partials are registered once, under
//! their path relative to the components directory without extension, so
//! `components/nav/item.html` is included as `{% include "nav/item" %}`.
//!
//! All templates are HTML-escaped; page contents are rendered markup and
//! must be emitted with `{{ contents|safe }}`.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// Error compiling or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Partial file could not be read.
    #[error("Failed to read partial {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Partial directory could not be listed.
    #[error("Failed to list partials in {}: {message}", dir.display())]
    List { dir: PathBuf, message: String },
    /// Template failed to compile or render.
    #[error("Template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Template engine holding the registered partials.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create an engine without partials.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self { env }
    }

    /// Create an engine with every file below `dir` registered as a partial.
    ///
    /// A missing directory yields an engine without partials.
    pub fn from_components_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut engine = Self::new();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "No components directory");
            return Ok(engine);
        }

        let pattern = format!(
            "{}/**/*",
            glob::Pattern::escape(&dir.to_string_lossy()).trim_end_matches('/')
        );
        let paths = glob::glob(&pattern).map_err(|e| TemplateError::List {
            dir: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        for entry in paths {
            let path = entry.map_err(|e| TemplateError::List {
                dir: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if !path.is_file() {
                continue;
            }
            let Some(name) = partial_name(dir, &path) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                path: path.clone(),
                source,
            })?;
            engine.add_partial(name, source)?;
        }

        Ok(engine)
    }

    /// Register a partial under `name`.
    pub fn add_partial(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        tracing::debug!(partial = %name, "Registered partial");
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|source| TemplateError::Render { name, source })
    }

    /// Render layout `source` (named `name` in errors) with `context`.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        source: &str,
        context: &S,
    ) -> Result<String, TemplateError> {
        self.env
            .render_named_str(name, source, context)
            .map_err(|source| TemplateError::Render {
                name: name.to_owned(),
                source,
            })
    }
}

/// Partial name: path relative to `dir`, `/`-separated, without extension.
fn partial_name(dir: &Path, path: &Path) -> Option<String> {
    let relative = folio_nav::relative_path(path, dir)?.with_extension("");
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect();
    Some(segments?.join("/"))
}
