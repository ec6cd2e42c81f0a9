//! Layout lookup with a read-once cache.
//!
//! Pages name their layout in front matter (`layout: wide`); pages that name
//! none use the default layout. Each distinct layout is read from its
//! [`LayoutSource`] once per build, however many pages use it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Error loading a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// No layout file with this name.
    #[error("Layout '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },
    /// Layout file could not be read.
    #[error("Failed to read layout '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// Layout name escapes the layout directory or is empty.
    #[error("Invalid layout name '{0}'")]
    InvalidName(String),
}

/// Provider of layout template sources by name.
pub trait LayoutSource: Send + Sync {
    /// Read the template source of the named layout.
    fn read(&self, name: &str) -> Result<String, LayoutError>;
}

/// Layouts stored as `<dir>/<name>.html` files.
#[derive(Clone, Debug)]
pub struct FsLayoutSource {
    dir: PathBuf,
}

impl FsLayoutSource {
    /// Create a source reading layouts from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LayoutSource for FsLayoutSource {
    fn read(&self, name: &str) -> Result<String, LayoutError> {
        if name.is_empty()
            || name.starts_with('/')
            || name.split(['/', '\\']).any(|segment| segment == "..")
        {
            return Err(LayoutError::InvalidName(name.to_owned()));
        }

        let path = self.dir.join(format!("{name}.html"));
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LayoutError::NotFound {
                    name: name.to_owned(),
                    path,
                }
            } else {
                LayoutError::Read {
                    name: name.to_owned(),
                    source,
                }
            }
        })
    }
}

/// Build-scoped layout cache.
///
/// A miss holds the lock while reading, so concurrent lookups of the same
/// layout trigger a single read. Failed reads are not cached.
pub struct LayoutCache {
    source: Box<dyn LayoutSource>,
    default_layout: String,
    layouts: Mutex<HashMap<String, Arc<str>>>,
}

impl LayoutCache {
    /// Create an empty cache over `source`.
    pub fn new(source: Box<dyn LayoutSource>, default_layout: impl Into<String>) -> Self {
        Self {
            source,
            default_layout: default_layout.into(),
            layouts: Mutex::new(HashMap::new()),
        }
    }

    /// Name the layout resolves to: `name`, or the default layout.
    #[must_use]
    pub fn resolve_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.unwrap_or(&self.default_layout)
    }

    /// Get a layout's source, reading it on first use.
    pub fn get(&self, name: &str) -> Result<Arc<str>, LayoutError> {
        let mut layouts = self.layouts.lock().unwrap();
        if let Some(layout) = layouts.get(name) {
            return Ok(Arc::clone(layout));
        }

        tracing::debug!(layout = name, "Loading layout");
        let layout: Arc<str> = self.source.read(name)?.into();
        layouts.insert(name.to_owned(), Arc::clone(&layout));
        Ok(layout)
    }

    /// Number of layouts loaded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.lock().unwrap().len()
    }

    /// Check if no layout has been loaded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
