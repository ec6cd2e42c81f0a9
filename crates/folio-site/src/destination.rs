//! Output of rendered pages.

use std::path::{Path, PathBuf};

/// Rendered page ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPage {
    /// Location relative to the output root (always `<dir>/index.html`).
    pub path: PathBuf,
    /// Rendered HTML.
    pub contents: String,
}

impl OutputPage {
    /// Output location for a source file: the source's directory plus
    /// `index.html`.
    ///
    /// `docs/setup/index.md` and `docs/setup/notes.md` both map to
    /// `docs/setup/index.html`.
    #[must_use]
    pub fn path_for(relative_source: &Path) -> PathBuf {
        relative_source
            .parent()
            .unwrap_or(Path::new(""))
            .join("index.html")
    }
}

/// Error writing output.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sink for rendered pages.
pub trait Destination {
    /// Write one page.
    fn write(&mut self, page: &OutputPage) -> Result<(), WriteError>;

    /// Called once after the last page; returns when every page is stored.
    fn finish(&mut self) -> Result<(), WriteError>;
}

/// Writes pages below an output directory.
#[derive(Debug)]
pub struct FsDestination {
    root: PathBuf,
    written: usize,
}

impl FsDestination {
    /// Create a destination writing below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    /// Output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of pages written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl Destination for FsDestination {
    fn write(&mut self, page: &OutputPage) -> Result<(), WriteError> {
        let path = self.root.join(&page.path);
        let io_err = |source| WriteError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&path, &page.contents).map_err(io_err)?;

        tracing::debug!(path = %page.path.display(), "Wrote page");
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        tracing::debug!(root = %self.root.display(), pages = self.written, "Output complete");
        Ok(())
    }
}
