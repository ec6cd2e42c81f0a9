//! Content discovery.
//!
//! A [`ContentSource`] yields every content file of a build in discovery
//! order. [`GlobSource`] matches a glob pattern below the content root.

use std::path::{Path, PathBuf};

/// One content file as read from the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Filesystem location.
    pub path: PathBuf,
    /// Location relative to the content root.
    pub relative_path: PathBuf,
    /// Raw file text.
    pub contents: String,
}

/// Error reading content files.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Glob pattern is malformed.
    #[error("Invalid source pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// File could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// File is not below the content root.
    #[error("{} is outside the content root {}", path.display(), base.display())]
    OutsideBase { path: PathBuf, base: PathBuf },
}

impl SourceError {
    /// Path of the file that failed, if the error concerns one file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Pattern { .. } => None,
            Self::Read { path, .. } | Self::OutsideBase { path, .. } => Some(path),
        }
    }
}

/// Provider of content files.
pub trait ContentSource {
    /// Every content file, in discovery order.
    ///
    /// A failed file is yielded as an error and does not stop iteration.
    fn files(&self) -> Box<dyn Iterator<Item = Result<SourceFile, SourceError>> + '_>;
}

/// Content files matching a glob pattern below a root directory.
#[derive(Clone, Debug)]
pub struct GlobSource {
    base: PathBuf,
    pattern: String,
}

impl GlobSource {
    /// Create a source matching `pattern` (e.g. `**/*.md`) below `base`.
    pub fn new(base: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            pattern: pattern.into(),
        }
    }

    fn full_pattern(&self) -> String {
        let base = glob::Pattern::escape(&self.base.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), self.pattern)
    }

    /// Location of a matched file relative to the content root.
    ///
    /// `glob` drops a leading `./` from the paths it yields, so the
    /// comparison ignores `.` segments.
    fn relative_path(&self, path: &Path) -> Result<PathBuf, SourceError> {
        folio_nav::relative_path(path, &self.base).ok_or_else(|| SourceError::OutsideBase {
            path: path.to_path_buf(),
            base: self.base.clone(),
        })
    }

    fn read(&self, path: PathBuf) -> Result<SourceFile, SourceError> {
        let relative_path = self.relative_path(&path)?;
        let contents = std::fs::read_to_string(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %relative_path.display(), "Read content file");

        Ok(SourceFile {
            path,
            relative_path,
            contents,
        })
    }
}

impl ContentSource for GlobSource {
    fn files(&self) -> Box<dyn Iterator<Item = Result<SourceFile, SourceError>> + '_> {
        let pattern = self.full_pattern();
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(source) => {
                return Box::new(std::iter::once(Err(SourceError::Pattern {
                    pattern,
                    source,
                })));
            }
        };

        Box::new(paths.filter_map(move |entry| match entry {
            Ok(path) if path.is_dir() => None,
            Ok(path) => Some(self.read(path)),
            Err(e) => {
                let path = e.path().to_path_buf();
                Some(Err(SourceError::Read {
                    path,
                    source: e.into(),
                }))
            }
        }))
    }
}
