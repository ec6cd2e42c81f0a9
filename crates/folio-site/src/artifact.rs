//! Site-wide artifacts written after every page: the sitemap and feeds.

use std::path::{Path, PathBuf};

use crate::feed::Feed;
use crate::sitemap::Sitemap;

/// Error generating or writing an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// XML serialization failed.
    #[error("XML error: {0}")]
    Xml(#[from] std::io::Error),
    /// Serialized XML is not UTF-8.
    #[error("Invalid UTF-8 in generated XML: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// RSS channel failed validation.
    #[error("RSS validation failed: {0}")]
    Rss(String),
    /// Artifact file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output locations of the site-wide artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub sitemap: PathBuf,
    pub feed_json: PathBuf,
    pub feed_atom: PathBuf,
    pub feed_rss: PathBuf,
}

impl ArtifactPaths {
    /// Default locations below an output directory.
    #[must_use]
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            sitemap: output_dir.join("sitemap.xml"),
            feed_json: output_dir.join("feed/feed.json"),
            feed_atom: output_dir.join("feed/atom.xml"),
            feed_rss: output_dir.join("feed/rss.xml"),
        }
    }

    /// Serialize and write the feeds and the sitemap.
    ///
    /// Everything is serialized before the first file is written.
    pub(crate) fn write(&self, feed: &Feed, sitemap: &Sitemap) -> Result<(), ArtifactError> {
        let outputs = [
            (&self.feed_json, feed.json1()?),
            (&self.feed_atom, feed.atom1()?),
            (&self.feed_rss, feed.rss2()?),
            (&self.sitemap, sitemap.to_xml()?),
        ];

        for (path, contents) in outputs {
            write_file(path, &contents)?;
            tracing::debug!(path = %path.display(), "Wrote artifact");
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, contents).map_err(io_err)
}
