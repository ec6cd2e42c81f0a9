//! Page URL derivation from content file locations.
//!
//! Every content file lives in its own directory, so a page's URL is the
//! directory path relative to the content root:
//!
//! - `index.md` -> `""` (site home)
//! - `docs/index.md` -> `"docs"`
//! - `docs/setup/index.md` -> `"docs/setup"`
//!
//! URLs never carry a leading or trailing slash.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Error returned when a file cannot be mapped to a page URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    /// The file is not located below the content root.
    #[error("{} is not inside content root {}", path.display(), base.display())]
    OutsideBase {
        /// File path that was resolved.
        path: PathBuf,
        /// Content root the path was resolved against.
        base: PathBuf,
    },
    /// A path component is not valid UTF-8.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8(PathBuf),
}

/// Derive the page URL of a content file.
///
/// Strips `base`, drops the file's own basename and joins the remaining
/// directory components with `/`. The result depends only on the two
/// arguments; the file system is never consulted.
///
/// # Errors
///
/// Returns [`UrlError::OutsideBase`] if `path` is not below `base`, and
/// [`UrlError::NonUtf8`] if a directory name is not valid UTF-8.
pub fn page_url(path: &Path, base: &Path) -> Result<String, UrlError> {
    let relative = relative_components(path, base).ok_or_else(|| UrlError::OutsideBase {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    })?;

    // Last component is the file itself
    let Some((_, dirs)) = relative.split_last() else {
        return Ok(String::new());
    };

    let segments = dirs
        .iter()
        .map(|part| {
            part.to_str()
                .ok_or_else(|| UrlError::NonUtf8(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(segments.join("/"))
}

/// Parent URL of a page URL.
///
/// Returns `None` for top-level pages (no `/` in the URL) and for the site
/// home (`""`).
#[must_use]
pub fn parent_url(url: &str) -> Option<&str> {
    url.rsplit_once('/').map(|(parent, _)| parent)
}

/// Check whether `ancestor` contains `url` on a path-segment boundary.
///
/// `docs` is an ancestor of `docs/setup`, but not of `docs` itself and not
/// of `docs-old/setup`. The site home (`""`) is never reported as an ancestor.
#[must_use]
pub fn is_ancestor(ancestor: &str, url: &str) -> bool {
    !ancestor.is_empty()
        && url.len() > ancestor.len()
        && url.starts_with(ancestor)
        && url.as_bytes()[ancestor.len()] == b'/'
}

/// Location of `path` relative to `base`.
///
/// `.` segments are ignored on both sides, so `pages/a.md` is below
/// `./pages` and `docs/a.md` is below `.`. Returns `None` if `path` is not
/// below `base`.
#[must_use]
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    relative_components(path, base).map(|parts| parts.into_iter().collect())
}

fn relative_components<'a>(path: &'a Path, base: &'a Path) -> Option<Vec<&'a OsStr>> {
    let path_parts = normal_components(path);
    let base_parts = normal_components(base);
    path_parts
        .strip_prefix(base_parts.as_slice())
        .map(<[&OsStr]>::to_vec)
}

/// Components of a path with `.` segments removed.
fn normal_components(path: &Path) -> Vec<&OsStr> {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::Prefix(p) => Some(p.as_os_str()),
            Component::RootDir => Some(OsStr::new("/")),
            Component::ParentDir => Some(OsStr::new("..")),
            Component::Normal(s) => Some(s),
        })
        .collect()
}
