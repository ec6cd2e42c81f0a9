//! Navigation records.

use std::cmp::Ordering;

use serde::Serialize;

use crate::url::parent_url;

/// Lightweight per-page entry used to build the site hierarchy.
///
/// The parent is derived from the URL and never set by the caller, so
/// the parent relation is always a strict prefix relation and cannot form
/// cycles.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavigationRecord {
    /// Page URL without leading slash (e.g., "docs/setup").
    pub url: String,
    /// URL of the containing page, `None` for top-level pages.
    #[serde(skip)]
    pub parent: Option<String>,
    /// Display title.
    pub title: String,
    /// Sibling position from front matter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    /// Child records, ordered by position. Populated by the tree builder.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationRecord>,
}

impl NavigationRecord {
    /// Create a record with its parent derived from `url`.
    pub fn new(url: impl Into<String>, title: impl Into<String>, position: Option<f64>) -> Self {
        let url = url.into();
        let parent = parent_url(&url).map(str::to_owned);
        Self {
            url,
            parent,
            title: title.into(),
            position,
            children: Vec::new(),
        }
    }

    /// Depth of the record in the URL hierarchy (1 for top-level pages).
    #[must_use]
    pub fn depth(&self) -> usize {
        url_depth(&self.url)
    }
}

/// Number of segments in a page URL (`""` has depth 0).
pub(crate) fn url_depth(url: &str) -> usize {
    if url.is_empty() {
        0
    } else {
        url.split('/').count()
    }
}

/// Sibling ordering: ascending position, missing positions last.
///
/// Used with stable sorts, so equal positions keep discovery order.
pub(crate) fn by_position(a: &NavigationRecord, b: &NavigationRecord) -> Ordering {
    let key = |r: &NavigationRecord| r.position.unwrap_or(f64::INFINITY);
    key(a).total_cmp(&key(b))
}
