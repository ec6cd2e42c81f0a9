//! Buffered content files and the per-page render context.

use std::path::PathBuf;

use folio_nav::{NavItem, PageLink};
use folio_renderer::{FrontMatter, TocEntry};
use serde::Serialize;

use crate::feed::SiteInfo;
use crate::metatags::MetaTag;

/// One content file, buffered for the whole build.
///
/// Created in the collection phase with rendered HTML in `contents`;
/// `computed` is attached in the annotation phase.
#[derive(Clone, Debug)]
pub struct ContentFile {
    /// Filesystem location (identity key).
    pub path: PathBuf,
    /// Location relative to the content root.
    pub relative_path: PathBuf,
    /// Page URL derived from the location.
    pub url: String,
    pub front_matter: FrontMatter,
    /// Rendered HTML body.
    pub contents: String,
    /// Text of the first H1 heading.
    pub heading: Option<String>,
    pub toc: Vec<TocEntry>,
    /// Render context, once annotated.
    pub computed: Option<PageContext>,
}

impl ContentFile {
    /// Page title: front matter `title`, then the first H1.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.front_matter
            .title
            .as_deref()
            .or(self.heading.as_deref())
    }

    /// Title shown in navigation.
    ///
    /// Falls back from `navigation_title` to the page title, then to the
    /// last URL segment.
    #[must_use]
    pub fn navigation_title(&self) -> &str {
        self.front_matter
            .navigation_title()
            .or(self.heading.as_deref())
            .unwrap_or_else(|| self.url.rsplit('/').next().unwrap_or_default())
    }
}

/// Everything a layout template sees when rendering one page.
#[derive(Clone, Debug, Serialize)]
pub struct PageContext {
    pub url: String,
    pub title: Option<String>,
    pub changed: Option<String>,
    /// Rendered page body; emit with `{{ contents|safe }}`.
    pub contents: String,
    pub navigation: Vec<NavItem>,
    pub breadcrumb: Vec<PageLink>,
    pub previous_page: Option<PageLink>,
    pub next_page: Option<PageLink>,
    pub sub_pages: Vec<PageLink>,
    pub metatags: Vec<MetaTag>,
    pub toc: Vec<TocEntry>,
    /// Front matter as declared, including custom keys.
    pub page: FrontMatter,
    pub site: SiteInfo,
}
