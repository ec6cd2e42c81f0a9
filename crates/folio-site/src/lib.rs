//! Navigation-aware static site build pipeline for Folio.
//!
//! This crate provides:
//! - [`Pipeline`]: Two-phase build from a [`ContentSource`] to a [`Destination`]
//! - [`LayoutCache`] and [`TemplateEngine`]: Layout lookup and minijinja rendering
//! - [`Feed`] and [`Sitemap`]: Site-wide artifacts written after every page
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use folio_site::{
//!     ArtifactPaths, BuildConfig, FsDestination, GlobSource, Pipeline, SiteInfo,
//!     TemplateSettings,
//! };
//!
//! let config = BuildConfig {
//!     base: "pages".into(),
//!     site: SiteInfo {
//!         title: "Guide".to_owned(),
//!         url: "https://example.com".to_owned(),
//!         ..SiteInfo::default()
//!     },
//!     templates: TemplateSettings {
//!         layouts_dir: "src/templates".into(),
//!         components_dir: "src/components".into(),
//!         default_layout: "layout".to_owned(),
//!     },
//!     artifacts: ArtifactPaths::in_dir(Path::new("dist")),
//! };
//!
//! let pipeline = Pipeline::new(config).unwrap();
//! let source = GlobSource::new("pages", "**/*.md");
//! let mut destination = FsDestination::new("dist");
//! let report = pipeline
//!     .run(&source, &mut destination, |error| eprintln!("{error}"))
//!     .unwrap();
//! println!("{} pages", report.written);
//! ```

mod artifact;
mod destination;
mod feed;
mod layout;
pub mod metatags;
mod page;
mod pipeline;
mod sitemap;
mod source;
mod template;

pub use artifact::{ArtifactError, ArtifactPaths};
pub use destination::{Destination, FsDestination, OutputPage, WriteError};
pub use feed::{Feed, FeedItem, SiteInfo};
pub use layout::{FsLayoutSource, LayoutCache, LayoutError, LayoutSource};
pub use metatags::{MetaAttribute, MetaTag, PageMeta};
pub use page::{ContentFile, PageContext};
pub use pipeline::{
    BuildConfig, BuildError, BuildReport, PageError, Pipeline, PipelineError, Stage,
    TemplateSettings,
};
pub use sitemap::{Sitemap, SitemapEntry, page_location};
pub use source::{ContentSource, GlobSource, SourceError, SourceFile};
pub use template::{TemplateEngine, TemplateError};
