//! Navigation-aware build pipeline.
//!
//! # Architecture
//!
//! A build runs in two phases separated by a barrier:
//!
//! 1. **Collection**: every content file is read, its front matter parsed,
//!    its markdown rendered and its URL computed. Files are buffered with a
//!    navigation record each; nothing is written.
//! 2. **Annotation and emission**: the navigation tree is built and
//!    flattened once. Each page then gets its own navigation context,
//!    metatags and layout, rendered on the rayon pool. Rendered pages are
//!    written in discovery order.
//!
//! Feeds and the sitemap are produced after the destination reports every
//! page written.
//!
//! Per-file failures are handed to the caller's error handler and the file
//! is dropped; the build continues. Artifact failures end the build.

use std::fmt;
use std::path::{Path, PathBuf};

use folio_nav::{NavigationRecord, NavigationTree, UrlError, extend, page_url};
use folio_renderer::{FrontMatterError, MarkdownRenderer, split_front_matter};
use rayon::prelude::*;

use crate::artifact::{ArtifactError, ArtifactPaths};
use crate::destination::{Destination, OutputPage, WriteError};
use crate::feed::{Feed, SiteInfo};
use crate::layout::{FsLayoutSource, LayoutCache, LayoutError, LayoutSource};
use crate::metatags::{self, PageMeta};
use crate::page::{ContentFile, PageContext};
use crate::sitemap::Sitemap;
use crate::source::{ContentSource, SourceError, SourceFile};
use crate::template::{TemplateEngine, TemplateError};

/// Twitter card type used for every page.
const METATAG_CARD: &str = "summary";

/// Template locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateSettings {
    /// Layout directory (`<dir>/<name>.html`).
    pub layouts_dir: PathBuf,
    /// Partial directory.
    pub components_dir: PathBuf,
    /// Layout for pages whose front matter names none.
    pub default_layout: String,
}

/// Configuration consumed by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Content root; page URLs are relative to it.
    pub base: PathBuf,
    pub site: SiteInfo,
    pub templates: TemplateSettings,
    pub artifacts: ArtifactPaths,
}

/// Pipeline stage a per-file error occurred in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Source,
    FrontMatter,
    Layout,
    Template,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "source",
            Self::FrontMatter => "front matter",
            Self::Layout => "layout",
            Self::Template => "template",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Cause of a per-file failure.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Per-file failure handed to the error handler.
#[derive(Debug, thiserror::Error)]
#[error("{stage} error in {}: {source}", path.display())]
pub struct PipelineError {
    pub stage: Stage,
    /// File the failure concerns (empty if none).
    pub path: PathBuf,
    #[source]
    pub source: PageError,
}

impl PipelineError {
    fn new(stage: Stage, path: impl Into<PathBuf>, source: impl Into<PageError>) -> Self {
        Self {
            stage,
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Error ending a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Partials could not be loaded.
    #[error("Failed to load templates: {0}")]
    Templates(#[from] TemplateError),
    /// Destination failed to complete.
    #[error("Failed to complete output: {0}")]
    Destination(#[from] WriteError),
    /// Feed or sitemap generation failed.
    #[error("Failed to generate site artifacts: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Summary of a finished build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Content files collected in phase 1.
    pub collected: usize,
    /// Pages handed to the destination successfully.
    pub written: usize,
    /// Per-file failures reported to the error handler.
    pub failed: usize,
    /// Entries in the generated feeds.
    pub feed_items: usize,
}

/// Static site build pipeline.
pub struct Pipeline {
    config: BuildConfig,
    layouts: LayoutCache,
    engine: TemplateEngine,
}

impl Pipeline {
    /// Create a pipeline reading layouts and partials from the configured
    /// template directories.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let engine = TemplateEngine::from_components_dir(&config.templates.components_dir)?;
        let layouts = LayoutCache::new(
            Box::new(FsLayoutSource::new(&config.templates.layouts_dir)),
            config.templates.default_layout.clone(),
        );
        Ok(Self {
            config,
            layouts,
            engine,
        })
    }

    /// Replace the layout source.
    #[must_use]
    pub fn with_layout_source(mut self, source: Box<dyn LayoutSource>) -> Self {
        self.layouts = LayoutCache::new(source, self.config.templates.default_layout.clone());
        self
    }

    /// Replace the template engine.
    #[must_use]
    pub fn with_template_engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Build configuration.
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run a full build.
    ///
    /// Per-file failures go to `on_error`; the build continues without the
    /// file. Returns only after the feeds and sitemap are written.
    pub fn run<S, D, F>(
        &self,
        source: &S,
        destination: &mut D,
        mut on_error: F,
    ) -> Result<BuildReport, BuildError>
    where
        S: ContentSource + ?Sized,
        D: Destination + ?Sized,
        F: FnMut(PipelineError),
    {
        let mut failed = 0;
        let mut report_error = |error: PipelineError| {
            tracing::debug!(stage = %error.stage, path = %error.path.display(), "Page failed");
            failed += 1;
            on_error(error);
        };

        // Phase 1: collection
        let mut files = Vec::new();
        let mut records = Vec::new();
        for result in source.files() {
            let collected = result
                .map_err(|e| {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    PipelineError::new(Stage::Source, path, e)
                })
                .and_then(|file| self.collect(file));
            match collected {
                Ok(file) => {
                    records.push(NavigationRecord::new(
                        file.url.clone(),
                        file.navigation_title(),
                        file.front_matter.position,
                    ));
                    files.push(file);
                }
                Err(error) => report_error(error),
            }
        }
        tracing::info!(files = files.len(), "Collected content files");

        // Barrier: every record is known
        let tree = NavigationTree::build(records);
        let flattened = tree.flatten();
        tracing::debug!(entries = flattened.len(), "Built navigation tree");

        // Phase 2: annotation and rendering, then writes in discovery order
        let rendered: Vec<Result<OutputPage, PipelineError>> = files
            .par_iter_mut()
            .map(|file| self.render(file, &tree, &flattened))
            .collect();

        let mut sitemap = Sitemap::new(self.config.site.url.clone());
        let mut written = 0;
        for (file, result) in files.iter().zip(rendered) {
            let outcome = result.and_then(|page| {
                destination
                    .write(&page)
                    .map_err(|e| PipelineError::new(Stage::Write, &file.path, e))
            });
            match outcome {
                Ok(()) => {
                    sitemap.push(file.url.clone());
                    written += 1;
                }
                Err(error) => report_error(error),
            }
        }

        destination.finish()?;
        tracing::info!(pages = written, "Wrote pages");

        // Completion: artifacts from the full buffered set
        let feed = Feed::from_files(&self.config.site, &files);
        self.config.artifacts.write(&feed, &sitemap)?;
        tracing::info!(
            sitemap = sitemap.urls.len(),
            feed_items = feed.items().len(),
            "Wrote feeds and sitemap"
        );

        Ok(BuildReport {
            collected: files.len(),
            written,
            failed,
            feed_items: feed.items().len(),
        })
    }

    /// Phase 1 for one file.
    fn collect(&self, file: SourceFile) -> Result<ContentFile, PipelineError> {
        let (front_matter, body) = split_front_matter(&file.contents)
            .map_err(|e| PipelineError::new(Stage::FrontMatter, &file.path, e))?;
        let url = page_url(&file.path, &self.config.base)
            .map_err(|e| PipelineError::new(Stage::Source, &file.path, e))?;
        let rendered = MarkdownRenderer::new(&file.path).render(body);

        tracing::debug!(path = %file.relative_path.display(), url = %url, "Collected page");

        Ok(ContentFile {
            path: file.path,
            relative_path: file.relative_path,
            url,
            front_matter,
            contents: rendered.html,
            heading: rendered.title,
            toc: rendered.toc,
            computed: None,
        })
    }

    /// Phase 2 for one file: attach the context and render the layout.
    fn render(
        &self,
        file: &mut ContentFile,
        tree: &NavigationTree,
        flattened: &[&NavigationRecord],
    ) -> Result<OutputPage, PipelineError> {
        let navigation = extend(tree, flattened, &file.url);
        let site = &self.config.site;
        let metatags = metatags::generate(&PageMeta {
            title: file.front_matter.title.clone(),
            description: file.front_matter.lead.clone(),
            card: METATAG_CARD.to_owned(),
            site_name: site.title.clone(),
            url: site.page_url(&file.url),
        });

        let context = PageContext {
            url: file.url.clone(),
            title: file.title().map(str::to_owned),
            changed: file.front_matter.changed.clone(),
            contents: file.contents.clone(),
            navigation: navigation.navigation,
            breadcrumb: navigation.breadcrumb,
            previous_page: navigation.previous_page,
            next_page: navigation.next_page,
            sub_pages: navigation.sub_pages,
            metatags,
            toc: file.toc.clone(),
            page: file.front_matter.clone(),
            site: site.clone(),
        };
        let context: &PageContext = file.computed.insert(context);

        let name = self.layouts.resolve_name(file.front_matter.layout.as_deref());
        let layout = self
            .layouts
            .get(name)
            .map_err(|e| PipelineError::new(Stage::Layout, &file.path, e))?;
        let html = self
            .engine
            .render(name, &layout, context)
            .map_err(|e| PipelineError::new(Stage::Template, &file.path, e))?;

        tracing::debug!(url = %file.url, layout = name, "Rendered page");

        Ok(OutputPage {
            path: OutputPage::path_for(&file.relative_path),
            contents: html,
        })
    }
}
