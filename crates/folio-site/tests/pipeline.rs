//! End-to-end tests for the build pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use folio_site::{
    ArtifactPaths, BuildConfig, ContentSource, Destination, FsDestination, GlobSource,
    LayoutError, LayoutSource, OutputPage, Pipeline, PipelineError, SiteInfo, SourceError,
    SourceFile, Stage, TemplateEngine, TemplateSettings, WriteError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const BASE: &str = "/site/pages";

/// Layout exposing the navigation context in a compact, assertable form.
const LAYOUT: &str = "<title>{{ title }}</title>\
crumbs={% for c in breadcrumb %}[{{ c.title }}]{% endfor %}\
|prev={% if previous_page %}{{ previous_page.title }}{% endif %}\
|next={% if next_page %}{{ next_page.title }}{% endif %}\
|subs={% for s in sub_pages %}({{ s.title }}){% endfor %}\
|nav={% for item in navigation %}{{ item.title }}{% if item.is_active %}*{% endif %}{% if item.is_current %}!{% endif %};{% endfor %}\
|{{ contents|safe }}";

fn site() -> SiteInfo {
    SiteInfo {
        title: "Guide".to_owned(),
        description: "Accessible websites".to_owned(),
        url: "https://example.com".to_owned(),
        language: "en".to_owned(),
    }
}

fn config(base: &Path, templates: &Path, output: &Path) -> BuildConfig {
    BuildConfig {
        base: base.to_path_buf(),
        site: site(),
        templates: TemplateSettings {
            layouts_dir: templates.join("templates"),
            components_dir: templates.join("components"),
            default_layout: "layout".to_owned(),
        },
        artifacts: ArtifactPaths::in_dir(output),
    }
}

/// In-memory content source.
struct StaticSource {
    files: Vec<SourceFile>,
}

impl StaticSource {
    fn new(pages: &[(&str, &str)]) -> Self {
        let files = pages
            .iter()
            .map(|(relative, contents)| SourceFile {
                path: Path::new(BASE).join(relative),
                relative_path: PathBuf::from(relative),
                contents: (*contents).to_owned(),
            })
            .collect();
        Self { files }
    }
}

impl ContentSource for StaticSource {
    fn files(&self) -> Box<dyn Iterator<Item = Result<SourceFile, SourceError>> + '_> {
        Box::new(self.files.iter().cloned().map(Ok))
    }
}

/// Layout source counting reads per call.
struct CountingLayouts {
    reads: Arc<AtomicUsize>,
}

impl LayoutSource for CountingLayouts {
    fn read(&self, name: &str) -> Result<String, LayoutError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match name {
            "layout" => Ok(LAYOUT.to_owned()),
            "plain" => Ok("plain:{{ url }}".to_owned()),
            _ => Err(LayoutError::NotFound {
                name: name.to_owned(),
                path: PathBuf::from(format!("{name}.html")),
            }),
        }
    }
}

/// Layout source serving one template for every name.
struct SingleLayout(&'static str);

impl LayoutSource for SingleLayout {
    fn read(&self, _name: &str) -> Result<String, LayoutError> {
        Ok(self.0.to_owned())
    }
}

/// Destination keeping pages in memory, optionally slow, that records
/// whether the sitemap existed when it finished.
struct RecordingDestination {
    pages: Vec<OutputPage>,
    delay: Duration,
    sitemap: PathBuf,
    sitemap_existed_at_finish: Option<bool>,
}

impl RecordingDestination {
    fn new(sitemap: &Path) -> Self {
        Self {
            pages: Vec::new(),
            delay: Duration::ZERO,
            sitemap: sitemap.to_path_buf(),
            sitemap_existed_at_finish: None,
        }
    }

    fn page(&self, path: &str) -> &str {
        &self
            .pages
            .iter()
            .find(|page| page.path == Path::new(path))
            .unwrap_or_else(|| panic!("no page {path}"))
            .contents
    }

    fn paths(&self) -> Vec<String> {
        self.pages
            .iter()
            .map(|page| page.path.display().to_string())
            .collect()
    }
}

impl Destination for RecordingDestination {
    fn write(&mut self, page: &OutputPage) -> Result<(), WriteError> {
        std::thread::sleep(self.delay);
        if page.path.starts_with("readonly") {
            return Err(WriteError::Io {
                path: page.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.pages.push(page.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriteError> {
        std::thread::sleep(self.delay);
        self.sitemap_existed_at_finish = Some(self.sitemap.exists());
        Ok(())
    }
}

struct Harness {
    output: TempDir,
    reads: Arc<AtomicUsize>,
    pipeline: Pipeline,
}

impl Harness {
    fn new() -> Self {
        let output = TempDir::new().unwrap();
        let reads = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new(config(Path::new(BASE), output.path(), output.path()))
            .unwrap()
            .with_layout_source(Box::new(CountingLayouts {
                reads: Arc::clone(&reads),
            }));
        Self {
            output,
            reads,
            pipeline,
        }
    }

    fn sitemap(&self) -> PathBuf {
        self.output.path().join("sitemap.xml")
    }

    fn run(&self, source: &StaticSource) -> (RecordingDestination, Vec<PipelineError>) {
        let mut destination = RecordingDestination::new(&self.sitemap());
        let mut errors = Vec::new();
        self.pipeline
            .run(source, &mut destination, |e| errors.push(e))
            .unwrap();
        (destination, errors)
    }
}

fn docs_site() -> StaticSource {
    StaticSource::new(&[
        ("index.md", "---\ntitle: Home\n---\nWelcome"),
        (
            "docs/index.md",
            "---\ntitle: Documentation\nnavigation_title: Docs\nposition: 1\n---\nAll docs",
        ),
        (
            "docs/b/index.md",
            "---\nnavigation_title: B\nposition: 2\nchanged: 2019-03-12\n---\n# Bee\n",
        ),
        (
            "docs/a/index.md",
            "---\ntitle: Page A\nnavigation_title: A\nposition: 1\nlead: About A\n---\nText of **A**",
        ),
        ("about/index.md", "---\nnavigation_title: About\nposition: 2\n---\nAbout us"),
    ])
}

#[test]
fn test_nested_page_context() {
    let harness = Harness::new();
    let (destination, errors) = harness.run(&docs_site());

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        destination.page("docs/a/index.html"),
        "<title>Page A</title>\
         crumbs=[Docs][A]|prev=Docs|next=B|subs=|nav=Docs*;About;\
         |<p>Text of <strong>A</strong></p>\n"
    );
}

#[test]
fn test_parent_page_lists_sub_pages() {
    let harness = Harness::new();
    let (destination, _) = harness.run(&docs_site());

    let docs = destination.page("docs/index.html");
    assert!(docs.contains("crumbs=[Docs]|"), "{docs}");
    assert!(docs.contains("|prev=|next=A|"), "{docs}");
    assert!(docs.contains("|subs=(A)(B)|"), "{docs}");
    assert!(docs.contains("|nav=Docs!;About;|"), "{docs}");
}

#[test]
fn test_prev_next_across_subtrees() {
    let harness = Harness::new();
    let (destination, _) = harness.run(&docs_site());

    let b = destination.page("docs/b/index.html");
    // Title falls back to the first heading
    assert!(b.starts_with("<title>Bee</title>"), "{b}");
    assert!(b.contains("|prev=A|next=About|"), "{b}");

    let about = destination.page("about/index.html");
    assert!(about.contains("|prev=B|next=|"), "{about}");
}

#[test]
fn test_home_page_is_rendered_outside_navigation() {
    let harness = Harness::new();
    let (destination, _) = harness.run(&docs_site());

    let home = destination.page("index.html");
    assert!(home.contains("crumbs=|prev=|next=|subs=|nav=Docs;About;|"), "{home}");
}

#[test]
fn test_pages_written_in_discovery_order() {
    let harness = Harness::new();
    let (destination, _) = harness.run(&docs_site());

    assert_eq!(
        destination.paths(),
        [
            "index.html",
            "docs/index.html",
            "docs/b/index.html",
            "docs/a/index.html",
            "about/index.html",
        ]
    );
}

#[test]
fn test_default_layout_read_once() {
    let harness = Harness::new();
    let (destination, _) = harness.run(&docs_site());

    assert_eq!(destination.pages.len(), 5);
    assert_eq!(harness.reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_named_layout() {
    let harness = Harness::new();
    let source = StaticSource::new(&[
        ("docs/index.md", "---\nlayout: plain\n---\nText"),
        ("about/index.md", "---\nlayout: plain\n---\nText"),
        ("contact/index.md", "Text"),
    ]);

    let (destination, _) = harness.run(&source);

    assert_eq!(destination.page("docs/index.html"), "plain:docs");
    assert!(destination.page("contact/index.html").starts_with("<title>"));
    assert_eq!(harness.reads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_artifacts_written_after_slow_destination_finishes() {
    let harness = Harness::new();
    let mut destination = RecordingDestination::new(&harness.sitemap());
    destination.delay = Duration::from_millis(20);

    let report = harness
        .pipeline
        .run(&docs_site(), &mut destination, |e| panic!("{e}"))
        .unwrap();

    assert_eq!(destination.sitemap_existed_at_finish, Some(false));
    assert_eq!(report.written, 5);

    let sitemap = fs::read_to_string(harness.sitemap()).unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 5);
    assert!(sitemap.contains("<loc>https://example.com/</loc>"));
    assert!(sitemap.contains("<loc>https://example.com/docs/a/</loc>"));

    let feeds = harness.output.path().join("feed");
    for name in ["feed.json", "atom.xml", "rss.xml"] {
        assert!(feeds.join(name).is_file(), "{name}");
    }
}

#[test]
fn test_feed_lists_titled_pages_newest_first() {
    let harness = Harness::new();
    let (_, _) = harness.run(&docs_site());

    let json = fs::read_to_string(harness.output.path().join("feed/feed.json")).unwrap();
    let feed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let urls: Vec<_> = feed["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["url"].as_str().unwrap().to_owned())
        .collect();

    // "docs/b" is the only dated page; "about" has no title
    assert_eq!(
        urls,
        [
            "https://example.com/docs/b/",
            "https://example.com/",
            "https://example.com/docs/",
            "https://example.com/docs/a/",
        ]
    );
}

#[test]
fn test_errors_are_tagged_and_build_continues() {
    let harness = Harness::new();
    let source = StaticSource::new(&[
        ("broken/index.md", "---\ntitle: Broken\nno closing fence"),
        ("docs/index.md", "---\nnavigation_title: Docs\nposition: 1\n---\nOk"),
        ("fancy/index.md", "---\nlayout: missing\nposition: 2\n---\nOk"),
        ("readonly/index.md", "---\nposition: 3\n---\nOk"),
    ]);

    let (destination, errors) = harness.run(&source);

    let tagged: Vec<_> = errors
        .iter()
        .map(|e| (e.stage, e.path.display().to_string()))
        .collect();
    assert_eq!(
        tagged,
        [
            (Stage::FrontMatter, format!("{BASE}/broken/index.md")),
            (Stage::Layout, format!("{BASE}/fancy/index.md")),
            (Stage::Write, format!("{BASE}/readonly/index.md")),
        ]
    );
    assert_eq!(destination.paths(), ["docs/index.html"]);

    // The dropped page is not part of the navigation
    assert!(destination.page("docs/index.html").contains("|nav=Docs!;fancy;readonly;|"));

    // Failed writes are left out of the sitemap
    let sitemap = fs::read_to_string(harness.sitemap()).unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 1);
}

#[test]
fn test_orphan_page_rendered_without_navigation_entry() {
    let harness = Harness::new();
    let source = StaticSource::new(&[
        ("docs/index.md", "---\nnavigation_title: Docs\n---\nOk"),
        ("missing/child/index.md", "---\nnavigation_title: Orphan\n---\nOk"),
    ]);

    let (destination, errors) = harness.run(&source);

    assert!(errors.is_empty());
    let orphan = destination.page("missing/child/index.html");
    assert!(orphan.contains("crumbs=|prev=|next=|subs=|nav=Docs;|"), "{orphan}");
}

#[test]
fn test_template_engine_with_registered_partials() {
    let output = TempDir::new().unwrap();
    let mut engine = TemplateEngine::new();
    engine
        .add_partial(
            "nav/crumbs",
            "{% for c in breadcrumb %}{{ c.title }}/{% endfor %}",
        )
        .unwrap();
    let pipeline = Pipeline::new(config(Path::new(BASE), output.path(), output.path()))
        .unwrap()
        .with_template_engine(engine)
        .with_layout_source(Box::new(SingleLayout(
            "{% include \"nav/crumbs\" %}{{ contents|safe }}",
        )));
    assert_eq!(pipeline.config().templates.default_layout, "layout");

    let source = StaticSource::new(&[
        ("docs/index.md", "---\nnavigation_title: Docs\n---\nAll docs"),
        ("docs/a/index.md", "---\nnavigation_title: A\n---\nText"),
    ]);
    let mut destination = RecordingDestination::new(&output.path().join("sitemap.xml"));
    pipeline
        .run(&source, &mut destination, |e| panic!("{e}"))
        .unwrap();

    assert_eq!(destination.page("docs/a/index.html"), "Docs/A/<p>Text</p>\n");
}

#[test]
fn test_build_from_filesystem() {
    let root = TempDir::new().unwrap();
    let pages = root.path().join("pages");
    let templates = root.path().join("src");
    let output = root.path().join("dist");

    for (relative, contents) in [
        ("pages/index.md", "---\ntitle: Home\n---\n# Home"),
        (
            "pages/docs/index.md",
            "---\nnavigation_title: Docs\nposition: 1\n---\nSee [setup](setup/index.md).",
        ),
        (
            "pages/docs/setup/index.md",
            "---\nnavigation_title: Setup\nposition: 1\n---\n# Setup",
        ),
        (
            "src/templates/layout.html",
            "<html><head>{% include \"head\" %}</head><body>{{ contents|safe }}</body></html>",
        ),
        (
            "src/components/head.html",
            "{% for tag in metatags %}<meta {{ tag.attribute }}=\"{{ tag.key }}\">{% endfor %}",
        ),
    ] {
        let path = root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let pipeline = Pipeline::new(config(&pages, &templates, &output)).unwrap();
    let source = GlobSource::new(&pages, "**/*.md");
    let mut destination = FsDestination::new(&output);
    let mut errors = Vec::new();

    let report = pipeline
        .run(&source, &mut destination, |e| errors.push(e))
        .unwrap();

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(report.collected, 3);
    assert_eq!(report.written, 3);
    assert_eq!(report.failed, 0);

    let docs = fs::read_to_string(output.join("docs/index.html")).unwrap();
    assert!(docs.contains(r#"<a href="setup/">setup</a>"#), "{docs}");
    assert!(docs.contains(r#"<meta property="og:type">"#), "{docs}");
    assert!(output.join("index.html").is_file());
    assert!(output.join("docs/setup/index.html").is_file());
    assert!(output.join("sitemap.xml").is_file());
    assert!(output.join("feed/rss.xml").is_file());
}
