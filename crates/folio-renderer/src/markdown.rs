//! Markdown to HTML conversion.
//!
//! Wraps `pulldown-cmark` with the adjustments a page-per-directory site
//! needs:
//! - links to `.md` files point at the target page's directory
//! - headings receive stable `id` slugs
//! - the first H1 is reported as the page title, later headings as ToC

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (2-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Result of rendering one markdown document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedMarkdown {
    /// Rendered HTML.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Headings below H1, in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer for one source file.
pub struct MarkdownRenderer {
    source_path: PathBuf,
}

impl MarkdownRenderer {
    /// Create a renderer for the file at `source_path`.
    pub fn new(source_path: impl AsRef<Path>) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
        }
    }

    /// Render markdown text to HTML.
    #[must_use]
    pub fn render(&self, text: &str) -> RenderedMarkdown {
        let mut events: Vec<Event<'_>> = Parser::new_ext(text, parser_options())
            .map(|event| self.rewrite_link(event))
            .collect();

        let mut slugs = Slugs::default();
        for event in &events {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                slugs.reserve(id);
            }
        }
        let mut title = None;
        let mut toc = Vec::new();

        for i in 0..events.len() {
            let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
                continue;
            };
            let level = *level;
            let explicit_id = id.as_ref().map(ToString::to_string);
            let text = heading_text(&events[i + 1..]);
            let anchor = explicit_id.unwrap_or_else(|| slugs.unique(&text));

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(anchor.clone()));
            }

            if level == HeadingLevel::H1 {
                if title.is_none() {
                    title = Some(text);
                }
            } else {
                toc.push(TocEntry {
                    level: level as u8,
                    title: text,
                    id: anchor,
                });
            }
        }

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());

        RenderedMarkdown {
            html: out,
            title,
            toc,
        }
    }

    fn rewrite_link<'a>(&self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match rewrite_md_link(&dest_url) {
                    Some(rewritten) => {
                        tracing::trace!(
                            source = %self.source_path.display(),
                            from = %dest_url,
                            to = %rewritten,
                            "Rewrote page link"
                        );
                        CowStr::from(rewritten)
                    }
                    None => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            other => other,
        }
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Rewrite a relative link to a `.md` file into a link to its page directory.
///
/// Returns `None` for links that need no change (external URLs, anchors,
/// non-markdown targets).
///
/// - `../setup/index.md` -> `../setup/`
/// - `other.md#usage` -> `./#usage`
#[must_use]
pub fn rewrite_md_link(dest: &str) -> Option<String> {
    if dest.contains("://") || dest.starts_with("mailto:") || dest.starts_with('#') {
        return None;
    }

    let (path, fragment) = match dest.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (dest, None),
    };

    if !path.ends_with(".md") {
        return None;
    }

    let dir = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "./",
    };

    Some(match fragment {
        Some(fragment) => format!("{dir}#{fragment}"),
        None => dir.to_owned(),
    })
}

/// Plain text of a heading, read up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Unique anchor slugs within one document.
///
/// Explicit heading ids are reserved up front; generated slugs never reuse
/// a taken id.
#[derive(Default)]
struct Slugs {
    taken: HashSet<String>,
}

impl Slugs {
    fn reserve(&mut self, id: &str) {
        self.taken.insert(id.to_owned());
    }

    fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();
        let mut suffix = 0;
        while self.taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(text: &str) -> RenderedMarkdown {
        MarkdownRenderer::new("pages/test/index.md").render(text)
    }

    #[test]
    fn test_render_basic_markdown() {
        let result = render("Some **bold** text");
        assert_eq!(result.html, "<p>Some <strong>bold</strong> text</p>\n");
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_render_extracts_first_h1_as_title() {
        let result = render("# First\n\n# Second\n");
        assert_eq!(result.title.as_deref(), Some("First"));
        assert!(result.html.contains(r#"<h1 id="first">First</h1>"#));
        assert!(result.toc.is_empty());
    }

    #[test]
    fn test_render_builds_toc_with_unique_ids() {
        let result = render("# Title\n\n## Usage\n\n### Details\n\n## Usage\n");
        assert_eq!(
            result.toc,
            vec![
                TocEntry {
                    level: 2,
                    title: "Usage".to_owned(),
                    id: "usage".to_owned(),
                },
                TocEntry {
                    level: 3,
                    title: "Details".to_owned(),
                    id: "details".to_owned(),
                },
                TocEntry {
                    level: 2,
                    title: "Usage".to_owned(),
                    id: "usage-1".to_owned(),
                },
            ]
        );
        assert!(result.html.contains(r#"<h2 id="usage-1">Usage</h2>"#));
    }

    #[test]
    fn test_render_keeps_explicit_heading_id() {
        let result = render("## Custom heading {#custom}\n");
        assert_eq!(result.toc[0].id, "custom");
        assert!(result.html.contains(r#"id="custom""#));
    }

    #[test]
    fn test_render_generated_ids_avoid_explicit_ids() {
        let result = render("## Usage {#usage}\n\n## Usage\n");
        let ids: Vec<_> = result.toc.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["usage", "usage-1"]);

        // Explicit id further down the page still wins
        let result = render("## Usage\n\n## Intro {#usage}\n");
        let ids: Vec<_> = result.toc.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["usage-1", "usage"]);
        assert!(result.html.contains(r#"<h2 id="usage-1">Usage</h2>"#));
    }

    #[test]
    fn test_render_heading_with_code() {
        let result = render("## The `aria-hidden` attribute\n");
        assert_eq!(result.toc[0].title, "The aria-hidden attribute");
        assert_eq!(result.toc[0].id, "the-aria-hidden-attribute");
    }

    #[test]
    fn test_render_rewrites_md_links() {
        let result = render("[Setup](../setup/index.md) and [site](https://example.com/a.md)");
        assert!(result.html.contains(r#"href="../setup/""#));
        assert!(result.html.contains(r#"href="https://example.com/a.md""#));
    }

    #[test]
    fn test_render_tables_enabled() {
        let result = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(result.html.contains("<table>"));
    }

    #[test]
    fn test_rewrite_md_link() {
        assert_eq!(rewrite_md_link("../b/index.md").as_deref(), Some("../b/"));
        assert_eq!(rewrite_md_link("other.md").as_deref(), Some("./"));
        assert_eq!(
            rewrite_md_link("../b/index.md#usage").as_deref(),
            Some("../b/#usage")
        );
        assert_eq!(rewrite_md_link("#usage"), None);
        assert_eq!(rewrite_md_link("image.png"), None);
        assert_eq!(rewrite_md_link("http://example.com/x.md"), None);
        assert_eq!(rewrite_md_link("mailto:a@example.com"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaces -- and_underscores "), "spaces-and-underscores");
        assert_eq!(slugify("Ümlaut ß"), "ümlaut-ß");
        assert_eq!(slugify("!!!"), "section");
    }
}
