//! Front matter parsing and markdown rendering for Folio.
//!
//! # Example
//!
//! ```
//! use folio_renderer::{MarkdownRenderer, split_front_matter};
//!
//! let source = "---\ntitle: Hello\nposition: 1\n---\n# Hello\n\nSee [setup](../setup/index.md).";
//! let (front_matter, body) = split_front_matter(source).unwrap();
//! assert_eq!(front_matter.title.as_deref(), Some("Hello"));
//!
//! let rendered = MarkdownRenderer::new("pages/hello/index.md").render(body);
//! assert!(rendered.html.contains(r#"href="../setup/""#));
//! ```

mod front_matter;
mod markdown;

pub use front_matter::{FrontMatter, FrontMatterError, split_front_matter};
pub use markdown::{MarkdownRenderer, RenderedMarkdown, TocEntry, rewrite_md_link};
