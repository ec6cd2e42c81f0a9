//! Navigation tree building and per-page navigation context for Folio.
//!
//! This crate provides:
//! - [`page_url`]: Canonical URL derivation from a content file's location
//! - [`NavigationRecord`] and [`NavigationTree`]: Position-ordered page hierarchy
//! - [`NavigationContext`]: Breadcrumb, previous/next and sub-page links for one page
//!
//! # Quick Start
//!
//! ```
//! use folio_nav::{NavigationRecord, NavigationTree};
//!
//! let tree = NavigationTree::build(vec![
//!     NavigationRecord::new("docs", "Docs", Some(1.0)),
//!     NavigationRecord::new("docs/setup", "Setup", Some(1.0)),
//!     NavigationRecord::new("docs/usage", "Usage", Some(2.0)),
//! ]);
//!
//! let context = tree.context("docs/usage");
//! assert_eq!(context.previous_page.unwrap().url, "docs/setup");
//! assert_eq!(context.breadcrumb.len(), 2);
//! ```

mod context;
mod record;
mod tree;
mod url;

pub use context::{NavItem, NavigationContext, PageLink, extend};
pub use record::NavigationRecord;
pub use tree::NavigationTree;
pub use url::{UrlError, is_ancestor, page_url, parent_url, relative_path};
