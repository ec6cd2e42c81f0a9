//! Per-page navigation context.
//!
//! [`extend`] decorates a copy of the navigation tree for one page and
//! collects the page's breadcrumb, previous/next links and sub-pages.
//!
//! The traversal is a pure recursion: every call returns the decorated node
//! together with the [`Trail`] found in its subtree, and the caller merges
//! child trails into its own. Nothing is accumulated outside a single call,
//! so contexts for different pages can be computed concurrently from the
//! same tree.

use serde::Serialize;

use crate::record::{NavigationRecord, url_depth};
use crate::tree::NavigationTree;
use crate::url::is_ancestor;

/// Navigation item decorated for one page render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// Page URL without leading slash.
    pub url: String,
    /// Sibling position from front matter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    /// True for the page being rendered.
    pub is_current: bool,
    /// True for ancestors of the page being rendered.
    pub is_active: bool,
    /// Decorated children.
    pub children: Vec<NavItem>,
}

/// Title and URL of a linked page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Display title.
    pub title: String,
    /// Page URL without leading slash.
    pub url: String,
}

impl From<&NavigationRecord> for PageLink {
    fn from(record: &NavigationRecord) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
        }
    }
}

/// Navigation context for one page render.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NavigationContext {
    /// Decorated copy of the whole navigation tree.
    pub navigation: Vec<NavItem>,
    /// Ancestors and the page itself, shallowest first.
    pub breadcrumb: Vec<PageLink>,
    /// Preceding page in reading order.
    pub previous_page: Option<PageLink>,
    /// Following page in reading order.
    pub next_page: Option<PageLink>,
    /// Immediate children of the page.
    pub sub_pages: Vec<PageLink>,
}

/// Partial context collected from one subtree.
#[derive(Default)]
struct Trail {
    breadcrumb: Vec<PageLink>,
    sub_pages: Vec<PageLink>,
    previous_page: Option<PageLink>,
    next_page: Option<PageLink>,
}

impl Trail {
    fn merge(&mut self, other: Trail) {
        self.breadcrumb.extend(other.breadcrumb);
        self.sub_pages.extend(other.sub_pages);
        if self.previous_page.is_none() {
            self.previous_page = other.previous_page;
        }
        if self.next_page.is_none() {
            self.next_page = other.next_page;
        }
    }
}

/// Compute the navigation context of `current_url`.
///
/// `flattened` must be `tree.flatten()`; it is taken as an argument so a
/// build can flatten once and share the sequence across pages. The tree is
/// only read.
#[must_use]
pub fn extend(
    tree: &NavigationTree,
    flattened: &[&NavigationRecord],
    current_url: &str,
) -> NavigationContext {
    let mut trail = Trail::default();
    let navigation = tree
        .roots()
        .iter()
        .map(|root| {
            let (item, root_trail) = decorate(root, flattened, current_url);
            trail.merge(root_trail);
            item
        })
        .collect();

    trail.breadcrumb.sort_by_key(|link| url_depth(&link.url));

    NavigationContext {
        navigation,
        breadcrumb: trail.breadcrumb,
        previous_page: trail.previous_page,
        next_page: trail.next_page,
        sub_pages: trail.sub_pages,
    }
}

fn decorate(
    node: &NavigationRecord,
    flattened: &[&NavigationRecord],
    current_url: &str,
) -> (NavItem, Trail) {
    let mut trail = Trail::default();
    let is_current = node.url == current_url;
    let is_active = !is_current && is_ancestor(&node.url, current_url);

    if is_current {
        if let Some(idx) = flattened.iter().position(|r| r.url == node.url) {
            trail.previous_page = idx
                .checked_sub(1)
                .map(|prev| PageLink::from(flattened[prev]));
            trail.next_page = flattened.get(idx + 1).map(|&next| PageLink::from(next));
        }
        trail.breadcrumb.push(PageLink::from(node));
        trail
            .sub_pages
            .extend(node.children.iter().map(PageLink::from));
    } else if is_active {
        trail.breadcrumb.push(PageLink::from(node));
    }

    let children = node
        .children
        .iter()
        .map(|child| {
            let (item, child_trail) = decorate(child, flattened, current_url);
            trail.merge(child_trail);
            item
        })
        .collect();

    let item = NavItem {
        title: node.title.clone(),
        url: node.url.clone(),
        position: node.position,
        is_current,
        is_active,
        children,
    };

    (item, trail)
}
