//! Navigation tree assembly and flattening.
//!
//! # Architecture
//!
//! The tree is built once from the complete record set:
//! - Records are grouped by parent URL
//! - Each record's children are attached recursively, sorted by position
//! - Top-level records (no parent) become the roots
//!
//! Records whose parent URL matches no record are orphans. They are not
//! promoted to roots and do not appear in the tree. The site home (`""`) has
//! no containing directory and is not a navigation entry either.

use std::collections::{HashMap, HashSet};

use crate::context::{NavigationContext, extend};
use crate::record::{NavigationRecord, by_position};

/// Position-ordered forest of navigation records.
///
/// Immutable after [`build`](Self::build); per-page decoration happens on
/// copies produced by [`extend`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationTree {
    roots: Vec<NavigationRecord>,
}

impl NavigationTree {
    /// Assemble the forest from every collected record.
    ///
    /// Record URLs are expected to be unique. Duplicates are reported with a
    /// warning and kept as they are; lookups resolve to the first match.
    #[must_use]
    pub fn build(records: Vec<NavigationRecord>) -> Self {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.url.as_str()) {
                tracing::warn!(url = %record.url, "Duplicate navigation url");
            }
        }

        let mut by_parent: HashMap<&str, Vec<&NavigationRecord>> = HashMap::new();
        let mut top_level = Vec::new();

        for record in &records {
            if record.url.is_empty() {
                tracing::debug!("Home page excluded from navigation");
                continue;
            }
            match record.parent.as_deref() {
                None => top_level.push(record),
                Some(parent) if seen.contains(parent) => {
                    by_parent.entry(parent).or_default().push(record);
                }
                Some(parent) => {
                    tracing::debug!(url = %record.url, parent, "Orphaned navigation record dropped");
                }
            }
        }

        let mut roots: Vec<_> = top_level
            .into_iter()
            .map(|record| attach_children(record, &by_parent))
            .collect();
        roots.sort_by(by_position);

        Self { roots }
    }

    /// Top-level records in position order.
    #[must_use]
    pub fn roots(&self) -> &[NavigationRecord] {
        &self.roots
    }

    /// Check if the tree has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order sequence of every record in the tree.
    ///
    /// A node precedes its children; children follow their sorted order.
    /// This is the reading order used for previous/next links.
    #[must_use]
    pub fn flatten(&self) -> Vec<&NavigationRecord> {
        fn visit<'a>(records: &'a [NavigationRecord], out: &mut Vec<&'a NavigationRecord>) {
            for record in records {
                out.push(record);
                visit(&record.children, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.roots, &mut out);
        out
    }

    /// Find a record by URL (first match in reading order).
    #[must_use]
    pub fn find(&self, url: &str) -> Option<&NavigationRecord> {
        self.flatten().into_iter().find(|record| record.url == url)
    }

    /// Compute the navigation context for one page.
    ///
    /// Flattens the tree on every call. Callers rendering many pages should
    /// flatten once and use [`extend`] directly.
    #[must_use]
    pub fn context(&self, current_url: &str) -> NavigationContext {
        extend(self, &self.flatten(), current_url)
    }
}

/// Copy a record and attach its children recursively.
///
/// Terminates because every child's URL strictly extends its parent's.
fn attach_children(
    record: &NavigationRecord,
    by_parent: &HashMap<&str, Vec<&NavigationRecord>>,
) -> NavigationRecord {
    let mut children: Vec<_> = by_parent
        .get(record.url.as_str())
        .into_iter()
        .flatten()
        .map(|child| attach_children(child, by_parent))
        .collect();
    children.sort_by(by_position);

    NavigationRecord {
        children,
        ..record.clone()
    }
}
