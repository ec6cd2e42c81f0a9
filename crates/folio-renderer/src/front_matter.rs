//! YAML front matter.
//!
//! A content file may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! navigation_title: Setup
//! position: 2
//! ---
//! # Setting things up
//! ```
//!
//! Known keys are typed fields of [`FrontMatter`]; any other key is kept in
//! [`FrontMatter::extra`] and passed through to templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page metadata declared in front matter.
///
/// All fields are optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Title used in navigation, breadcrumbs and prev/next links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_title: Option<String>,

    /// Position among siblings (ascending).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,

    /// Layout template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// Short summary, used as page description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<String>,

    /// Last change date (e.g. `2019-03-12`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<String>,

    /// Any other key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    /// Parse front matter from YAML content.
    ///
    /// Empty content returns a default instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, FrontMatterError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(trimmed)
            .map_err(|e| FrontMatterError::Parse(format!("Invalid YAML: {e}")))
    }

    /// Title shown in navigation: `navigation_title`, then `title`.
    #[must_use]
    pub fn navigation_title(&self) -> Option<&str> {
        self.navigation_title.as_deref().or(self.title.as_deref())
    }
}

/// Error type for front matter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
    /// Opening `---` without a closing fence.
    #[error("Front matter is not terminated by a `---` line")]
    Unterminated,
}

/// Split a content file into front matter and body.
///
/// Files that do not start with a `---` line have empty front matter and
/// the whole text as body. The closing fence may be `---` or `...`.
///
/// # Errors
///
/// Returns [`FrontMatterError::Unterminated`] if the block is never closed
/// and [`FrontMatterError::Parse`] if the YAML is malformed.
pub fn split_front_matter(text: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(after_open) = text
        .strip_prefix("---")
        .and_then(|rest| rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')))
    else {
        return Ok((FrontMatter::default(), text));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        let fence = line.trim_end_matches(['\r', '\n']);
        if fence == "---" || fence == "..." {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((FrontMatter::from_yaml(yaml)?, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}
