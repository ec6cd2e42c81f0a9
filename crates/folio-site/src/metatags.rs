//! Social and search metatags for a page.

use serde::Serialize;

/// Page data the metatags are generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Twitter card type (e.g. `summary`).
    pub card: String,
    pub site_name: String,
    /// Canonical page URL.
    pub url: String,
}

/// Which attribute a `<meta>` element names its key with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttribute {
    Name,
    Property,
}

/// One `<meta>` element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub attribute: MetaAttribute,
    pub key: String,
    pub content: String,
}

impl MetaTag {
    fn name(key: &str, content: &str) -> Self {
        Self {
            attribute: MetaAttribute::Name,
            key: key.to_owned(),
            content: content.to_owned(),
        }
    }

    fn property(key: &str, content: &str) -> Self {
        Self {
            attribute: MetaAttribute::Property,
            key: key.to_owned(),
            content: content.to_owned(),
        }
    }
}

/// Generate Open Graph, Twitter card and description tags.
///
/// Tags for absent optional values are omitted.
#[must_use]
pub fn generate(meta: &PageMeta) -> Vec<MetaTag> {
    let mut tags = Vec::with_capacity(9);

    if let Some(description) = &meta.description {
        tags.push(MetaTag::name("description", description));
    }

    tags.push(MetaTag::name("twitter:card", &meta.card));
    if let Some(title) = &meta.title {
        tags.push(MetaTag::name("twitter:title", title));
    }
    if let Some(description) = &meta.description {
        tags.push(MetaTag::name("twitter:description", description));
    }

    tags.push(MetaTag::property("og:type", "website"));
    tags.push(MetaTag::property("og:site_name", &meta.site_name));
    tags.push(MetaTag::property("og:url", &meta.url));
    if let Some(title) = &meta.title {
        tags.push(MetaTag::property("og:title", title));
    }
    if let Some(description) = &meta.description {
        tags.push(MetaTag::property("og:description", description));
    }

    tags
}
