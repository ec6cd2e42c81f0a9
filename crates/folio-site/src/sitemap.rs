//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/docs/setup/</loc>
//!   </url>
//! </urlset>
//! ```

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::artifact::ArtifactError;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One page listed in the sitemap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Page URL without leading slash (`""` for the home page).
    pub url: String,
}

/// Sitemap of every rendered page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sitemap {
    /// Site host every entry is prefixed with.
    pub hostname: String,
    /// Entries in output order.
    pub urls: Vec<SitemapEntry>,
}

impl Sitemap {
    /// Create an empty sitemap for `hostname`.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            urls: Vec::new(),
        }
    }

    /// Append a page.
    pub fn push(&mut self, url: impl Into<String>) {
        self.urls.push(SitemapEntry { url: url.into() });
    }

    /// Absolute location of an entry.
    fn loc(&self, entry: &SitemapEntry) -> String {
        page_location(&self.hostname, &entry.url)
    }

    /// Serialize to sitemap XML.
    pub fn to_xml(&self) -> Result<String, ArtifactError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
        ))?;
        for entry in &self.urls {
            let loc = self.loc(entry);
            writer.write_event(Event::Start(BytesStart::new("url")))?;
            writer.write_event(Event::Start(BytesStart::new("loc")))?;
            writer.write_event(Event::Text(BytesText::new(&loc)))?;
            writer.write_event(Event::End(BytesEnd::new("loc")))?;
            writer.write_event(Event::End(BytesEnd::new("url")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("urlset")))?;

        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }
}

/// Canonical URL of a page: `<host>/<url>/`, or `<host>/` for the home page.
#[must_use]
pub fn page_location(hostname: &str, url: &str) -> String {
    let host = hostname.trim_end_matches('/');
    if url.is_empty() {
        format!("{host}/")
    } else {
        format!("{host}/{url}/")
    }
}
