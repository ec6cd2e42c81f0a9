//! Syndication feeds: JSON Feed 1, Atom 1 and RSS 2.
//!
//! A feed lists the pages that have a title, newest `changed` date first.
//! Pages without a (parseable) date follow in discovery order.

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rss::validation::Validate;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use serde::Serialize;

use crate::artifact::ArtifactError;
use crate::page::ContentFile;
use crate::sitemap::page_location;

const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = "Folio";

/// Site identity shared by feeds, metatags and templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    /// Site host, without trailing slash.
    pub url: String,
    pub language: String,
}

impl SiteInfo {
    /// Canonical URL of the page at `url`.
    #[must_use]
    pub fn page_url(&self, url: &str) -> String {
        page_location(&self.url, url)
    }
}

/// One feed entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    /// Canonical page URL.
    pub url: String,
    pub summary: Option<String>,
    /// Rendered page HTML.
    pub content_html: String,
    pub date: Option<DateTime<Utc>>,
}

/// Feed of a site's pages.
#[derive(Clone, Debug)]
pub struct Feed {
    site: SiteInfo,
    items: Vec<FeedItem>,
}

impl Feed {
    /// Collect the feed items from every page of a build.
    #[must_use]
    pub fn from_files(site: &SiteInfo, files: &[ContentFile]) -> Self {
        let mut items: Vec<FeedItem> = files
            .iter()
            .filter_map(|file| {
                let title = file.title()?;
                let date = file.front_matter.changed.as_deref().and_then(|changed| {
                    let parsed = parse_date(changed);
                    if parsed.is_none() {
                        tracing::warn!(
                            path = %file.relative_path.display(),
                            changed,
                            "Unrecognized change date"
                        );
                    }
                    parsed
                });
                Some(FeedItem {
                    title: title.to_owned(),
                    url: site.page_url(&file.url),
                    summary: file.front_matter.lead.clone(),
                    content_html: file.contents.clone(),
                    date,
                })
            })
            .collect();

        // Newest first; undated items keep discovery order at the end
        items.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            site: site.clone(),
            items,
        }
    }

    /// Feed entries in output order.
    #[must_use]
    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Date of the newest entry, or now.
    fn updated(&self) -> DateTime<Utc> {
        self.items
            .iter()
            .find_map(|item| item.date)
            .unwrap_or_else(Utc::now)
    }

    fn home_page_url(&self) -> String {
        self.site.page_url("")
    }

    /// Serialize as JSON Feed 1.
    pub fn json1(&self) -> Result<String, ArtifactError> {
        #[derive(Serialize)]
        struct JsonFeed<'a> {
            version: &'static str,
            title: &'a str,
            home_page_url: String,
            #[serde(skip_serializing_if = "str::is_empty")]
            description: &'a str,
            items: Vec<JsonFeedItem<'a>>,
        }

        #[derive(Serialize)]
        struct JsonFeedItem<'a> {
            id: &'a str,
            url: &'a str,
            title: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            summary: Option<&'a str>,
            content_html: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            date_modified: Option<String>,
        }

        let feed = JsonFeed {
            version: JSON_FEED_VERSION,
            title: &self.site.title,
            home_page_url: self.home_page_url(),
            description: &self.site.description,
            items: self
                .items
                .iter()
                .map(|item| JsonFeedItem {
                    id: &item.url,
                    url: &item.url,
                    title: &item.title,
                    summary: item.summary.as_deref(),
                    content_html: &item.content_html,
                    date_modified: item.date.map(|date| date.to_rfc3339()),
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&feed)?)
    }

    /// Serialize as Atom 1.
    pub fn atom1(&self) -> Result<String, ArtifactError> {
        let updated = self.updated().to_rfc3339();
        let home = self.home_page_url();
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("feed").with_attributes([("xmlns", ATOM_NS)]),
        ))?;
        text_element(&mut writer, "id", &home)?;
        text_element(&mut writer, "title", &self.site.title)?;
        if !self.site.description.is_empty() {
            text_element(&mut writer, "subtitle", &self.site.description)?;
        }
        text_element(&mut writer, "updated", &updated)?;
        writer.write_event(Event::Empty(
            BytesStart::new("link").with_attributes([("rel", "alternate"), ("href", home.as_str())]),
        ))?;
        text_element(&mut writer, "generator", GENERATOR)?;

        for item in &self.items {
            let item_updated = item.date.map_or_else(|| updated.clone(), |d| d.to_rfc3339());
            writer.write_event(Event::Start(BytesStart::new("entry")))?;
            text_element(&mut writer, "title", &item.title)?;
            text_element(&mut writer, "id", &item.url)?;
            writer.write_event(Event::Empty(
                BytesStart::new("link").with_attributes([("href", item.url.as_str())]),
            ))?;
            text_element(&mut writer, "updated", &item_updated)?;
            if let Some(summary) = &item.summary {
                text_element(&mut writer, "summary", summary)?;
            }
            writer.write_event(Event::Start(
                BytesStart::new("content").with_attributes([("type", "html")]),
            ))?;
            writer.write_event(Event::Text(BytesText::new(&item.content_html)))?;
            writer.write_event(Event::End(BytesEnd::new("content")))?;
            writer.write_event(Event::End(BytesEnd::new("entry")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("feed")))?;

        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }

    /// Serialize as RSS 2.
    pub fn rss2(&self) -> Result<String, ArtifactError> {
        let items: Vec<rss::Item> = self
            .items
            .iter()
            .map(|item| {
                ItemBuilder::default()
                    .title(item.title.clone())
                    .link(item.url.clone())
                    .guid(
                        GuidBuilder::default()
                            .permalink(true)
                            .value(item.url.clone())
                            .build(),
                    )
                    .description(item.summary.clone())
                    .content(item.content_html.clone())
                    .pub_date(item.date.map(|date| date.to_rfc2822()))
                    .build()
            })
            .collect();

        let channel = ChannelBuilder::default()
            .title(self.site.title.clone())
            .link(self.home_page_url())
            .description(self.site.description.clone())
            .language(self.site.language.clone())
            .generator(GENERATOR.to_owned())
            .items(items)
            .build();

        channel
            .validate()
            .map_err(|e| ArtifactError::Rss(e.to_string()))?;
        Ok(channel.to_string())
    }
}

/// Parse a `changed` value: `YYYY-MM-DD` or RFC 3339.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ArtifactError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
