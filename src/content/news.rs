//! Headlines from an RSS or Atom feed, BBC World News by default

use super::{ContentGenerator, ContentHandler};
use crate::config::Section;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_FEED_URL: &str = "https://feeds.bbci.co.uk/news/world/rss.xml";
pub const DEFAULT_MAX_ITEMS: usize = 4;
pub const FAILURE_TEXT: &str = "Failed to reach BBC News";
pub const DEFAULT_INTRO: &str =
    "And now, The latest stories from the World section of the BBC News.\n\n";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Description,
}

impl FeedEntry {
    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Description => self.description.push_str(text),
        }
    }
}

/// HTML entities that show up in feed text but are not defined by XML
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some(" "),
        "ndash" => Some("-"),
        "mdash" => Some("-"),
        "hellip" => Some("..."),
        "lsquo" | "rsquo" => Some("'"),
        "ldquo" | "rdquo" => Some("\""),
        "pound" => Some("£"),
        "euro" => Some("€"),
        _ => None,
    }
}

/// Extract entries from an RSS (`item`) or Atom (`entry`) document.
/// Only direct children of an entry are read, so nested extension elements
/// such as `media:content/media:title` are ignored.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;
    let mut is_feed = false;
    let mut depth = 0usize;
    let mut entry_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let child_of_entry = current.is_some() && depth == entry_depth + 1;
                match e.name().as_ref() {
                    b"rss" | b"feed" | b"rdf:RDF" | b"RDF" => is_feed = true,
                    b"item" | b"entry" => {
                        current = Some(FeedEntry::default());
                        entry_depth = depth;
                    }
                    b"title" if child_of_entry => field = Some(Field::Title),
                    b"description" | b"summary" if child_of_entry => {
                        field = Some(Field::Description)
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"item" | b"entry" => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    b"title" | b"description" | b"summary" if depth == entry_depth + 1 => {
                        field = None
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    match text.unescape_with(html_entity) {
                        Ok(unescaped) => entry.push(field, &unescaped),
                        Err(e) => {
                            debug!("📰 Keeping raw feed text: {}", e);
                            entry.push(field, &String::from_utf8_lossy(&text));
                        }
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.push(field, String::from_utf8_lossy(&data.into_inner()).trim());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed feed at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    if !is_feed {
        return Err("Not an RSS or Atom document".to_string());
    }
    Ok(entries)
}

#[derive(Debug)]
pub struct NewsParser {
    client: Client,
    url: String,
    max_items: usize,
    intro: String,
}

impl NewsParser {
    pub fn new(section: &Section<ContentHandler>) -> Self {
        let max_items = section
            .get("max_items")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_ITEMS);

        Self {
            client: Client::new(),
            url: section.get_str_or("url", DEFAULT_FEED_URL),
            max_items,
            intro: section.get_str_or("intro", DEFAULT_INTRO),
        }
    }

    async fn fetch(&self) -> Result<Vec<FeedEntry>, String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Feed returned {}", status));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        parse_feed(&body)
    }
}

#[async_trait]
impl ContentGenerator for NewsParser {
    async fn generate(&self) -> String {
        match self.fetch().await {
            Ok(entries) => {
                debug!("📰 Feed returned {} entries", entries.len());
                let mut text = self.intro.clone();
                for entry in entries.iter().take(self.max_items) {
                    text.push_str(&format!("{}.\n{}\n\n", entry.title, entry.description));
                }
                text
            }
            Err(e) => {
                error!("❌ News feed {} failed: {}", self.url, e);
                FAILURE_TEXT.to_string()
            }
        }
    }

    fn name(&self) -> &str {
        "bbc_news"
    }
}
