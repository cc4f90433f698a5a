//! Feed page fetching and parsing.
//!
//! Each feed page is an RSS 2.0 document with Media RSS extensions. For every `<item>`:
//! - `<media:content url=".." width=".." height=".."/>` gives the media URL and dimensions
//! - `<media:credit role="author">` entries give the author; feeds commonly list both a
//!   display name and an avatar URL under the same role, so the first value that doesn't
//!   start with `http` wins
//!
//! The channel's `<atom:link rel="next" href=".."/>` points at the next page. Only links in
//! the `atom` prefix are considered, in document order.

mod paginate;

pub use paginate::{PaginationSummary, paginate};

use rss::extension::{Extension, ExtensionMap};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::{Dimensions, FeedItem, FeedPage};

/// Namespace prefix of the channel's pagination links
const ATOM_PREFIX: &str = "atom";

/// Iterate every extension element with the given local name, whatever its prefix
fn extension_elements<'a>(
    extensions: &'a ExtensionMap,
    name: &'a str,
) -> impl Iterator<Item = &'a Extension> + 'a {
    extensions
        .values()
        .filter_map(move |elements| elements.get(name))
        .flatten()
}

/// Pick the first author credit whose value isn't a URL
pub(crate) fn extract_author<'a>(credits: impl IntoIterator<Item = &'a Extension>) -> String {
    credits
        .into_iter()
        .filter(|credit| credit.attrs().get("role").map(String::as_str) == Some("author"))
        .filter_map(|credit| credit.value())
        .find(|value| !value.starts_with("http"))
        .unwrap_or_default()
        .to_string()
}

/// Pick the first link whose relation is `next`
pub(crate) fn extract_next_url<'a>(
    links: impl IntoIterator<Item = &'a Extension>,
) -> Option<String> {
    links
        .into_iter()
        .find(|link| link.attrs().get("rel").map(String::as_str) == Some("next"))
        .and_then(|link| link.attrs().get("href").cloned())
        .filter(|href| !href.is_empty())
}

fn parse_dimension(content: &Extension, attr: &str) -> u32 {
    content
        .attrs()
        .get(attr)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn to_feed_item(item: &rss::Item) -> FeedItem {
    let content = extension_elements(item.extensions(), "content").next();
    let media_url = content
        .and_then(|c| c.attrs().get("url"))
        .filter(|url| !url.is_empty())
        .cloned();
    let dimensions = content
        .map(|c| Dimensions {
            width: parse_dimension(c, "width"),
            height: parse_dimension(c, "height"),
        })
        .unwrap_or_default();

    FeedItem {
        title: item.title().unwrap_or_default().to_string(),
        link: item.link().unwrap_or_default().to_string(),
        guid: item.guid().map(|g| g.value().to_string()).unwrap_or_default(),
        publication_date: item.pub_date().unwrap_or_default().to_string(),
        author: extract_author(extension_elements(item.extensions(), "credit")),
        media_url,
        dimensions,
    }
}

/// Parse one feed page
///
/// # Errors
/// Returns [`Error::Parse`] if the content isn't a well-formed RSS document
pub fn parse_feed_page(url: &str, content: &[u8]) -> Result<FeedPage> {
    let channel = rss::Channel::read_from(content).map_err(|e| Error::parse(url, e))?;

    let items = channel.items().iter().map(to_feed_item).collect();
    let atom_links = channel
        .extensions()
        .get(ATOM_PREFIX)
        .and_then(|atom| atom.get("link"))
        .into_iter()
        .flatten();
    let next_page_url = extract_next_url(atom_links);

    Ok(FeedPage {
        next_page_url,
        items,
    })
}

/// Fetch and parse one feed page
///
/// # Errors
/// Returns [`Error::Transport`] if the fetch fails and [`Error::Parse`] if the page is
/// malformed
pub async fn fetch_feed_page(client: &dyn HttpClient, url: &str) -> Result<FeedPage> {
    debug!(url, "About to fetch feed page");
    let content = client.fetch(url).await?;
    let page = parse_feed_page(url, &content)?;
    info!(
        url,
        items = page.items.len(),
        has_next = page.next_page_url.is_some(),
        "Feed page fetched"
    );
    Ok(page)
}
