use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::test_helpers::{FakeWeb, MemoryFilesystem, create_test_fetcher, test_config};
use super::*;
use crate::feed::tests::{TestItem, feed_xml};
use crate::probe::tests::png_header;
use crate::types::{Dimensions, FeedItem};


const USERNAME: &str = "denarced";
const OUTPUT_ROOT: &str = "/favorites";

fn output_root() -> PathBuf {
    PathBuf::from(OUTPUT_ROOT)
}

fn page_url(n: usize) -> String {
    format!("http://feeds.test/{USERNAME}/{n}")
}

fn media_url(title: &str) -> String {
    format!("http://img.test/{title}.png")
}

fn detail_url(title: &str) -> String {
    format!("https://www.deviantart.com/someone/art/{title}")
}

/// Serve a chain of feed pages at `page_url(1..)`, each item's media at `media_url(title)`
fn serve_favorites(web: &FakeWeb, pages: &[&[&str]]) {
    for (index, titles) in pages.iter().enumerate() {
        let media: Vec<String> = titles.iter().map(|t| media_url(t)).collect();
        let items: Vec<TestItem<'_>> = titles
            .iter()
            .zip(&media)
            .map(|(title, url)| TestItem::new(title, url))
            .collect();
        let next = (index + 1 < pages.len()).then(|| page_url(index + 2));
        web.serve(&page_url(index + 1), feed_xml(&items, next.as_deref()));

        for (title, url) in titles.iter().zip(&media) {
            web.serve(url, format!("image bytes of {title}"));
        }
    }
}

fn titles(report: &FetchReport) -> Vec<&str> {
    report
        .saved_items
        .iter()
        .map(|s| s.feed_item.title.as_str())
        .collect()
}

/// Stored paths split into (directory, filename)
fn split_stored(saved: &SavedItem) -> (String, String) {
    let path = Path::new(&saved.stored_path);
    let dir = path.parent().unwrap().to_string_lossy().into_owned();
    let file = path.file_name().unwrap().to_string_lossy().into_owned();
    (dir, file)
}
