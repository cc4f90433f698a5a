//! Download-link extraction from detail pages.
//!
//! A streaming tag scanner built on `lol_html`: the page is fed through in chunks and only
//! `<a>` start tags are looked at. For each anchor the attributes are walked in document
//! order, tracking a pending `href` and whether the download class has been seen, so the
//! link is found whichever of the two attributes comes first.

use std::cell::RefCell;
use std::io::{ErrorKind, Read};

use lol_html::{HtmlRewriter, Settings, element};
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 8 * 1024;

/// Per-anchor attribute scan state
#[derive(Default)]
struct AnchorScan<'a> {
    class_marker: &'a str,
    pending_href: Option<String>,
    is_download_tag: bool,
}

impl<'a> AnchorScan<'a> {
    fn new(class_marker: &'a str) -> Self {
        Self {
            class_marker,
            ..Default::default()
        }
    }

    /// Feed one attribute; returns the link once both the marker class and href are seen
    fn attribute(&mut self, name: &str, value: String) -> Option<String> {
        match name {
            "class" => {
                if value.split_whitespace().any(|token| token == self.class_marker) {
                    self.is_download_tag = true;
                    if let Some(href) = self.pending_href.take() {
                        return Some(href);
                    }
                }
                None
            }
            "href" => {
                if self.is_download_tag {
                    Some(value)
                } else {
                    self.pending_href = Some(value);
                    None
                }
            }
            _ => None,
        }
    }
}

/// Find the first anchor carrying both `class_marker` and an `href`, returning the href
///
/// Returns an empty string when the stream ends, or fails to read, without a match.
pub fn extract_download_url<R: Read>(mut reader: R, class_marker: &str) -> String {
    let found: RefCell<Option<String>> = RefCell::new(None);

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a", |el| {
                    if found.borrow().is_some() {
                        return Ok(());
                    }
                    let mut scan = AnchorScan::new(class_marker);
                    for attr in el.attributes() {
                        if let Some(href) = scan.attribute(&attr.name(), attr.value()) {
                            *found.borrow_mut() = Some(href);
                            break;
                        }
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            if found.borrow().is_some() {
                break;
            }
            let n = match reader.read(&mut buf) {
                Ok(0) => {
                    if let Err(e) = rewriter.end() {
                        warn!(error = %e, "HTML scan finalization failed");
                    }
                    break;
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to read HTML stream");
                    break;
                }
            };
            if let Err(e) = rewriter.write(&buf[..n]) {
                warn!(error = %e, "HTML scan failed");
                break;
            }
        }
    }

    let url = found.into_inner().unwrap_or_default();
    if url.is_empty() {
        debug!(class = class_marker, "No download link found");
    } else {
        debug!(url = %url, "Download link found");
    }
    url
}
