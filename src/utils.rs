//! Utility functions for filenames and download identifiers

use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Derive a local filename from a media URL
///
/// Takes the last path segment, drops any query string and prepends `prefix_` when
/// `prefix` is non-empty.
///
/// # Examples
///
/// ```
/// use favorites_dl::utils::derive_filename;
///
/// assert_eq!(derive_filename("", "http://a.com/me.jpg?x=1"), "me.jpg");
/// assert_eq!(derive_filename("dox", "http://a.com/me.jpg?x=1"), "dox_me.jpg");
/// ```
pub fn derive_filename(prefix: &str, url: &str) -> String {
    // E.g. image.jpg?token=blaablaa or image.jpg
    let last_segment = url.rsplit('/').next().unwrap_or(url);
    let name = last_segment.split('?').next().unwrap_or(last_segment);
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", prefix, name)
    }
}

/// Generate a random identifier for an exclusive download directory
///
/// 128 bits from the OS random source, with RFC 4122 variant and version 4 bits set.
///
/// # Errors
/// Returns [`Error::Randomness`] if the OS random source fails
pub fn new_download_id() -> Result<Uuid> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Randomness(e.to_string()))?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}
