//! Image dimension probing from header bytes.
//!
//! Only the header is inspected, never a full decode. Every failure degrades to
//! [`Dimensions::default`] and is logged.

use tracing::{debug, warn};

use crate::types::Dimensions;

/// Read pixel dimensions from image bytes, or zeros if the format is unreadable
pub fn probe(bytes: &[u8]) -> Dimensions {
    match imagesize::blob_size(bytes) {
        Ok(size) => match (u32::try_from(size.width), u32::try_from(size.height)) {
            (Ok(width), Ok(height)) => {
                debug!(width, height, "Probed image dimensions");
                Dimensions { width, height }
            }
            _ => {
                warn!(
                    width = size.width,
                    height = size.height,
                    "Image dimensions out of range, leaving dimensions to zeros"
                );
                Dimensions::default()
            }
        },
        Err(e) => {
            warn!(
                error = %e,
                len = bytes.len(),
                "Error decoding image header, leaving dimensions to zeros"
            );
            Dimensions::default()
        }
    }
}
