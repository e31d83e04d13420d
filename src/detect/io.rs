//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Detectors that run a model
//! locally usually want RGB input.

use crate::util::{SelectError, SelectResult};
use std::path::Path;

/// Loads an image from disk and converts it to 8-bit RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> SelectResult<image::RgbImage> {
    let img = image::open(path).map_err(|err| SelectError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Returns the file stem of `path` as an image identifier.
///
/// Falls back to the full path when the stem is missing or not valid UTF-8.
pub fn image_id_from_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}
