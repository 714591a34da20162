// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media handling (images and videos).
//!
//! This module decodes the base64 frame images sent by the backend into RGBA
//! pixels suitable for display in egui, and decides which local files can be
//! uploaded at all.

use crate::error::{ReviewError, ReviewResult};
use base64::Engine;
use std::path::Path;

/// Image extensions the backend analyses as a single frame.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Video extensions the backend analyses frame by frame.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// A decoded frame image.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: Vec<u8>,
}

impl FrameImage {
    /// A transparent image of the given size.
    #[cfg(test)]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }
}

/// Decode a base64-encoded image (JPEG from the backend) to RGBA.
pub fn decode_base64_image(encoded: &str) -> ReviewResult<FrameImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ReviewError::MalformedResponse(format!("Invalid base64 image: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| ReviewError::MalformedResponse(format!("Undecodable image: {}", e)))?
        .to_rgba8();

    let (width, height) = img.dimensions();
    Ok(FrameImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Check that a file has an extension the backend accepts.
pub fn check_uploadable(path: &Path) -> ReviewResult<()> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&extension.as_str())
        || VIDEO_EXTENSIONS.contains(&extension.as_str())
    {
        Ok(())
    } else {
        Err(ReviewError::UnsupportedFile(path.display().to_string()))
    }
}

/// Every extension offered in the upload file picker.
pub fn uploadable_extensions() -> Vec<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(VIDEO_EXTENSIONS.iter())
        .copied()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a solid-colour PNG as base64, the way frames arrive on the wire.
    pub(crate) fn encoded_test_image(width: u32, height: u32) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
    }

    #[test]
    fn test_decode_base64_image() {
        let decoded = decode_base64_image(&encoded_test_image(4, 3)).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
        assert_eq!(decoded.pixels.len(), 4 * 3 * 4);
        assert_eq!(&decoded.pixels[..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        assert!(matches!(
            decode_base64_image("not base64!"),
            Err(ReviewError::MalformedResponse(_))
        ));
        let not_an_image = base64::engine::general_purpose::STANDARD.encode(b"hello");
        assert!(matches!(
            decode_base64_image(&not_an_image),
            Err(ReviewError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_check_uploadable() {
        assert!(check_uploadable(Path::new("match.MP4")).is_ok());
        assert!(check_uploadable(Path::new("/tmp/frame.jpeg")).is_ok());
        assert!(matches!(
            check_uploadable(Path::new("notes.txt")),
            Err(ReviewError::UnsupportedFile(_))
        ));
        assert!(check_uploadable(Path::new("no_extension")).is_err());
    }
}
