// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides coordinate transformations between the on-screen
//! display rectangle of a frame and the frame's own pixel coordinates, in
//! which detections are expressed.

/// Scale an image to fit inside `available`, keeping its aspect ratio.
///
/// Returns the display `(width, height)`.
pub fn fit_size(image_width: u32, image_height: u32, available: (f32, f32)) -> (f32, f32) {
    if image_width == 0 || image_height == 0 || available.0 <= 0.0 || available.1 <= 0.0 {
        return (0.0, 0.0);
    }

    let img_aspect = image_width as f32 / image_height as f32;
    let available_aspect = available.0 / available.1;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.0, available.0 / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.1 * img_aspect, available.1)
    }
}

/// Convert an offset inside the display rectangle to image pixel coordinates.
pub fn display_to_image(
    offset: (f32, f32),
    display: (f32, f32),
    image_width: u32,
    image_height: u32,
) -> (f64, f64) {
    (
        offset.0 as f64 * image_width as f64 / display.0 as f64,
        offset.1 as f64 * image_height as f64 / display.1 as f64,
    )
}

/// Convert image pixel coordinates to an offset inside the display rectangle.
pub fn image_to_display(
    point: (f64, f64),
    display: (f32, f32),
    image_width: u32,
    image_height: u32,
) -> (f32, f32) {
    (
        (point.0 * display.0 as f64 / image_width as f64) as f32,
        (point.1 * display.1 as f64 / image_height as f64) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_size_wide_and_tall() {
        let (w, h) = fit_size(1600, 900, (800.0, 800.0));
        assert_eq!(w, 800.0);
        assert!((h - 450.0).abs() < 0.01);
        assert_eq!(fit_size(500, 1000, (800.0, 800.0)), (400.0, 800.0));
        assert_eq!(fit_size(0, 100, (800.0, 800.0)), (0.0, 0.0));
    }

    #[test]
    fn test_display_to_image_scales_click() {
        // 800x450 frame shown at half size: a click at (15, 15) lands on pixel (30, 30).
        let (x, y) = display_to_image((15.0, 15.0), (400.0, 225.0), 800, 450);
        assert!((x - 30.0).abs() < 0.0001);
        assert!((y - 30.0).abs() < 0.0001);
    }

    #[test]
    fn test_image_to_display_corners() {
        let display = (400.0, 225.0);
        assert_eq!(image_to_display((0.0, 0.0), display, 800, 450), (0.0, 0.0));
        assert_eq!(image_to_display((800.0, 450.0), display, 800, 450), (400.0, 225.0));
    }
}
