// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection data structures.
//!
//! This module defines the bounding boxes returned by the detection backend
//! and the per-frame split between player and ball detections.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in image pixel coordinates.
///
/// On the wire this is the four-element array `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Check whether a point lies inside the box (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Finite coordinates with the corners in `[x1, y1, x2, y2]` order.
    ///
    /// Zero-width boxes are accepted: the backend truncates coordinates to
    /// whole pixels, which can collapse very small detections.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Classification of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    Player,
    Ball,
}

/// A single detection as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Detection {
    #[cfg(test)]
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            center: None,
            confidence: None,
        }
    }
}

/// All detections of one frame, split by kind as the backend sends them.
///
/// Player indices used throughout the crate index into `players` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    pub players: Vec<Detection>,
    pub balls: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(players: Vec<Detection>, balls: Vec<Detection>) -> Self {
        Self { players, balls }
    }

    /// Get the player detection at `index`, if any.
    pub fn player(&self, index: usize) -> Option<&Detection> {
        self.players.get(index)
    }

    /// Iterate over every detection, players first.
    pub fn iter(&self) -> impl Iterator<Item = (DetectionKind, &Detection)> {
        self.players
            .iter()
            .map(|d| (DetectionKind::Player, d))
            .chain(self.balls.iter().map(|d| (DetectionKind::Ball, d)))
    }

    /// Return the first detection whose box is not well formed.
    pub fn find_malformed(&self) -> Option<(DetectionKind, &Detection)> {
        self.iter().find(|(_, d)| !d.bbox.is_well_formed())
    }
}
