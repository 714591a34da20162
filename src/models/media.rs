// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Loaded media session state.
//!
//! A `MediaSession` holds the uploaded media's metadata and a cache of the
//! frames analysed so far. Images carry exactly one frame; video frames are
//! fetched lazily and kept in a bounded cache.

use crate::error::{ReviewError, ReviewResult};
use crate::io::media::{decode_base64_image, FrameImage};
use crate::io::protocol::{FrameResponse, UploadResponse};
use crate::models::detection::{Detection, FrameDetections};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Type of uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Parse the `type` field of an upload response.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// One analysed frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub image: Arc<FrameImage>,
    pub detections: FrameDetections,
    pub timestamp: Option<f64>,
}

impl Frame {
    /// Build a frame from a backend frame response, decoding its image.
    pub fn from_response(index: usize, response: FrameResponse) -> ReviewResult<Self> {
        if let Some(number) = response.frame_number {
            if number != index {
                return Err(ReviewError::MalformedResponse(format!(
                    "Requested frame {} but received frame {}",
                    index, number
                )));
            }
        }
        Self::build(index, &response.image, response.players, response.balls, response.timestamp)
    }

    fn build(
        index: usize,
        image: &str,
        players: Vec<Detection>,
        balls: Vec<Detection>,
        timestamp: Option<f64>,
    ) -> ReviewResult<Self> {
        let detections = FrameDetections::new(players, balls);
        if let Some((kind, detection)) = detections.find_malformed() {
            return Err(ReviewError::MalformedResponse(format!(
                "Invalid {:?} bounding box {:?} in frame {}",
                kind, detection.bbox, index
            )));
        }

        Ok(Self {
            index,
            image: Arc::new(decode_base64_image(image)?),
            detections,
            timestamp,
        })
    }
}

/// Frame cache with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct FrameCache {
    frames: HashMap<usize, Frame>,
    order: VecDeque<usize>,
    capacity: Option<usize>,
}

impl FrameCache {
    /// Create a cache; `None` means unbounded.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            frames: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(&index)
    }

    #[cfg(test)]
    pub fn contains(&self, index: usize) -> bool {
        self.frames.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Insert (or replace) a frame, evicting the oldest entries past capacity.
    pub fn insert(&mut self, frame: Frame) {
        let index = frame.index;
        if self.frames.insert(index, frame).is_some() {
            self.order.retain(|&i| i != index);
        }
        self.order.push_back(index);

        if let Some(capacity) = self.capacity {
            while self.frames.len() > capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.frames.remove(&oldest);
                        log::debug!("Evicted frame {} from cache", oldest);
                    }
                    None => break,
                }
            }
        }
    }
}

/// The currently loaded media and its analysed frames.
#[derive(Debug, Clone)]
pub struct MediaSession {
    pub kind: MediaKind,
    /// Opaque backend handle for the uploaded file.
    pub filename: String,
    pub total_frames: usize,
    /// Only known for videos.
    pub fps: Option<f64>,
    frames: FrameCache,
}

impl MediaSession {
    /// Build a session from an upload response.
    ///
    /// Images get their single frame; videos only get frame 0, the rest is
    /// fetched on demand and kept in a cache of `cache_capacity` frames.
    pub fn load(response: UploadResponse, cache_capacity: usize) -> ReviewResult<Self> {
        let media_type = response
            .media_type
            .ok_or_else(|| ReviewError::MalformedResponse("Missing media type".to_string()))?;
        let kind = MediaKind::from_wire(&media_type).ok_or_else(|| {
            ReviewError::MalformedResponse(format!("Unknown media type '{}'", media_type))
        })?;
        let filename = response
            .filename
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ReviewError::MalformedResponse("Missing filename".to_string()))?;

        match kind {
            MediaKind::Image => {
                let missing =
                    |field: &str| ReviewError::MalformedResponse(format!("Image response missing '{}'", field));
                let image = response.image.ok_or_else(|| missing("image"))?;
                let players = response.players.ok_or_else(|| missing("players"))?;
                let balls = response.balls.ok_or_else(|| missing("balls"))?;

                let mut frames = FrameCache::new(None);
                frames.insert(Frame::build(0, &image, players, balls, None)?);

                Ok(Self {
                    kind,
                    filename,
                    total_frames: 1,
                    fps: None,
                    frames,
                })
            }
            MediaKind::Video => {
                let info = response.video_info.ok_or_else(|| {
                    ReviewError::MalformedResponse("Video response missing 'video_info'".to_string())
                })?;
                if info.total_frames == 0 {
                    return Err(ReviewError::MalformedResponse(
                        "Video reports zero frames".to_string(),
                    ));
                }

                let mut frames = FrameCache::new(Some(cache_capacity));
                frames.insert(Frame::from_response(0, info.first_frame)?);

                Ok(Self {
                    kind,
                    filename,
                    total_frames: info.total_frames,
                    fps: Some(info.fps),
                    frames,
                })
            }
        }
    }

    /// Get a cached frame, or `FrameFetchRequired` if it has to be fetched.
    pub fn get_frame(&self, index: usize) -> ReviewResult<&Frame> {
        if index >= self.total_frames {
            return Err(ReviewError::OutOfRange {
                index,
                len: self.total_frames,
            });
        }
        self.frames
            .get(index)
            .ok_or(ReviewError::FrameFetchRequired(index))
    }

    /// Add a fetched frame to the cache.
    pub fn insert_frame(&mut self, frame: Frame) -> ReviewResult<()> {
        if frame.index >= self.total_frames {
            return Err(ReviewError::OutOfRange {
                index: frame.index,
                len: self.total_frames,
            });
        }
        self.frames.insert(frame);
        Ok(())
    }

    pub fn cached_frames(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
