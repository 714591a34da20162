// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection backend wire protocol.
//!
//! Request and response shapes for `/upload`, `/get_frame` and `/highlight`,
//! plus the per-request state machine used to guard against overlapping
//! requests and late completions.

use crate::error::{ReviewError, ReviewResult};
use crate::models::detection::{Detection, FrameDetections};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of `POST /upload`.
///
/// Fields are optional here; `MediaSession::load` decides which ones the
/// announced media type requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<Detection>>,
    #[serde(default)]
    pub balls: Option<Vec<Detection>>,
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
}

/// Video metadata returned alongside the first frame.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    pub total_frames: usize,
    pub fps: f64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub first_frame: FrameResponse,
}

/// A single analysed frame (`GET /get_frame/{filename}/{index}`).
#[derive(Debug, Clone, Deserialize)]
pub struct FrameResponse {
    #[serde(default)]
    pub frame_number: Option<usize>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub image: String,
    pub players: Vec<Detection>,
    pub balls: Vec<Detection>,
}

/// One freeze frame in a highlight request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub player_index: usize,
    pub frame_number: usize,
    pub player_data: Detection,
    pub frame_data: FrameDetections,
}

/// Body of `POST /highlight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub filename: String,
    pub player_selections: Vec<SelectionPayload>,
}

/// Successful response of `POST /highlight`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HighlightResponse {
    pub output_file: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HighlightResponse {
    /// Download path for the rendered video, relative to the backend root.
    pub fn download_path(&self) -> String {
        match &self.download_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("/download/{}", self.output_file),
        }
    }
}

/// Decode a backend JSON body.
///
/// Any body with a string `error` field is reported as `BackendError`,
/// whatever else it contains.
pub fn decode_response<T: DeserializeOwned>(body: &str) -> ReviewResult<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        return Err(ReviewError::BackendError(message.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

/// The kinds of request the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Upload,
    Frame,
    Highlight,
    Download,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Upload => "upload",
            RequestKind::Frame => "frame",
            RequestKind::Highlight => "highlight",
            RequestKind::Download => "download",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a request: `Idle -> Pending -> {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Tracks the single in-flight request of one kind.
///
/// Every request gets a ticket; only the completion carrying the in-flight
/// ticket is accepted.
#[derive(Debug, Clone)]
pub struct RequestSlot {
    kind: RequestKind,
    state: RequestState,
    in_flight: Option<u64>,
}

impl RequestSlot {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            state: RequestState::Idle,
            in_flight: None,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// Move to `Pending` with the given ticket.
    pub fn begin(&mut self, ticket: u64) -> ReviewResult<()> {
        if self.is_pending() {
            return Err(ReviewError::RequestPending(self.kind));
        }
        self.state = RequestState::Pending;
        self.in_flight = Some(ticket);
        Ok(())
    }

    /// Record a completion. Returns `false` if the ticket is stale.
    pub fn complete(&mut self, ticket: u64, succeeded: bool) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.state = if succeeded {
            RequestState::Succeeded
        } else {
            RequestState::Failed
        };
        true
    }

    /// Forget the in-flight request so its completion will be discarded.
    pub fn abandon(&mut self) {
        self.in_flight = None;
        self.state = RequestState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_body() {
        let result: ReviewResult<FrameResponse> =
            decode_response(r#"{"error": "Could not get frame"}"#);
        match result {
            Err(ReviewError::BackendError(msg)) => assert_eq!(msg, "Could not get frame"),
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_missing_fields_is_malformed() {
        let result: ReviewResult<FrameResponse> = decode_response(r#"{"image": "abc"}"#);
        assert!(matches!(result, Err(ReviewError::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_video_upload() {
        let body = r#"{
            "type": "video",
            "filename": "1700000000_match.mp4",
            "video_info": {
                "total_frames": 250, "fps": 25.0, "duration": 10.0,
                "width": 1920, "height": 1080,
                "first_frame": {
                    "frame_number": 0, "timestamp": 0, "image": "",
                    "players": [{"bbox": [1, 2, 3, 4], "center": [2, 3], "confidence": 0.8}],
                    "balls": []
                }
            }
        }"#;
        let upload: UploadResponse = decode_response(body).unwrap();
        assert_eq!(upload.media_type.as_deref(), Some("video"));
        let info = upload.video_info.unwrap();
        assert_eq!(info.total_frames, 250);
        assert_eq!(info.first_frame.players.len(), 1);
        assert_eq!(info.first_frame.frame_number, Some(0));
    }

    #[test]
    fn test_selection_payload_uses_camel_case() {
        let payload = SelectionPayload {
            player_index: 1,
            frame_number: 4,
            player_data: Detection::new([1.0, 2.0, 3.0, 4.0].into()),
            frame_data: FrameDetections::default(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["playerIndex"], 1);
        assert_eq!(json["frameNumber"], 4);
        assert_eq!(json["playerData"]["bbox"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(json["frameData"]["players"], serde_json::json!([]));
    }

    #[test]
    fn test_download_path_fallback() {
        let mut response: HighlightResponse =
            decode_response(r#"{"output_file": "highlight_clip.mp4"}"#).unwrap();
        assert_eq!(response.download_path(), "/download/highlight_clip.mp4");

        response.download_url = Some("/files/x.mp4".to_string());
        assert_eq!(response.download_path(), "/files/x.mp4");
    }

    #[test]
    fn test_request_slot_lifecycle() {
        let mut slot = RequestSlot::new(RequestKind::Frame);
        assert_eq!(slot.state(), RequestState::Idle);

        slot.begin(1).unwrap();
        assert!(matches!(
            slot.begin(2),
            Err(ReviewError::RequestPending(RequestKind::Frame))
        ));

        assert!(!slot.complete(7, true));
        assert!(slot.is_pending());
        assert!(slot.complete(1, false));
        assert_eq!(slot.state(), RequestState::Failed);

        slot.begin(2).unwrap();
        slot.abandon();
        assert!(!slot.complete(2, true));
        assert_eq!(slot.state(), RequestState::Idle);
    }
}
