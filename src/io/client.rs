// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client for the detection backend.
//!
//! Calls are blocking; they are only ever made from worker threads (see
//! `io::worker`), never from the UI thread.

use crate::config::BackendConfig;
use crate::error::{ReviewError, ReviewResult};
use crate::io::protocol::{
    decode_response, FrameResponse, HighlightRequest, HighlightResponse, UploadResponse,
};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::path::Path;

/// Client for the detection backend.
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> ReviewResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ReviewError::NetworkFailure(format!("Invalid backend URL '{}': {}", config.base_url, e))
        })?;
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, base_url })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ReviewResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReviewError::NetworkFailure(format!("Backend URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolve a backend-relative path (or absolute URL) against the base URL.
    pub fn resolve(&self, path_or_url: &str) -> ReviewResult<Url> {
        self.base_url.join(path_or_url).map_err(|e| {
            ReviewError::MalformedResponse(format!("Invalid download URL '{}': {}", path_or_url, e))
        })
    }

    /// Upload a file for analysis (`POST /upload`).
    pub fn upload(&self, path: &Path) -> ReviewResult<UploadResponse> {
        let url = self.endpoint(&["upload"])?;
        let form = multipart::Form::new().file("file", path)?;

        log::debug!("Uploading {} to {}", path.display(), url);
        let response = self.http.post(url).multipart(form).send()?;
        read_body(response)
    }

    /// Fetch one analysed video frame (`GET /get_frame/{filename}/{index}`).
    pub fn fetch_frame(&self, filename: &str, index: usize) -> ReviewResult<FrameResponse> {
        let url = self.endpoint(&["get_frame", filename, &index.to_string()])?;

        log::debug!("Fetching frame {} of {}", index, filename);
        let response = self.http.get(url).send()?;
        read_body(response)
    }

    /// Request a highlight video (`POST /highlight`).
    pub fn create_highlight(&self, request: &HighlightRequest) -> ReviewResult<HighlightResponse> {
        let url = self.endpoint(&["highlight"])?;

        log::debug!(
            "Requesting highlight for {} with {} freeze frames",
            request.filename,
            request.player_selections.len()
        );
        let response = self.http.post(url).json(request).send()?;
        read_body(response)
    }

    /// Download a rendered video to `dest`, returning the number of bytes written.
    pub fn download(&self, url: &Url, dest: &Path) -> ReviewResult<u64> {
        let mut response = self.http.get(url.clone()).send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(match decode_response::<serde_json::Value>(&body) {
                Err(e @ ReviewError::BackendError(_)) => e,
                _ => ReviewError::NetworkFailure(format!("Download failed with status {}", status)),
            });
        }

        let written = write_replacing(dest, |file| Ok(response.copy_to(file)?))?;
        log::info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

/// Write through a sibling `.part` file and move it over `dest` on success.
///
/// On failure the partial file is removed and `dest` is left as it was.
fn write_replacing<F>(dest: &Path, write: F) -> ReviewResult<u64>
where
    F: FnOnce(&mut File) -> ReviewResult<u64>,
{
    let mut part_name = dest.file_name().unwrap_or_default().to_os_string();
    part_name.push(".part");
    let part = dest.with_file_name(part_name);

    let result = File::create(&part)
        .map_err(ReviewError::from)
        .and_then(|mut file| {
            let written = write(&mut file)?;
            file.sync_all()?;
            Ok(written)
        })
        .and_then(|written| {
            fs::rename(&part, dest)?;
            Ok(written)
        });

    if result.is_err() {
        if let Err(e) = fs::remove_file(&part) {
            log::debug!("Could not remove {}: {}", part.display(), e);
        }
    }
    result
}

/// Decode a JSON response, preferring the backend's own error message.
fn read_body<T: DeserializeOwned>(response: Response) -> ReviewResult<T> {
    let status = response.status();
    let body = response.text()?;
    let decoded = decode_response::<T>(&body);

    if status.is_success() {
        return decoded;
    }
    match decoded {
        Err(e @ ReviewError::BackendError(_)) => Err(e),
        _ => Err(ReviewError::NetworkFailure(format!(
            "Backend returned status {}",
            status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::protocol::SelectionPayload;
    use crate::models::detection::{Detection, FrameDetections};
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: String) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: uri,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("http://localhost:5000/".to_string());
        let url = client.endpoint(&["get_frame", "my clip.mp4", "12"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/get_frame/my%20clip.mp4/12");

        let url = client.resolve("/download/highlight_x.mp4").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/download/highlight_x.mp4");
        let url = client.resolve("http://cdn.example/x.mp4").unwrap();
        assert_eq!(url.as_str(), "http://cdn.example/x.mp4");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = BackendClient::new(&BackendConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(ReviewError::NetworkFailure(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_frame() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_frame/clip.mp4/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "frame_number": 3,
                "timestamp": 0.12,
                "image": "",
                "players": [{"bbox": [1, 2, 30, 40], "confidence": 0.7}],
                "balls": []
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let frame = tokio::task::spawn_blocking(move || client_for(uri).fetch_frame("clip.mp4", 3))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(frame.frame_number, Some(3));
        assert_eq!(frame.players.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_body_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_frame/gone.mp4/0"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Video file not found"})),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = tokio::task::spawn_blocking(move || client_for(uri).fetch_frame("gone.mp4", 0))
            .await
            .unwrap();

        match result {
            Err(ReviewError::BackendError(msg)) => assert_eq!(msg, "Video file not found"),
            other => panic!("expected backend error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_json_failure_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/highlight"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let request = HighlightRequest {
            filename: "clip.mp4".to_string(),
            player_selections: Vec::new(),
        };
        let result =
            tokio::task::spawn_blocking(move || client_for(uri).create_highlight(&request))
                .await
                .unwrap();

        assert!(matches!(result, Err(ReviewError::NetworkFailure(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_highlight_sends_selections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/highlight"))
            .and(body_partial_json(json!({
                "filename": "clip.mp4",
                "player_selections": [{"playerIndex": 0, "frameNumber": 2}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "output_file": "highlight_clip.mp4",
                "download_url": "/download/highlight_clip.mp4"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let player = Detection::new([10.0, 10.0, 50.0, 50.0].into());
        let request = HighlightRequest {
            filename: "clip.mp4".to_string(),
            player_selections: vec![SelectionPayload {
                player_index: 0,
                frame_number: 2,
                player_data: player.clone(),
                frame_data: FrameDetections::new(vec![player], Vec::new()),
            }],
        };

        let uri = server.uri();
        let response =
            tokio::task::spawn_blocking(move || client_for(uri).create_highlight(&request))
                .await
                .unwrap()
                .unwrap();

        assert_eq!(response.output_file, "highlight_clip.mp4");
        assert_eq!(response.download_path(), "/download/highlight_clip.mp4");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_upload_and_download() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "image",
                "filename": "1700000000_photo.jpg",
                "image": "",
                "players": [],
                "balls": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/download/highlight_clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 32]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let upload_path = dir.path().join("photo.jpg");
        std::fs::write(&upload_path, b"jpeg bytes").unwrap();
        let dest = dir.path().join("out.mp4");

        let uri = server.uri();
        let dest_clone = dest.clone();
        let (upload, written) = tokio::task::spawn_blocking(move || {
            let client = client_for(uri);
            let upload = client.upload(&upload_path).unwrap();
            let url = client.resolve("/download/highlight_clip.mp4").unwrap();
            let written = client.download(&url, &dest_clone).unwrap();
            (upload, written)
        })
        .await
        .unwrap();

        assert_eq!(upload.media_type.as_deref(), Some("image"));
        assert_eq!(upload.filename.as_deref(), Some("1700000000_photo.jpg"));
        assert_eq!(written, 32);
        assert_eq!(std::fs::read(&dest).unwrap().len(), 32);
    }

    #[test]
    fn test_failed_write_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("highlight.mp4");
        std::fs::write(&dest, b"previous video").unwrap();

        let result = write_replacing(&dest, |file| {
            file.write_all(b"partial")?;
            Err(ReviewError::NetworkFailure("connection reset".to_string()))
        });

        assert!(matches!(result, Err(ReviewError::NetworkFailure(_))));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous video");
        assert!(!dir.path().join("highlight.mp4.part").exists());
    }

    #[test]
    fn test_successful_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("highlight.mp4");
        std::fs::write(&dest, b"previous video").unwrap();

        let written = write_replacing(&dest, |file| {
            file.write_all(b"new")?;
            Ok(3)
        })
        .unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
        assert!(!dir.path().join("highlight.mp4.part").exists());
    }
}
