// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Selection export and import.
//!
//! Selections are saved in the same shape as the highlight request body, in
//! YAML or JSON depending on the file extension.

use crate::io::protocol::HighlightRequest;
use anyhow::{bail, Result};
use std::path::Path;

/// Export selections to YAML format.
pub fn export_yaml(data: &HighlightRequest, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export selections to JSON format.
pub fn export_json(data: &HighlightRequest, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import selections from YAML format.
pub fn import_yaml(path: &Path) -> Result<HighlightRequest> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import selections from JSON format.
pub fn import_json(path: &Path) -> Result<HighlightRequest> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export, picking the format from the file extension.
pub fn export(data: &HighlightRequest, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import, picking the format from the file extension.
pub fn import(path: &Path) -> Result<HighlightRequest> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::protocol::SelectionPayload;
    use crate::models::detection::{Detection, FrameDetections};

    fn sample() -> HighlightRequest {
        let player = Detection {
            bbox: [10.0, 10.0, 50.0, 50.0].into(),
            center: Some([30.0, 30.0]),
            confidence: Some(0.87),
        };
        HighlightRequest {
            filename: "1700000000_match.mp4".to_string(),
            player_selections: vec![SelectionPayload {
                player_index: 0,
                frame_number: 12,
                player_data: player.clone(),
                frame_data: FrameDetections::new(vec![player], Vec::new()),
            }],
        }
    }

    #[test]
    fn test_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["selections.yaml", "selections.json"] {
            let path = dir.path().join(name);
            export(&sample(), &path).unwrap();
            assert_eq!(import(&path).unwrap(), sample());
        }
    }

    #[test]
    fn test_json_export_matches_request_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selections.json");
        export(&sample(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["player_selections"][0]["frameNumber"], 12);
        assert_eq!(value["player_selections"][0]["playerData"]["confidence"], 0.87);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export(&sample(), &dir.path().join("selections.txt")).is_err());
        assert!(import(&dir.path().join("selections.csv")).is_err());
    }
}
