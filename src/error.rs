// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the review workflow.

use crate::io::protocol::RequestKind;
use thiserror::Error;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// Response missing required fields or carrying an unknown media type.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Index {index} out of range (valid range 0..{len})")]
    OutOfRange { index: usize, len: usize },

    /// Toggle or hit-test referencing a player that does not exist.
    #[error("Invalid player index {index} (frame has {players} players)")]
    InvalidIndex { index: usize, players: usize },

    /// The frame is not cached yet and has to be fetched from the backend.
    #[error("Frame {0} has not been fetched")]
    FrameFetchRequired(usize),

    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// Structurally valid response carrying an `error` field.
    #[error("{0}")]
    BackendError(String),

    #[error("A {0} request is already in progress")]
    RequestPending(RequestKind),

    #[error("No media loaded")]
    NoSession,

    #[error("Please select at least one player")]
    NothingSelected,

    #[error("No highlight video has been created yet")]
    NoHighlight,

    #[error("Selections belong to '{found}' but '{expected}' is loaded")]
    SessionMismatch { expected: String, found: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ReviewError {
    fn from(e: reqwest::Error) -> Self {
        ReviewError::NetworkFailure(e.to_string())
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(e: serde_json::Error) -> Self {
        ReviewError::MalformedResponse(e.to_string())
    }
}

impl ReviewError {
    /// Failures reported by (or on the way to) the backend.
    ///
    /// These never touch in-memory state and are shown as dismissible notices.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ReviewError::NetworkFailure(_)
                | ReviewError::BackendError(_)
                | ReviewError::MalformedResponse(_)
        )
    }
}
