// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background execution of backend requests.
//!
//! Each command runs on its own thread; the finished event is sent back over a
//! channel and picked up by the UI loop. Events carry the ticket (and for
//! frames the session generation and index) they were issued with so the
//! controller can drop late results.

use crate::error::ReviewResult;
use crate::io::client::BackendClient;
use crate::io::protocol::{HighlightRequest, HighlightResponse};
use crate::models::media::{Frame, MediaSession};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// A request issued by the review controller.
#[derive(Debug, Clone)]
pub enum Command {
    Upload {
        ticket: u64,
        path: PathBuf,
    },
    FetchFrame {
        ticket: u64,
        generation: u64,
        filename: String,
        index: usize,
    },
    CreateHighlight {
        ticket: u64,
        request: HighlightRequest,
    },
    Download {
        ticket: u64,
        path_or_url: String,
        dest: PathBuf,
    },
}

/// A completed request.
#[derive(Debug)]
pub enum BackendEvent {
    Uploaded {
        ticket: u64,
        result: ReviewResult<MediaSession>,
    },
    FrameLoaded {
        ticket: u64,
        generation: u64,
        index: usize,
        result: ReviewResult<Frame>,
    },
    HighlightCreated {
        ticket: u64,
        result: ReviewResult<HighlightResponse>,
    },
    Downloaded {
        ticket: u64,
        dest: PathBuf,
        result: ReviewResult<u64>,
    },
}

/// Runs commands on background threads.
pub struct BackendWorker {
    client: Arc<BackendClient>,
    cache_capacity: usize,
    sender: Sender<BackendEvent>,
    receiver: Receiver<BackendEvent>,
    repaint: Option<egui::Context>,
}

impl BackendWorker {
    pub fn new(client: BackendClient, cache_capacity: usize) -> Self {
        let (sender, receiver) = channel();
        Self {
            client: Arc::new(client),
            cache_capacity,
            sender,
            receiver,
            repaint: None,
        }
    }

    /// Wake the UI whenever a request finishes.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Run a command in the background.
    pub fn execute(&self, command: Command) {
        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        let cache_capacity = self.cache_capacity;

        std::thread::spawn(move || {
            let event = run(&client, command, cache_capacity);
            // The receiver only goes away when the app is closing.
            let _ = sender.send(event);
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// Absolute URL for a backend path such as a highlight download link.
    pub fn resolve_url(&self, path_or_url: &str) -> ReviewResult<reqwest::Url> {
        self.client.resolve(path_or_url)
    }

    /// Collect every event that finished since the last poll.
    pub fn poll(&self) -> Vec<BackendEvent> {
        self.receiver.try_iter().collect()
    }
}

fn run(client: &BackendClient, command: Command, cache_capacity: usize) -> BackendEvent {
    match command {
        Command::Upload { ticket, path } => {
            let result = client
                .upload(&path)
                .and_then(|response| MediaSession::load(response, cache_capacity));
            BackendEvent::Uploaded { ticket, result }
        }
        Command::FetchFrame {
            ticket,
            generation,
            filename,
            index,
        } => {
            let result = client
                .fetch_frame(&filename, index)
                .and_then(|response| Frame::from_response(index, response));
            BackendEvent::FrameLoaded {
                ticket,
                generation,
                index,
                result,
            }
        }
        Command::CreateHighlight { ticket, request } => BackendEvent::HighlightCreated {
            ticket,
            result: client.create_highlight(&request),
        },
        Command::Download {
            ticket,
            path_or_url,
            dest,
        } => {
            let result = client
                .resolve(&path_or_url)
                .and_then(|url| client.download(&url, &dest));
            BackendEvent::Downloaded {
                ticket,
                dest,
                result,
            }
        }
    }
}
