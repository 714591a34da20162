// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Review workflow controller.
//!
//! `ReviewController` owns the media session, frame navigator and selection
//! set, and is the only place they are mutated. It knows nothing about
//! rendering or transport: user actions come in as method calls, backend
//! requests go out as `Command`s and their results come back as
//! `BackendEvent`s.

use crate::error::{ReviewError, ReviewResult};
use crate::io::media::check_uploadable;
use crate::io::protocol::{HighlightRequest, HighlightResponse, RequestKind, RequestSlot, RequestState};
use crate::io::worker::{BackendEvent, Command};
use crate::models::media::{Frame, MediaKind, MediaSession};
use crate::models::navigator::FrameNavigator;
use crate::models::selection::{hit_test, SelectionSet, Toggled};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A dismissible message for the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Persistent notices stay until dismissed.
    pub persistent: bool,
    raised_at: Instant,
}

pub struct ReviewController {
    session: Option<MediaSession>,
    navigator: Option<FrameNavigator>,
    selections: SelectionSet,
    /// Bumped whenever the session is replaced or reset.
    generation: u64,
    next_ticket: u64,
    upload: RequestSlot,
    frame: RequestSlot,
    highlight: RequestSlot,
    download: RequestSlot,
    highlight_result: Option<HighlightResponse>,
    /// Freeze frames in the highlight request in flight.
    submitted_frames: usize,
    notice: Option<Notice>,
    notice_timeout: Duration,
}

impl ReviewController {
    pub fn new(notice_timeout: Duration) -> Self {
        Self {
            session: None,
            navigator: None,
            selections: SelectionSet::new(),
            generation: 0,
            next_ticket: 0,
            upload: RequestSlot::new(RequestKind::Upload),
            frame: RequestSlot::new(RequestKind::Frame),
            highlight: RequestSlot::new(RequestKind::Highlight),
            download: RequestSlot::new(RequestKind::Download),
            highlight_result: None,
            submitted_frames: 0,
            notice: None,
            notice_timeout,
        }
    }

    pub fn session(&self) -> Option<&MediaSession> {
        self.session.as_ref()
    }

    /// Only present for video sessions.
    pub fn navigator(&self) -> Option<&FrameNavigator> {
        self.navigator.as_ref()
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn highlight_result(&self) -> Option<&HighlightResponse> {
        self.highlight_result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn request_state(&self, kind: RequestKind) -> RequestState {
        match kind {
            RequestKind::Upload => self.upload.state(),
            RequestKind::Frame => self.frame.state(),
            RequestKind::Highlight => self.highlight.state(),
            RequestKind::Download => self.download.state(),
        }
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.request_state(kind) == RequestState::Pending
    }

    /// Index of the displayed frame; always 0 for images.
    pub fn current_frame_index(&self) -> usize {
        self.navigator.map(|n| n.current()).unwrap_or(0)
    }

    /// The displayed frame, if it has been fetched.
    pub fn current_frame(&self) -> Option<&Frame> {
        let session = self.session.as_ref()?;
        session.get_frame(self.current_frame_index()).ok()
    }

    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn raise(&mut self, level: NoticeLevel, message: impl Into<String>, persistent: bool) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
            persistent,
            raised_at: Instant::now(),
        });
    }

    /// Show a transient notice.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.raise(level, message, false);
    }

    /// Surface a failed user action as a notice.
    pub fn report(&mut self, err: &ReviewError) {
        let level = if err.is_remote() {
            log::warn!("{}", err);
            NoticeLevel::Error
        } else {
            log::info!("{}", err);
            NoticeLevel::Warning
        };
        self.raise(level, err.to_string(), false);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Drop a non-persistent notice once it has been shown long enough.
    pub fn expire_notice(&mut self, now: Instant) {
        let expired = self.notice.as_ref().is_some_and(|n| {
            !n.persistent && now.saturating_duration_since(n.raised_at) >= self.notice_timeout
        });
        if expired {
            self.notice = None;
        }
    }

    /// Start uploading a file. The current session stays until the upload
    /// succeeds.
    pub fn begin_upload(&mut self, path: PathBuf) -> ReviewResult<Command> {
        check_uploadable(&path)?;
        let ticket = self.ticket();
        self.upload.begin(ticket)?;
        log::info!("Uploading file: {}", path.display());
        Ok(Command::Upload { ticket, path })
    }

    /// Replace the session, invalidating cached frames and selections.
    fn install_session(&mut self, session: MediaSession) {
        self.generation += 1;
        self.navigator = match session.kind {
            MediaKind::Video => Some(FrameNavigator::new(session.total_frames)),
            MediaKind::Image => None,
        };
        self.selections.clear();
        self.frame.abandon();
        self.highlight.abandon();
        self.download.abandon();
        self.highlight_result = None;

        match session.kind {
            MediaKind::Image => log::info!(
                "Loaded image {} with {} players",
                session.filename,
                session.get_frame(0).map(|f| f.detections.players.len()).unwrap_or(0)
            ),
            MediaKind::Video => log::info!(
                "Loaded video {} with {} frames",
                session.filename,
                session.total_frames
            ),
        }
        self.session = Some(session);
    }

    /// Discard everything, including results still in flight.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.session = None;
        self.navigator = None;
        self.selections.clear();
        self.upload.abandon();
        self.frame.abandon();
        self.highlight.abandon();
        self.download.abandon();
        self.highlight_result = None;
        self.notice = None;
    }

    pub fn next(&mut self) -> Option<Command> {
        let moved = self.navigator.as_mut().is_some_and(|n| n.next());
        if moved {
            self.ensure_current_frame()
        } else {
            None
        }
    }

    pub fn previous(&mut self) -> Option<Command> {
        let moved = self.navigator.as_mut().is_some_and(|n| n.previous());
        if moved {
            self.ensure_current_frame()
        } else {
            None
        }
    }

    pub fn go_to(&mut self, index: usize) -> ReviewResult<Option<Command>> {
        let session = self.session.as_ref().ok_or(ReviewError::NoSession)?;
        match self.navigator.as_mut() {
            Some(navigator) => navigator.go_to(index)?,
            None if index == 0 => {}
            None => {
                return Err(ReviewError::OutOfRange {
                    index,
                    len: session.total_frames,
                })
            }
        }
        Ok(self.ensure_current_frame())
    }

    /// Issue a fetch for the current frame unless it is cached or a frame
    /// fetch is already running (its completion re-checks).
    fn ensure_current_frame(&mut self) -> Option<Command> {
        let index = self.current_frame_index();
        let session = self.session.as_ref()?;
        let uncached = matches!(
            session.get_frame(index),
            Err(ReviewError::FrameFetchRequired(_))
        );
        if !uncached || self.frame.is_pending() {
            return None;
        }

        let filename = session.filename.clone();
        let ticket = self.ticket();
        self.frame.begin(ticket).ok()?;
        Some(Command::FetchFrame {
            ticket,
            generation: self.generation,
            filename,
            index,
        })
    }

    /// Translate a click in image pixel coordinates into a toggle.
    ///
    /// Returns `None` when the click hit no player.
    pub fn click(&mut self, x: f64, y: f64) -> ReviewResult<Option<Toggled>> {
        let detections = &self.current_frame_or_err()?.detections;
        match hit_test(detections, x, y) {
            Some(player_index) => self.toggle_player(player_index).map(Some),
            None => Ok(None),
        }
    }

    /// Toggle a player of the current frame.
    pub fn toggle_player(&mut self, player_index: usize) -> ReviewResult<Toggled> {
        let frame_index = self.current_frame_index();
        let session = self.session.as_ref().ok_or(ReviewError::NoSession)?;
        let frame = session.get_frame(frame_index)?;

        let toggled = self
            .selections
            .toggle(frame_index, player_index, &frame.detections)?;
        match toggled {
            Toggled::Selected => log::info!(
                "Selected player {} on frame {}",
                player_index + 1,
                frame_index + 1
            ),
            Toggled::Deselected => log::info!(
                "Removed player {} from frame {}",
                player_index + 1,
                frame_index + 1
            ),
        }
        Ok(toggled)
    }

    pub fn remove_selection(&mut self, position: usize) -> ReviewResult<()> {
        let removed = self.selections.remove_at(position)?;
        log::info!(
            "Removed player {} from frame {}",
            removed.player_index + 1,
            removed.frame_index + 1
        );
        Ok(())
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear();
        log::info!("Cleared all selections");
    }

    fn current_frame_or_err(&self) -> ReviewResult<&Frame> {
        let session = self.session.as_ref().ok_or(ReviewError::NoSession)?;
        session.get_frame(self.current_frame_index())
    }

    /// The highlight request body for the current selections.
    pub fn highlight_request(&self) -> ReviewResult<HighlightRequest> {
        let session = self.session.as_ref().ok_or(ReviewError::NoSession)?;
        if self.selections.is_empty() {
            return Err(ReviewError::NothingSelected);
        }
        Ok(HighlightRequest {
            filename: session.filename.clone(),
            player_selections: self.selections.serialize(),
        })
    }

    /// Replace the selections with an exported set for the same media.
    pub fn import_selections(&mut self, request: HighlightRequest) -> ReviewResult<usize> {
        let session = self.session.as_ref().ok_or(ReviewError::NoSession)?;
        if request.filename != session.filename {
            return Err(ReviewError::SessionMismatch {
                expected: session.filename.clone(),
                found: request.filename,
            });
        }
        if let Some(out_of_range) = request
            .player_selections
            .iter()
            .find(|p| p.frame_number >= session.total_frames)
        {
            return Err(ReviewError::OutOfRange {
                index: out_of_range.frame_number,
                len: session.total_frames,
            });
        }

        let count = self.selections.restore(request.player_selections)?;
        log::info!("Imported {} selections", count);
        Ok(count)
    }

    pub fn submit_highlight(&mut self) -> ReviewResult<Command> {
        let request = self.highlight_request()?;
        let ticket = self.ticket();
        self.highlight.begin(ticket)?;
        self.submitted_frames = request.player_selections.len();
        log::info!(
            "Creating highlight video with {} freeze frames",
            self.submitted_frames
        );
        Ok(Command::CreateHighlight { ticket, request })
    }

    /// Save the created highlight video to `dest`.
    pub fn begin_download(&mut self, dest: PathBuf) -> ReviewResult<Command> {
        let path_or_url = self
            .highlight_result
            .as_ref()
            .ok_or(ReviewError::NoHighlight)?
            .download_path();
        let ticket = self.ticket();
        self.download.begin(ticket)?;
        Ok(Command::Download {
            ticket,
            path_or_url,
            dest,
        })
    }

    /// Apply a finished request. May return a follow-up frame fetch.
    pub fn handle(&mut self, event: BackendEvent) -> Option<Command> {
        match event {
            BackendEvent::Uploaded { ticket, result } => {
                if !self.upload.complete(ticket, result.is_ok()) {
                    log::debug!("Discarding stale upload result {}", ticket);
                    return None;
                }
                match result {
                    Ok(session) => {
                        self.install_session(session);
                        self.raise(NoticeLevel::Success, "File processed successfully!", false);
                    }
                    Err(e) => {
                        log::warn!("Upload failed: {}", e);
                        self.raise(NoticeLevel::Error, format!("Error processing file: {}", e), false);
                    }
                }
                None
            }
            BackendEvent::FrameLoaded {
                ticket,
                generation,
                index,
                result,
            } => self.on_frame_loaded(ticket, generation, index, result),
            BackendEvent::HighlightCreated { ticket, result } => {
                if !self.highlight.complete(ticket, result.is_ok()) {
                    log::debug!("Discarding stale highlight result {}", ticket);
                    return None;
                }
                match result {
                    Ok(response) => {
                        log::info!("Highlight video created: {}", response.output_file);
                        let message = format!(
                            "Highlight video created successfully with {} freeze frame(s)!",
                            self.submitted_frames
                        );
                        self.highlight_result = Some(response);
                        self.raise(NoticeLevel::Success, message, true);
                    }
                    Err(e) => {
                        log::warn!("Highlight creation failed: {}", e);
                        self.raise(NoticeLevel::Error, format!("Error creating highlight: {}", e), false);
                    }
                }
                None
            }
            BackendEvent::Downloaded {
                ticket,
                dest,
                result,
            } => {
                if !self.download.complete(ticket, result.is_ok()) {
                    return None;
                }
                match result {
                    Ok(_) => self.raise(
                        NoticeLevel::Success,
                        format!("Saved highlight video to {}", dest.display()),
                        false,
                    ),
                    Err(e) => {
                        log::warn!("Download failed: {}", e);
                        self.raise(NoticeLevel::Error, format!("Error downloading highlight: {}", e), false);
                    }
                }
                None
            }
        }
    }

    fn on_frame_loaded(
        &mut self,
        ticket: u64,
        generation: u64,
        index: usize,
        result: ReviewResult<Frame>,
    ) -> Option<Command> {
        if !self.frame.complete(ticket, result.is_ok()) || generation != self.generation {
            log::debug!("Discarding frame {} from a replaced session", index);
            return None;
        }

        let current = self.current_frame_index();
        match result {
            Ok(frame) if index == current => {
                if let Some(session) = self.session.as_mut() {
                    match session.insert_frame(frame) {
                        Ok(()) => log::debug!(
                            "Cached frame {} ({} frames cached)",
                            index,
                            session.cached_frames()
                        ),
                        Err(e) => log::error!("Could not cache frame {}: {}", index, e),
                    }
                }
            }
            Ok(_) => log::debug!("Discarding frame {}, navigator moved to {}", index, current),
            Err(e) if index == current => {
                log::warn!("Error loading frame {}: {}", index, e);
                self.raise(NoticeLevel::Error, format!("Error loading frame {}: {}", index + 1, e), false);
                return None;
            }
            Err(e) => log::debug!("Ignoring failure of stale frame {}: {}", index, e),
        }
        self.ensure_current_frame()
    }
}
