// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Current-frame pointer for video sessions.

use crate::error::{ReviewError, ReviewResult};

/// Bounds-checked frame pointer over `[0, total_frames - 1]`.
///
/// Stepping past either end is a no-op so keyboard and button navigation never
/// fail at the edges; only explicit seeks report `OutOfRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameNavigator {
    current: usize,
    total_frames: usize,
}

impl FrameNavigator {
    /// Start at frame 0. `total_frames` is at least one.
    pub fn new(total_frames: usize) -> Self {
        Self {
            current: 0,
            total_frames: total_frames.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn last(&self) -> usize {
        self.total_frames - 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current < self.last()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current > 0
    }

    /// Step forward; returns whether the pointer moved.
    pub fn next(&mut self) -> bool {
        if self.can_go_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Step back; returns whether the pointer moved.
    pub fn previous(&mut self) -> bool {
        if self.can_go_previous() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, index: usize) -> ReviewResult<()> {
        if index >= self.total_frames {
            return Err(ReviewError::OutOfRange {
                index,
                len: self.total_frames,
            });
        }
        self.current = index;
        Ok(())
    }
}
