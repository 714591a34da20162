// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Player selections destined for highlight generation.
//!
//! Selections are keyed by `(frame_index, player_index)` and kept in insertion
//! order, which becomes the freeze-frame order of the generated video. Each
//! selection snapshots the detection data it was made on, so it stays valid
//! after the frame leaves the cache.

use crate::error::{ReviewError, ReviewResult};
use crate::io::protocol::SelectionPayload;
use crate::models::detection::{Detection, FrameDetections};

/// A tagged player on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub frame_index: usize,
    /// Index into the frame's player detections.
    pub player_index: usize,
    pub player: Detection,
    pub frame: FrameDetections,
}

impl Selection {
    fn to_payload(&self) -> SelectionPayload {
        SelectionPayload {
            player_index: self.player_index,
            frame_number: self.frame_index,
            player_data: self.player.clone(),
            frame_data: self.frame.clone(),
        }
    }
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Selected,
    Deselected,
}

/// Insertion-ordered set of selections, unique by `(frame, player)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    selections: Vec<Selection>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.selections.iter()
    }

    fn position(&self, frame_index: usize, player_index: usize) -> Option<usize> {
        self.selections
            .iter()
            .position(|s| s.frame_index == frame_index && s.player_index == player_index)
    }

    pub fn contains(&self, frame_index: usize, player_index: usize) -> bool {
        self.position(frame_index, player_index).is_some()
    }

    /// Player indices selected on the given frame, in selection order.
    pub fn players_on_frame(&self, frame_index: usize) -> impl Iterator<Item = usize> + '_ {
        self.selections
            .iter()
            .filter(move |s| s.frame_index == frame_index)
            .map(|s| s.player_index)
    }

    /// Select the player if unselected, otherwise deselect it.
    ///
    /// A new selection is appended and snapshots `frame`; removal keeps the
    /// order of the remaining selections.
    pub fn toggle(
        &mut self,
        frame_index: usize,
        player_index: usize,
        frame: &FrameDetections,
    ) -> ReviewResult<Toggled> {
        if let Some(pos) = self.position(frame_index, player_index) {
            self.selections.remove(pos);
            return Ok(Toggled::Deselected);
        }

        let player = frame
            .player(player_index)
            .ok_or(ReviewError::InvalidIndex {
                index: player_index,
                players: frame.players.len(),
            })?
            .clone();

        self.selections.push(Selection {
            frame_index,
            player_index,
            player,
            frame: frame.clone(),
        });
        Ok(Toggled::Selected)
    }

    /// Remove the selection at `position` in insertion order.
    pub fn remove_at(&mut self, position: usize) -> ReviewResult<Selection> {
        if position >= self.selections.len() {
            return Err(ReviewError::OutOfRange {
                index: position,
                len: self.selections.len(),
            });
        }
        Ok(self.selections.remove(position))
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Wire form for the highlight request, in insertion order.
    pub fn serialize(&self) -> Vec<SelectionPayload> {
        self.selections.iter().map(Selection::to_payload).collect()
    }

    /// Replace the contents with previously serialized selections.
    ///
    /// Each payload must reference a player present in its own frame
    /// snapshot, carry that same player, and hold only well-formed boxes.
    /// Duplicates keep their first occurrence. Nothing changes if any payload
    /// is invalid.
    pub fn restore(&mut self, payloads: Vec<SelectionPayload>) -> ReviewResult<usize> {
        let mut restored = SelectionSet::new();
        for payload in payloads {
            if restored.contains(payload.frame_number, payload.player_index) {
                continue;
            }
            if let Some((kind, detection)) = payload.frame_data.find_malformed() {
                return Err(ReviewError::MalformedResponse(format!(
                    "{:?} box {:?} on frame {} is not well formed",
                    kind, detection.bbox, payload.frame_number
                )));
            }
            let snapshot = payload.frame_data.player(payload.player_index).ok_or(
                ReviewError::InvalidIndex {
                    index: payload.player_index,
                    players: payload.frame_data.players.len(),
                },
            )?;
            if *snapshot != payload.player_data {
                return Err(ReviewError::MalformedResponse(format!(
                    "player {} on frame {} does not match its frame snapshot",
                    payload.player_index, payload.frame_number
                )));
            }
            restored.selections.push(Selection {
                frame_index: payload.frame_number,
                player_index: payload.player_index,
                player: payload.player_data,
                frame: payload.frame_data,
            });
        }

        *self = restored;
        Ok(self.len())
    }
}

/// Find the player under a point given in image pixel coordinates.
///
/// Returns the index of the first player box (in list order) containing the
/// point. Ball detections are never hit.
pub fn hit_test(detections: &FrameDetections, x: f64, y: f64) -> Option<usize> {
    detections
        .players
        .iter()
        .position(|player| player.bbox.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;

    fn player(x1: f64, y1: f64, x2: f64, y2: f64) -> Detection {
        Detection::new(BoundingBox::new(x1, y1, x2, y2))
    }

    fn two_players() -> FrameDetections {
        FrameDetections::new(
            vec![player(10.0, 10.0, 50.0, 50.0), player(100.0, 100.0, 150.0, 150.0)],
            vec![player(20.0, 20.0, 25.0, 25.0)],
        )
    }

    #[test]
    fn test_double_toggle_restores_prior_state() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(3, 1, &frame).unwrap();
        let before = set.clone();

        assert_eq!(set.toggle(3, 0, &frame).unwrap(), Toggled::Selected);
        assert_eq!(set.toggle(3, 0, &frame).unwrap(), Toggled::Deselected);
        assert_eq!(set, before);
    }

    #[test]
    fn test_toggle_snapshots_detections() {
        let mut frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(0, 1, &frame).unwrap();

        frame.players.clear();
        let selection = set.iter().next().unwrap();
        assert_eq!(selection.player.bbox, BoundingBox::new(100.0, 100.0, 150.0, 150.0));
        assert_eq!(selection.frame.players.len(), 2);
        assert_eq!(selection.frame.balls.len(), 1);
    }

    #[test]
    fn test_toggle_invalid_player_index() {
        let mut set = SelectionSet::new();
        let result = set.toggle(0, 2, &two_players());
        assert!(matches!(
            result,
            Err(ReviewError::InvalidIndex { index: 2, players: 2 })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_same_player_on_different_frames_is_distinct() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(1, 0, &frame).unwrap();
        set.toggle(2, 0, &frame).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.players_on_frame(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_removal_keeps_remaining_order() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(1, 0, &frame).unwrap();
        set.toggle(2, 1, &frame).unwrap();
        set.toggle(3, 0, &frame).unwrap();

        set.toggle(2, 1, &frame).unwrap();
        let frames: Vec<_> = set.iter().map(|s| s.frame_index).collect();
        assert_eq!(frames, vec![1, 3]);

        let removed = set.remove_at(0).unwrap();
        assert_eq!(removed.frame_index, 1);
        assert!(matches!(
            set.remove_at(1),
            Err(ReviewError::OutOfRange { index: 1, len: 1 })
        ));

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_serialize_preserves_insertion_order() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(2, 0, &frame).unwrap();
        set.toggle(4, 1, &frame).unwrap();

        let payloads = set.serialize();
        assert_eq!(payloads.len(), set.len());
        assert_eq!((payloads[0].frame_number, payloads[0].player_index), (2, 0));
        assert_eq!((payloads[1].frame_number, payloads[1].player_index), (4, 1));
        assert_eq!(payloads[1].player_data, frame.players[1]);
        assert_eq!(payloads[1].frame_data, frame);
    }

    #[test]
    fn test_restore_dedupes_and_validates() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(2, 0, &frame).unwrap();
        set.toggle(4, 1, &frame).unwrap();
        let mut payloads = set.serialize();
        payloads.push(payloads[0].clone());

        let mut restored = SelectionSet::new();
        assert_eq!(restored.restore(payloads.clone()).unwrap(), 2);
        assert_eq!(restored, set);

        payloads[1].player_index = 9;
        assert!(restored.restore(payloads).is_err());
        assert_eq!(restored, set);
    }

    #[test]
    fn test_restore_rejects_player_not_in_snapshot() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(2, 0, &frame).unwrap();
        let before = set.clone();

        let mut payloads = set.serialize();
        payloads[0].player_data = player(900.0, 900.0, 800.0, 800.0);
        assert!(matches!(
            set.restore(payloads),
            Err(ReviewError::MalformedResponse(_))
        ));
        assert_eq!(set, before);

        // Swapping in the other player of the same snapshot is also rejected.
        let mut payloads = set.serialize();
        payloads[0].player_data = frame.players[1].clone();
        assert!(set.restore(payloads).is_err());
        assert_eq!(set, before);
    }

    #[test]
    fn test_restore_rejects_malformed_snapshot() {
        let frame = two_players();
        let mut set = SelectionSet::new();
        set.toggle(2, 0, &frame).unwrap();
        let before = set.clone();

        // A bad ball box rejects the import even though the player is fine.
        let mut payloads = set.serialize();
        payloads[0].frame_data.balls[0] = player(30.0, 30.0, 20.0, 20.0);
        assert!(matches!(
            set.restore(payloads),
            Err(ReviewError::MalformedResponse(_))
        ));

        let mut payloads = set.serialize();
        payloads[0].frame_data.players[0].bbox.x2 = f64::NAN;
        payloads[0].player_data.bbox.x2 = f64::NAN;
        assert!(matches!(
            set.restore(payloads),
            Err(ReviewError::MalformedResponse(_))
        ));
        assert_eq!(set, before);
    }

    #[test]
    fn test_hit_test() {
        let frame = two_players();
        assert_eq!(hit_test(&frame, 30.0, 30.0), Some(0));
        assert_eq!(hit_test(&frame, 120.0, 140.0), Some(1));
        assert_eq!(hit_test(&frame, 75.0, 75.0), None);
        assert_eq!(hit_test(&frame, 500.0, 5.0), None);
    }

    #[test]
    fn test_hit_test_overlap_prefers_first() {
        let frame = FrameDetections::new(
            vec![player(0.0, 0.0, 100.0, 100.0), player(50.0, 50.0, 150.0, 150.0)],
            Vec::new(),
        );
        assert_eq!(hit_test(&frame, 75.0, 75.0), Some(0));
        assert_eq!(hit_test(&frame, 125.0, 125.0), Some(1));
    }
}
