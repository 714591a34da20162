// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the timeline scrubber for navigating through
//! video frames and selecting the frame to review.

use crate::models::navigator::FrameNavigator;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    Previous,
    Next,
    Seek(usize),
}

/// Display frame navigation: previous/next buttons, a slider and a counter.
pub fn show(
    ui: &mut egui::Ui,
    navigator: &FrameNavigator,
    fps: Option<f64>,
    loading: bool,
) -> TimelineAction {
    let mut action = TimelineAction::None;

    ui.horizontal(|ui| {
        if ui
            .add_enabled(navigator.can_go_previous(), egui::Button::new("◀ Prev"))
            .clicked()
        {
            action = TimelineAction::Previous;
        }

        let mut value = navigator.current();
        let slider = egui::Slider::new(&mut value, 0..=navigator.last()).show_value(false);
        if ui.add(slider).changed() && value != navigator.current() {
            action = TimelineAction::Seek(value);
        }

        if ui
            .add_enabled(navigator.can_go_next(), egui::Button::new("Next ▶"))
            .clicked()
        {
            action = TimelineAction::Next;
        }

        ui.separator();
        ui.label(format!(
            "Frame {} / {}",
            navigator.current() + 1,
            navigator.total_frames()
        ));
        if let Some(fps) = fps.filter(|f| *f > 0.0) {
            ui.label(
                egui::RichText::new(format!("{:.2}s", navigator.current() as f64 / fps)).weak(),
            );
        }
        if loading {
            ui.spinner();
        }
    });

    action
}
