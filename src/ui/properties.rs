// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection and selection panel.
//!
//! This module provides the side panel showing detection counts for the
//! displayed frame, the list of selected players, and the link to the
//! generated highlight video.

use crate::models::media::Frame;
use crate::models::selection::SelectionSet;

/// Result of panel interaction.
pub enum PropertiesAction {
    None,
    RemoveSelection(usize),
    ClearSelections,
    SaveHighlight,
}

/// Display the panel.
pub fn show(
    ui: &mut egui::Ui,
    frame: Option<&Frame>,
    selections: &SelectionSet,
    highlight_url: Option<&str>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Detections");
    match frame {
        Some(frame) => {
            egui::Grid::new("detection_counts").show(ui, |ui| {
                ui.label("Players:");
                ui.label(frame.detections.players.len().to_string());
                ui.end_row();
                ui.label("Balls:");
                ui.label(frame.detections.balls.len().to_string());
                ui.end_row();
                if let Some(timestamp) = frame.timestamp {
                    ui.label("Time:");
                    ui.label(format!("{:.2}s", timestamp));
                    ui.end_row();
                }
            });
        }
        None => {
            ui.label(egui::RichText::new("No frame loaded").weak());
        }
    }

    ui.separator();
    ui.heading(format!("Selected Players ({})", selections.len()));

    if selections.is_empty() {
        ui.label(egui::RichText::new("Click a player box to select it").weak());
    } else {
        egui::ScrollArea::vertical()
            .max_height((ui.available_height() - 120.0).max(80.0))
            .show(ui, |ui| {
                for (position, selection) in selections.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "Player {} (Frame {})",
                            selection.player_index + 1,
                            selection.frame_index + 1
                        ));
                        if ui.small_button("✖").on_hover_text("Remove").clicked() {
                            action = PropertiesAction::RemoveSelection(position);
                        }
                    });
                }
            });

        if ui.button("Clear all").clicked() {
            action = PropertiesAction::ClearSelections;
        }
    }

    if let Some(url) = highlight_url {
        ui.separator();
        ui.heading("Highlight");
        ui.hyperlink_to("Download Highlight Video", url);
        if ui.button("💾 Save video...").clicked() {
            action = PropertiesAction::SaveHighlight;
        }
    }

    action
}
