// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the main review actions.
//!
//! This module provides the toolbar for opening media, generating the
//! highlight video and clearing selections.

/// What the toolbar needs to know to enable its buttons.
pub struct ToolbarState {
    pub has_session: bool,
    pub selection_count: usize,
    pub uploading: bool,
    pub creating_highlight: bool,
}

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    OpenFile,
    CreateHighlight,
    ClearSelections,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, state: &ToolbarState) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let upload_label = if state.uploading { "Analyzing..." } else { "📂 Upload & Analyze" };
        if ui
            .add_enabled(!state.uploading, egui::Button::new(upload_label))
            .clicked()
        {
            action = ToolbarAction::OpenFile;
        }

        ui.separator();

        let can_submit = state.has_session && state.selection_count > 0 && !state.creating_highlight;
        if ui
            .add_enabled(can_submit, egui::Button::new("🎬 Create Highlight"))
            .clicked()
        {
            action = ToolbarAction::CreateHighlight;
        }

        if ui
            .add_enabled(state.selection_count > 0, egui::Button::new("✖ Clear"))
            .clicked()
        {
            action = ToolbarAction::ClearSelections;
        }

        ui.separator();

        let hint = if !state.has_session {
            "Upload an image or video, or drop a file on the window"
        } else if state.creating_highlight {
            "Creating highlight video with multiple freeze frames..."
        } else {
            "Click a detected player to select it, ←/→ to change frames"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
