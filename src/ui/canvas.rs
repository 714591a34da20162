// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame display canvas.
//!
//! This module provides the main canvas area where the current frame is
//! shown with its detections, and where clicks on players are captured.

use crate::models::detection::BoundingBox;
use crate::models::media::Frame;
use crate::util::geometry::{display_to_image, fit_size, image_to_display};

const PLAYER_COLOR: egui::Color32 = egui::Color32::from_rgb(0x00, 0x7b, 0xff);
const BALL_COLOR: egui::Color32 = egui::Color32::from_rgb(0x28, 0xa7, 0x45);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(0xdc, 0x35, 0x45);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Click in frame pixel coordinates.
    Click { x: f64, y: f64 },
}

/// Display the canvas and handle clicks.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    frame: Option<&Frame>,
    selected_players: &[usize],
    has_session: bool,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (frame, texture) = match (frame, texture) {
            (Some(frame), Some(texture)) => (frame, texture),
            _ if has_session => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Loading frame...").color(egui::Color32::WHITE));
                });
                return;
            }
            _ => {
                show_welcome(ui);
                return;
            }
        };

        let (img_width, img_height) = (frame.image.width, frame.image.height);
        let available = ui.available_size();
        let (display_width, display_height) =
            fit_size(img_width, img_height, (available.x, available.y));
        if display_width <= 0.0 || display_height <= 0.0 {
            return;
        }

        // Center the image
        let x_offset = (available.x - display_width) / 2.0;
        let y_offset = (available.y - display_height) / 2.0;
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click());
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if image_rect.contains(pos) {
                    let (x, y) = display_to_image(
                        (pos.x - image_rect.min.x, pos.y - image_rect.min.y),
                        (display_width, display_height),
                        img_width,
                        img_height,
                    );
                    action = CanvasAction::Click { x, y };
                }
            }
        }
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let painter = ui.painter();
        let to_screen = |bbox: &BoundingBox| {
            let display = (display_width, display_height);
            let (x1, y1) = image_to_display((bbox.x1, bbox.y1), display, img_width, img_height);
            let (x2, y2) = image_to_display((bbox.x2, bbox.y2), display, img_width, img_height);
            egui::Rect::from_min_max(
                image_rect.min + egui::vec2(x1, y1),
                image_rect.min + egui::vec2(x2, y2),
            )
        };

        for (index, player) in frame.detections.players.iter().enumerate() {
            let rect = to_screen(&player.bbox);
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, PLAYER_COLOR));
            draw_label(painter, rect, &format!("Player {}", index + 1), PLAYER_COLOR);
        }
        for ball in &frame.detections.balls {
            let rect = to_screen(&ball.bbox);
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, BALL_COLOR));
            draw_label(painter, rect, "Ball", BALL_COLOR);
        }
        for player in selected_players
            .iter()
            .filter_map(|&i| frame.detections.player(i))
        {
            painter.rect_stroke(
                to_screen(&player.bbox),
                0.0,
                egui::Stroke::new(3.0, SELECTED_COLOR),
            );
        }
    });

    action
}

fn draw_label(painter: &egui::Painter, rect: egui::Rect, text: &str, color: egui::Color32) {
    painter.text(
        rect.left_top() - egui::vec2(0.0, 4.0),
        egui::Align2::LEFT_BOTTOM,
        text,
        egui::FontId::proportional(14.0),
        color,
    );
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("HILITE")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Player highlight picker")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Upload a photo or video to detect players")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Upload... or drop a file here")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
