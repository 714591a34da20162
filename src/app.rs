// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application shell and egui App implementation.
//!
//! This module wires the UI components to the review controller and the
//! background backend worker. It holds no review state of its own beyond the
//! texture of the frame on screen.

use crate::config::AppConfig;
use crate::error::{ReviewError, ReviewResult};
use crate::io::client::BackendClient;
use crate::io::media::uploadable_extensions;
use crate::io::protocol::RequestKind;
use crate::io::serialization;
use crate::io::worker::{BackendWorker, Command};
use crate::review::{NoticeLevel, ReviewController};
use crate::ui::{canvas, properties, timeline, toolbar};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Identifies the frame a texture was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextureKey {
    generation: u64,
    frame: usize,
}

/// Main application state.
pub struct HiliteApp {
    /// Session, navigation and selection state
    controller: ReviewController,

    /// Runs backend requests off the UI thread
    worker: BackendWorker,

    /// Texture for the frame currently on screen
    texture: Option<(TextureKey, egui::TextureHandle)>,
}

impl HiliteApp {
    /// Create a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> anyhow::Result<Self> {
        let client = BackendClient::new(&config.backend)?;
        log::info!("Using detection backend at {}", config.backend.base_url);

        Ok(Self {
            controller: ReviewController::new(config.notice_timeout()),
            worker: BackendWorker::new(client, config.frame_cache_capacity)
                .with_repaint(cc.egui_ctx.clone()),
            texture: None,
        })
    }

    fn dispatch(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            self.worker.execute(command);
        }
    }

    fn run(&mut self, command: ReviewResult<Command>) {
        match command {
            Ok(command) => self.worker.execute(command),
            Err(e) => self.controller.report(&e),
        }
    }

    fn upload(&mut self, path: PathBuf) {
        let command = self.controller.begin_upload(path);
        self.run(command);
    }

    fn open_upload_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images and videos", uploadable_extensions().as_slice())
            .pick_file()
        {
            self.upload(path);
        }
    }

    fn create_highlight(&mut self) {
        let command = self.controller.submit_highlight();
        self.run(command);
    }

    fn save_highlight(&mut self) {
        let file_name = self
            .controller
            .highlight_result()
            .map(|r| r.output_file.clone())
            .unwrap_or_else(|| "highlight.mp4".to_string());

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("MP4 video", &["mp4"])
            .set_file_name(file_name)
            .save_file()
        {
            let command = self.controller.begin_download(path);
            self.run(command);
        }
    }

    /// Export the current selections to a file.
    fn export_selections(&mut self, path: PathBuf) {
        let request = match self.controller.highlight_request() {
            Ok(request) => request,
            Err(e) => return self.controller.report(&e),
        };

        match serialization::export(&request, &path) {
            Ok(_) => {
                log::info!("Exported selections to {}", path.display());
                self.controller.notify(
                    NoticeLevel::Success,
                    format!(
                        "Exported {} selections to {}",
                        request.player_selections.len(),
                        path.display()
                    ),
                );
            }
            Err(e) => {
                log::error!("Failed to export selections: {}", e);
                self.controller
                    .notify(NoticeLevel::Error, format!("Failed to export selections: {}", e));
            }
        }
    }

    /// Import selections for the loaded media from a file.
    fn import_selections(&mut self, path: PathBuf) {
        let request = match serialization::import(&path) {
            Ok(request) => request,
            Err(e) => {
                log::error!("Failed to import selections: {}", e);
                self.controller
                    .notify(NoticeLevel::Error, format!("Failed to import selections: {}", e));
                return;
            }
        };

        match self.controller.import_selections(request) {
            Ok(count) => self
                .controller
                .notify(NoticeLevel::Success, format!("Imported {} selections", count)),
            Err(e) => self.controller.report(&e),
        }
    }

    /// Keep the texture in step with the frame on screen.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let key = TextureKey {
            generation: self.controller.generation(),
            frame: self.controller.current_frame_index(),
        };
        if self.texture.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }

        self.texture = self.controller.current_frame().map(|frame| {
            let size = [frame.image.width as usize, frame.image.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.image.pixels);
            let texture = ctx.load_texture("current_frame", color_image, egui::TextureOptions::LINEAR);
            (key, texture)
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            self.upload(path);
        }

        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("file_drop_target"),
            ));
            let screen_rect = ctx.screen_rect();
            painter.rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(180));
            painter.text(
                screen_rect.center(),
                egui::Align2::CENTER_CENTER,
                "Drop to upload & analyze",
                egui::FontId::proportional(24.0),
                egui::Color32::WHITE,
            );
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Success => egui::Color32::LIGHT_GREEN,
            NoticeLevel::Warning => egui::Color32::YELLOW,
            NoticeLevel::Error => egui::Color32::LIGHT_RED,
        };

        let mut dismissed = false;
        egui::TopBottomPanel::bottom("notice").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(color, notice.message.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✖").on_hover_text("Dismiss (Esc)").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
        if dismissed {
            self.controller.dismiss_notice();
        }

        if !notice.persistent {
            // Wake up to expire the notice even if nothing else happens.
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

/// A selection call failed although the UI only offers valid ones.
fn selection_out_of_sync(err: ReviewError) {
    log::error!("Selection state out of sync with UI: {}", err);
    debug_assert!(false, "selection state out of sync with UI: {}", err);
}

impl eframe::App for HiliteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished backend requests
        for event in self.worker.poll() {
            let follow_up = self.controller.handle(event);
            self.dispatch(follow_up);
        }
        self.controller.expire_notice(Instant::now());

        self.handle_dropped_files(ctx);
        self.sync_texture(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Upload Image/Video...").clicked() {
                        self.open_upload_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_session = self.controller.session().is_some();
                    if ui
                        .add_enabled(has_session, egui::Button::new("Import Selections..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Selections", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_selections(path);
                        }
                        ui.close_menu();
                    }
                    let has_selections = !self.controller.selections().is_empty();
                    ui.add_enabled_ui(has_selections, |ui| {
                        ui.menu_button("Export Selections", |ui| {
                            if ui.button("Export as YAML...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("YAML", &["yaml", "yml"])
                                    .set_file_name("selections.yaml")
                                    .save_file()
                                {
                                    self.export_selections(path);
                                }
                                ui.close_menu();
                            }
                            if ui.button("Export as JSON...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON", &["json"])
                                    .set_file_name("selections.json")
                                    .save_file()
                                {
                                    self.export_selections(path);
                                }
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Reset").clicked() {
                        self.controller.reset();
                        self.texture = None;
                        log::info!("Session reset");
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_state = toolbar::ToolbarState {
            has_session: self.controller.session().is_some(),
            selection_count: self.controller.selections().len(),
            uploading: self.controller.is_pending(RequestKind::Upload),
            creating_highlight: self.controller.is_pending(RequestKind::Highlight),
        };
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &toolbar_state))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::OpenFile => self.open_upload_dialog(),
            toolbar::ToolbarAction::CreateHighlight => self.create_highlight(),
            toolbar::ToolbarAction::ClearSelections => self.controller.clear_selections(),
            toolbar::ToolbarAction::None => {}
        }

        self.show_notice(ctx);

        // Frame navigation (videos only)
        if let Some(navigator) = self.controller.navigator().copied() {
            let fps = self.controller.session().and_then(|s| s.fps);
            let loading = self.controller.is_pending(RequestKind::Frame);
            let timeline_action = egui::TopBottomPanel::bottom("timeline")
                .show(ctx, |ui| timeline::show(ui, &navigator, fps, loading))
                .inner;
            let command = match timeline_action {
                timeline::TimelineAction::Previous => self.controller.previous(),
                timeline::TimelineAction::Next => self.controller.next(),
                timeline::TimelineAction::Seek(index) => {
                    self.controller.go_to(index).unwrap_or_else(|e| {
                        log::debug!("Ignoring seek: {}", e);
                        None
                    })
                }
                timeline::TimelineAction::None => None,
            };
            self.dispatch(command);
        }

        // Detection and selection panel (right side)
        let highlight_url = self
            .controller
            .highlight_result()
            .and_then(|r| self.worker.resolve_url(&r.download_path()).ok())
            .map(|url| url.to_string());
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    self.controller.current_frame(),
                    self.controller.selections(),
                    highlight_url.as_deref(),
                )
            })
            .inner;
        match properties_action {
            properties::PropertiesAction::RemoveSelection(position) => {
                if let Err(e) = self.controller.remove_selection(position) {
                    selection_out_of_sync(e);
                }
            }
            properties::PropertiesAction::ClearSelections => self.controller.clear_selections(),
            properties::PropertiesAction::SaveHighlight => self.save_highlight(),
            properties::PropertiesAction::None => {}
        }

        // Keyboard navigation, skipped while a text field has focus
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                let command = self.controller.next();
                self.dispatch(command);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                let command = self.controller.previous();
                self.dispatch(command);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.controller.dismiss_notice();
            }
        }

        // Main canvas (center)
        let uploading = self.controller.is_pending(RequestKind::Upload);
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if uploading {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new("Uploading and analyzing...")
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return canvas::CanvasAction::None;
                }

                let frame_index = self.controller.current_frame_index();
                let selected: Vec<usize> = self
                    .controller
                    .selections()
                    .players_on_frame(frame_index)
                    .collect();
                canvas::show(
                    ui,
                    self.texture.as_ref().map(|(_, texture)| texture),
                    self.controller.current_frame(),
                    &selected,
                    self.controller.session().is_some(),
                )
            })
            .inner;

        if let canvas::CanvasAction::Click { x, y } = canvas_action {
            if let Err(e) = self.controller.click(x, y) {
                selection_out_of_sync(e);
            }
        }
    }
}
