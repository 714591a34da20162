// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HILITE - Player Highlight Picker
//!
//! A cross-platform desktop client for reviewing player and ball detections
//! on uploaded photos and videos, and for picking the players to include in
//! a highlight reel.

mod app;
mod config;
mod error;
mod io;
mod models;
mod review;
mod ui;
mod util;

use anyhow::Result;
use app::HiliteApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load()?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("HILITE - Player Highlight Picker")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "HILITE",
        options,
        Box::new(move |cc| Ok(Box::new(HiliteApp::new(cc, &config)?))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
