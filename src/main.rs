// src/main.rs
use anyhow::Result;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod config;
mod export;
mod format;
mod model;
mod state;
mod ui;

use app::FincastApp;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 860.0)),
        ..Default::default()
    };

    eframe::run_native(
        "FinCast",
        options,
        Box::new(|_cc| Box::new(FincastApp::new())),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
