// src/app.rs
use eframe::egui;
use std::path::PathBuf;
use tracing::info;

use crate::api::{spawn_analysis, PendingAnalysis};
use crate::config::ApiConfig;
use crate::export::ReportExporter;
use crate::model::UploadedFile;
use crate::state::{AppState, ViewState};
use crate::ui::dashboard::DashboardAction;
use crate::ui::{dashboard, upload};

pub struct FincastApp {
    state: AppState,
    config: ApiConfig,
    exporter: ReportExporter,
    pending: Option<PendingAnalysis>,
    /// Screenshot handed over by `post_rendering`, processed on the next
    /// update.
    captured: Option<egui::ColorImage>,
}

impl FincastApp {
    pub fn new() -> Self {
        // TODO: bundle a font that covers U+20B9; egui's default fonts
        // draw the rupee sign as a placeholder box.
        Self {
            state: AppState::new(),
            config: ApiConfig::from_env(),
            exporter: ReportExporter::new(),
            pending: None,
            captured: None,
        }
    }

    /// Reads the picked or dropped file and kicks off an analysis run.
    /// Ignored while a call is already in flight.
    fn submit_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        if self.pending.is_some() {
            return;
        }
        match std::fs::read(&path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "ledger".to_string());
                info!(file = %name, size = bytes.len(), "ledger selected");
                let file = UploadedFile { name, bytes };
                self.state.begin_analysis(file.clone());
                self.pending = Some(spawn_analysis(
                    &self.config,
                    file,
                    self.state.assumptions.clone(),
                    ctx.clone(),
                ));
            }
            Err(err) => {
                self.state.error_message =
                    Some(format!("Could not read {}: {err}", path.display()));
            }
        }
    }

    /// Re-runs the analysis with the held file and the current assumption
    /// overrides. The displayed report blanks until the new result lands.
    fn run_scenario(&mut self, ctx: &egui::Context) {
        if self.pending.is_some() {
            return;
        }
        let Some(file) = self.state.uploaded.clone() else {
            self.state.error_message =
                Some("Upload a ledger before running a scenario.".to_string());
            return;
        };
        self.state.begin_analysis(file.clone());
        self.pending = Some(spawn_analysis(
            &self.config,
            file,
            self.state.assumptions.clone(),
            ctx.clone(),
        ));
    }

    fn poll_analysis(&mut self) {
        if let Some(pending) = &self.pending {
            if let Some(outcome) = pending.poll() {
                self.pending = None;
                self.state.finish_analysis(outcome);
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if !matches!(self.state.view, ViewState::NoData) {
            return;
        }
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .next()
        });
        if let Some(path) = dropped {
            self.submit_path(ctx, path);
        }
    }
}

impl eframe::App for FincastApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        // A capture requested last frame arrives here.
        if self.exporter.awaiting_screenshot() {
            if let Some(shot) = self.captured.take() {
                match self.exporter.finish(&shot, &self.state) {
                    Ok(Some(_)) | Ok(None) => {}
                    Err(err) => {
                        self.state.error_message = Some(format!("Export failed: {err:#}"));
                    }
                }
            }
        }

        self.poll_analysis();
        self.handle_dropped_files(ctx);

        // If the report vanished mid-capture, stand down and restore.
        if self.exporter.in_progress() && self.state.result().is_none() {
            self.exporter.abort();
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("FinCast").strong());
                ui.weak("three-way forecast studio");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.config.base_url);
                });
            });
        });

        let mut action = None;
        let mut picked = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.result().is_some() {
                action = dashboard::show_dashboard(
                    ui,
                    &mut self.state,
                    self.exporter.in_progress(),
                    self.exporter.capture_active(),
                );
            } else if self.state.is_analyzing() {
                let name = self.state.uploaded.as_ref().map(|f| f.name.clone());
                upload::show_analyzing(ui, name.as_deref());
            } else {
                picked = upload::show_upload(ui);
            }
        });

        if let Some(path) = picked {
            self.submit_path(ctx, path);
        }
        match action {
            Some(DashboardAction::RunScenario) => self.run_scenario(ctx),
            Some(DashboardAction::ExportPdf) => self.exporter.begin(ctx),
            None => {}
        }

        // Show error modal if needed
        let error_msg = self.state.error_message.clone();
        if let Some(error) = error_msg {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        self.state.error_message = None;
                    }
                });
        }

        self.exporter.drive(ctx, frame);
    }

    fn post_rendering(&mut self, _window_size_px: [u32; 2], frame: &eframe::Frame) {
        if let Some(shot) = frame.screenshot() {
            self.captured = Some(shot);
        }
    }
}
