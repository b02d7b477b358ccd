// src/ui/upload.rs
use std::path::PathBuf;

use eframe::egui;
use rfd::FileDialog;

/// Landing screen: pick a ledger file or drop one on the window. Returns
/// the chosen path, if any. The extension filter is a picker hint only;
/// the backend decides what it can actually parse.
pub fn show_upload(ui: &mut egui::Ui) -> Option<PathBuf> {
    let mut picked = None;

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading("FinCast");
        ui.label("Upload a ledger to build a 12-month, three-way forecast.");
        ui.add_space(16.0);

        if ui.button("Browse Ledger File…").clicked() {
            picked = FileDialog::new()
                .add_filter("Ledger files", &["csv", "xlsx", "xls"])
                .set_title("Select Ledger File")
                .pick_file();
        }

        ui.add_space(8.0);
        ui.weak("or drop a CSV / Excel file anywhere in this window");
    });

    picked
}

pub fn show_analyzing(ui: &mut egui::Ui, file_name: Option<&str>) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.spinner();
        ui.add_space(12.0);
        match file_name {
            Some(name) => ui.label(format!("Analyzing {name}…")),
            None => ui.label("Analyzing…"),
        };
        ui.weak("Forecasting revenue, cash flow and advance tax");
    });
}
