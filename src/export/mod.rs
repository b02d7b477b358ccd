// src/export/mod.rs
//
// Turns the live report into a paginated PDF. The capture is sequenced
// over frames: install the capture guard (hides export-excluded controls
// and raises the raster scale), let the layout settle for one frame,
// request a screenshot, then on the frame where it arrives drop the guard
// and hand the raster to the PDF builder. The guard restores on drop, so
// every exit path, including failures, leaves the UI as it was.

use anyhow::{anyhow, Context as _, Result};
use chrono::Local;
use eframe::egui;
use image::RgbImage;
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::info;

use crate::state::AppState;

pub mod pdf;

/// Fixed device-independent raster geometry: the capture is normalized to
/// this logical width at this supersampling scale, so the exported PDF
/// does not depend on the user's window size or display density.
pub const REFERENCE_WIDTH: f32 = 1400.0;
pub const RASTER_SCALE: f32 = 1.5;

/// Scoped UI suppression for the duration of a capture. While installed,
/// the dashboard hides its export-excluded controls (it consults
/// [`ReportExporter::capture_active`]) and egui renders at the fixed
/// raster scale. Dropping the guard restores the previous scale.
struct CaptureGuard {
    ctx: egui::Context,
    prev_scale: f32,
}

impl CaptureGuard {
    fn install(ctx: &egui::Context) -> Self {
        let prev_scale = ctx.pixels_per_point();
        ctx.set_pixels_per_point(RASTER_SCALE);
        Self {
            ctx: ctx.clone(),
            prev_scale,
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.ctx.set_pixels_per_point(self.prev_scale);
    }
}

enum ExportPhase {
    Idle,
    /// Frames to wait before requesting the screenshot, so the hidden
    /// controls and the scale change have taken effect in the layout.
    Settling(u8),
    AwaitingShot,
}

pub struct ReportExporter {
    phase: ExportPhase,
    guard: Option<CaptureGuard>,
    shot_scale: f32,
}

impl ReportExporter {
    pub fn new() -> Self {
        Self {
            phase: ExportPhase::Idle,
            guard: None,
            shot_scale: 1.0,
        }
    }

    /// An export is running; the triggering control disables itself on
    /// this so a second click cannot start a concurrent capture.
    pub fn in_progress(&self) -> bool {
        !matches!(self.phase, ExportPhase::Idle)
    }

    /// Export-excluded controls hide themselves while this holds.
    pub fn capture_active(&self) -> bool {
        self.guard.is_some()
    }

    pub fn begin(&mut self, ctx: &egui::Context) {
        if self.in_progress() {
            return;
        }
        info!("starting report export");
        self.guard = Some(CaptureGuard::install(ctx));
        self.phase = ExportPhase::Settling(1);
        ctx.request_repaint();
    }

    /// Advances the capture sequence; call once per frame after the UI has
    /// been drawn.
    pub fn drive(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        match self.phase {
            ExportPhase::Settling(0) => {
                self.shot_scale = ctx.pixels_per_point();
                frame.request_screenshot();
                self.phase = ExportPhase::AwaitingShot;
                ctx.request_repaint();
            }
            ExportPhase::Settling(frames) => {
                self.phase = ExportPhase::Settling(frames - 1);
                ctx.request_repaint();
            }
            // Keep frames coming until the screenshot lands.
            ExportPhase::AwaitingShot => ctx.request_repaint(),
            ExportPhase::Idle => {}
        }
    }

    pub fn awaiting_screenshot(&self) -> bool {
        matches!(self.phase, ExportPhase::AwaitingShot)
    }

    /// Completes the export with the captured frame. The guard is dropped
    /// before any fallible work, so hidden controls and the render scale
    /// are restored even when PDF assembly or the file write fails.
    /// Returns `None` when the user cancels the save dialog.
    pub fn finish(
        &mut self,
        shot: &egui::ColorImage,
        state: &AppState,
    ) -> Result<Option<PathBuf>> {
        self.phase = ExportPhase::Idle;
        let guard = self.guard.take();
        drop(guard);

        let rect = state
            .report_rect
            .ok_or_else(|| anyhow!("no rendered report to capture"))?;
        let source_name = state
            .uploaded
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("report");
        let result = state.result();

        let raster = normalize_width(to_opaque_rgb(&crop_to_rect(shot, rect, self.shot_scale)));
        let meta = pdf::ReportMeta {
            source_name,
            view_mode_label: state.view_mode.label(),
            kpis: result.map(|r| &r.kpis),
            tax: result.and_then(|r| r.tax_metadata.as_ref()),
            generated_on: Local::now().date_naive(),
        };
        let bytes = pdf::render_report_pdf(&raster, &meta).context("could not assemble the PDF")?;

        let suggested = pdf::export_file_name(source_name, meta.generated_on);
        let Some(path) = FileDialog::new()
            .set_file_name(&suggested)
            .add_filter("PDF documents", &["pdf"])
            .set_title("Save Report PDF")
            .save_file()
        else {
            return Ok(None);
        };
        std::fs::write(&path, bytes)
            .with_context(|| format!("could not write {}", path.display()))?;
        info!(path = %path.display(), "report exported");
        Ok(Some(path))
    }

    /// Abandons an in-flight capture, restoring the UI.
    pub fn abort(&mut self) {
        self.phase = ExportPhase::Idle;
        self.guard = None;
    }
}

/// Cuts the report subtree out of the full-window capture. `rect` is in
/// egui points; the screenshot is in physical pixels at `scale`.
fn crop_to_rect(shot: &egui::ColorImage, rect: egui::Rect, scale: f32) -> egui::ColorImage {
    let [shot_w, shot_h] = shot.size;
    let x0 = ((rect.min.x * scale).floor().max(0.0) as usize).min(shot_w);
    let y0 = ((rect.min.y * scale).floor().max(0.0) as usize).min(shot_h);
    let x1 = ((rect.max.x * scale).ceil().max(0.0) as usize).min(shot_w);
    let y1 = ((rect.max.y * scale).ceil().max(0.0) as usize).min(shot_h);
    let (w, h) = (x1.saturating_sub(x0), y1.saturating_sub(y0));

    let mut pixels = Vec::with_capacity(w * h);
    for row in y0..y1 {
        let start = row * shot_w + x0;
        pixels.extend_from_slice(&shot.pixels[start..start + w]);
    }
    egui::ColorImage {
        size: [w, h],
        pixels,
    }
}

/// Composites onto an opaque white background; the document raster has no
/// alpha channel, so translucency must resolve to white rather than
/// carrying through.
fn to_opaque_rgb(img: &egui::ColorImage) -> RgbImage {
    let [w, h] = img.size;
    let mut out = RgbImage::new(w as u32, h as u32);
    for (pixel, color) in out.pixels_mut().zip(&img.pixels) {
        // Color32 is premultiplied, so the white show-through is 255 - a.
        let gap = 255 - color.a();
        *pixel = image::Rgb([
            color.r().saturating_add(gap),
            color.g().saturating_add(gap),
            color.b().saturating_add(gap),
        ]);
    }
    out
}

/// Resamples to the fixed export width so pagination is deterministic
/// across window sizes and display densities.
fn normalize_width(raster: RgbImage) -> RgbImage {
    let target = (REFERENCE_WIDTH * RASTER_SCALE) as u32;
    if raster.width() == 0 || raster.height() == 0 || raster.width() == target {
        return raster;
    }
    let height = ((raster.height() as f32 * target as f32 / raster.width() as f32).round() as u32)
        .max(1);
    image::imageops::resize(&raster, target, height, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid_image(w: usize, h: usize, color: egui::Color32) -> egui::ColorImage {
        egui::ColorImage {
            size: [w, h],
            pixels: vec![color; w * h],
        }
    }

    #[test]
    fn crop_respects_scale_and_bounds() {
        let shot = solid_image(100, 80, egui::Color32::WHITE);
        let rect = egui::Rect::from_min_max(egui::pos2(10.0, 10.0), egui::pos2(30.0, 20.0));
        let cropped = crop_to_rect(&shot, rect, 2.0);
        assert_eq!(cropped.size, [40, 20]);
    }

    #[test]
    fn crop_clamps_to_screenshot_edges() {
        let shot = solid_image(50, 50, egui::Color32::WHITE);
        let rect = egui::Rect::from_min_max(egui::pos2(-5.0, 40.0), egui::pos2(80.0, 90.0));
        let cropped = crop_to_rect(&shot, rect, 1.0);
        assert_eq!(cropped.size, [50, 10]);
    }

    #[test]
    fn translucency_resolves_to_white() {
        let img = solid_image(2, 1, egui::Color32::TRANSPARENT);
        let rgb = to_opaque_rgb(&img);
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
    }

    #[test]
    fn raster_is_normalized_to_the_export_width() {
        let raster = RgbImage::new(700, 500);
        let normalized = normalize_width(raster);
        assert_eq!(normalized.width(), 2100);
        assert_eq!(normalized.height(), 1500);
    }
}
