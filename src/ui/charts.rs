// src/ui/charts.rs
use eframe::egui;
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::model::{AreaPoint, WaterfallBar};

const BASELINE_COLOR: egui::Color32 = egui::Color32::from_rgb(99, 102, 241);
const INFLOW_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
const OUTFLOW_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 100, 100);
const TOTAL_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 140, 180);

/// 12-month revenue trend with its confidence cone.
pub fn draw_trend_chart(ui: &mut egui::Ui, points: &[AreaPoint]) {
    let plot = Plot::new("revenue_trend")
        .height(220.0)
        .allow_zoom(false)
        .allow_drag(false)
        .show_background(false);

    plot.show(ui, |plot_ui| {
        let series = |f: fn(&AreaPoint) -> f64| -> Vec<[f64; 2]> {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| [i as f64, f(p)])
                .collect()
        };

        // Confidence cone bounds
        for (values, name) in [
            (series(|p| p.upper), "Upper bound"),
            (series(|p| p.lower), "Lower bound"),
        ] {
            plot_ui.line(
                Line::new(PlotPoints::from(values))
                    .name(name)
                    .width(1.0)
                    .color(BASELINE_COLOR.gamma_multiply(0.4)),
            );
        }

        plot_ui.line(
            Line::new(PlotPoints::from(series(|p| p.baseline)))
                .name("Baseline")
                .width(2.0)
                .color(BASELINE_COLOR)
                .fill(0.0),
        );
    });
}

/// Cash bridge from starting to ending cash. Total bars rise from zero,
/// flow bars float at the running subtotal.
pub fn draw_waterfall_chart(ui: &mut egui::Ui, bars: &[WaterfallBar]) {
    let plot = Plot::new("cash_waterfall")
        .height(220.0)
        .allow_zoom(false)
        .allow_drag(false)
        .show_background(false);

    plot.show(ui, |plot_ui| {
        let mut running = 0.0;
        let mut chart_bars = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            let drawn = if bar.is_total {
                running = bar.value;
                Bar::new(i as f64, bar.value)
                    .name(&bar.name)
                    .width(0.6)
                    .fill(TOTAL_COLOR)
            } else {
                let base = running;
                running += bar.value;
                Bar::new(i as f64, bar.value)
                    .name(&bar.name)
                    .width(0.6)
                    .base_offset(base)
                    .fill(if bar.value >= 0.0 {
                        INFLOW_COLOR
                    } else {
                        OUTFLOW_COLOR
                    })
            };
            chart_bars.push(drawn);
        }

        plot_ui.bar_chart(BarChart::new(chart_bars));
    });
}
