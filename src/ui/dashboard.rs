// src/ui/dashboard.rs
use eframe::egui;

use crate::format::{format_dso_dpo, format_inr, format_pct};
use crate::model::projection::opex_line_names;
use crate::model::{AnalysisResult, TaxMetadata};
use crate::state::{AppState, ViewMode};
use crate::ui::charts;

const AMBER: egui::Color32 = egui::Color32::from_rgb(217, 119, 6);
const AMBER_BG: egui::Color32 = egui::Color32::from_rgb(69, 49, 14);
const NEGATIVE: egui::Color32 = egui::Color32::from_rgb(220, 90, 90);

pub enum DashboardAction {
    RunScenario,
    ExportPdf,
}

/// Renders the populated report. Controls flagged export-excluded (view
/// toggle, scenario panel, export button) drop out while a capture is
/// active and come back when it ends.
pub fn show_dashboard(
    ui: &mut egui::Ui,
    state: &mut AppState,
    export_in_progress: bool,
    capture_active: bool,
) -> Option<DashboardAction> {
    // Clone the result for immutable use while the rest of the state
    // stays mutable for the toggles.
    let Some(result) = state.result().cloned() else {
        return None;
    };
    let mut action = None;

    egui::ScrollArea::vertical().show(ui, |ui| {
        show_header(ui, state, &mut action, export_in_progress, capture_active);
        ui.add_space(8.0);

        show_kpi_cards(ui, &result);
        ui.add_space(8.0);

        if let Some(tax) = &result.tax_metadata {
            show_tax_banner(ui, tax);
            ui.add_space(8.0);
        }

        ui.columns(2, |columns| {
            columns[0].group(|ui| {
                ui.heading("Revenue Trend");
                charts::draw_trend_chart(ui, &result.charts.area_data);
            });
            columns[1].group(|ui| {
                ui.heading("Cash Bridge");
                charts::draw_waterfall_chart(ui, &result.charts.waterfall_data);
            });
        });
        ui.add_space(8.0);

        match state.view_mode {
            ViewMode::Management => show_management_statement(ui, state, &result),
            ViewMode::Schedule3 => show_schedule3_statement(ui, &result),
        }

        // Everything above is part of the export capture.
        state.report_rect = Some(ui.min_rect());
    });

    action
}

fn show_header(
    ui: &mut egui::Ui,
    state: &mut AppState,
    action: &mut Option<DashboardAction>,
    export_in_progress: bool,
    capture_active: bool,
) {
    ui.horizontal(|ui| {
        ui.heading("Forecast Dashboard");
        if let Some(file) = &state.uploaded {
            ui.weak(&file.name);
        }

        if capture_active {
            return;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!export_in_progress, egui::Button::new("Export PDF"))
                .clicked()
            {
                *action = Some(DashboardAction::ExportPdf);
            }

            ui.separator();
            for (mode, label) in [
                (ViewMode::Schedule3, "Schedule III"),
                (ViewMode::Management, "Management"),
            ] {
                if ui
                    .selectable_label(state.view_mode == mode, label)
                    .clicked()
                {
                    state.view_mode = mode;
                }
            }
        });
    });

    if capture_active {
        return;
    }
    ui.add_space(6.0);
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label("Scenario:");
            ui.label("Revenue growth %");
            ui.add(
                egui::TextEdit::singleline(&mut state.assumptions.revenue_growth)
                    .desired_width(56.0)
                    .hint_text("auto"),
            );
            ui.label("Tax rate %");
            ui.add(
                egui::TextEdit::singleline(&mut state.assumptions.tax_rate).desired_width(56.0),
            );
            ui.label("New capex");
            ui.add(
                egui::TextEdit::singleline(&mut state.assumptions.new_capex)
                    .desired_width(90.0)
                    .hint_text("0"),
            );
            if ui.button("Run Scenario").clicked() {
                *action = Some(DashboardAction::RunScenario);
            }
        });
    });
}

fn show_kpi_cards(ui: &mut egui::Ui, result: &AnalysisResult) {
    let kpis = &result.kpis;
    let cards = [
        (
            "Projected 12M Revenue",
            format_inr(kpis.projected_12m),
            format!("{} monthly growth", format_pct(kpis.geo_growth_rate)),
        ),
        (
            "EBITDA",
            format_inr(kpis.ebitda),
            format!("{} gross margin", format_pct(kpis.gross_margin)),
        ),
        (
            "Net Margin",
            format_pct(kpis.net_margin),
            "of latest month revenue".to_string(),
        ),
        (
            "DSO / DPO",
            format_dso_dpo(kpis.calculated_dso, kpis.calculated_dpo),
            "collection vs payment days".to_string(),
        ),
    ];

    ui.columns(cards.len(), |columns| {
        for (column, (title, value, subtitle)) in columns.iter_mut().zip(cards) {
            column.group(|ui| {
                ui.set_width(ui.available_width());
                ui.weak(title);
                ui.heading(value);
                ui.small(subtitle);
            });
        }
    });
}

fn show_tax_banner(ui: &mut egui::Ui, tax: &TaxMetadata) {
    egui::Frame::none()
        .fill(AMBER_BG)
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(
                AMBER,
                format!(
                    "Advance tax compliance — {}: estimated annual liability {}",
                    tax.schedule,
                    format_inr(tax.estimated_annual_tax)
                ),
            );
            if tax.advance_tax_exempt {
                if let Some(note) = &tax.exempt_note {
                    ui.weak(note);
                }
            } else {
                for (window, share) in &tax.installments {
                    ui.weak(format!("{window}: {share}"));
                }
            }
        });
}

fn show_management_statement(ui: &mut egui::Ui, state: &mut AppState, result: &AnalysisResult) {
    let months = &result.three_way_model;
    let rows: Vec<_> = months.iter().map(|m| m.direct_row()).collect();

    ui.heading("Management Cash Flow (Direct Method)");
    egui::ScrollArea::horizontal()
        .id_source("management_scroll")
        .show(ui, |ui| {
            egui::Grid::new("management_grid")
                .striped(true)
                .min_col_width(84.0)
                .show(ui, |ui| {
                    ui.strong("");
                    for row in &rows {
                        ui.strong(row.month);
                    }
                    ui.end_row();

                    statement_row(ui, "Revenue", rows.iter().map(|r| r.revenue));
                    statement_row(ui, "COGS", rows.iter().map(|r| -r.cogs));
                    statement_row(ui, "Payroll", rows.iter().map(|r| -r.payroll));

                    let arrow = if state.expanded_opex { "⏷" } else { "⏵" };
                    if ui
                        .selectable_label(
                            state.expanded_opex,
                            format!("{arrow} Total Operating Expenses"),
                        )
                        .clicked()
                    {
                        state.expanded_opex = !state.expanded_opex;
                    }
                    for row in &rows {
                        money_cell(ui, -row.opex_total);
                    }
                    ui.end_row();

                    if state.expanded_opex {
                        for name in opex_line_names(months) {
                            ui.weak(format!("    {name}"));
                            for row in &rows {
                                let amount = row.line_items.get(&name).copied().unwrap_or(0.0);
                                money_cell(ui, -amount);
                            }
                            ui.end_row();
                        }
                    }

                    statement_row(ui, "Debt Service", rows.iter().map(|r| -r.debt_service));
                    statement_row(ui, "Capex", rows.iter().map(|r| -r.capex));
                    statement_total_row(ui, "Net Cash Flow", rows.iter().map(|r| r.net_cash_flow));
                    statement_total_row(ui, "Ending Cash", rows.iter().map(|r| r.ending_cash));
                });
        });
}

fn show_schedule3_statement(ui: &mut egui::Ui, result: &AnalysisResult) {
    let rows: Vec<_> = result.three_way_model.iter().map(|m| m.indirect_row()).collect();

    ui.heading("Cash Flow Statement — Schedule III (Indirect Method)");
    egui::ScrollArea::horizontal()
        .id_source("schedule3_scroll")
        .show(ui, |ui| {
            egui::Grid::new("schedule3_grid")
                .striped(true)
                .min_col_width(84.0)
                .show(ui, |ui| {
                    ui.strong("");
                    for row in &rows {
                        ui.strong(&row.month);
                    }
                    ui.end_row();

                    statement_row(
                        ui,
                        "Operating Profit before Working Capital Changes",
                        rows.iter().map(|r| r.operating_profit_bwc),
                    );
                    statement_row(
                        ui,
                        "(Increase) / Decrease in Trade Receivables",
                        rows.iter().map(|r| r.receivables_delta),
                    );
                    statement_row(
                        ui,
                        "Increase / (Decrease) in Trade Payables",
                        rows.iter().map(|r| r.payables_delta),
                    );
                    statement_row(
                        ui,
                        "Cash Generated from Operations",
                        rows.iter().map(|r| r.cash_from_operations),
                    );

                    // Advance tax lands only in installment months; those
                    // cells get the compliance accent.
                    ui.label("Less: Advance Tax Paid");
                    for row in &rows {
                        if row.is_tax_quarter {
                            ui.colored_label(AMBER, format_inr(-row.taxes_paid));
                        } else {
                            money_cell(ui, 0.0);
                        }
                    }
                    ui.end_row();

                    statement_row(
                        ui,
                        "Net Cash from Operating Activities",
                        rows.iter().map(|r| r.net_cash_operating),
                    );
                    statement_row(
                        ui,
                        "Net Cash from Investing Activities",
                        rows.iter().map(|r| r.net_cash_investing),
                    );
                    statement_row(
                        ui,
                        "Net Cash from Financing Activities",
                        rows.iter().map(|r| r.net_cash_financing),
                    );
                    statement_total_row(
                        ui,
                        "Net Increase / (Decrease) in Cash",
                        rows.iter().map(|r| r.net_cash_flow),
                    );
                    statement_total_row(
                        ui,
                        "Closing Cash Balance",
                        rows.iter().map(|r| r.ending_cash),
                    );
                });
        });
}

fn statement_row(ui: &mut egui::Ui, label: &str, values: impl Iterator<Item = f64>) {
    ui.label(label);
    for value in values {
        money_cell(ui, value);
    }
    ui.end_row();
}

fn statement_total_row(ui: &mut egui::Ui, label: &str, values: impl Iterator<Item = f64>) {
    ui.strong(label);
    for value in values {
        ui.strong(format_inr(value));
    }
    ui.end_row();
}

fn money_cell(ui: &mut egui::Ui, value: f64) {
    if value < 0.0 {
        ui.colored_label(NEGATIVE, format_inr(value));
    } else {
        ui.label(format_inr(value));
    }
}
