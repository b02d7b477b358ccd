// src/export/pdf.rs
//
// PDF assembly for the report export: a programmatically drawn cover page
// followed by the report raster paginated across A4 landscape pages. Page
// geometry, footer format and filename derivation are compatibility
// points with previously generated reports and must not drift.

use anyhow::Result;
use chrono::NaiveDate;
use image::{DynamicImage, RgbImage};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfLayerReference, Rect, Rgb,
};

use crate::format::{format_inr, format_pct};
use crate::model::{Kpis, TaxMetadata};

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const PAGE_MARGIN_MM: f32 = 12.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM;
pub const CONTENT_HEIGHT_MM: f32 = PAGE_HEIGHT_MM - 2.0 * PAGE_MARGIN_MM;

/// Labeling inputs for the cover page and footers.
pub struct ReportMeta<'a> {
    pub source_name: &'a str,
    pub view_mode_label: &'a str,
    pub kpis: Option<&'a Kpis>,
    pub tax: Option<&'a TaxMetadata>,
    pub generated_on: NaiveDate,
}

/// Number of content pages needed to show an image of the given height,
/// one content-height band per page. Always at least one page, even when
/// the raster is shorter than a single band.
pub fn content_page_count(image_height_mm: f32, content_height_mm: f32) -> usize {
    let pages = (image_height_mm / content_height_mm).ceil() as usize;
    pages.max(1)
}

/// Strips the extension and replaces every character outside
/// `[A-Za-z0-9_-]` with an underscore.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<sanitized stem>_<YYYY-MM-DD>.pdf`
pub fn export_file_name(source_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}.pdf",
        sanitize_file_stem(source_name),
        date.format("%Y-%m-%d")
    )
}

/// Cover summary block. Empty when no KPIs are available (the block is
/// omitted rather than printing placeholder zeros); the tax line appears
/// only when the backend reported tax metadata.
pub fn cover_summary_lines(kpis: Option<&Kpis>, tax: Option<&TaxMetadata>) -> Vec<String> {
    let Some(kpis) = kpis else {
        return Vec::new();
    };
    let mut lines = vec![
        format!("Projected 12M Revenue: {}", pdf_money(kpis.projected_12m)),
        format!("EBITDA: {}", pdf_money(kpis.ebitda)),
        format!("Net Margin: {}", format_pct(kpis.net_margin)),
        format!("DSO: {:.0} days", kpis.calculated_dso),
    ];
    if let Some(tax) = tax {
        lines.push(format!(
            "Estimated Annual Advance Tax: {}",
            pdf_money(tax.estimated_annual_tax)
        ));
    }
    lines
}

// The builtin PDF fonts are WinAnsi-encoded and have no rupee glyph.
fn pdf_money(value: f64) -> String {
    format_inr(value).replace('₹', "Rs ")
}

/// Renders the full document: cover page plus `ceil(H / C)` content pages
/// of the report raster, each content page stamped with a footer. Returns
/// the finished PDF bytes.
pub fn render_report_pdf(raster: &RgbImage, meta: &ReportMeta) -> Result<Vec<u8>> {
    let (doc, cover_page, cover_layer) = PdfDocument::new(
        "FinCast Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Cover",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    draw_cover(
        &doc.get_page(cover_page).get_layer(cover_layer),
        &bold,
        &regular,
        meta,
    );

    // The raster is scaled to the content width; its height follows
    // proportionally and is consumed band by band across pages.
    let px_per_mm = raster.width() as f32 / CONTENT_WIDTH_MM;
    let image_height_mm = raster.height() as f32 / px_per_mm;
    let dpi = px_per_mm * 25.4;
    let pages = content_page_count(image_height_mm, CONTENT_HEIGHT_MM);

    for page in 0..pages {
        let (page_index, layer_index) = doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", page + 1),
        );
        let layer = doc.get_page(page_index).get_layer(layer_index);

        let consumed_mm = page as f32 * CONTENT_HEIGHT_MM;
        let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(raster.clone()));
        pdf_image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(PAGE_MARGIN_MM)),
                translate_y: Some(Mm(
                    PAGE_HEIGHT_MM - PAGE_MARGIN_MM + consumed_mm - image_height_mm
                )),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        mask_margins(&layer);
        draw_footer(&layer, &regular, meta.source_name, page + 1);
    }

    Ok(doc.save_to_bytes()?)
}

fn draw_cover(
    layer: &PdfLayerReference,
    bold: &IndirectFontRef,
    regular: &IndirectFontRef,
    meta: &ReportMeta,
) {
    // Full-bleed dark background
    layer.set_fill_color(Color::Rgb(Rgb::new(0.08, 0.10, 0.16, None)));
    layer.add_rect(filled_rect(0.0, 0.0, PAGE_WIDTH_MM, PAGE_HEIGHT_MM));

    // Accent bar above the title
    layer.set_fill_color(Color::Rgb(Rgb::new(0.96, 0.62, 0.04, None)));
    layer.add_rect(filled_rect(
        PAGE_MARGIN_MM,
        150.0,
        PAGE_MARGIN_MM + 40.0,
        152.5,
    ));

    layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    layer.use_text(
        "FinCast Financial Forecast",
        30.0,
        Mm(PAGE_MARGIN_MM),
        Mm(132.0),
        bold,
    );

    layer.set_fill_color(Color::Rgb(Rgb::new(0.75, 0.78, 0.84, None)));
    layer.use_text(meta.source_name, 14.0, Mm(PAGE_MARGIN_MM), Mm(119.0), regular);
    layer.use_text(
        format!("Generated {}", meta.generated_on.format("%d %B %Y")),
        11.0,
        Mm(PAGE_MARGIN_MM),
        Mm(110.0),
        regular,
    );
    layer.use_text(meta.view_mode_label, 11.0, Mm(PAGE_MARGIN_MM), Mm(103.0), regular);

    let summary = cover_summary_lines(meta.kpis, meta.tax);
    if summary.is_empty() {
        return;
    }
    layer.set_fill_color(Color::Rgb(Rgb::new(0.92, 0.93, 0.95, None)));
    let mut y = 82.0;
    for line in summary {
        layer.use_text(line, 12.0, Mm(PAGE_MARGIN_MM), Mm(y), regular);
        y -= 8.0;
    }
}

// The raster band bleeds past the content area on every page except the
// last; white bands over the top and bottom margins clip it back to the
// content height. The image spans exactly the content width, so the side
// margins never need masking.
fn mask_margins(layer: &PdfLayerReference) {
    layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    layer.add_rect(filled_rect(
        0.0,
        PAGE_HEIGHT_MM - PAGE_MARGIN_MM,
        PAGE_WIDTH_MM,
        PAGE_HEIGHT_MM,
    ));
    layer.add_rect(filled_rect(0.0, 0.0, PAGE_WIDTH_MM, PAGE_MARGIN_MM));
}

// Footer on content pages only; the page number excludes the cover.
fn draw_footer(
    layer: &PdfLayerReference,
    regular: &IndirectFontRef,
    source_name: &str,
    page_number: usize,
) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.45, 0.47, 0.52, None)));
    layer.use_text(
        format!("FinCast report — {source_name}"),
        8.0,
        Mm(PAGE_MARGIN_MM),
        Mm(5.5),
        regular,
    );
    layer.use_text(
        format!("Page {page_number}"),
        8.0,
        Mm(PAGE_WIDTH_MM - PAGE_MARGIN_MM - 14.0),
        Mm(5.5),
        regular,
    );
}

fn filled_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
    Rect::new(Mm(x1), Mm(y1), Mm(x2), Mm(y2)).with_mode(PaintMode::Fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_kpis() -> Kpis {
        Kpis {
            projected_12m: 1_200_000.0,
            geo_growth_rate: 4.2,
            calculated_dso: 42.0,
            calculated_dpo: 30.0,
            gross_margin: 55.0,
            net_margin: 18.5,
            ebitda: 300_000.0,
        }
    }

    fn sample_tax() -> TaxMetadata {
        TaxMetadata {
            schedule: "Section 211 - Indian Income Tax Act".to_string(),
            installments: Default::default(),
            estimated_annual_tax: 39_600.0,
            advance_tax_exempt: false,
            exempt_note: None,
        }
    }

    #[test]
    fn page_count_is_ceiling_of_height_over_band() {
        assert_eq!(content_page_count(372.0, CONTENT_HEIGHT_MM), 2);
        assert_eq!(content_page_count(373.0, CONTENT_HEIGHT_MM), 3);
        assert_eq!(content_page_count(186.0, 186.0), 1);
    }

    #[test]
    fn short_raster_still_gets_one_page() {
        assert_eq!(content_page_count(40.0, CONTENT_HEIGHT_MM), 1);
        assert_eq!(content_page_count(0.0, CONTENT_HEIGHT_MM), 1);
    }

    #[test]
    fn filename_sanitization_matches_contract() {
        assert_eq!(sanitize_file_stem("My Ledger (Q3).xlsx"), "My_Ledger__Q3_");
        assert_eq!(sanitize_file_stem("tally_export-2025.csv"), "tally_export-2025");
        assert_eq!(sanitize_file_stem("no_extension"), "no_extension");
    }

    #[test]
    fn export_name_carries_the_date_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(
            export_file_name("My Ledger (Q3).xlsx", date),
            "My_Ledger__Q3__2026-08-25.pdf"
        );
    }

    #[test]
    fn cover_summary_omitted_without_kpis() {
        assert!(cover_summary_lines(None, Some(&sample_tax())).is_empty());
    }

    #[test]
    fn cover_summary_includes_tax_only_when_reported() {
        let kpis = sample_kpis();
        let without_tax = cover_summary_lines(Some(&kpis), None);
        assert_eq!(without_tax.len(), 4);
        assert!(!without_tax.iter().any(|l| l.contains("Tax")));

        let tax = sample_tax();
        let with_tax = cover_summary_lines(Some(&kpis), Some(&tax));
        assert_eq!(with_tax.len(), 5);
        assert_eq!(with_tax[0], "Projected 12M Revenue: Rs 12,00,000");
        assert_eq!(with_tax[4], "Estimated Annual Advance Tax: Rs 39,600");
    }

    #[test]
    fn rendered_document_is_structurally_stable() {
        let raster = RgbImage::from_pixel(420, 600, image::Rgb([255, 255, 255]));
        let meta = ReportMeta {
            source_name: "ledger.csv",
            view_mode_label: "Management View",
            kpis: Some(&sample_kpis()),
            tax: None,
            generated_on: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        };
        let first = render_report_pdf(&raster, &meta).unwrap();
        let second = render_report_pdf(&raster, &meta).unwrap();
        assert!(!first.is_empty());
        // Same inputs, same structure: cover plus ceil(H / C) pages.
        assert_eq!(first.len(), second.len());
    }
}
