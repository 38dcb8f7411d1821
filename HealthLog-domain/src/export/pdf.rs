use printpdf::*;
use std::io::BufWriter;
use std::ops::Range;
use tracing::debug;

use super::{Report, ReportRow, BP_STATUS_COLUMN, COLUMNS, FITNESS_COLUMN};
use crate::entities::vitals::SeverityColor;
use crate::services::report::ReportError;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 7.0;
/// Rough width of one Helvetica character at `FONT_SIZE`
const CHAR_WIDTH: f32 = 1.3;

/// Table top on the first page, below the title block
const FIRST_TABLE_TOP: f32 = 170.0;
/// Table top on continuation pages
const TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN;

/// Column widths in mm; they add up to the printable width
const COLUMN_WIDTHS: [f32; 15] = [
    24.0, 16.0, 10.0, 18.0, 18.0, 20.0, 14.0, 14.0, 12.0, 13.0, 14.0, 20.0, 30.0, 24.0, 20.0,
];

const HEADER_FILL: (u8, u8, u8) = (59, 130, 246);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const BLACK: (u8, u8, u8) = (0, 0, 0);
const GRID: (u8, u8, u8) = (200, 200, 200);

fn color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn rows_below(top: f32) -> usize {
    ((top - ROW_HEIGHT - MARGIN) / ROW_HEIGHT).floor() as usize
}

/// Split `row_count` rows into per-page ranges. There is always at least one
/// page, so an empty report still prints its title and header.
pub fn paginate(row_count: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = rows_below(FIRST_TABLE_TOP);

    loop {
        let end = (start + capacity).min(row_count);
        pages.push(start..end);
        if end >= row_count {
            return pages;
        }
        start = end;
        capacity = rows_below(TABLE_TOP);
    }
}

/// Shorten `text` so it fits a column `width` mm wide
pub fn fit_text(text: &str, width: f32) -> String {
    let max_chars = ((width - 2.0) / CHAR_WIDTH).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }

    let mut shortened: String = text.chars().take(max_chars - 3).collect();
    shortened.push_str("...");
    shortened
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn fill_rect(layer: &PdfLayerReference, x: f32, top: f32, width: f32, fill: (u8, u8, u8)) {
    layer.set_fill_color(color(fill));
    layer.add_rect(Rect::new(
        Mm(x),
        Mm(top - ROW_HEIGHT),
        Mm(x + width),
        Mm(top),
    ));
}

fn rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_color(color(GRID));
    layer.set_outline_thickness(0.2);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn draw_header(layer: &PdfLayerReference, fonts: &Fonts, top: f32) {
    let width: f32 = COLUMN_WIDTHS.iter().sum();
    fill_rect(layer, MARGIN, top, width, HEADER_FILL);

    layer.set_fill_color(color(WHITE));
    let mut x = MARGIN;
    for (heading, column_width) in COLUMNS.iter().zip(COLUMN_WIDTHS) {
        let text = fit_text(heading, column_width);
        layer.use_text(text, FONT_SIZE, Mm(x + 1.0), Mm(top - 4.2), &fonts.bold);
        x += column_width;
    }
}

fn draw_row(layer: &PdfLayerReference, fonts: &Fonts, row: &ReportRow, top: f32) {
    let mut x = MARGIN;
    for (index, (cell, column_width)) in row.cells.iter().zip(COLUMN_WIDTHS).enumerate() {
        let (fill, font) = match index {
            BP_STATUS_COLUMN => (Some(row.bp_stage.color()), &fonts.regular),
            FITNESS_COLUMN => (Some(row.fitness.color()), &fonts.bold),
            _ => (None, &fonts.regular),
        };

        if let Some(fill) = fill.map(|severity: SeverityColor| severity.rgb()) {
            fill_rect(layer, x, top, column_width, fill);
        }

        layer.set_fill_color(color(BLACK));
        layer.use_text(
            fit_text(cell, column_width),
            FONT_SIZE,
            Mm(x + 1.0),
            Mm(top - 4.2),
            font,
        );
        x += column_width;
    }
    rule(layer, top - ROW_HEIGHT);
}

/// Render `report` as a landscape A4 PDF. Returns PDF bytes.
pub fn generate_report_pdf(report: &Report) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?,
    };

    let pages = paginate(report.rows.len());
    debug!("Rendering {} rows on {} pages", report.rows.len(), pages.len());

    for (page_number, range) in pages.into_iter().enumerate() {
        let layer = if page_number == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let mut top = if page_number == 0 {
            layer.set_fill_color(color(BLACK));
            layer.use_text(&report.title, 18.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 20.0), &fonts.bold);
            layer.use_text(report.printed_line(), 10.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 28.0), &fonts.regular);
            layer.use_text(report.summary_line(), 9.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 34.0), &fonts.regular);
            FIRST_TABLE_TOP
        } else {
            TABLE_TOP
        };

        draw_header(&layer, &fonts, top);
        top -= ROW_HEIGHT;

        if report.rows.is_empty() {
            layer.set_fill_color(color(BLACK));
            layer.use_text("No records", FONT_SIZE, Mm(MARGIN + 1.0), Mm(top - 4.2), &fonts.regular);
        }

        for row in &report.rows[range] {
            draw_row(&layer, &fonts, row, top);
            top -= ROW_HEIGHT;
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))
}
