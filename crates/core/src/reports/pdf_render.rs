//! PDF rendering of tabular documents.
//!
//! Layout works in millimetres on A4 portrait. Row capacity per page is
//! computed with integer arithmetic; floats only appear at draw time.

#![allow(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::ops::Range;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use super::error::ReportError;
use super::types::TabularDocument;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const CELL_PADDING_MM: f32 = 1.5;
const CHAR_WIDTH_MM: f32 = 1.75;

const ROW_HEIGHT_MM: u16 = 7;
const FIRST_TABLE_TOP_MM: u16 = 262;
const TABLE_TOP_MM: u16 = 282;
const TABLE_BOTTOM_MM: u16 = 20;

/// Widths of the six grade-report columns; other tables share the width evenly.
const GRADE_COLUMN_WIDTHS_MM: [f32; 6] = [28.0, 52.0, 18.0, 26.0, 28.0, 28.0];
const TABLE_WIDTH_MM: f32 = 180.0;

const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 11.0;
const CELL_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 8.0;

const fn body_rows_below(top_mm: u16) -> usize {
    ((top_mm - TABLE_BOTTOM_MM) / ROW_HEIGHT_MM) as usize - 1
}

/// Body rows that fit on the first page, under the title block.
pub const FIRST_PAGE_ROWS: usize = body_rows_below(FIRST_TABLE_TOP_MM);
/// Body rows that fit on each following page.
pub const PAGE_ROWS: usize = body_rows_below(TABLE_TOP_MM);

/// Splits `row_count` body rows into per-page ranges.
///
/// Always yields at least one page so an empty table still renders its header.
#[must_use]
pub fn paginate(row_count: usize, first_page_rows: usize, page_rows: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = first_page_rows.max(1);
    loop {
        let end = (start + capacity).min(row_count);
        pages.push(start..end);
        if end >= row_count {
            return pages;
        }
        start = end;
        capacity = page_rows.max(1);
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn title_color() -> Color {
    rgb(0x2c, 0x3e, 0x50)
}

fn header_color() -> Color {
    rgb(0x34, 0x98, 0xdb)
}

fn stripe_color() -> Color {
    rgb(0xf2, 0xf4, 0xf5)
}

fn grid_color() -> Color {
    rgb(0xbd, 0xc3, 0xc7)
}

fn text_color() -> Color {
    rgb(0x22, 0x22, 0x22)
}

fn white() -> Color {
    rgb(0xff, 0xff, 0xff)
}

fn column_widths(columns: usize) -> Vec<f32> {
    if columns == GRADE_COLUMN_WIDTHS_MM.len() {
        GRADE_COLUMN_WIDTHS_MM.to_vec()
    } else {
        vec![TABLE_WIDTH_MM / columns.max(1) as f32; columns]
    }
}

/// Clips `text` to what fits in a cell of `width_mm`, ending with `...`.
///
/// Text reaches the built-in fonts as raw bytes, so anything outside printable
/// ASCII (accented letters included) becomes `?`.
fn fit_cell(text: &str, width_mm: f32) -> String {
    let clean: String = text
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();
    let max_chars = ((width_mm - 2.0 * CELL_PADDING_MM) / CHAR_WIDTH_MM).max(4.0) as usize;
    if clean.chars().count() <= max_chars {
        clean
    } else {
        let kept: String = clean.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct TableLayout {
    widths: Vec<f32>,
}

impl TableLayout {
    fn column_lefts(&self) -> impl Iterator<Item = f32> + '_ {
        self.widths.iter().scan(MARGIN_MM, |x, w| {
            let left = *x;
            *x += w;
            Some(left)
        })
    }

    fn right_edge(&self) -> f32 {
        MARGIN_MM + self.widths.iter().sum::<f32>()
    }

    fn draw_row(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        cells: &[String],
        top: f32,
        fill: Option<Color>,
        text: Color,
    ) {
        let bottom = top - f32::from(ROW_HEIGHT_MM);
        if let Some(fill) = fill {
            layer.set_fill_color(fill);
            layer.add_rect(Rect::new(
                Mm(MARGIN_MM),
                Mm(bottom),
                Mm(self.right_edge()),
                Mm(top),
            ));
        }

        layer.set_fill_color(text);
        for ((left, width), cell) in self.column_lefts().zip(&self.widths).zip(cells) {
            layer.use_text(
                fit_cell(cell, *width),
                CELL_SIZE,
                Mm(left + CELL_PADDING_MM),
                Mm(bottom + 2.2),
                font,
            );
        }
    }

    fn draw_grid(&self, layer: &PdfLayerReference, top: f32, rows: usize) {
        let bottom = top - f32::from(ROW_HEIGHT_MM) * (rows + 1) as f32;
        let right = self.right_edge();

        layer.set_outline_color(grid_color());
        layer.set_outline_thickness(0.5);

        for i in 0..=rows + 1 {
            let y = top - f32::from(ROW_HEIGHT_MM) * i as f32;
            layer.add_line(segment((MARGIN_MM, y), (right, y)));
        }
        for x in self.column_lefts().chain(std::iter::once(right)) {
            layer.add_line(segment((x, top), (x, bottom)));
        }
    }
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}

/// Renders a styled, paginated A4 report.
///
/// The first page carries the title block; the header row repeats on every page.
///
/// # Errors
///
/// Returns `ReportError::Pdf` if the PDF backend fails.
pub fn render_pdf(document: &TabularDocument) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        &document.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Table",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
    };
    let table = TableLayout {
        widths: column_widths(document.headers.len()),
    };

    let pages = paginate(document.rows.len(), FIRST_PAGE_ROWS, PAGE_ROWS);
    let page_count = pages.len();

    for (index, range) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Table");
            doc.get_page(page).get_layer(layer)
        };

        let top = if index == 0 {
            layer.set_fill_color(title_color());
            layer.use_text(&document.title, TITLE_SIZE, Mm(MARGIN_MM), Mm(278.0), &fonts.bold);
            layer.use_text(
                &document.subtitle,
                SUBTITLE_SIZE,
                Mm(MARGIN_MM),
                Mm(270.0),
                &fonts.regular,
            );
            f32::from(FIRST_TABLE_TOP_MM)
        } else {
            f32::from(TABLE_TOP_MM)
        };

        table.draw_row(
            &layer,
            &fonts.bold,
            &document.headers,
            top,
            Some(header_color()),
            white(),
        );

        let rows = &document.rows[range];
        for (offset, cells) in rows.iter().enumerate() {
            let row_top = top - f32::from(ROW_HEIGHT_MM) * (offset + 1) as f32;
            let fill = (offset % 2 == 1).then(stripe_color);
            table.draw_row(&layer, &fonts.regular, cells, row_top, fill, text_color());
        }
        table.draw_grid(&layer, top, rows.len());

        layer.set_fill_color(text_color());
        layer.use_text(
            format!("Page {} of {page_count}", index + 1),
            FOOTER_SIZE,
            Mm(MARGIN_MM),
            Mm(10.0),
            &fonts.regular,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::Pdf(e.to_string()))
}
