use std::io::BufWriter;

use printpdf::*;

use crate::error::{Result, ScopeError};
use crate::export::ReportMeta;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const MIN_COL_W: f32 = 16.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ScopeError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ScopeError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn needs_page(&self, needed: f32) -> bool {
        self.y + needed > PAGE_H - MARGIN_BOTTOM
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, meta: &ReportMeta) {
        self.text(&meta.title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !meta.company.is_empty() {
            self.text(&meta.company, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        if !meta.date_range.is_empty() {
            self.text(&meta.date_range, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        let ts = chrono::Local::now()
            .format("Generated %Y-%m-%d %H:%M")
            .to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[String]) {
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(&headers[i], x, FONT_SIZE, true),
                    Align::Right => {
                        let tw = approx_text_width(&headers[i], FONT_SIZE);
                        self.text(&headers[i], x + col.width - tw, FONT_SIZE, true);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[String]) {
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                let cell = clip_cell(&values[i], col.width);
                match col.align {
                    Align::Left => self.text(&cell, x, FONT_SIZE, false),
                    Align::Right => {
                        let tw = approx_text_width(&cell, FONT_SIZE);
                        self.text(&cell, x + col.width - tw, FONT_SIZE, false);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ScopeError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| ScopeError::Pdf(e.to_string()))
    }
}

/// Truncate a cell so it cannot bleed into the next column.
fn clip_cell(s: &str, width: f32) -> String {
    let max_chars = ((width - 2.0) / (FONT_SIZE * 0.18)).max(1.0) as usize;
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

/// Size columns from their content: each gets a share of the usable width
/// proportional to its widest cell, floored so narrow columns stay legible.
fn layout_columns(headers: &[String], rows: &[Vec<String>], numeric: &[bool]) -> Vec<Col> {
    let usable = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;
    let mut want: Vec<f32> = headers
        .iter()
        .map(|h| approx_text_width(h, FONT_SIZE).max(MIN_COL_W))
        .collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < want.len() {
                want[i] = want[i].max(approx_text_width(cell, FONT_SIZE));
            }
        }
    }
    let total: f32 = want.iter().sum();
    let scale = if total > 0.0 { usable / total } else { 1.0 };
    want.iter()
        .enumerate()
        .map(|(i, w)| Col {
            width: (w * scale).max(MIN_COL_W).min(usable),
            align: if numeric.get(i).copied().unwrap_or(false) {
                Align::Right
            } else {
                Align::Left
            },
        })
        .collect()
}

/// Render one titled table in projection order, breaking to new pages as
/// needed and repeating the header row on each page.
pub fn render_table(
    meta: &ReportMeta,
    headers: &[String],
    rows: &[Vec<String>],
    numeric: &[bool],
) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(&meta.title)?;
    pdf.header(meta);

    let cols = layout_columns(headers, rows, numeric);
    pdf.table_header(&cols, headers);

    for row in rows {
        if pdf.needs_page(ROW_H) {
            pdf.new_page();
            pdf.table_header(&cols, headers);
        }
        pdf.table_row(&cols, row);
    }

    if rows.is_empty() {
        pdf.text("No records in range.", MARGIN_LEFT, FONT_SIZE, false);
        pdf.y += ROW_H;
    }

    pdf.to_bytes()
}
