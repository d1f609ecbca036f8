use std::io::Cursor;

use printpdf::{
    Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
    image_crate::{DynamicImage, GenericImageView},
    path::PaintMode,
};

use super::{Header, ReceiptLayout, assets::ReceiptFont};
use crate::error::{AppError, AppResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const LINE_GAP: f32 = 6.0;

const LOGO_WIDTH: f32 = 42.0;
const ROW_HEIGHT: f32 = 9.0;
const COLUMN_WIDTHS: [f32; 3] = [70.0, 35.0, 35.0];

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Render `layout` as an A4 PDF.
///
/// The font is embedded whole; printpdf 0.7 has no subsetting, so a receipt
/// carries the full face (about 850 KB for DejaVu Sans).
pub fn render(layout: &ReceiptLayout, font: &ReceiptFont) -> AppResult<Vec<u8>> {
    let face = font.face()?;
    let (doc, page, layer) = PdfDocument::new(
        &layout.document_title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "receipt",
    );
    let font_ref = doc
        .add_external_font(Cursor::new(font.bytes()))
        .map_err(|err| AppError::Render(format!("{err:?}")))?;

    let mut pen = Pen {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN,
        font: font_ref,
        face,
    };

    for text in layout.texts() {
        if let Some(ch) = text.chars().find(|ch| pen.face.glyph_index(*ch).is_none()) {
            tracing::warn!(glyph = ?ch, "receipt font lacks a glyph, text may render incompletely");
        }
    }

    match &layout.header {
        Header::Logo(image) => pen.logo(image),
        Header::Title(title) => pen.centered(title, TITLE_SIZE),
    }
    pen.gap(LINE_GAP);
    pen.centered(&layout.title, TITLE_SIZE);
    pen.gap(LINE_GAP);

    for line in &layout.info {
        pen.left(line, BODY_SIZE);
    }
    pen.gap(LINE_GAP * 2.0);

    let last = layout.table.len().saturating_sub(1);
    for (idx, row) in layout.table.iter().enumerate() {
        if pen.y - ROW_HEIGHT < MARGIN {
            pen.new_page(&doc);
        }
        pen.row(row, RowStyle::for_row(idx, last));
    }

    drop(pen);
    doc.save_to_bytes()
        .map_err(|err| AppError::Render(format!("{err:?}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStyle {
    Header,
    /// First item row.
    Lead,
    Body,
    Total,
}

impl RowStyle {
    fn for_row(idx: usize, last: usize) -> Self {
        match idx {
            0 => RowStyle::Header,
            _ if idx == last => RowStyle::Total,
            1 => RowStyle::Lead,
            _ => RowStyle::Body,
        }
    }

    fn background(self) -> Rgb {
        match self {
            RowStyle::Header => Rgb::new(0.5, 0.0, 0.5, None),
            RowStyle::Lead => Rgb::new(0.96, 0.96, 0.96, None),
            RowStyle::Body => Rgb::new(0.9, 0.9, 0.98, None),
            RowStyle::Total => Rgb::new(0.827, 0.827, 0.827, None),
        }
    }

    fn text(self) -> Rgb {
        match self {
            RowStyle::Header => Rgb::new(1.0, 1.0, 1.0, None),
            _ => Rgb::new(0.0, 0.0, 0.0, None),
        }
    }
}

/// Writes top-down on the current page, tracking the baseline.
struct Pen<'f> {
    layer: PdfLayerReference,
    y: f32,
    font: IndirectFontRef,
    face: ttf_parser::Face<'f>,
}

impl Pen<'_> {
    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn new_page(&mut self, doc: &PdfDocumentReference) {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "receipt");
        self.layer = doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Advance width of `text` in millimetres.
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let units_per_em = f32::from(self.face.units_per_em());
        let advance: f32 = text
            .chars()
            .filter_map(|ch| self.face.glyph_index(ch))
            .filter_map(|glyph| self.face.glyph_hor_advance(glyph))
            .map(f32::from)
            .sum();
        advance / units_per_em * size / PT_PER_MM
    }

    /// Longest prefix of `text` that fits in `width`, with an ellipsis if cut.
    fn fit(&self, text: &str, size: f32, width: f32) -> String {
        if self.text_width(text, size) <= width {
            return text.to_string();
        }
        let mut fitted = String::new();
        for ch in text.chars() {
            fitted.push(ch);
            if self.text_width(&format!("{fitted}…"), size) > width {
                fitted.pop();
                break;
            }
        }
        format!("{fitted}…")
    }

    fn text_at(&self, text: &str, size: f32, x: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.y), &self.font);
    }

    fn left(&mut self, text: &str, size: f32) {
        self.y -= size / PT_PER_MM;
        self.text_at(text, size, MARGIN);
        self.y -= 1.5;
    }

    fn centered(&mut self, text: &str, size: f32) {
        self.y -= size / PT_PER_MM;
        let x = (PAGE_WIDTH - self.text_width(text, size)) / 2.0;
        self.text_at(text, size, x.max(MARGIN));
    }

    fn logo(&mut self, image: &DynamicImage) {
        let (width, height) = image.dimensions();
        let width_px = width.max(1) as f32;
        let height_px = height.max(1) as f32;
        let dpi = width_px * 25.4 / LOGO_WIDTH;
        let height_mm = height_px * 25.4 / dpi;

        self.y -= height_mm;
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((PAGE_WIDTH - LOGO_WIDTH) / 2.0)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    fn rule(&self, x1: f32, x2: f32, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn row(&mut self, cells: &[String; 3], style: RowStyle) {
        let table_width: f32 = COLUMN_WIDTHS.iter().sum();
        let left = (PAGE_WIDTH - table_width) / 2.0;
        let top = self.y;
        let bottom = top - ROW_HEIGHT;

        self.layer.set_fill_color(Color::Rgb(style.background()));
        self.layer.add_rect(
            Rect::new(Mm(left), Mm(bottom), Mm(left + table_width), Mm(top))
                .with_mode(PaintMode::Fill),
        );
        self.layer.set_fill_color(Color::Rgb(style.text()));

        let baseline = bottom + (ROW_HEIGHT - BODY_SIZE / PT_PER_MM) / 2.0 + 1.0;
        let mut x = left;
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            let text = self.fit(cell, BODY_SIZE, width - 4.0);
            let offset = (width - self.text_width(&text, BODY_SIZE)) / 2.0;
            self.layer
                .use_text(text, BODY_SIZE, Mm(x + offset), Mm(baseline), &self.font);
            x += width;
        }

        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
        self.layer.set_outline_thickness(match style {
            RowStyle::Header | RowStyle::Total => 1.0,
            RowStyle::Lead | RowStyle::Body => 0.5,
        });
        self.rule(left, left + table_width, top);
        self.rule(left, left + table_width, bottom);
        let mut x = left;
        self.vertical(x, top, bottom);
        for width in COLUMN_WIDTHS {
            x += width;
            self.vertical(x, top, bottom);
        }

        self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.y = bottom;
    }

    fn vertical(&self, x: f32, top: f32, bottom: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(top)), false),
                (Point::new(Mm(x), Mm(bottom)), false),
            ],
            is_closed: false,
        });
    }
}
