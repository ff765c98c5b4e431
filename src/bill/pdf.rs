// PDF encoding of a BillLayout (printpdf, built-in Helvetica)

use super::layout::{
    BillLayout, CellFrame, FontStyle, PageLayout, GRID_LINE_WIDTH, HEADER_SHADE, PAGE_HEIGHT,
    PAGE_WIDTH,
};
use crate::error::{BillingError, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::warn;

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Encode `layout` and write it to `path`, replacing any existing file.
pub fn write_pdf(layout: &BillLayout, title: &str, path: &Path) -> Result<()> {
    let pdf_error = |message: String| BillingError::Pdf {
        path: path.to_path_buf(),
        message,
    };

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Bill");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error(e.to_string()))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Bill");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, &fonts);
    }

    let file = File::create(path).map_err(|source| BillingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| pdf_error(e.to_string()))?;

    Ok(())
}

fn draw_page(layer: &PdfLayerReference, page: &PageLayout, fonts: &Fonts) {
    // Shading first so grid lines and text sit on top of it
    let (r, g, b) = HEADER_SHADE;
    layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    for cell in page.cells.iter().filter(|c| c.shaded) {
        layer.add_polygon(Polygon {
            rings: vec![corners(cell)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(GRID_LINE_WIDTH);
    for cell in &page.cells {
        layer.add_line(Line {
            points: corners(cell),
            is_closed: true,
        });
    }

    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    for run in &page.texts {
        if !builtin_font_can_encode(&run.text) {
            warn!(text = %run.text, "text outside Latin-1 will not display with the built-in Helvetica");
        }
        layer.use_text(
            run.text.clone(),
            run.size,
            mm(run.x),
            mm(run.y),
            fonts.get(run.style),
        );
    }
}

/// Built-in fonts are single-byte (WinAnsi); anything past Latin-1 is lost.
pub fn builtin_font_can_encode(text: &str) -> bool {
    text.chars().all(|c| (c as u32) <= 0xFF)
}

fn corners(cell: &CellFrame) -> Vec<(Point, bool)> {
    let (left, bottom) = (cell.x, cell.y);
    let (right, top) = (cell.x + cell.width, cell.y + cell.height);
    vec![
        (Point::new(mm(left), mm(bottom)), false),
        (Point::new(mm(right), mm(bottom)), false),
        (Point::new(mm(right), mm(top)), false),
        (Point::new(mm(left), mm(top)), false),
    ]
}
