// 📐 Bill layout - pure placement of text and table cells, in PDF points
//
// Origin is the bottom-left corner of the page (PDF convention).

use super::{BillHeader, BillTable};

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// A4 portrait
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 72.0;

pub const COLUMN_WIDTHS: [f32; 2] = [200.0, 300.0];
pub const ROW_HEIGHT: f32 = 18.0;
pub const GRID_LINE_WIDTH: f32 = 0.5;
/// Light grey header row, as RGB in 0..=1
pub const HEADER_SHADE: (f32, f32, f32) = (0.827, 0.827, 0.827);

pub const TITLE_SIZE: f32 = 18.0;
pub const SUBTITLE_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 10.0;
/// Blank gap between the date line and the table
pub const SPACER: f32 = 12.0;

const LEADING: f32 = 1.2;
const PARAGRAPH_GAP: f32 = 6.0;

// ============================================================================
// LAYOUT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge of the text
    pub x: f32,
    /// Baseline
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
}

/// One bordered table cell; `y` is its bottom edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFrame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shaded: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<TextRun>,
    pub cells: Vec<CellFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillLayout {
    pub pages: Vec<PageLayout>,
}

impl BillLayout {
    /// Header block on the first page, then the table, breaking onto new
    /// pages whenever the next row would cross the bottom margin.
    pub fn build(header: &BillHeader, table: &BillTable) -> Self {
        let mut pages = Vec::new();
        let mut page = PageLayout::default();
        let mut cursor = PAGE_HEIGHT - MARGIN;

        // Title, centred
        let title_width = text_width(&header.title, TITLE_SIZE);
        page.texts.push(TextRun {
            text: header.title.clone(),
            x: (PAGE_WIDTH - title_width) / 2.0,
            y: cursor - TITLE_SIZE,
            size: TITLE_SIZE,
            style: FontStyle::Bold,
        });
        cursor -= TITLE_SIZE * LEADING + PARAGRAPH_GAP;

        page.texts.push(TextRun {
            text: header.subtitle.clone(),
            x: MARGIN,
            y: cursor - SUBTITLE_SIZE,
            size: SUBTITLE_SIZE,
            style: FontStyle::Bold,
        });
        cursor -= SUBTITLE_SIZE * LEADING + PARAGRAPH_GAP;

        page.texts.push(TextRun {
            text: header.date_line.clone(),
            x: MARGIN,
            y: cursor - BODY_SIZE,
            size: BODY_SIZE,
            style: FontStyle::Regular,
        });
        cursor -= BODY_SIZE * LEADING + SPACER;

        let table_width: f32 = COLUMN_WIDTHS.iter().sum();
        let table_left = (PAGE_WIDTH - table_width) / 2.0;

        for (index, row) in table.all_rows().enumerate() {
            if cursor - ROW_HEIGHT < MARGIN {
                pages.push(std::mem::take(&mut page));
                cursor = PAGE_HEIGHT - MARGIN;
            }

            let bottom = cursor - ROW_HEIGHT;
            let shaded = index == 0;

            let mut x = table_left;
            for (text, width) in [&row.label, &row.value].into_iter().zip(COLUMN_WIDTHS) {
                page.cells.push(CellFrame {
                    x,
                    y: bottom,
                    width,
                    height: ROW_HEIGHT,
                    shaded,
                });
                page.texts.push(TextRun {
                    text: text.clone(),
                    x: x + (width - text_width(text, BODY_SIZE)) / 2.0,
                    y: bottom + (ROW_HEIGHT - cap_height(BODY_SIZE)) / 2.0,
                    size: BODY_SIZE,
                    style: FontStyle::Regular,
                });
                x += width;
            }

            cursor = bottom;
        }

        pages.push(page);
        BillLayout { pages }
    }
}

// ============================================================================
// FONT METRICS (Helvetica, 1/1000 em)
// ============================================================================

/// Advance width of `text` set in Helvetica at `size` points.
///
/// Bold runs are measured with the regular widths; the difference is small
/// enough for centring.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    units as f32 * size / 1000.0
}

fn cap_height(size: f32) -> f32 {
    size * 0.718
}

fn helvetica_width(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        '"' => 355,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        'i' | 'j' | 'l' => 222,
        '{' | '}' => 334,
        '|' => 260,
        // digits, '#', '$', '?', '_', and the remaining lowercase letters
        _ => 556,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::TableRow;
    use chrono::NaiveDate;

    fn header() -> BillHeader {
        BillHeader::new("Test College", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    fn table(body_rows: usize) -> BillTable {
        BillTable {
            header: TableRow::new("Field", "Value"),
            rows: (0..body_rows)
                .map(|i| TableRow::new(format!("Field {i}"), format!("{i}")))
                .collect(),
        }
    }

    #[test]
    fn test_header_block_order() {
        let layout = BillLayout::build(&header(), &table(1));
        let texts = &layout.pages[0].texts;

        assert_eq!(texts[0].text, "Test College");
        assert_eq!(texts[0].style, FontStyle::Bold);
        assert_eq!(texts[1].text, "Hostel and Mess Bill");
        assert_eq!(texts[2].text, "01-Jun-2025");
        assert!(texts[0].y > texts[1].y && texts[1].y > texts[2].y);
    }

    #[test]
    fn test_title_centred() {
        let layout = BillLayout::build(&header(), &table(0));
        let title = &layout.pages[0].texts[0];
        let width = text_width(&title.text, TITLE_SIZE);

        let left_gap = title.x;
        let right_gap = PAGE_WIDTH - (title.x + width);
        assert!((left_gap - right_gap).abs() < 0.01);
    }

    #[test]
    fn test_columns_and_shading() {
        let layout = BillLayout::build(&header(), &table(3));
        let cells = &layout.pages[0].cells;

        // (1 header + 3 body rows) * 2 columns
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0].width, 200.0);
        assert_eq!(cells[1].width, 300.0);
        assert_eq!(cells[1].x, cells[0].x + 200.0);
        assert!(cells[0].shaded && cells[1].shaded);
        assert!(cells[2..].iter().all(|c| !c.shaded));

        // Table centred on the page
        let right_edge = cells[1].x + cells[1].width;
        assert!((cells[0].x - (PAGE_WIDTH - right_edge)).abs() < 0.01);
    }

    #[test]
    fn test_cell_text_centred() {
        let layout = BillLayout::build(&header(), &table(1));
        let page = &layout.pages[0];
        // Header block is three runs; header-row label is the fourth
        let run = &page.texts[3];
        let cell = &page.cells[0];

        assert_eq!(run.text, "Field");
        let width = text_width(&run.text, BODY_SIZE);
        let left_gap = run.x - cell.x;
        let right_gap = cell.x + cell.width - (run.x + width);
        assert!((left_gap - right_gap).abs() < 0.01);
        assert!(run.y > cell.y && run.y < cell.y + cell.height);
    }

    #[test]
    fn test_rows_stack_downwards() {
        let layout = BillLayout::build(&header(), &table(2));
        let cells = &layout.pages[0].cells;
        assert!((cells[0].y - cells[2].y - ROW_HEIGHT).abs() < 0.001);
        assert!((cells[2].y - cells[4].y - ROW_HEIGHT).abs() < 0.001);
    }

    #[test]
    fn test_long_table_paginates() {
        let layout = BillLayout::build(&header(), &table(80));

        assert!(layout.pages.len() >= 2);
        let total_cells: usize = layout.pages.iter().map(|p| p.cells.len()).sum();
        assert_eq!(total_cells, 81 * 2);

        for page in &layout.pages {
            for cell in &page.cells {
                assert!(cell.y >= MARGIN - 0.01);
                assert!(cell.y + cell.height <= PAGE_HEIGHT - MARGIN + 0.01);
            }
        }
        // Continuation pages carry no header block and no shading
        assert!(layout.pages[1].cells.iter().all(|c| !c.shaded));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 10.0), 0.0);
        assert!((text_width("100", 10.0) - 16.68).abs() < 0.001);
        assert!(text_width("WWW", 10.0) > text_width("iii", 10.0));
    }
}
