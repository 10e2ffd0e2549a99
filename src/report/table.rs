//! Striped data tables.
//!
//! A table is a header row followed by data rows, each row a run of
//! bordered, centred cells of equal width spanning the printable width.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Color;
use crate::layout::{Align, Border, Canvas, CellMove};

/// Colours and font sizes of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    /// Header row background
    pub header_fill: Color,
    /// Header row text colour
    pub header_text: Color,
    /// Header row font size (pt)
    pub header_font_size: f32,
    /// Background of even data rows (0, 2, 4, ...)
    pub stripe_fill: Color,
    /// Data row text colour
    pub body_text: Color,
    /// Data row font size (pt)
    pub body_font_size: f32,
    /// Draw the header row again at the top of every continuation page
    pub repeat_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: Color::from_rgb8(30, 60, 84),
            header_text: Color::white(),
            header_font_size: 14.0,
            stripe_fill: Color::from_rgb8(188, 227, 222),
            body_text: Color::black(),
            body_font_size: 8.0,
            repeat_header: true,
        }
    }
}

/// Draw a table at the cursor.
///
/// Rows are `font_size` millimetres tall, where `font_size` is the point
/// size active when the table starts. Font and colours are restored
/// afterwards.
pub(crate) fn render_table<R, C, H>(
    canvas: &mut Canvas,
    family: &str,
    data: &[R],
    columns: &[H],
    style: &TableStyle,
) -> Result<()>
where
    R: AsRef<[C]>,
    C: Display,
    H: Display,
{
    if data.is_empty() {
        return Err(Error::MissingArgument("Table data must be specified"));
    }
    if columns.is_empty() {
        return Err(Error::MissingArgument("Table columns must be specified"));
    }

    let headings: Vec<String> = columns.iter().map(ToString::to_string).collect();
    let col_width = canvas.effective_page_width() / headings.len() as f32;
    let row_height = canvas.font_size();
    let saved_size = canvas.font_size();
    let saved_text = canvas.text_color();
    let saved_fill = canvas.fill_color();

    canvas.ln(None);
    canvas.ln(None);
    header_row(canvas, family, &headings, col_width, row_height, style)?;
    body_font(canvas, family, style)?;

    for (index, row) in data.iter().enumerate() {
        let cells = row.as_ref();
        if cells.len() != headings.len() {
            log::warn!(
                "Table row {} has {} cells for {} columns",
                index,
                cells.len(),
                headings.len()
            );
        }

        canvas.ln(Some(row_height));
        if style.repeat_header && canvas.needs_page_break(row_height) {
            canvas.add_page()?;
            header_row(canvas, family, &headings, col_width, row_height, style)?;
            body_font(canvas, family, style)?;
            canvas.ln(Some(row_height));
        }

        let fill = index % 2 == 0;
        for cell in cells {
            canvas.cell(
                col_width,
                row_height,
                &cell.to_string(),
                Border::ALL,
                CellMove::Right,
                Align::Center,
                fill,
            )?;
        }
    }

    log::debug!("Drew table: {} columns, {} rows", headings.len(), data.len());
    canvas.set_font(family, "", saved_size)?;
    canvas.set_text_color(saved_text);
    canvas.set_fill_color(saved_fill);
    Ok(())
}

fn header_row(
    canvas: &mut Canvas,
    family: &str,
    headings: &[String],
    col_width: f32,
    row_height: f32,
    style: &TableStyle,
) -> Result<()> {
    canvas.set_text_color(style.header_text);
    canvas.set_fill_color(style.header_fill);
    canvas.set_font(family, "", style.header_font_size)?;
    for heading in headings {
        canvas.cell(
            col_width,
            row_height,
            heading,
            Border::ALL,
            CellMove::Right,
            Align::Center,
            true,
        )?;
    }
    Ok(())
}

fn body_font(canvas: &mut Canvas, family: &str, style: &TableStyle) -> Result<()> {
    canvas.set_text_color(style.body_text);
    canvas.set_fill_color(style.stripe_fill);
    canvas.set_font(family, "", style.body_font_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::writer::PdfWriterConfig;

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(PageSize::A4, PdfWriterConfig::default().with_compress(false));
        canvas.add_page().unwrap();
        canvas
    }

    #[test]
    fn test_rejects_empty_input() {
        let mut c = canvas();
        let rows: Vec<Vec<&str>> = Vec::new();
        let err = render_table(&mut c, "Arial", &rows, &["a"], &TableStyle::default()).unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));

        let rows = vec![vec!["1"]];
        let none: [&str; 0] = [];
        let err = render_table(&mut c, "Arial", &rows, &none, &TableStyle::default()).unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));
        assert_eq!(c.y(), 10.0);
    }

    #[test]
    fn test_rows_use_starting_font_size() {
        let mut c = canvas();
        c.set_font("Arial", "", 12.0).unwrap();
        let rows = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        render_table(&mut c, "Arial", &rows, &["a", "b"], &TableStyle::default()).unwrap();

        // Cursor sits on the last row: two breaks of 0 (no cell yet) then
        // three row advances of 12 mm.
        assert!((c.y() - (10.0 + 3.0 * 12.0)).abs() < 1e-4);
        assert_eq!(c.font_size(), 12.0);
        assert_eq!(c.text_color(), Color::black());
    }

    #[test]
    fn test_header_repeats_after_break() {
        let mut c = canvas();
        c.set_font("Arial", "", 12.0).unwrap();
        let rows: Vec<Vec<String>> = (0..40).map(|i| vec![i.to_string()]).collect();
        render_table(&mut c, "Arial", &rows, &["n"], &TableStyle::default()).unwrap();
        assert!(c.page_count() >= 2);

        let bytes = c.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("(n) Tj").count(), c.page_count());
    }

    #[test]
    fn test_style_defaults() {
        let style = TableStyle::default();
        assert_eq!(style.header_fill, Color::from_rgb8(30, 60, 84));
        assert_eq!(style.stripe_fill, Color::from_rgb8(188, 227, 222));
        assert_eq!(style.header_font_size, 14.0);
        assert_eq!(style.body_font_size, 8.0);
    }
}
