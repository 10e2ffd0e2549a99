//! Local drawing surface for charts.

use crate::error::Result;
use crate::geometry::Color;
use crate::writer::{ContentStreamBuilder, FontManager, LineJoin, PdfWriter, PdfWriterConfig};

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    /// Text starts at the anchor point
    #[default]
    Left,
    /// Text is centred on the anchor point
    Center,
    /// Text ends at the anchor point
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    /// Anchor on the baseline
    #[default]
    Baseline,
    /// Anchor below the descenders
    Bottom,
    /// Anchor at half the cap height
    Center,
    /// Anchor at the cap height
    Top,
}

/// Text anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAnchor {
    /// Horizontal part
    pub h: HAlign,
    /// Vertical part
    pub v: VAlign,
}

impl TextAnchor {
    /// Create an anchor.
    pub const fn new(h: HAlign, v: VAlign) -> Self {
        Self { h, v }
    }
}

/// Drawing surface in points with the origin at the bottom-left corner of
/// the figure block.
///
/// Font sizes and line widths are given at nominal size and multiplied by the
/// figure scale; coordinates are not scaled.
pub struct Figure<'a> {
    content: &'a mut ContentStreamBuilder,
    metrics: &'a FontManager,
    regular_font: String,
    bold_font: String,
    width: f32,
    height: f32,
    scale: f32,
}

/// Draw a `width` x `height` point figure as the only page of a new
/// document whose page is exactly the figure.
pub fn standalone_figure<F>(
    width: f32,
    height: f32,
    scale: f32,
    config: PdfWriterConfig,
    draw: F,
) -> Result<PdfWriter>
where
    F: FnOnce(&mut Figure<'_>) -> Result<()>,
{
    let fonts = FontManager::new();
    let mut writer = PdfWriter::with_config(config);
    let regular = writer.font_resource("Helvetica");
    let bold = writer.font_resource("Helvetica-Bold");

    let content = writer.add_page(width, height).into_content();
    content.save_state().clip_rect(0.0, 0.0, width, height);
    let mut figure = Figure::new(content, &fonts, regular, bold, width, height, scale);
    draw(&mut figure)?;
    figure.finish();
    Ok(writer)
}

impl<'a> Figure<'a> {
    pub(crate) fn new(
        content: &'a mut ContentStreamBuilder,
        metrics: &'a FontManager,
        regular_font: String,
        bold_font: String,
        width: f32,
        height: f32,
        scale: f32,
    ) -> Self {
        Self {
            content,
            metrics,
            regular_font,
            bold_font,
            width,
            height,
            scale,
        }
    }

    /// Restore the graphics state saved when the figure was opened.
    pub(crate) fn finish(self) {
        self.content.restore_state();
    }

    /// Figure width in points.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Figure height in points.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Scale applied to font sizes and line widths.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rendered width of `text` at nominal `size`.
    pub fn text_width(&self, text: &str, size: f32, bold: bool) -> f32 {
        let base_font = if bold { "Helvetica-Bold" } else { "Helvetica" };
        self.metrics.text_width(text, base_font, size * self.scale)
    }

    /// Rendered height of one line of text at nominal `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        size * self.scale * 1.2
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.content.fill_color(color).rect(x, y, w, h).fill();
    }

    /// Outline a rectangle.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32) {
        self.content
            .stroke_color(color)
            .set_line_width(line_width * self.scale)
            .rect(x, y, w, h)
            .stroke();
    }

    /// Draw a straight line.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color, line_width: f32) {
        self.content
            .stroke_color(color)
            .set_line_width(line_width * self.scale)
            .move_to(x1, y1)
            .line_to(x2, y2)
            .stroke();
    }

    /// Draw connected line segments through `points`.
    pub fn polyline(&mut self, points: &[(f32, f32)], color: Color, line_width: f32) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.content
            .stroke_color(color)
            .set_line_width(line_width * self.scale)
            .set_line_join(LineJoin::Round)
            .move_to(x0, y0);
        for &(x, y) in rest {
            self.content.line_to(x, y);
        }
        self.content.stroke().set_line_join(LineJoin::Miter);
    }

    /// Fill a circle.
    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        self.content.fill_color(color);
        self.arc_path(cx, cy, r, 0.0, 360.0, true);
        self.content.close_path().fill();
    }

    /// Draw a pie wedge from `start` to `end` degrees, counter-clockwise from
    /// the positive x axis.
    #[allow(clippy::too_many_arguments)]
    pub fn wedge(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        start: f32,
        end: f32,
        fill: Color,
        edge: Option<Color>,
    ) {
        let sweep = end - start;
        if sweep <= 0.0 {
            return;
        }
        self.content.fill_color(fill);
        if let Some(edge) = edge {
            self.content.stroke_color(edge).set_line_width(0.5 * self.scale);
        }
        if sweep >= 360.0 - 1e-3 {
            self.arc_path(cx, cy, r, start, start + 360.0, true);
        } else {
            self.content.move_to(cx, cy);
            self.arc_path(cx, cy, r, start, end, false);
        }
        self.content.close_path();
        if edge.is_some() {
            self.content.fill_stroke();
        } else {
            self.content.fill();
        }
    }

    /// Show text anchored at (x, y).
    pub fn text(&mut self, text: &str, x: f32, y: f32, size: f32, anchor: TextAnchor, bold: bool) {
        self.rotated_text(text, x, y, size, anchor, bold, 0.0);
    }

    /// Show text rotated `degrees` counter-clockwise around its anchor.
    #[allow(clippy::too_many_arguments)]
    pub fn rotated_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        anchor: TextAnchor,
        bold: bool,
        degrees: f32,
    ) {
        if text.is_empty() {
            return;
        }
        let actual = size * self.scale;
        let width = self.text_width(text, size, bold);
        let dx = match anchor.h {
            HAlign::Left => 0.0,
            HAlign::Center => -width / 2.0,
            HAlign::Right => -width,
        };
        let dy = match anchor.v {
            VAlign::Baseline => 0.0,
            VAlign::Bottom => 0.207 * actual,
            VAlign::Center => -0.359 * actual,
            VAlign::Top => -0.718 * actual,
        };
        let (sin, cos) = degrees.to_radians().sin_cos();
        let ox = x + dx * cos - dy * sin;
        let oy = y + dx * sin + dy * cos;

        let font = if bold { &self.bold_font } else { &self.regular_font };
        self.content.fill_color(Color::black()).set_font(font, actual);
        if degrees == 0.0 {
            self.content.text(text, ox, oy);
        } else {
            self.content.rotated_text(text, ox, oy, degrees);
        }
    }

    /// Append an arc as Bezier segments of at most 90 degrees.
    fn arc_path(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, move_first: bool) {
        let segments = ((end - start) / 90.0).ceil().max(1.0) as usize;
        let step = (end - start) / segments as f32;
        let point = |deg: f32| {
            let (s, c) = deg.to_radians().sin_cos();
            (cx + r * c, cy + r * s)
        };

        let (x0, y0) = point(start);
        if move_first {
            self.content.move_to(x0, y0);
        } else {
            self.content.line_to(x0, y0);
        }

        // Control point distance for a circular arc of `step` degrees.
        let handle = 4.0 / 3.0 * (step.to_radians() / 4.0).tan() * r;
        for i in 0..segments {
            let a0 = start + step * i as f32;
            let a1 = a0 + step;
            let (s0, c0) = a0.to_radians().sin_cos();
            let (s1, c1) = a1.to_radians().sin_cos();
            let (x1, y1) = point(a1);
            self.content.curve_to(
                cx + r * c0 - handle * s0,
                cy + r * s0 + handle * c0,
                x1 + handle * s1,
                y1 - handle * c1,
                x1,
                y1,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ContentStreamOp;

    fn with_figure(f: impl FnOnce(&mut Figure<'_>)) -> Vec<ContentStreamOp> {
        let mut content = ContentStreamBuilder::new();
        let metrics = FontManager::new();
        {
            let mut fig = Figure::new(
                &mut content,
                &metrics,
                "F1".to_string(),
                "F2".to_string(),
                240.0,
                160.0,
                2.0,
            );
            f(&mut fig);
        }
        content.operations().to_vec()
    }

    #[test]
    fn test_text_scales_font() {
        let ops = with_figure(|fig| {
            fig.text("Sales", 10.0, 10.0, 6.0, TextAnchor::default(), false);
        });
        assert!(ops.contains(&ContentStreamOp::SetFont("F1".to_string(), 12.0)));
        assert!(ops.contains(&ContentStreamOp::ShowText("Sales".to_string())));
    }

    #[test]
    fn test_centered_text_offset() {
        let ops = with_figure(|fig| {
            let w = fig.text_width("ABC", 6.0, true);
            fig.text("ABC", 100.0, 50.0, 6.0, TextAnchor::new(HAlign::Center, VAlign::Baseline), true);
            assert!(w > 0.0);
        });
        let tm = ops
            .iter()
            .find_map(|op| match op {
                ContentStreamOp::SetTextMatrix([.., e, f]) => Some((*e, *f)),
                _ => None,
            })
            .unwrap();
        assert!(tm.0 < 100.0);
        assert_eq!(tm.1, 50.0);
        assert!(ops.contains(&ContentStreamOp::SetFont("F2".to_string(), 12.0)));
    }

    #[test]
    fn test_full_circle_wedge_uses_four_curves() {
        let ops = with_figure(|fig| {
            fig.wedge(50.0, 50.0, 20.0, 0.0, 360.0, Color::black(), None);
        });
        let curves = ops
            .iter()
            .filter(|op| matches!(op, ContentStreamOp::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
        assert!(ops.contains(&ContentStreamOp::Fill));
    }

    #[test]
    fn test_partial_wedge_starts_at_center() {
        let ops = with_figure(|fig| {
            fig.wedge(50.0, 50.0, 20.0, 0.0, 45.0, Color::black(), Some(Color::white()));
        });
        assert!(ops.contains(&ContentStreamOp::MoveTo(50.0, 50.0)));
        assert!(ops.contains(&ContentStreamOp::FillStroke));
        let end = ops
            .iter()
            .rev()
            .find_map(|op| match op {
                ContentStreamOp::CurveTo([.., x, y]) => Some((*x, *y)),
                _ => None,
            })
            .unwrap();
        let expected = 50.0 + 20.0 * 45f32.to_radians().cos();
        assert!((end.0 - expected).abs() < 1e-3);
        assert!((end.1 - expected).abs() < 1e-3);
    }

    #[test]
    fn test_empty_wedge_draws_nothing() {
        let ops = with_figure(|fig| fig.wedge(0.0, 0.0, 5.0, 30.0, 30.0, Color::black(), None));
        assert!(ops.is_empty());
    }

    #[test]
    fn test_polyline() {
        let ops = with_figure(|fig| {
            fig.polyline(&[(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)], Color::black(), 1.0);
            fig.polyline(&[], Color::black(), 1.0);
        });
        let lines = ops
            .iter()
            .filter(|op| matches!(op, ContentStreamOp::LineTo(..)))
            .count();
        assert_eq!(lines, 2);
        assert!(ops.contains(&ContentStreamOp::Stroke));
    }

    #[test]
    fn test_standalone_figure_page_matches_figure() {
        let config = PdfWriterConfig::default().with_compress(false);
        let writer = standalone_figure(216.0, 144.0, 1.5, config, |fig| {
            fig.fill_rect(10.0, 10.0, 50.0, 20.0, Color::black());
            fig.text("Share", 108.0, 130.0, 6.0, TextAnchor::default(), true);
            Ok(())
        })
        .unwrap();
        assert_eq!(writer.page_count(), 1);

        let pdf = String::from_utf8_lossy(&writer.finish().unwrap()).into_owned();
        assert!(pdf.contains("/MediaBox [0 0 216 144]"));
        assert!(pdf.contains("/Helvetica-Bold"));
        assert!(pdf.contains("(Share) Tj"));
    }

    #[test]
    fn test_standalone_figure_draw_error() {
        let result = standalone_figure(100.0, 100.0, 1.0, PdfWriterConfig::default(), |_| {
            Err(crate::error::Error::NoPage)
        });
        assert!(result.is_err());
    }
}
