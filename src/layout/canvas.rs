//! Cursor-based page canvas.
//!
//! Coordinates are millimetres from the top-left corner of the page. The
//! canvas owns a [`PdfWriter`] and converts every call into operators on the
//! current page's content stream.

use std::path::Path;

use crate::config::{Margins, PageSize};
use crate::error::{Error, Result};
use crate::geometry::{mm_to_pt, pt_to_mm, Color};
use crate::writer::{
    base_font_name, ContentStreamBuilder, FontFamily, FontManager, FontStyle, PageBuilder,
    PdfWriter, PdfWriterConfig,
};

use super::figure::Figure;

/// Horizontal padding between a cell edge and its text (mm).
const CELL_MARGIN: f32 = 1.0;

/// Hooks run when a page is opened and closed.
///
/// While a hook runs, automatic page breaks are suspended.
pub trait PageDecorator: Send {
    /// Draw the page header. Called right after a page is opened.
    fn header(&self, _canvas: &mut Canvas) -> Result<()> {
        Ok(())
    }

    /// Draw the page footer. Called before the next page is opened and when
    /// the document is closed.
    fn footer(&self, _canvas: &mut Canvas) -> Result<()> {
        Ok(())
    }
}

/// Which cell edges get a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
    /// Left edge
    pub left: bool,
    /// Top edge
    pub top: bool,
    /// Right edge
    pub right: bool,
    /// Bottom edge
    pub bottom: bool,
}

impl Border {
    /// No border.
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    /// Frame on all four edges.
    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Parse edge letters `L`, `T`, `R`, `B` in any order; `"1"` means all.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec == "1" {
            return Ok(Self::ALL);
        }
        let mut border = Self::NONE;
        for ch in spec.chars() {
            match ch.to_ascii_uppercase() {
                'L' => border.left = true,
                'T' => border.top = true,
                'R' => border.right = true,
                'B' => border.bottom = true,
                '0' => {},
                other => return Err(Error::invalid("border", format!("unknown edge '{}'", other))),
            }
        }
        Ok(border)
    }

    fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

/// Horizontal text alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Left aligned, padded by the cell margin
    #[default]
    Left,
    /// Centred
    Center,
    /// Right aligned, padded by the cell margin
    Right,
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellMove {
    /// To the right of the cell
    #[default]
    Right,
    /// To the left margin of the next line
    NextLine,
    /// Directly below the cell
    Below,
}

/// How a rectangle is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RectStyle {
    /// Outline only
    #[default]
    Draw,
    /// Filled only
    Fill,
    /// Filled and outlined
    DrawFill,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FontState {
    family: FontFamily,
    style: FontStyle,
    size: f32,
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    font: FontState,
    fill_color: Color,
    text_color: Color,
    draw_color: Color,
    line_width: f32,
}

/// FPDF-style drawing surface.
pub struct Canvas {
    writer: PdfWriter,
    fonts: FontManager,
    page_size: PageSize,
    page: Option<usize>,
    footer_done: bool,
    x: f32,
    y: f32,
    margins: Margins,
    auto_page_break: bool,
    break_margin: f32,
    font: FontState,
    fill_color: Color,
    text_color: Color,
    draw_color: Color,
    line_width: f32,
    last_h: f32,
    decorator: Option<Box<dyn PageDecorator>>,
    in_decorator: bool,
}

impl Canvas {
    /// Create a canvas with 10 mm margins and a 20 mm page break margin.
    pub fn new(page_size: PageSize, writer_config: PdfWriterConfig) -> Self {
        let margins = Margins::default();
        Self {
            writer: PdfWriter::with_config(writer_config),
            fonts: FontManager::new(),
            page_size,
            page: None,
            footer_done: false,
            x: margins.left,
            y: margins.top,
            margins,
            auto_page_break: true,
            break_margin: 20.0,
            font: FontState {
                family: FontFamily::Helvetica,
                style: FontStyle::regular(),
                size: 12.0,
            },
            fill_color: Color::black(),
            text_color: Color::black(),
            draw_color: Color::black(),
            line_width: 0.2,
            last_h: 0.0,
            decorator: None,
            in_decorator: false,
        }
    }

    /// Install (or remove) the header/footer hooks.
    pub fn set_decorator(&mut self, decorator: Option<Box<dyn PageDecorator>>) {
        self.decorator = decorator;
    }

    /// Document metadata and output options.
    pub fn writer_config_mut(&mut self) -> &mut PdfWriterConfig {
        self.writer.config_mut()
    }

    /// Page size in millimetres.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Set left, top and right margins.
    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
        if self.x < margins.left {
            self.x = margins.left;
        }
    }

    /// Current margins.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Set the top margin used by the next page.
    pub fn set_top_margin(&mut self, margin: f32) {
        self.margins.top = margin;
    }

    /// Enable or disable automatic page breaks and set the bottom margin
    /// that triggers them.
    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f32) {
        self.auto_page_break = enabled;
        self.break_margin = margin;
    }

    /// Printable width between the left and right margins.
    pub fn effective_page_width(&self) -> f32 {
        self.page_size.width - self.margins.left - self.margins.right
    }

    /// Cursor x position.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Cursor y position.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Set the cursor x position; negative values count from the right edge.
    pub fn set_x(&mut self, x: f32) {
        self.x = if x >= 0.0 { x } else { self.page_size.width + x };
    }

    /// Set the cursor y position and move x back to the left margin;
    /// negative values count from the bottom edge.
    pub fn set_y(&mut self, y: f32) {
        self.x = self.margins.left;
        self.y = if y >= 0.0 { y } else { self.page_size.height + y };
    }

    /// Set both cursor coordinates.
    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.set_y(y);
        self.set_x(x);
    }

    /// Select a font. `size` of 0 keeps the current size.
    pub fn set_font(&mut self, family: &str, style: &str, size: f32) -> Result<()> {
        let family = FontFamily::from_name(family)?;
        let style = FontStyle::parse(style)?;
        if !size.is_finite() || size < 0.0 {
            return Err(Error::invalid("font size", format!("{} is not a valid size", size)));
        }
        self.font = FontState {
            family,
            style,
            size: if size > 0.0 { size } else { self.font.size },
        };
        Ok(())
    }

    /// Current font size in points.
    pub fn font_size(&self) -> f32 {
        self.font.size
    }

    /// Current font size in millimetres.
    pub fn font_size_mm(&self) -> f32 {
        pt_to_mm(self.font.size)
    }

    /// Set the colour used for filled cells and shapes.
    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    /// Colour used for filled cells and shapes.
    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    /// Set the colour used for text.
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    /// Colour used for text.
    pub fn text_color(&self) -> Color {
        self.text_color
    }

    /// Set the colour used for lines and borders.
    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    /// Set the line width in millimetres.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Whether content of height `h` at the cursor would trigger an
    /// automatic page break.
    pub fn needs_page_break(&self, h: f32) -> bool {
        let trigger = self.page_size.height - self.break_margin;
        self.auto_page_break && !self.in_decorator && self.page.is_some() && self.y + h > trigger
    }

    /// Number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    /// Width of `text` in the current font, in millimetres.
    pub fn string_width(&self, text: &str) -> f32 {
        pt_to_mm(self.fonts.text_width(text, self.base_font(), self.font.size))
    }

    /// Close the current page and open a new one.
    ///
    /// The cursor moves to the top-left margin, then the header hook runs.
    /// Font and colours in effect before the call are restored afterwards.
    pub fn add_page(&mut self) -> Result<()> {
        self.finish_page()?;

        let saved = self.graphics_state();
        self.writer
            .add_page(mm_to_pt(self.page_size.width), mm_to_pt(self.page_size.height));
        self.page = Some(self.writer.page_count() - 1);
        self.footer_done = false;
        self.x = self.margins.left;
        self.y = self.margins.top;
        log::debug!("Opened page {}", self.writer.page_count());

        let result = self.run_decorator(|decorator, canvas| decorator.header(canvas));
        self.restore_graphics_state(saved);
        result
    }

    /// Line break: x back to the left margin, y down by `h` or by the height
    /// of the last cell.
    pub fn ln(&mut self, h: Option<f32>) {
        self.x = self.margins.left;
        self.y += h.unwrap_or(self.last_h);
    }

    /// Print a cell: an optional filled and bordered rectangle with one line
    /// of text. A width of 0 extends the cell to the right margin.
    #[allow(clippy::too_many_arguments)]
    pub fn cell(
        &mut self,
        w: f32,
        h: f32,
        text: &str,
        border: Border,
        ln: CellMove,
        align: Align,
        fill: bool,
    ) -> Result<()> {
        self.require_page()?;
        self.break_if_needed(h)?;

        let w = if w == 0.0 {
            self.page_size.width - self.margins.right - self.x
        } else {
            w
        };
        let (x, y) = (self.x, self.y);

        if fill || border != Border::NONE {
            let (px, py) = self.to_pt(x, y + h);
            let (pw, ph) = (mm_to_pt(w), mm_to_pt(h));
            let fill_color = self.fill_color;
            let draw_color = self.draw_color;
            let line_width = mm_to_pt(self.line_width);
            let page_height = mm_to_pt(self.page_size.height);
            let content = self.content()?;

            if fill {
                content.fill_color(fill_color);
            }
            if border != Border::NONE {
                content.stroke_color(draw_color).set_line_width(line_width);
            }
            if fill || border.is_all() {
                content.rect(px, py, pw, ph);
                match (fill, border.is_all()) {
                    (true, true) => content.fill_stroke(),
                    (true, false) => content.fill(),
                    _ => content.stroke(),
                };
            }
            if !border.is_all() {
                let top = page_height - mm_to_pt(y);
                let edges = [
                    (border.left, (px, top), (px, py)),
                    (border.top, (px, top), (px + pw, top)),
                    (border.right, (px + pw, top), (px + pw, py)),
                    (border.bottom, (px, py), (px + pw, py)),
                ];
                for (enabled, from, to) in edges {
                    if enabled {
                        content.move_to(from.0, from.1).line_to(to.0, to.1).stroke();
                    }
                }
            }
        }

        if !text.is_empty() {
            let text_w = self.string_width(text);
            let dx = match align {
                Align::Left => CELL_MARGIN,
                Align::Center => (w - text_w) / 2.0,
                Align::Right => w - CELL_MARGIN - text_w,
            };
            let baseline = y + 0.5 * h + 0.3 * self.font_size_mm();
            self.draw_text(x + dx, baseline, text)?;
        }

        self.last_h = h;
        match ln {
            CellMove::Right => self.x = x + w,
            CellMove::NextLine => {
                self.x = self.margins.left;
                self.y = y + h;
            },
            CellMove::Below => self.y = y + h,
        }
        Ok(())
    }

    /// Print flowing text with line height `h`.
    ///
    /// Text starts at the cursor, wraps at the right margin and continues
    /// at the left margin. `\n` forces a line break. The cursor ends right
    /// after the last fragment.
    pub fn write(&mut self, h: f32, text: &str) -> Result<()> {
        self.require_page()?;
        let base_font = self.base_font();
        let size = self.font.size;
        let max_width = mm_to_pt(self.effective_page_width());

        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.x = self.margins.left;
                self.y += h;
            }
            let first_width = mm_to_pt(self.page_size.width - self.margins.right - self.x).max(0.0);
            let lines = self
                .fonts
                .wrap_text(segment, base_font, size, first_width, max_width);

            for (j, (line, width)) in lines.into_iter().enumerate() {
                if j > 0 {
                    self.x = self.margins.left;
                    self.y += h;
                }
                self.break_if_needed(h)?;
                if !line.is_empty() {
                    let baseline = self.y + 0.5 * h + 0.3 * self.font_size_mm();
                    self.draw_text(self.x, baseline, &line)?;
                }
                self.x += pt_to_mm(width);
            }
        }

        self.last_h = h;
        Ok(())
    }

    /// Read and embed the image at `path` without drawing it, returning its
    /// size in pixels. Later [`image`](Self::image) calls with the same path
    /// reuse the embedded copy.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(u32, u32)> {
        self.require_page()?;
        let (_, px_w, px_h) = self.writer.register_image_file(path.as_ref())?;
        Ok((px_w, px_h))
    }

    /// Place an image.
    ///
    /// A zero `w` and `h` use the natural size (one point per pixel); a single
    /// zero keeps the aspect ratio. Without `y` the image flows: the page
    /// breaks if it does not fit and the cursor moves below it. Without `x`
    /// the cursor x is used.
    pub fn image(
        &mut self,
        path: impl AsRef<Path>,
        x: Option<f32>,
        y: Option<f32>,
        w: f32,
        h: f32,
    ) -> Result<()> {
        self.require_page()?;
        let (resource, px_w, px_h) = self.writer.register_image_file(path.as_ref())?;
        let natural_w = pt_to_mm(px_w as f32);
        let natural_h = pt_to_mm(px_h as f32);

        let (w, h) = match (w > 0.0, h > 0.0) {
            (false, false) => (natural_w, natural_h),
            (true, false) => (w, w * natural_h / natural_w.max(f32::EPSILON)),
            (false, true) => (h * natural_w / natural_h.max(f32::EPSILON), h),
            (true, true) => (w, h),
        };

        let y = match y {
            Some(y) => y,
            None => {
                self.break_if_needed(h)?;
                let y = self.y;
                self.y += h;
                y
            },
        };
        let x = x.unwrap_or(self.x);

        log::debug!(
            "Placing {} ({} at {:.1},{:.1} mm, {:.1}x{:.1} mm)",
            path.as_ref().display(),
            resource,
            x,
            y,
            w,
            h
        );
        let (px, py) = self.to_pt(x, y + h);
        self.content()?
            .draw_image(&resource, px, py, mm_to_pt(w), mm_to_pt(h));
        Ok(())
    }

    /// Draw a line between two points.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let (ax, ay) = self.to_pt(x1, y1);
        let (bx, by) = self.to_pt(x2, y2);
        let color = self.draw_color;
        let width = mm_to_pt(self.line_width);
        self.content()?
            .stroke_color(color)
            .set_line_width(width)
            .move_to(ax, ay)
            .line_to(bx, by)
            .stroke();
        Ok(())
    }

    /// Draw a rectangle with its top-left corner at (x, y).
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, style: RectStyle) -> Result<()> {
        let (px, py) = self.to_pt(x, y + h);
        let fill_color = self.fill_color;
        let draw_color = self.draw_color;
        let width = mm_to_pt(self.line_width);
        let content = self.content()?;
        content
            .fill_color(fill_color)
            .stroke_color(draw_color)
            .set_line_width(width)
            .rect(px, py, mm_to_pt(w), mm_to_pt(h));
        match style {
            RectStyle::Draw => content.stroke(),
            RectStyle::Fill => content.fill(),
            RectStyle::DrawFill => content.fill_stroke(),
        };
        Ok(())
    }

    /// Reserve a `width` x `height` point block at the cursor and draw into
    /// it through a [`Figure`].
    ///
    /// The block flows like an image: the page breaks if it does not fit and
    /// the cursor moves below it. Drawing is clipped to the block.
    pub fn figure<F>(&mut self, width: f32, height: f32, scale: f32, draw: F) -> Result<()>
    where
        F: FnOnce(&mut Figure<'_>) -> Result<()>,
    {
        self.require_page()?;
        for (what, value) in [("figure width", width), ("figure height", height), ("figure scale", scale)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid(what, format!("{} is not positive", value)));
            }
        }

        let h_mm = pt_to_mm(height);
        self.break_if_needed(h_mm)?;

        let regular = self.writer.font_resource("Helvetica");
        let bold = self.writer.font_resource("Helvetica-Bold");
        let (ox, oy) = self.to_pt(self.x, self.y + h_mm);
        let index = self.require_page()?;

        let content = self
            .writer
            .page(index)
            .map(PageBuilder::into_content)
            .ok_or(Error::NoPage)?;
        content
            .save_state()
            .transform(1.0, 0.0, 0.0, 1.0, ox, oy)
            .clip_rect(0.0, 0.0, width, height);

        let mut figure = Figure::new(
            content,
            &self.fonts,
            regular,
            bold,
            width,
            height,
            scale,
        );
        let result = draw(&mut figure);
        figure.finish();

        self.y += h_mm;
        result
    }

    /// Run the footer hook for the last page.
    pub fn close(&mut self) -> Result<()> {
        self.finish_page()
    }

    /// Close the document and serialize it.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.close()?;
        self.writer.finish()
    }

    /// Close the document and write it to `path`.
    pub fn output(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        log::info!(
            "Wrote {} ({} pages, {} bytes)",
            path.as_ref().display(),
            self.page_count(),
            bytes.len()
        );
        Ok(())
    }

    fn require_page(&self) -> Result<usize> {
        self.page.ok_or(Error::NoPage)
    }

    fn content(&mut self) -> Result<&mut ContentStreamBuilder> {
        let index = self.require_page()?;
        self.writer
            .page(index)
            .map(PageBuilder::into_content)
            .ok_or(Error::NoPage)
    }

    /// Page coordinates (mm, top-left origin) to PDF user space (pt).
    fn to_pt(&self, x: f32, y: f32) -> (f32, f32) {
        (mm_to_pt(x), mm_to_pt(self.page_size.height - y))
    }

    fn base_font(&self) -> &'static str {
        base_font_name(self.font.family, self.font.style.weight(), self.font.style.italic)
    }

    fn break_if_needed(&mut self, h: f32) -> Result<bool> {
        if self.needs_page_break(h) {
            let x = self.x;
            self.add_page()?;
            self.x = x;
            return Ok(true);
        }
        Ok(false)
    }

    fn draw_text(&mut self, x: f32, baseline: f32, text: &str) -> Result<()> {
        let base_font = self.base_font();
        let resource = self.writer.font_resource(base_font);
        let size = self.font.size;
        let color = self.text_color;
        let (px, py) = self.to_pt(x, baseline);

        let underline = if self.font.style.underline {
            let metrics = self.fonts.metrics(base_font);
            Some((
                metrics.text_width(text, size),
                metrics.underline_position * size / 1000.0,
                metrics.underline_thickness * size / 1000.0,
            ))
        } else {
            None
        };

        let content = self.content()?;
        content.fill_color(color).set_font(&resource, size).text(text, px, py);
        if let Some((width, position, thickness)) = underline {
            content.rect(px, py + position - thickness, width, thickness).fill();
        }
        Ok(())
    }

    fn finish_page(&mut self) -> Result<()> {
        if self.page.is_none() || self.footer_done {
            return Ok(());
        }
        self.footer_done = true;
        let saved = self.graphics_state();
        let result = self.run_decorator(|decorator, canvas| decorator.footer(canvas));
        self.restore_graphics_state(saved);
        result
    }

    fn run_decorator(&mut self, hook: fn(&dyn PageDecorator, &mut Canvas) -> Result<()>) -> Result<()> {
        let Some(decorator) = self.decorator.take() else {
            return Ok(());
        };
        self.in_decorator = true;
        let result = hook(decorator.as_ref(), self);
        self.in_decorator = false;
        self.decorator = Some(decorator);
        result
    }

    fn graphics_state(&self) -> GraphicsState {
        GraphicsState {
            font: self.font,
            fill_color: self.fill_color,
            text_color: self.text_color,
            draw_color: self.draw_color,
            line_width: self.line_width,
        }
    }

    fn restore_graphics_state(&mut self, state: GraphicsState) {
        self.font = state.font;
        self.fill_color = state.fill_color;
        self.text_color = state.text_color;
        self.draw_color = state.draw_color;
        self.line_width = state.line_width;
    }
}
