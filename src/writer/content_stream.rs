//! Page content streams.
//!
//! Graphics and text operators of ISO 32000-1:2008 sections 8 and 9, limited
//! to what reports draw: paths, rectangles, colour, text in standard fonts and
//! image XObjects.

use std::fmt;
use std::io::Write;

use super::font_manager::encode_win_ansi;
use super::object_serializer::format_real;
use crate::error::Result;
use crate::geometry::Color;

/// Affine matrix `[a b c d e f]`.
pub type Matrix = [f32; 6];

fn translation(x: f32, y: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, x, y]
}

/// A single content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// `q`
    SaveState,
    /// `Q`
    RestoreState,
    /// `cm`
    Transform(Matrix),
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Tf` with a page font resource name
    SetFont(String, f32),
    /// `Tm`
    SetTextMatrix(Matrix),
    /// `Tj`; the text is WinAnsi encoded when written
    ShowText(String),
    /// `rg`
    FillColor(Color),
    /// `RG`
    StrokeColor(Color),
    /// `w`
    LineWidth(f32),
    /// `j`
    LineJoin(LineJoin),
    /// `m`
    MoveTo(f32, f32),
    /// `l`
    LineTo(f32, f32),
    /// `c`: two control points, then the end point
    CurveTo([f32; 6]),
    /// `re`: lower-left corner and size
    Rectangle(f32, f32, f32, f32),
    /// `h`
    ClosePath,
    /// `S`
    Stroke,
    /// `f`
    Fill,
    /// `B`
    FillStroke,
    /// `W`
    Clip,
    /// `n`
    EndPath,
    /// `Do`
    PaintXObject(String),
}

/// How stroked path segments meet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corners
    #[default]
    Miter = 0,
    /// Rounded corners
    Round = 1,
    /// Cut-off corners
    Bevel = 2,
}

struct Num(f32);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A formatter error surfaces as an io::Error from `build`.
        f.write_str(&format_real(self.0 as f64).ok_or(fmt::Error)?)
    }
}

fn numbers(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    for value in values {
        write!(f, "{} ", Num(*value))?;
    }
    Ok(())
}

impl fmt::Display for ContentStreamOp {
    /// Operator text. `ShowText` renders its string as UTF-8 here; the
    /// builder writes the WinAnsi bytes instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SaveState => f.write_str("q"),
            Self::RestoreState => f.write_str("Q"),
            Self::Transform(m) => {
                numbers(f, m)?;
                f.write_str("cm")
            },
            Self::BeginText => f.write_str("BT"),
            Self::EndText => f.write_str("ET"),
            Self::SetFont(resource, size) => write!(f, "/{} {} Tf", resource, Num(*size)),
            Self::SetTextMatrix(m) => {
                numbers(f, m)?;
                f.write_str("Tm")
            },
            Self::ShowText(text) => write!(f, "({}) Tj", text),
            Self::FillColor(c) => {
                numbers(f, &[c.r, c.g, c.b])?;
                f.write_str("rg")
            },
            Self::StrokeColor(c) => {
                numbers(f, &[c.r, c.g, c.b])?;
                f.write_str("RG")
            },
            Self::LineWidth(width) => write!(f, "{} w", Num(*width)),
            Self::LineJoin(join) => write!(f, "{} j", *join as u8),
            Self::MoveTo(x, y) => write!(f, "{} {} m", Num(*x), Num(*y)),
            Self::LineTo(x, y) => write!(f, "{} {} l", Num(*x), Num(*y)),
            Self::CurveTo(points) => {
                numbers(f, points)?;
                f.write_str("c")
            },
            Self::Rectangle(x, y, w, h) => {
                numbers(f, &[*x, *y, *w, *h])?;
                f.write_str("re")
            },
            Self::ClosePath => f.write_str("h"),
            Self::Stroke => f.write_str("S"),
            Self::Fill => f.write_str("f"),
            Self::FillStroke => f.write_str("B"),
            Self::Clip => f.write_str("W"),
            Self::EndPath => f.write_str("n"),
            Self::PaintXObject(name) => write!(f, "/{} Do", name),
        }
    }
}

/// Records operators for one page.
///
/// `BT`/`ET` are inserted automatically around text, and `Tf` is skipped
/// when the requested font is already active inside the current text object.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
    current_font: Option<(String, f32)>,
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw operator.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operators recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Whether nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Open a text object unless one is open.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.in_text_object = true;
            self.op(ContentStreamOp::BeginText);
        }
        self
    }

    /// Close the open text object, if any.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.in_text_object = false;
            // Font state is scoped to the text object.
            self.current_font = None;
            self.op(ContentStreamOp::EndText);
        }
        self
    }

    /// Select a font resource and size.
    pub fn set_font(&mut self, resource: &str, size: f32) -> &mut Self {
        let same = matches!(&self.current_font, Some((r, s)) if r == resource && *s == size);
        if !same {
            self.begin_text();
            self.current_font = Some((resource.to_string(), size));
            self.op(ContentStreamOp::SetFont(resource.to_string(), size));
        }
        self
    }

    /// Show `text` with its baseline origin at (x, y).
    pub fn text(&mut self, text: &str, x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(translation(x, y)));
        self.op(ContentStreamOp::ShowText(text.to_string()))
    }

    /// Show `text` turned `degrees` counter-clockwise about (x, y).
    pub fn rotated_text(&mut self, text: &str, x: f32, y: f32, degrees: f32) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix([cos, sin, -sin, cos, x, y]));
        self.op(ContentStreamOp::ShowText(text.to_string()))
    }

    /// Non-stroking colour.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::FillColor(color))
    }

    /// Stroking colour.
    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::StrokeColor(color))
    }

    /// Stroke width in points.
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.op(ContentStreamOp::LineWidth(width))
    }

    /// Corner style of stroked paths.
    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.op(ContentStreamOp::LineJoin(join))
    }

    /// Start a subpath.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Straight segment.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Cubic Bezier segment.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.op(ContentStreamOp::CurveTo([x1, y1, x2, y2, x3, y3]))
    }

    /// Rectangle subpath from its lower-left corner.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Paint the path outline.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Paint the path interior.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Paint interior, then outline.
    pub fn fill_stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::FillStroke)
    }

    /// Restrict painting to a rectangle until the next restore.
    pub fn clip_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.rect(x, y, width, height);
        self.op(ContentStreamOp::Clip);
        self.op(ContentStreamOp::EndPath)
    }

    /// Push the graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::SaveState)
    }

    /// Pop the graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::RestoreState)
    }

    /// Concatenate `[a b c d e f]` to the current transformation.
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> &mut Self {
        self.end_text();
        self.op(ContentStreamOp::Transform([a, b, c, d, e, f]))
    }

    /// Paint image `resource` into the box with lower-left corner (x, y).
    pub fn draw_image(&mut self, resource: &str, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.save_state();
        self.op(ContentStreamOp::Transform([width, 0.0, 0.0, height, x, y]));
        self.op(ContentStreamOp::PaintXObject(resource.to_string()));
        self.restore_state()
    }

    /// Whether some shown text had characters WinAnsi cannot encode.
    pub fn has_lossy_text(&self) -> bool {
        self.operations.iter().any(|op| match op {
            ContentStreamOp::ShowText(text) => encode_win_ansi(text).1,
            _ => false,
        })
    }

    /// Serialize the stream, one operator per line. An open text object is
    /// closed.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.operations.len() * 16);
        for op in &self.operations {
            match op {
                ContentStreamOp::ShowText(text) => {
                    out.push(b'(');
                    escape_text(&mut out, text);
                    out.extend_from_slice(b") Tj\n");
                },
                other => writeln!(out, "{}", other)?,
            }
        }
        if self.in_text_object {
            out.extend_from_slice(b"ET\n");
        }
        Ok(out)
    }
}

/// WinAnsi bytes of `text` with literal-string delimiters escaped.
fn escape_text(out: &mut Vec<u8>, text: &str) {
    let (bytes, _) = encode_win_ansi(text);
    for byte in bytes {
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
            out.push(byte);
        } else if byte == b'\n' {
            out.extend_from_slice(b"\\n");
        } else if byte == b'\r' {
            out.extend_from_slice(b"\\r");
        } else {
            out.push(byte);
        }
    }
}
