//! Page layout on top of the PDF writer.
//!
//! [`Canvas`] keeps a cursor in millimetres measured from the top-left corner
//! of the page and turns cell, flowing text, image and line calls into content
//! stream operators, breaking pages automatically. [`Figure`] is a local
//! drawing surface in points used for charts.

mod canvas;
mod figure;

pub use canvas::{Align, Border, Canvas, CellMove, PageDecorator, RectStyle};
pub use figure::{standalone_figure, Figure, HAlign, TextAnchor, VAlign};
