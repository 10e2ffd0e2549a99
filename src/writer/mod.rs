//! PDF writing module for generating PDF files.
//!
//! ## Architecture
//!
//! ```text
//! [layout::Canvas] (cursor model, millimetres)
//!     ↓
//! [ContentStreamBuilder] (operators → content stream bytes)
//!     ↓
//! [PdfWriter] (pages, shared resources, xref, trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Low-Level API (PdfWriter)
//!
//! ```ignore
//! use pdf_report::writer::PdfWriter;
//!
//! let mut writer = PdfWriter::new();
//! let font = writer.font_resource("Helvetica");
//! writer.add_page(595.28, 841.89).content().set_font(&font, 12.0).text("Hello, World!", 72.0, 720.0);
//! let bytes = writer.finish()?;
//! ```

mod content_stream;
mod font_manager;
mod image_handler;
mod object;
mod object_serializer;
mod pdf_writer;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp, LineJoin};
pub use font_manager::{
    base_font_name, encode_win_ansi, FontFamily, FontInfo, FontManager, FontStyle, FontWeight,
};
pub use image_handler::{ColorSpace, ImageData, ImageError, ImageFormat, ImageManager};
pub use object::{Dict, Object, ObjectRef};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{DocumentInfo, PageBuilder, PdfWriter, PdfWriterConfig};
