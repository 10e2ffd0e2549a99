//! Document assembly.
//!
//! Pages, the shared resource dictionary and the Info dictionary are laid
//! out as numbered objects, followed by a classic cross-reference table and
//! trailer (ISO 32000-1:2008, section 7.5).

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Local};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use indexmap::IndexMap;

use super::content_stream::ContentStreamBuilder;
use super::image_handler::{ImageError, ImageManager};
use super::object::{Dict, Object};
use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};

/// Entries of the document Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    /// `/Title`
    pub title: Option<String>,
    /// `/Author`
    pub author: Option<String>,
    /// `/Subject`
    pub subject: Option<String>,
    /// `/Keywords`
    pub keywords: Option<String>,
    /// `/Creator`
    pub creator: Option<String>,
    /// `/Producer`
    pub producer: Option<String>,
    /// `/CreationDate`
    pub creation_date: Option<DateTime<Local>>,
}

impl DocumentInfo {
    fn to_object(&self) -> Object {
        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ];
        let mut entries: Vec<(&str, Object)> = fields
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, Object::String(info_string(v)))))
            .collect();
        if let Some(date) = &self.creation_date {
            entries.push(("CreationDate", Object::text(&date.format("D:%Y%m%d%H%M%S").to_string())));
        }
        Object::dict(entries)
    }
}

/// Output settings of a [`PdfWriter`].
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// Version in the file header
    pub version: String,
    /// Flate-compress page content
    pub compress: bool,
    /// Document metadata
    pub info: DocumentInfo,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            compress: true,
            info: DocumentInfo {
                producer: Some(format!("{} {}", crate::NAME, crate::VERSION)),
                creation_date: Some(Local::now()),
                ..DocumentInfo::default()
            },
        }
    }
}

impl PdfWriterConfig {
    /// Document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    /// Document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.info.author = Some(author.into());
        self
    }

    /// Whether page content is Flate-compressed.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Borrowed page of a [`PdfWriter`].
pub struct PageBuilder<'a> {
    page: &'a mut Page,
}

impl<'a> PageBuilder<'a> {
    /// Operators of the page.
    pub fn content(&mut self) -> &mut ContentStreamBuilder {
        &mut self.page.content
    }

    /// Operators of the page, for the whole writer borrow.
    pub fn into_content(self) -> &'a mut ContentStreamBuilder {
        &mut self.page.content
    }
}

#[derive(Debug)]
struct Page {
    media_box: (f32, f32),
    content: ContentStreamBuilder,
}

/// Builds a PDF file page by page.
///
/// All pages share one resource dictionary. Standard fonts are named `F1`,
/// `F2`, ... and images `Im1`, `Im2`, ... in first-use order.
#[derive(Debug, Default)]
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<Page>,
    /// Base font name to resource name
    fonts: IndexMap<String, String>,
    images: ImageManager,
}

impl PdfWriter {
    /// Writer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with `config`.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Output settings.
    pub fn config(&self) -> &PdfWriterConfig {
        &self.config
    }

    /// Output settings; metadata may change until [`PdfWriter::finish`].
    pub fn config_mut(&mut self) -> &mut PdfWriterConfig {
        &mut self.config
    }

    /// Append a `width` x `height` pt page.
    pub fn add_page(&mut self, width: f32, height: f32) -> PageBuilder<'_> {
        self.pages.push(Page {
            media_box: (width, height),
            content: ContentStreamBuilder::new(),
        });
        let page = self.pages.len() - 1;
        PageBuilder {
            page: &mut self.pages[page],
        }
    }

    /// Page `index`, if it exists.
    pub fn page(&mut self, index: usize) -> Option<PageBuilder<'_>> {
        self.pages.get_mut(index).map(|page| PageBuilder { page })
    }

    /// Pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Resource name of a standard font, assigning one on first use.
    pub fn font_resource(&mut self, base_font: &str) -> String {
        let next = self.fonts.len() + 1;
        self.fonts
            .entry(base_font.to_string())
            .or_insert_with(|| format!("F{}", next))
            .clone()
    }

    /// Resource name and pixel size of an image file. Each path is read once.
    pub fn register_image_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<(String, u32, u32), ImageError> {
        let (resource, image) = self.images.load_file(path)?;
        Ok((resource, image.width, image.height))
    }

    /// Serialize the document.
    pub fn finish(&self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(Error::NoPage);
        }

        let mut body = Body::default();
        let catalog = body.reserve();
        let tree = body.reserve();
        let resources = self.write_resources(&mut body);

        let mut kids = Vec::with_capacity(self.pages.len());
        for (number, page) in self.pages.iter().enumerate() {
            if page.content.has_lossy_text() {
                log::warn!(
                    "Page {} has characters outside WinAnsiEncoding, shown as '?'",
                    number + 1
                );
            }
            let contents = body.add(self.content_stream(&page.content)?);
            let (width, height) = page.media_box;
            kids.push(Object::reference(body.add(Object::dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::reference(tree)),
                ("MediaBox", Object::rect(0.0, 0.0, width as f64, height as f64)),
                ("Contents", Object::reference(contents)),
                ("Resources", Object::reference(resources)),
            ]))));
        }

        body.set(
            tree,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(self.pages.len() as i64)),
            ]),
        );
        body.set(
            catalog,
            Object::dict([("Type", Object::name("Catalog")), ("Pages", Object::reference(tree))]),
        );
        let info = body.add(self.config.info.to_object());

        let output = body.write_file(&self.config.version, catalog, info)?;
        log::debug!(
            "Serialized {} pages, {} fonts, {} images into {} bytes",
            self.pages.len(),
            self.fonts.len(),
            self.images.len(),
            output.len()
        );
        Ok(output)
    }

    /// Write `finish()` to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.finish()?)?;
        Ok(())
    }

    /// Font and image objects plus the resource dictionary referring to them.
    fn write_resources(&self, body: &mut Body) -> u32 {
        let mut fonts = Dict::new();
        for (base_font, resource) in &self.fonts {
            let mut font = vec![
                ("Type", Object::name("Font")),
                ("Subtype", Object::name("Type1")),
                ("BaseFont", Object::name(base_font)),
            ];
            // Symbolic fonts keep their built-in encoding.
            if !matches!(base_font.as_str(), "Symbol" | "ZapfDingbats") {
                font.push(("Encoding", Object::name("WinAnsiEncoding")));
            }
            fonts.insert(resource.clone(), Object::reference(body.add(Object::dict(font))));
        }

        let mut xobjects = Dict::new();
        for (resource, image) in self.images.images_with_ids() {
            let mask = image.soft_mask_xobject().map(|mask| body.add(mask));
            let id = body.add(image.to_xobject(mask));
            xobjects.insert(resource.to_string(), Object::reference(id));
        }

        let procs = ["PDF", "Text", "ImageB", "ImageC"].into_iter().map(Object::name).collect();
        let mut resources = vec![("ProcSet", Object::Array(procs))];
        if !fonts.is_empty() {
            resources.push(("Font", Object::Dictionary(fonts)));
        }
        if !xobjects.is_empty() {
            resources.push(("XObject", Object::Dictionary(xobjects)));
        }
        body.add(Object::dict(resources))
    }

    fn content_stream(&self, content: &ContentStreamBuilder) -> Result<Object> {
        let raw = content.build()?;
        if !self.config.compress {
            return Ok(Object::Stream {
                dict: Dict::new(),
                data: Bytes::from(raw),
            });
        }
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw.len() / 3), Compression::default());
        encoder.write_all(&raw)?;
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::name("FlateDecode"));
        Ok(Object::Stream {
            dict,
            data: Bytes::from(encoder.finish()?),
        })
    }
}

/// Numbered objects of the file body. Numbers start at 1 and may be
/// reserved before their object is known.
#[derive(Debug, Default)]
struct Body {
    objects: Vec<Option<Object>>,
}

impl Body {
    fn reserve(&mut self) -> u32 {
        self.objects.push(None);
        self.objects.len() as u32
    }

    fn set(&mut self, id: u32, object: Object) {
        self.objects[id as usize - 1] = Some(object);
    }

    fn add(&mut self, object: Object) -> u32 {
        self.objects.push(Some(object));
        self.objects.len() as u32
    }

    /// Header, objects, xref table and trailer.
    fn write_file(self, version: &str, root: u32, info: u32) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::compact();
        let mut out = Vec::new();
        writeln!(out, "%PDF-{}", version)?;
        // High-bit comment marks the file as binary.
        out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, object) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            let id = index as u32 + 1;
            match object {
                Some(object) => serializer.write_indirect(&mut out, id, 0, object)?,
                None => serializer.write_indirect(&mut out, id, 0, &Object::Null)?,
            }
        }

        let size = self.objects.len() + 1;
        let xref = out.len();
        write!(out, "xref\n0 {}\n0000000000 65535 f \n", size)?;
        for offset in offsets {
            write!(out, "{:010} 00000 n \n", offset)?;
        }

        let trailer = Object::dict([
            ("Size", Object::Integer(size as i64)),
            ("Root", Object::reference(root)),
            ("Info", Object::reference(info)),
        ]);
        out.extend_from_slice(b"trailer\n");
        serializer.write(&mut out, &trailer)?;
        write!(out, "\nstartxref\n{}\n%%EOF", xref)?;
        Ok(out)
    }
}

/// Info dictionary text: ASCII as-is, anything else UTF-16BE with a BOM.
fn info_string(value: &str) -> Vec<u8> {
    if value.is_ascii() {
        return value.as_bytes().to_vec();
    }
    std::iter::once(0xFEFF)
        .chain(value.encode_utf16())
        .flat_map(u16::to_be_bytes)
        .collect()
}
