//! Raster images as Image XObjects (ISO 32000-1:2008, section 8.9).
//!
//! JPEG files are embedded as-is under `DCTDecode`. Everything else the
//! `image` crate can decode is stored as 8-bit samples under `FlateDecode`,
//! with a non-trivial alpha channel split off into a soft mask.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use indexmap::IndexMap;

use super::object::Object;

/// Stream filter of the embedded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Original JPEG bytes
    Jpeg,
    /// Decoded samples, zlib-compressed
    Flate,
}

impl ImageFormat {
    fn filter(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "DCTDecode",
            ImageFormat::Flate => "FlateDecode",
        }
    }
}

/// Device colour space of the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One component
    DeviceGray,
    /// Three components
    DeviceRGB,
    /// Four components; only produced by JPEG pass-through
    DeviceCMYK,
}

impl ColorSpace {
    /// PDF name of the colour space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Errors raised while loading an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The file could not be read
    #[error("cannot read image {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Bytes are not in a format the decoder knows
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// The decoder rejected the data
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// JPEG without a usable frame header
    #[error("malformed JPEG: {0}")]
    MalformedJpeg(&'static str),

    /// zlib compression failed
    #[error("cannot compress image samples: {0}")]
    Compression(#[source] io::Error),
}

/// An image ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Colour space of `data`
    pub color_space: ColorSpace,
    /// Filter applied to `data`
    pub format: ImageFormat,
    /// Encoded samples
    pub data: Bytes,
    /// zlib-compressed alpha samples
    pub soft_mask: Option<Bytes>,
}

impl ImageData {
    /// Wrap JPEG bytes without re-encoding them.
    pub fn from_jpeg(data: impl Into<Bytes>) -> Result<Self, ImageError> {
        let data = data.into();
        let frame = jpeg_frame(&data)?;
        Ok(Self {
            width: frame.width,
            height: frame.height,
            color_space: frame.color_space,
            format: ImageFormat::Jpeg,
            data,
            soft_mask: None,
        })
    }

    /// Decode any supported raster into Flate-compressed samples.
    pub fn from_decoded(img: &image::DynamicImage) -> Result<Self, ImageError> {
        use image::{ColorType, GenericImageView};

        let (width, height) = img.dimensions();
        let has_alpha = img.color().has_alpha();
        let gray = matches!(img.color(), ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16);

        let (color_space, samples) = if gray {
            (ColorSpace::DeviceGray, img.to_luma8().into_raw())
        } else {
            (ColorSpace::DeviceRGB, img.to_rgb8().into_raw())
        };
        let alpha = if has_alpha {
            let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
            // Fully opaque masks add nothing.
            Some(alpha).filter(|a| a.iter().any(|&v| v < u8::MAX))
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            color_space,
            format: ImageFormat::Flate,
            data: deflate(&samples)?,
            soft_mask: alpha.as_deref().map(deflate).transpose()?,
        })
    }

    /// Load from encoded bytes, sniffing the format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ImageError> {
        match image::guess_format(data) {
            Ok(image::ImageFormat::Jpeg) => Self::from_jpeg(Bytes::copy_from_slice(data)),
            Ok(format) => Self::from_decoded(&image::load_from_memory_with_format(data, format)?),
            Err(_) => Err(ImageError::UnsupportedFormat),
        }
    }

    /// Load from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    /// Image XObject stream; `soft_mask` is the object number of the mask.
    pub fn to_xobject(&self, soft_mask: Option<u32>) -> Object {
        let mut entries = image_entries(self.width, self.height, self.color_space, self.format);
        if self.format == ImageFormat::Jpeg && self.color_space == ColorSpace::DeviceCMYK {
            // Adobe writes CMYK JPEGs inverted.
            let decode = [1, 0, 1, 0, 1, 0, 1, 0].into_iter().map(Object::Integer).collect();
            entries.push(("Decode", Object::Array(decode)));
        }
        if let Some(id) = soft_mask {
            entries.push(("SMask", Object::reference(id)));
        }
        Object::Stream {
            dict: dict_of(entries),
            data: self.data.clone(),
        }
    }

    /// Soft mask XObject stream, if the image has transparency.
    pub fn soft_mask_xobject(&self) -> Option<Object> {
        self.soft_mask.as_ref().map(|mask| Object::Stream {
            dict: dict_of(image_entries(self.width, self.height, ColorSpace::DeviceGray, ImageFormat::Flate)),
            data: mask.clone(),
        })
    }
}

fn image_entries(width: u32, height: u32, space: ColorSpace, format: ImageFormat) -> Vec<(&'static str, Object)> {
    vec![
        ("Type", Object::name("XObject")),
        ("Subtype", Object::name("Image")),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::name(space.pdf_name())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::name(format.filter())),
    ]
}

fn dict_of(entries: Vec<(&'static str, Object)>) -> super::object::Dict {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn deflate(samples: &[u8]) -> Result<Bytes, ImageError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(samples.len() / 2), Compression::default());
    encoder.write_all(samples).map_err(ImageError::Compression)?;
    encoder.finish().map(Bytes::from).map_err(ImageError::Compression)
}

struct JpegFrame {
    width: u32,
    height: u32,
    color_space: ColorSpace,
}

/// Read the first start-of-frame segment.
fn jpeg_frame(data: &[u8]) -> Result<JpegFrame, ImageError> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return Err(ImageError::MalformedJpeg("missing SOI marker"));
    }
    let mut rest = &data[2..];
    loop {
        // Skip fill bytes up to the next marker.
        let start = rest
            .windows(2)
            .position(|w| w[0] == 0xFF && w[1] != 0xFF && w[1] != 0x00)
            .ok_or(ImageError::MalformedJpeg("no frame header"))?;
        let marker = rest[start + 1];
        rest = &rest[start + 2..];

        // Standalone markers carry no length.
        if matches!(marker, 0x01 | 0xD0..=0xD9) {
            continue;
        }
        let &[hi, lo, ..] = rest else {
            return Err(ImageError::MalformedJpeg("truncated segment"));
        };
        let len = u16::from_be_bytes([hi, lo]) as usize;

        // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
        let is_frame = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let &[_, _, _precision, h1, h0, w1, w0, components, ..] = rest else {
                return Err(ImageError::MalformedJpeg("truncated frame header"));
            };
            let color_space = match components {
                1 => ColorSpace::DeviceGray,
                4 => ColorSpace::DeviceCMYK,
                _ => ColorSpace::DeviceRGB,
            };
            return Ok(JpegFrame {
                width: u16::from_be_bytes([w1, w0]) as u32,
                height: u16::from_be_bytes([h1, h0]) as u32,
                color_space,
            });
        }
        rest = rest.get(len..).ok_or(ImageError::MalformedJpeg("truncated segment"))?;
    }
}

/// Images of one document, keyed by source (normally the file path).
///
/// A key is loaded once; later uses share its `Im<n>` resource.
#[derive(Debug, Default)]
pub struct ImageManager {
    images: IndexMap<String, (String, ImageData)>,
}

impl ImageManager {
    /// No images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `image` under `key` and return its resource name. A known key
    /// keeps its first image.
    pub fn register(&mut self, key: impl Into<String>, image: ImageData) -> String {
        let next = self.images.len() + 1;
        let (resource, _) = self
            .images
            .entry(key.into())
            .or_insert_with(|| (format!("Im{}", next), image));
        resource.clone()
    }

    /// Resource name and image for `path`, reading the file on first use.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(String, &ImageData), ImageError> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();
        if !self.images.contains_key(&key) {
            let image = ImageData::from_file(path)?;
            log::debug!(
                "Embedding {} as {:?} ({}x{} px, alpha: {})",
                key,
                image.format,
                image.width,
                image.height,
                image.soft_mask.is_some()
            );
            self.register(key.clone(), image);
        }
        let (resource, image) = &self.images[&key];
        Ok((resource.clone(), image))
    }

    /// `(resource, image)` pairs in registration order.
    pub fn images_with_ids(&self) -> impl Iterator<Item = (&str, &ImageData)> {
        self.images.values().map(|(resource, image)| (resource.as_str(), image))
    }

    /// Number of distinct images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image was registered.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(img: image::DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut io::Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    fn stream_dict(obj: &Object) -> &super::super::object::Dict {
        match obj {
            Object::Stream { dict, .. } => dict,
            other => panic!("expected stream, got {:?}", other),
        }
    }

    // SOI, APP0 with two payload bytes, then SOF0 of a 16x8 image.
    fn tiny_jpeg(components: u8) -> Vec<u8> {
        vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x08, 0x00, 0x10, components, 0x01, 0x11, 0x00,
        ]
    }

    #[test]
    fn test_rgb_png() {
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 0]));
        let data = ImageData::from_bytes(&png(image::DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.color_space, ColorSpace::DeviceRGB);
        assert_eq!(data.format, ImageFormat::Flate);
        assert!(data.soft_mask_xobject().is_none());
    }

    #[test]
    fn test_gray_png() {
        let img = image::GrayImage::from_pixel(3, 3, image::Luma([128]));
        let data = ImageData::from_bytes(&png(image::DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(data.color_space, ColorSpace::DeviceGray);
    }

    #[test]
    fn test_translucent_png_gets_soft_mask() {
        let img = image::RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 255, 128]));
        let data = ImageData::from_bytes(&png(image::DynamicImage::ImageRgba8(img))).unwrap();

        let mask = data.soft_mask_xobject().unwrap();
        assert_eq!(stream_dict(&mask).get("ColorSpace"), Some(&Object::name("DeviceGray")));

        let xobject = data.to_xobject(Some(9));
        assert_eq!(stream_dict(&xobject).get("SMask"), Some(&Object::reference(9)));
    }

    #[test]
    fn test_opaque_alpha_dropped() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        let data = ImageData::from_bytes(&png(image::DynamicImage::ImageRgba8(img))).unwrap();
        assert!(data.soft_mask.is_none());
    }

    #[test]
    fn test_unknown_bytes() {
        assert!(matches!(
            ImageData::from_bytes(b"definitely not an image"),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_jpeg_pass_through() {
        let image = ImageData::from_jpeg(tiny_jpeg(3)).unwrap();
        assert_eq!((image.width, image.height), (16, 8));
        assert_eq!(image.color_space, ColorSpace::DeviceRGB);

        let xobject = image.to_xobject(None);
        let dict = stream_dict(&xobject);
        assert_eq!(dict.get("Filter"), Some(&Object::name("DCTDecode")));
        assert_eq!(dict.get("Width"), Some(&Object::Integer(16)));
        assert!(dict.get("Decode").is_none());
    }

    #[test]
    fn test_cmyk_jpeg_inverted() {
        let image = ImageData::from_jpeg(tiny_jpeg(4)).unwrap();
        assert_eq!(image.color_space, ColorSpace::DeviceCMYK);
        assert!(stream_dict(&image.to_xobject(None)).contains_key("Decode"));
    }

    #[test]
    fn test_malformed_jpeg() {
        assert!(matches!(
            ImageData::from_jpeg(vec![0x00, 0x00]),
            Err(ImageError::MalformedJpeg(_))
        ));
        assert!(matches!(
            ImageData::from_jpeg(vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00]),
            Err(ImageError::MalformedJpeg(_))
        ));
    }

    #[test]
    fn test_manager_shares_resources() {
        let bytes = png(image::DynamicImage::ImageRgb8(image::RgbImage::new(1, 1)));
        let mut manager = ImageManager::new();
        assert!(manager.is_empty());

        let logo = manager.register("logo.png", ImageData::from_bytes(&bytes).unwrap());
        let again = manager.register("logo.png", ImageData::from_bytes(&bytes).unwrap());
        let chart = manager.register("chart.png", ImageData::from_bytes(&bytes).unwrap());

        assert_eq!(logo, "Im1");
        assert_eq!(again, "Im1");
        assert_eq!(chart, "Im2");
        let order: Vec<&str> = manager.images_with_ids().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["Im1", "Im2"]);
    }

    #[test]
    fn test_missing_file() {
        let mut manager = ImageManager::new();
        let err = manager.load_file("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }
}
