//! Configuration for report generation.
//!
//! Every field has a default, so a JSON configuration only needs to name
//! what it changes:
//!
//! ```json
//! { "report_name": "q3", "title": "ACME - Q3 2024", "page_numbers": true }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::ChartStyle;
use crate::error::{Error, Result};
use crate::writer::FontFamily;

/// Page dimensions in millimetres.
///
/// Deserializes from either a name (`"A4"`, `"Letter"`, ...) or an explicit
/// `{ "width": .., "height": .. }` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PageSizeRepr")]
pub struct PageSize {
    /// Page width (mm)
    pub width: f32,
    /// Page height (mm)
    pub height: f32,
}

impl PageSize {
    /// ISO A4, 210 x 297 mm.
    pub const A4: PageSize = PageSize::new(210.0, 297.0);
    /// ISO A3, 297 x 420 mm.
    pub const A3: PageSize = PageSize::new(297.0, 420.0);
    /// ISO A5, 148 x 210 mm.
    pub const A5: PageSize = PageSize::new(148.0, 210.0);
    /// US Letter, 8.5 x 11 in.
    pub const LETTER: PageSize = PageSize::new(215.9, 279.4);
    /// US Legal, 8.5 x 14 in.
    pub const LEGAL: PageSize = PageSize::new(215.9, 355.6);

    /// Create a custom page size.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Look up a named page size (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::LETTER),
            "legal" => Some(Self::LEGAL),
            _ => None,
        }
    }

    /// Swap width and height.
    pub fn landscape(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageSizeRepr {
    Named(String),
    Explicit { width: f32, height: f32 },
}

impl TryFrom<PageSizeRepr> for PageSize {
    type Error = String;

    fn try_from(repr: PageSizeRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PageSizeRepr::Named(name) => {
                PageSize::from_name(&name).ok_or_else(|| format!("unknown page size '{}'", name))
            },
            PageSizeRepr::Explicit { width, height } => Ok(PageSize::new(width, height)),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Left margin
    pub left: f32,
    /// Top margin
    pub top: f32,
    /// Right margin
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 10.0,
            top: 10.0,
            right: 10.0,
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base name of the output file written by `save()`
    pub report_name: String,
    /// Logo drawn in the page header; empty for none
    pub logo_path: String,
    /// Header text; empty for none
    pub title: String,
    /// Header font size (pt)
    pub title_font_size: f32,
    /// Body text font size (pt)
    pub paragraph_font_size: f32,
    /// Font family for all text
    pub font_family: String,
    /// Page size
    pub page_size: PageSize,
    /// Page margins
    pub margins: Margins,
    /// Distance from the bottom edge that triggers a page break (mm)
    pub auto_page_break_margin: f32,
    /// Compress page content streams
    pub compress: bool,
    /// Draw "Page N" in the footer of every page
    pub page_numbers: bool,
    /// Author written to the document information
    pub author: Option<String>,
    /// Chart fonts and colours
    pub chart_style: ChartStyle,
    /// Directory that receives a copy of every chart as `<title>.pdf`; `None`
    /// writes no chart files
    pub chart_export_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_name: String::new(),
            logo_path: String::new(),
            title: String::new(),
            title_font_size: 14.0,
            paragraph_font_size: 12.0,
            font_family: "Arial".to_string(),
            page_size: PageSize::A4,
            margins: Margins::default(),
            auto_page_break_margin: 20.0,
            compress: true,
            page_numbers: false,
            author: None,
            chart_style: ChartStyle::default(),
            chart_export_dir: None,
        }
    }
}

impl ReportConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report name.
    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    /// Set the logo path.
    pub fn with_logo_path(mut self, path: impl Into<String>) -> Self {
        self.logo_path = path.into();
        self
    }

    /// Set the header title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the header font size.
    pub fn with_title_font_size(mut self, size: f32) -> Self {
        self.title_font_size = size;
        self
    }

    /// Set the body text font size.
    pub fn with_paragraph_font_size(mut self, size: f32) -> Self {
        self.paragraph_font_size = size;
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Enable or disable content stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enable or disable page numbers in the footer.
    pub fn with_page_numbers(mut self, enable: bool) -> Self {
        self.page_numbers = enable;
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Also write every chart to `dir` as a one-page PDF.
    pub fn with_chart_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_export_dir = Some(dir.into());
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded report configuration from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Check that the configuration can produce a document.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("title_font_size", self.title_font_size),
            ("paragraph_font_size", self.paragraph_font_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, size)));
            }
        }

        FontFamily::from_name(&self.font_family).map_err(|e| Error::Config(e.to_string()))?;

        let page = self.page_size;
        if !(page.width > 0.0 && page.height > 0.0) {
            return Err(Error::Config(format!(
                "page size must be positive, got {} x {} mm",
                page.width, page.height
            )));
        }

        let m = self.margins;
        if m.left < 0.0 || m.top < 0.0 || m.right < 0.0 {
            return Err(Error::Config("margins cannot be negative".to_string()));
        }
        if m.left + m.right >= page.width {
            return Err(Error::Config(format!(
                "margins ({} + {} mm) leave no printable width on a {} mm page",
                m.left, m.right, page.width
            )));
        }
        if !(0.0..page.height).contains(&self.auto_page_break_margin) {
            return Err(Error::Config(format!(
                "auto_page_break_margin must be within the page height, got {}",
                self.auto_page_break_margin
            )));
        }

        self.chart_style.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.title_font_size, 14.0);
        assert_eq!(config.paragraph_font_size, 12.0);
        assert_eq!(config.font_family, "Arial");
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.margins, Margins::default());
        assert!(!config.page_numbers);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ReportConfig::new()
            .with_report_name("weekly")
            .with_title("ACME")
            .with_font_family("Times")
            .with_page_numbers(true);
        assert_eq!(config.report_name, "weekly");
        assert_eq!(config.title, "ACME");
        assert!(config.page_numbers);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_partial() {
        let config =
            ReportConfig::from_json_str(r#"{ "report_name": "q3", "page_size": "letter" }"#).unwrap();
        assert_eq!(config.report_name, "q3");
        assert_eq!(config.page_size, PageSize::LETTER);
        assert_eq!(config.title_font_size, 14.0);
        assert_eq!(config.chart_export_dir, None);

        let config = ReportConfig::from_json_str(r#"{ "chart_export_dir": "charts" }"#).unwrap();
        assert_eq!(config.chart_export_dir, Some(PathBuf::from("charts")));
    }

    #[test]
    fn test_json_explicit_page_size() {
        let config =
            ReportConfig::from_json_str(r#"{ "page_size": { "width": 100, "height": 150 } }"#)
                .unwrap();
        assert_eq!(config.page_size, PageSize::new(100.0, 150.0));
    }

    #[test]
    fn test_json_unknown_page_size() {
        let err = ReportConfig::from_json_str(r#"{ "page_size": "B7" }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_font = ReportConfig::new().with_font_family("Wingdings");
        assert!(matches!(bad_font.validate(), Err(Error::Config(_))));

        let bad_size = ReportConfig::new().with_paragraph_font_size(0.0);
        assert!(matches!(bad_size.validate(), Err(Error::Config(_))));

        let bad_margins = ReportConfig::new().with_margins(Margins {
            left: 110.0,
            top: 10.0,
            right: 100.0,
        });
        assert!(matches!(bad_margins.validate(), Err(Error::Config(_))));

        let bad_page = ReportConfig::new().with_page_size(PageSize::new(0.0, 297.0));
        assert!(matches!(bad_page.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, r#"{ "title": "From file", "compress": false }"#).unwrap();
        let config = ReportConfig::from_json_file(&path).unwrap();
        assert_eq!(config.title, "From file");
        assert!(!config.compress);
    }

    #[test]
    fn test_landscape() {
        assert_eq!(PageSize::A4.landscape(), PageSize::new(297.0, 210.0));
        assert_eq!(PageSize::from_name("A4"), Some(PageSize::A4));
        assert_eq!(PageSize::from_name("tabloid"), None);
    }
}
