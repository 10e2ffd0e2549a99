//! JSON report definitions.
//!
//! A definition lists the blocks of a report in order, so a report can be
//! produced without writing Rust:
//!
//! ```json
//! {
//!   "report_name": "pets",
//!   "title": "ACME - Q3",
//!   "logo": "logo.png",
//!   "blocks": [
//!     { "type": "page" },
//!     { "type": "cover_page", "title": "Pet census" },
//!     { "type": "section_heading", "text": "Counts" },
//!     { "type": "vertical_bar", "title": "Pets", "labels": ["Cat", "Dog"], "values": [3, 4] },
//!     { "type": "table", "columns": ["Pet", "Count"], "rows": [["Cat", 3], ["Dog", 4]] }
//!   ]
//! }
//! ```
//!
//! Relative image and logo paths in a definition loaded from a file are
//! resolved against the file's directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::{BarGraph, FigureSize, Histogram, LineChart, PieChart};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::report::{ReportGenerator, TableStyle, TEXT_LINE_HEIGHT};

/// Optional figure size override shared by chart blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeOverride {
    /// Width in inches
    pub width: Option<f32>,
    /// Height in inches
    pub height: Option<f32>,
    /// Dots per inch
    pub dpi: Option<u32>,
}

impl SizeOverride {
    fn apply(&self, default: FigureSize) -> FigureSize {
        FigureSize::new(
            self.width.unwrap_or(default.width_in),
            self.height.unwrap_or(default.height_in),
            self.dpi.unwrap_or(default.dpi),
        )
    }
}

/// Bar or line chart block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBlock {
    /// Chart title
    pub title: String,
    /// Category labels
    pub labels: Vec<String>,
    /// One value per label
    pub values: Vec<f64>,
    /// X axis label
    #[serde(default)]
    pub x_label: String,
    /// Y axis label
    #[serde(default)]
    pub y_label: String,
    /// Figure width (in)
    #[serde(default)]
    pub width: Option<f32>,
    /// Figure height (in)
    #[serde(default)]
    pub height: Option<f32>,
    /// Figure resolution
    #[serde(default)]
    pub dpi: Option<u32>,
}

impl SeriesBlock {
    fn size(&self, default: FigureSize) -> FigureSize {
        SizeOverride {
            width: self.width,
            height: self.height,
            dpi: self.dpi,
        }
        .apply(default)
    }
}

/// Table cell: text, number or boolean, printed as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    /// Text
    Text(String),
    /// Number, printed without a trailing `.0` for integers
    Number(serde_json::Number),
    /// Boolean
    Bool(bool),
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableCell::Text(text) => f.write_str(text),
            TableCell::Number(number) => write!(f, "{}", number),
            TableCell::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// One step of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// New page
    Page,
    /// Line break; without a height, the height of the last line
    LineBreak {
        /// Break height (mm)
        #[serde(default)]
        height: Option<f32>,
    },
    /// Cover page with a centred title
    CoverPage {
        /// Cover title
        title: String,
    },
    /// Section heading
    SectionHeading {
        /// Heading text
        text: String,
        /// Line height (mm)
        #[serde(default)]
        line_height: Option<f32>,
    },
    /// Paragraph of flowing text
    Paragraph {
        /// Paragraph text
        text: String,
    },
    /// Image at natural size
    Image {
        /// Image file
        path: PathBuf,
    },
    /// Vertical bar graph
    VerticalBar(SeriesBlock),
    /// Horizontal bar graph
    HorizontalBar(SeriesBlock),
    /// Line chart
    Line(SeriesBlock),
    /// Pie chart
    Pie {
        /// Chart title
        title: String,
        /// Wedge labels
        labels: Vec<String>,
        /// Wedge values
        values: Vec<f64>,
        /// Figure width (in)
        #[serde(default)]
        width: Option<f32>,
        /// Figure height (in)
        #[serde(default)]
        height: Option<f32>,
        /// Figure resolution
        #[serde(default)]
        dpi: Option<u32>,
    },
    /// Histogram
    Histogram {
        /// Chart title
        title: String,
        /// Sample values
        data: Vec<f64>,
        /// X axis label
        #[serde(default)]
        x_label: String,
        /// Y axis label
        #[serde(default)]
        y_label: String,
        /// Figure width (in)
        #[serde(default)]
        width: Option<f32>,
        /// Figure height (in)
        #[serde(default)]
        height: Option<f32>,
        /// Figure resolution
        #[serde(default)]
        dpi: Option<u32>,
    },
    /// Striped table
    Table {
        /// Header cells
        columns: Vec<String>,
        /// Data rows
        rows: Vec<Vec<TableCell>>,
        /// Colours and font sizes
        #[serde(default)]
        style: Option<TableStyle>,
    },
}

impl Block {
    /// Block tag as written in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Page => "page",
            Block::LineBreak { .. } => "line_break",
            Block::CoverPage { .. } => "cover_page",
            Block::SectionHeading { .. } => "section_heading",
            Block::Paragraph { .. } => "paragraph",
            Block::Image { .. } => "image",
            Block::VerticalBar(_) => "vertical_bar",
            Block::HorizontalBar(_) => "horizontal_bar",
            Block::Line(_) => "line",
            Block::Pie { .. } => "pie",
            Block::Histogram { .. } => "histogram",
            Block::Table { .. } => "table",
        }
    }
}

/// A complete report: configuration plus ordered blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDefinition {
    /// Report configuration
    pub config: ReportConfig,
    /// Overrides `config.report_name`
    pub report_name: Option<String>,
    /// Overrides `config.title`
    pub title: Option<String>,
    /// Overrides `config.logo_path`
    pub logo: Option<String>,
    /// Report content, in order
    pub blocks: Vec<Block>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl ReportDefinition {
    /// Parse a definition from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let definition: ReportDefinition = serde_json::from_str(json)?;
        definition.config.validate()?;
        Ok(definition)
    }

    /// Load a definition file. Relative paths inside it are resolved against
    /// the file's directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut definition = Self::from_json_str(&json)?;
        definition.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!(
            "Loaded definition {} ({} blocks)",
            path.display(),
            definition.blocks.len()
        );
        Ok(definition)
    }

    /// Effective configuration after applying the top-level overrides.
    pub fn effective_config(&self) -> ReportConfig {
        let mut config = self.config.clone();
        if let Some(name) = &self.report_name {
            config.report_name = name.clone();
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(logo) = &self.logo {
            config.logo_path = logo.clone();
        }
        if !config.logo_path.is_empty() {
            config.logo_path = self.resolve(Path::new(&config.logo_path)).to_string_lossy().into_owned();
        }
        if let Some(dir) = &config.chart_export_dir {
            config.chart_export_dir = Some(self.resolve(dir));
        }
        config
    }

    /// Build the report by applying every block in order.
    pub fn render(&self) -> Result<ReportGenerator> {
        let mut report = ReportGenerator::new(self.effective_config())?;
        for (index, block) in self.blocks.iter().enumerate() {
            if let Err(err) = self.apply(&mut report, block) {
                log::warn!("Block {} ({}) failed: {}", index, block.kind(), err);
                return Err(err);
            }
        }
        Ok(report)
    }

    fn apply(&self, report: &mut ReportGenerator, block: &Block) -> Result<()> {
        match block {
            Block::Page => report.add_page(),
            Block::LineBreak { height } => {
                report.ln(*height);
                Ok(())
            },
            Block::CoverPage { title } => report.create_cover_page(title),
            Block::SectionHeading { text, line_height } => report
                .create_section_heading_with_line_height(text, line_height.unwrap_or(TEXT_LINE_HEIGHT)),
            Block::Paragraph { text } => report.create_paragraph(text),
            Block::Image { path } => report.add_image(self.resolve(path)),
            Block::VerticalBar(series) => {
                let chart = BarGraph::vertical(&series.title, series.labels.clone(), series.values.clone());
                let size = series.size(chart.size);
                report.add_chart(
                    &chart
                        .with_axis_labels(&series.x_label, &series.y_label)
                        .with_size(size),
                )
            },
            Block::HorizontalBar(series) => {
                let chart =
                    BarGraph::horizontal(&series.title, series.labels.clone(), series.values.clone());
                let size = series.size(chart.size);
                report.add_chart(
                    &chart
                        .with_axis_labels(&series.x_label, &series.y_label)
                        .with_size(size),
                )
            },
            Block::Line(series) => {
                let chart = LineChart::new(&series.title, series.labels.clone(), series.values.clone());
                let size = series.size(chart.size);
                report.add_chart(
                    &chart
                        .with_axis_labels(&series.x_label, &series.y_label)
                        .with_size(size),
                )
            },
            Block::Pie {
                title,
                labels,
                values,
                width,
                height,
                dpi,
            } => {
                let chart = PieChart::new(title, labels.clone(), values.clone());
                let size = SizeOverride {
                    width: *width,
                    height: *height,
                    dpi: *dpi,
                }
                .apply(chart.size);
                report.add_chart(&chart.with_size(size))
            },
            Block::Histogram {
                title,
                data,
                x_label,
                y_label,
                width,
                height,
                dpi,
            } => {
                let chart = Histogram::new(title, data.clone());
                let size = SizeOverride {
                    width: *width,
                    height: *height,
                    dpi: *dpi,
                }
                .apply(chart.size);
                report.add_chart(&chart.with_axis_labels(x_label, y_label).with_size(size))
            },
            Block::Table { columns, rows, style } => match style {
                Some(style) => report.create_table_with_style(rows.as_slice(), columns.as_slice(), style),
                None => report.create_table(rows.as_slice(), columns.as_slice()),
            },
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_blocks() {
        let json = r#"{
            "report_name": "pets",
            "blocks": [
                { "type": "page" },
                { "type": "line_break" },
                { "type": "line_break", "height": 4 },
                { "type": "section_heading", "text": "Counts" },
                { "type": "pie", "title": "Pets", "labels": ["a", "b"], "values": [1, 2], "dpi": 72 },
                { "type": "table", "columns": ["Pet", "Count"], "rows": [["Cat", 3], ["Dog", 4.5]] }
            ]
        }"#;
        let def = ReportDefinition::from_json_str(json).unwrap();
        assert_eq!(def.report_name.as_deref(), Some("pets"));
        assert_eq!(def.blocks.len(), 6);
        assert_eq!(def.blocks[0], Block::Page);
        assert_eq!(def.blocks[2], Block::LineBreak { height: Some(4.0) });
        assert_eq!(def.blocks[4].kind(), "pie");

        let Block::Table { rows, .. } = &def.blocks[5] else {
            panic!("expected table");
        };
        let printed: Vec<String> = rows[1].iter().map(ToString::to_string).collect();
        assert_eq!(printed, vec!["Dog", "4.5"]);
        assert_eq!(rows[0][1].to_string(), "3");
    }

    #[test]
    fn test_unknown_block_is_error() {
        let json = r#"{ "blocks": [ { "type": "sparkline" } ] }"#;
        assert!(matches!(ReportDefinition::from_json_str(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_overrides() {
        let json = r#"{
            "config": { "report_name": "a", "title": "old" },
            "report_name": "b",
            "title": "new"
        }"#;
        let config = ReportDefinition::from_json_str(json).unwrap().effective_config();
        assert_eq!(config.report_name, "b");
        assert_eq!(config.title, "new");
        assert_eq!(config.logo_path, "");
    }

    #[test]
    fn test_size_override() {
        let size = SizeOverride {
            width: Some(4.0),
            height: None,
            dpi: None,
        }
        .apply(FigureSize::new(3.0, 2.0, 120));
        assert_eq!(size, FigureSize::new(4.0, 2.0, 120));
    }

    #[test]
    fn test_render_stops_at_failing_block() {
        let json = r#"{
            "config": { "compress": false },
            "blocks": [
                { "type": "page" },
                { "type": "line", "title": "", "labels": ["a"], "values": [1] }
            ]
        }"#;
        let def = ReportDefinition::from_json_str(json).unwrap();
        let err = def.render().err().unwrap();
        assert_eq!(err.to_string(), "A title must be specified");
    }

    #[test]
    fn test_render_demo_blocks() {
        let json = r#"{
            "config": { "compress": false },
            "report_name": "demo",
            "title": "COMPANY NAME - REPORT DATE",
            "blocks": [
                { "type": "page" },
                { "type": "cover_page", "title": "This is the cover page" },
                { "type": "section_heading", "text": "Section" },
                { "type": "vertical_bar", "title": "test", "labels": ["Cat", "Dog", "Bird"],
                  "values": [0, 1, 2], "width": 3, "height": 4, "x_label": "Animal", "y_label": "Quantity" },
                { "type": "line_break" },
                { "type": "horizontal_bar", "title": "test2", "labels": ["Cat", "Dog", "Bird"],
                  "values": [0, 1, 2], "width": 3, "height": 1 },
                { "type": "line_break" },
                { "type": "pie", "title": "test3", "labels": ["CAT", "DOG", "BIRD", "PLANE"], "values": [2, 4, 5, 7] },
                { "type": "line", "title": "test4", "labels": ["CAT", "DOG", "BIRD", "PLANE"], "values": [2, 4, 5, 7] },
                { "type": "histogram", "title": "test5", "data": [2, 2, 3, 7, 4, 4, 5, 7] }
            ]
        }"#;
        let mut report = ReportDefinition::from_json_str(json).unwrap().render().unwrap();
        assert!(report.page_count() >= 3);
        let bytes = report.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }
}
