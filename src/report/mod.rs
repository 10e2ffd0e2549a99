//! Report assembly.
//!
//! [`ReportGenerator`] wraps a [`Canvas`] with the building blocks of a
//! business report: a branded page header, cover page, section headings,
//! paragraphs, images, charts and striped tables.
//!
//! # Example
//!
//! ```no_run
//! use pdf_report::{ReportConfig, ReportGenerator};
//!
//! let mut report = ReportGenerator::new(ReportConfig::new().with_report_name("quarterly"))?;
//! report.set_title("ACME Corp");
//! report.add_page()?;
//! report.create_cover_page("Quarterly results")?;
//! report.create_section_heading("Sales")?;
//! report.add_vertical_bar_graph("Sales", &["Q1", "Q2"], &[3.0, 4.0], "Quarter", "Units")?;
//! report.save()?;
//! # Ok::<(), pdf_report::Error>(())
//! ```

mod table;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::chart::{BarGraph, Chart, Histogram, LineChart, PieChart};
use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::layout::{standalone_figure, Align, Border, Canvas, CellMove, PageDecorator};
use crate::writer::PdfWriterConfig;

pub use table::TableStyle;

/// Line height of headings and paragraphs (mm).
pub const TEXT_LINE_HEIGHT: f32 = 5.0;

/// Header band: title cell height, rule position and logo box (mm).
const HEADER_CELL_HEIGHT: f32 = 20.0;
const HEADER_RULE_Y: f32 = 15.0;
const HEADER_CONTENT_Y: f32 = 20.0;
const LOGO_WIDTH: f32 = 50.0;
const LOGO_HEIGHT: f32 = 15.0;

/// Cover title position (mm).
const COVER_X: f32 = 80.0;
const COVER_Y: f32 = 125.0;

/// Header and footer drawn on every page.
#[derive(Debug, Clone)]
struct ReportHeader {
    title: String,
    logo_path: String,
    font_family: String,
    title_font_size: f32,
    page_numbers: bool,
}

impl ReportHeader {
    fn from_config(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            logo_path: config.logo_path.clone(),
            font_family: config.font_family.clone(),
            title_font_size: config.title_font_size,
            page_numbers: config.page_numbers,
        }
    }
}

impl PageDecorator for ReportHeader {
    fn header(&self, canvas: &mut Canvas) -> Result<()> {
        let page_width = canvas.page_size().width;
        canvas.set_font(&self.font_family, "B", self.title_font_size)?;
        if !self.title.is_empty() {
            canvas.cell(
                0.0,
                HEADER_CELL_HEIGHT,
                &self.title,
                Border::NONE,
                CellMove::Right,
                Align::Left,
                false,
            )?;
        }
        if !self.logo_path.is_empty() {
            // 161 mm on A4: the logo box overhangs the right edge by 1 mm.
            let x = page_width - LOGO_WIDTH + 1.0;
            canvas.image(&self.logo_path, Some(x), Some(0.0), LOGO_WIDTH, LOGO_HEIGHT)?;
        }
        let left = canvas.margins().left;
        canvas.line(left, HEADER_RULE_Y, page_width, HEADER_RULE_Y)?;
        canvas.set_y(HEADER_CONTENT_Y);
        Ok(())
    }

    fn footer(&self, canvas: &mut Canvas) -> Result<()> {
        if !self.page_numbers {
            return Ok(());
        }
        canvas.set_y(-15.0);
        canvas.set_font(&self.font_family, "I", 8.0)?;
        if !self.title.is_empty() {
            canvas.cell(0.0, 10.0, &self.title, Border::NONE, CellMove::Below, Align::Left, false)?;
        }
        let label = format!("Page {}", canvas.page_count());
        canvas.cell(0.0, 10.0, &label, Border::NONE, CellMove::Right, Align::Center, false)
    }
}

/// Builds a report page by page.
///
/// Content is appended at the cursor of the current page; when a block does
/// not fit above the bottom margin a new page (with header) is started.
pub struct ReportGenerator {
    config: ReportConfig,
    canvas: Canvas,
}

impl ReportGenerator {
    /// Create a generator with the given configuration.
    ///
    /// No page is opened yet; call [`add_page`](Self::add_page) or
    /// [`create_cover_page`](Self::create_cover_page) first.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        if config.report_name.is_empty() {
            log::warn!("You must specify a report name");
        }

        let mut writer_config = PdfWriterConfig::default().with_compress(config.compress);
        if !config.report_name.is_empty() {
            writer_config = writer_config.with_title(config.report_name.clone());
        }
        if let Some(author) = &config.author {
            writer_config = writer_config.with_author(author.clone());
        }

        let mut canvas = Canvas::new(config.page_size, writer_config);
        canvas.set_margins(config.margins);
        canvas.set_auto_page_break(true, config.auto_page_break_margin);
        canvas.set_font(&config.font_family, "", config.paragraph_font_size)?;

        let mut report = Self { config, canvas };
        report.install_header();
        log::debug!("Created report generator for '{}'", report.config.report_name);
        Ok(report)
    }

    /// Active configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Underlying canvas, for drawing beyond the built-in blocks.
    pub fn canvas(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Logo drawn at the top right of every page header. Applies to pages
    /// opened after the call.
    pub fn set_logo_path(&mut self, path: impl Into<String>) {
        self.config.logo_path = path.into();
        self.install_header();
    }

    /// Name of the file written by [`save`](Self::save), without extension.
    /// Also used as the document title.
    pub fn set_report_name(&mut self, name: impl Into<String>) {
        self.config.report_name = name.into();
        self.canvas.writer_config_mut().info.title = Some(self.config.report_name.clone());
    }

    /// Text shown in the page header. Applies to pages opened after the call.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
        self.install_header();
    }

    /// Select the font for following text. `size` of 0 keeps the current size.
    pub fn set_font(&mut self, family: &str, style: &str, size: f32) -> Result<()> {
        self.canvas.set_font(family, style, size)
    }

    /// Start a new page.
    pub fn add_page(&mut self) -> Result<()> {
        self.canvas.add_page()
    }

    /// Line break of `h` millimetres, or of the last line height.
    pub fn ln(&mut self, h: Option<f32>) {
        self.canvas.ln(h);
    }

    /// Number of pages so far.
    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    /// Add a cover page: the title in capitals at the middle of a fresh page,
    /// followed by another page for the content.
    pub fn create_cover_page(&mut self, title: &str) -> Result<()> {
        if title.is_empty() {
            log::warn!("Rejected cover page without a title");
            return Err(Error::MissingArgument("A title must be specified"));
        }
        let family = self.config.font_family.clone();
        self.canvas.set_top_margin(0.0);
        self.canvas.add_page()?;
        self.canvas.set_xy(COVER_X, COVER_Y);
        self.canvas.set_font(&family, "B", 0.0)?;
        self.canvas.cell(
            self.canvas.page_size().width,
            10.0,
            &title.to_uppercase(),
            Border::NONE,
            CellMove::Right,
            Align::Left,
            false,
        )?;
        self.canvas.set_font(&family, "", 0.0)?;
        self.canvas.add_page()
    }

    /// Add a bold, underlined, upper-cased section heading.
    pub fn create_section_heading(&mut self, heading: &str) -> Result<()> {
        self.create_section_heading_with_line_height(heading, TEXT_LINE_HEIGHT)
    }

    /// Section heading with an explicit line height (mm).
    pub fn create_section_heading_with_line_height(
        &mut self,
        heading: &str,
        line_height: f32,
    ) -> Result<()> {
        if heading.is_empty() {
            log::warn!("Rejected empty section heading");
            return Err(Error::MissingArgument("A heading must be specified"));
        }
        let family = self.config.font_family.clone();
        self.canvas.set_font(&family, "BU", 0.0)?;
        self.canvas.write(line_height, &heading.to_uppercase())?;
        self.canvas.ln(None);
        self.canvas.set_font(&family, "", 0.0)
    }

    /// Add a paragraph of flowing text. Empty text adds nothing.
    pub fn create_paragraph(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let family = self.config.font_family.clone();
        self.canvas.ln(None);
        self.canvas.set_font(&family, "", 0.0)?;
        self.canvas.write(TEXT_LINE_HEIGHT, text)
    }

    /// Add an image at its natural size below the current line.
    pub fn add_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            log::warn!("Rejected image without a path");
            return Err(Error::MissingArgument("Please specify a valid path"));
        }
        // Load before the line break so a bad file leaves the cursor alone.
        self.canvas.load_image(path)?;
        self.canvas.ln(None);
        self.canvas.image(path, None, None, 0.0, 0.0)
    }

    /// Add a chart below the current line.
    ///
    /// The chart is validated first; an invalid chart leaves the report
    /// unchanged.
    pub fn add_chart(&mut self, chart: &dyn Chart) -> Result<()> {
        if let Err(err) = chart.validate() {
            log::warn!("Rejected chart '{}': {}", chart.title(), err);
            return Err(err);
        }
        if self.canvas.page_count() == 0 {
            return Err(Error::NoPage);
        }

        let size = chart.figure_size();
        log::debug!(
            "Adding chart '{}' ({}x{} in at {} dpi)",
            chart.title(),
            size.width_in,
            size.height_in,
            size.dpi
        );
        if let Some(dir) = &self.config.chart_export_dir {
            self.export_chart(chart, dir)?;
        }
        let style = &self.config.chart_style;
        self.canvas.ln(None);
        self.canvas
            .figure(size.width_pt(), size.height_pt(), size.scale(), |figure| chart.draw(figure, style))
    }

    /// Write `chart` on its own to `<dir>/<title>.pdf`, a page the size of
    /// the figure.
    fn export_chart(&self, chart: &dyn Chart, dir: &Path) -> Result<()> {
        let size = chart.figure_size();
        let style = &self.config.chart_style;
        let config = PdfWriterConfig::default()
            .with_compress(self.config.compress)
            .with_title(chart.title());
        let writer = standalone_figure(size.width_pt(), size.height_pt(), size.scale(), config, |figure| {
            chart.draw(figure, style)
        })?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.pdf", chart_file_stem(chart.title())));
        writer.save(&path)?;
        log::info!("Exported chart '{}' to {}", chart.title(), path.display());
        Ok(())
    }

    /// Vertical bar graph, 2 x 2.2 inches.
    pub fn add_vertical_bar_graph<S: AsRef<str>>(
        &mut self,
        title: &str,
        labels: &[S],
        values: &[f64],
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let chart = BarGraph::vertical(title, owned(labels), values.to_vec())
            .with_axis_labels(x_label, y_label);
        self.add_chart(&chart)
    }

    /// Horizontal bar graph, 3 x 2 inches.
    pub fn add_horizontal_bar_graph<S: AsRef<str>>(
        &mut self,
        title: &str,
        labels: &[S],
        values: &[f64],
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let chart = BarGraph::horizontal(title, owned(labels), values.to_vec())
            .with_axis_labels(x_label, y_label);
        self.add_chart(&chart)
    }

    /// Pie chart, 3 x 2 inches.
    pub fn add_pie_chart<S: AsRef<str>>(&mut self, title: &str, labels: &[S], values: &[f64]) -> Result<()> {
        self.add_chart(&PieChart::new(title, owned(labels), values.to_vec()))
    }

    /// Line chart, 3 x 2 inches.
    pub fn add_line_chart<S: AsRef<str>>(
        &mut self,
        title: &str,
        labels: &[S],
        values: &[f64],
        x_label: &str,
        y_label: &str,
    ) -> Result<()> {
        let chart =
            LineChart::new(title, owned(labels), values.to_vec()).with_axis_labels(x_label, y_label);
        self.add_chart(&chart)
    }

    /// Ten-bin histogram of `data`, 3 x 2 inches.
    pub fn add_histogram(&mut self, title: &str, data: &[f64], x_label: &str, y_label: &str) -> Result<()> {
        let chart = Histogram::new(title, data.to_vec()).with_axis_labels(x_label, y_label);
        self.add_chart(&chart)
    }

    /// Add a table with the default colours.
    pub fn create_table<R, C, H>(&mut self, data: &[R], columns: &[H]) -> Result<()>
    where
        R: AsRef<[C]>,
        C: Display,
        H: Display,
    {
        self.create_table_with_style(data, columns, &TableStyle::default())
    }

    /// Add a table: a header row with `columns`, then one row per entry of
    /// `data`.
    pub fn create_table_with_style<R, C, H>(
        &mut self,
        data: &[R],
        columns: &[H],
        style: &TableStyle,
    ) -> Result<()>
    where
        R: AsRef<[C]>,
        C: Display,
        H: Display,
    {
        let family = self.config.font_family.clone();
        table::render_table(&mut self.canvas, &family, data, columns, style).map_err(|err| {
            log::warn!("Rejected table: {}", err);
            err
        })
    }

    /// Close the document and serialize it.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.canvas.to_bytes()
    }

    /// Close the document and write it to `path`.
    pub fn output(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.canvas.output(path)
    }

    /// Write the document to `<report name>.pdf` in the working directory.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.output_path()?;
        self.output(&path)?;
        Ok(path)
    }

    /// File name [`save`](Self::save) writes to.
    pub fn output_path(&self) -> Result<PathBuf> {
        if self.config.report_name.is_empty() {
            return Err(Error::MissingArgument("You must specify a report name"));
        }
        Ok(PathBuf::from(format!("{}.pdf", self.config.report_name)))
    }

    fn install_header(&mut self) {
        let header = ReportHeader::from_config(&self.config);
        self.canvas.set_decorator(Some(Box::new(header)));
    }
}

/// Chart title made safe as a file name: path separators, reserved and
/// control characters become `_`.
fn chart_file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match stem.as_str() {
        "." | ".." => stem.replace('.', "_"),
        _ => stem,
    }
}

fn owned<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels.iter().map(|l| l.as_ref().to_string()).collect()
}
