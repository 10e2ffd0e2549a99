//! Charts drawn as vector graphics.
//!
//! Each chart validates its inputs, then draws itself into a
//! [`Figure`](crate::layout::Figure) block reserved on the page. A figure of
//! `w` x `h` inches at `dpi` occupies `w * dpi` x `h * dpi` points, and text
//! and line widths scale by `dpi / 72`.
//!
//! # Example
//!
//! ```ignore
//! use pdf_report::chart::BarGraph;
//!
//! let chart = BarGraph::vertical("Pets", vec!["Cat".into(), "Dog".into()], vec![3.0, 5.0])
//!     .with_axis_labels("Animal", "Quantity");
//! report.add_chart(&chart)?;
//! ```

mod axis;
mod bar;
mod histogram;
mod line;
mod pie;

pub use axis::{format_ticks, nice_ticks};
pub use bar::{BarGraph, Orientation};
pub use histogram::{histogram_bins, Histogram, HISTOGRAM_BINS};
pub use line::LineChart;
pub use pie::PieChart;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Color;
use crate::layout::Figure;

/// Default rendering resolution (dots per inch).
pub const DEFAULT_DPI: u32 = 120;

/// Figure dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    /// Width in inches
    pub width_in: f32,
    /// Height in inches
    pub height_in: f32,
    /// Dots per inch
    pub dpi: u32,
}

impl FigureSize {
    /// Create a figure size.
    pub const fn new(width_in: f32, height_in: f32, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    /// Width on the page in points.
    pub fn width_pt(&self) -> f32 {
        self.width_in * self.dpi as f32
    }

    /// Height on the page in points.
    pub fn height_pt(&self) -> f32 {
        self.height_in * self.dpi as f32
    }

    /// Scale factor for font sizes and line widths.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }

    /// Check that the figure has a drawable size.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.width_in) || !positive(self.height_in) {
            return Err(Error::MissingArgument(
                "Please specify the width and height of the graph",
            ));
        }
        if self.dpi == 0 {
            return Err(Error::MissingArgument("Please specify the dpi of the image"));
        }
        Ok(())
    }
}

/// Fonts and colours shared by all charts. Sizes are in points at 72 dpi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Base text size (pie labels)
    pub font_size: f32,
    /// Chart title size
    pub title_size: f32,
    /// Axis label size
    pub label_size: f32,
    /// Tick label size
    pub tick_size: f32,
    /// Series colours, used in order
    pub palette: Vec<Color>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            title_size: 6.0,
            label_size: 6.0,
            tick_size: 6.0,
            palette: default_palette(),
        }
    }
}

impl ChartStyle {
    /// Colour for series `index`, cycling through the palette.
    pub fn color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return Color::black();
        }
        self.palette[index % self.palette.len()]
    }

    /// Check sizes and palette.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("font_size", self.font_size),
            ("title_size", self.title_size),
            ("label_size", self.label_size),
            ("tick_size", self.tick_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::Config(format!(
                    "chart {} must be positive, got {}",
                    name, size
                )));
            }
        }
        if self.palette.is_empty() {
            return Err(Error::Config("chart palette cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// The ten-colour categorical palette.
pub fn default_palette() -> Vec<Color> {
    [
        (0x1f, 0x77, 0xb4),
        (0xff, 0x7f, 0x0e),
        (0x2c, 0xa0, 0x2c),
        (0xd6, 0x27, 0x28),
        (0x94, 0x67, 0xbd),
        (0x8c, 0x56, 0x4b),
        (0xe3, 0x77, 0xc2),
        (0x7f, 0x7f, 0x7f),
        (0xbc, 0xbd, 0x22),
        (0x17, 0xbe, 0xcf),
    ]
    .iter()
    .map(|&(r, g, b)| Color::from_rgb8(r, g, b))
    .collect()
}

/// A chart that can be placed in a report.
pub trait Chart {
    /// Chart title.
    fn title(&self) -> &str;

    /// Figure dimensions.
    fn figure_size(&self) -> FigureSize;

    /// Check the inputs; an error leaves the document untouched.
    fn validate(&self) -> Result<()>;

    /// Draw into a figure of `figure_size()`.
    fn draw(&self, figure: &mut Figure<'_>, style: &ChartStyle) -> Result<()>;
}

pub(crate) fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::MissingArgument("A title must be specified"));
    }
    Ok(())
}

pub(crate) fn require_labels(labels: &[String]) -> Result<()> {
    if labels.is_empty() {
        return Err(Error::MissingArgument("Labels must be specified"));
    }
    Ok(())
}

/// Largest magnitude a plotted value may have. Axis ranges and nice ticks
/// reach up to ten tick steps past the data and must stay finite.
pub const MAX_PLOT_VALUE: f64 = 1e300;

pub(crate) fn require_values(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::MissingArgument("Values must be specified"));
    }
    require_plottable("values", values)
}

pub(crate) fn require_plottable(what: &'static str, values: &[f64]) -> Result<()> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(Error::invalid(what, format!("{} is not a finite number", bad)));
    }
    if let Some(bad) = values.iter().find(|v| v.abs() > MAX_PLOT_VALUE) {
        return Err(Error::invalid(
            what,
            format!("{} is outside the plottable range of +/-{:e}", bad, MAX_PLOT_VALUE),
        ));
    }
    Ok(())
}

pub(crate) fn require_same_len(labels: &[String], values: &[f64]) -> Result<()> {
    if labels.len() != values.len() {
        return Err(Error::LengthMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_size_points() {
        let size = FigureSize::new(2.0, 2.2, 120);
        assert_eq!(size.width_pt(), 240.0);
        assert!((size.height_pt() - 264.0).abs() < 1e-3);
        assert!((size.scale() - 120.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn test_figure_size_validation() {
        assert!(FigureSize::new(3.0, 2.0, 120).validate().is_ok());
        let err = FigureSize::new(0.0, 2.0, 120).validate().unwrap_err();
        assert_eq!(err.to_string(), "Please specify the width and height of the graph");
        let err = FigureSize::new(3.0, 2.0, 0).validate().unwrap_err();
        assert_eq!(err.to_string(), "Please specify the dpi of the image");
    }

    #[test]
    fn test_style_defaults() {
        let style = ChartStyle::default();
        assert_eq!(style.font_size, 8.0);
        assert_eq!(style.title_size, 6.0);
        assert_eq!(style.palette.len(), 10);
        assert_eq!(style.color(10), style.color(0));
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_style_validation() {
        let style = ChartStyle {
            palette: Vec::new(),
            ..ChartStyle::default()
        };
        assert!(matches!(style.validate(), Err(Error::Config(_))));
        let style = ChartStyle {
            tick_size: -1.0,
            ..ChartStyle::default()
        };
        assert!(matches!(style.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_requirements() {
        assert_eq!(
            require_title(" ").unwrap_err().to_string(),
            "A title must be specified"
        );
        assert_eq!(
            require_labels(&[]).unwrap_err().to_string(),
            "Labels must be specified"
        );
        assert_eq!(
            require_values(&[]).unwrap_err().to_string(),
            "Values must be specified"
        );
        assert!(require_values(&[1.0, f64::NAN]).is_err());
        assert!(matches!(
            require_values(&[-1e308, 1e308]),
            Err(Error::InvalidArgument { what: "values", .. })
        ));
        assert!(require_values(&[-MAX_PLOT_VALUE, MAX_PLOT_VALUE]).is_ok());
        assert!(matches!(
            require_same_len(&["a".to_string()], &[1.0, 2.0]),
            Err(Error::LengthMismatch { labels: 1, values: 2 })
        ));
    }
}
