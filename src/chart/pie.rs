//! Pie chart.

use super::{require_labels, require_same_len, require_title, require_values};
use super::{Chart, ChartStyle, FigureSize, DEFAULT_DPI};
use crate::error::{Error, Result};
use crate::layout::{Figure, HAlign, TextAnchor, VAlign};

/// Distance of wedge labels from the centre, relative to the radius.
const LABEL_DISTANCE: f32 = 1.1;

/// Pie chart with one wedge per label.
///
/// Wedges start at 0 degrees (3 o'clock) and run counter-clockwise, each
/// taking a share of the circle proportional to its value.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    /// Chart title
    pub title: String,
    /// Wedge labels
    pub labels: Vec<String>,
    /// Wedge values
    pub values: Vec<f64>,
    /// Figure dimensions
    pub size: FigureSize,
}

impl PieChart {
    /// Pie chart, 3 x 2 inches.
    pub fn new(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            labels,
            values,
            size: FigureSize::new(3.0, 2.0, DEFAULT_DPI),
        }
    }

    /// Set the figure size.
    pub fn with_size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }

    /// Start and end angle in degrees of every wedge.
    pub fn wedge_angles(&self) -> Vec<(f32, f32)> {
        let total: f64 = self.values.iter().sum();
        let mut angle = 0.0f64;
        self.values
            .iter()
            .map(|v| {
                let start = angle;
                angle += v / total * 360.0;
                (start as f32, angle as f32)
            })
            .collect()
    }
}

impl Chart for PieChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn figure_size(&self) -> FigureSize {
        self.size
    }

    fn validate(&self) -> Result<()> {
        require_labels(&self.labels)?;
        require_values(&self.values)?;
        require_same_len(&self.labels, &self.values)?;
        require_title(&self.title)?;
        if let Some(negative) = self.values.iter().find(|v| **v < 0.0) {
            return Err(Error::invalid(
                "values",
                format!("pie values cannot be negative, got {}", negative),
            ));
        }
        if self.values.iter().sum::<f64>() <= 0.0 {
            return Err(Error::invalid("values", "pie values sum to zero"));
        }
        self.size.validate()
    }

    fn draw(&self, fig: &mut Figure<'_>, style: &ChartStyle) -> Result<()> {
        let s = fig.scale();
        let pad = 4.0 * s;
        let title_h = fig.line_height(style.title_size) + pad;
        let label_h = fig.line_height(style.font_size);
        let widest = self
            .labels
            .iter()
            .map(|l| fig.text_width(l, style.font_size, false))
            .fold(0.0f32, f32::max);

        let avail_h = fig.height() - title_h - pad;
        let by_height = (avail_h / 2.0 - label_h) / LABEL_DISTANCE;
        let by_width = (fig.width() / 2.0 - widest - pad) / LABEL_DISTANCE;
        let radius = by_height.min(by_width).max(fig.height().min(fig.width()) * 0.15);
        let cx = fig.width() / 2.0;
        let cy = pad + avail_h / 2.0;

        for (i, (start, end)) in self.wedge_angles().into_iter().enumerate() {
            fig.wedge(cx, cy, radius, start, end, style.color(i), None);
        }
        for ((start, end), label) in self.wedge_angles().into_iter().zip(&self.labels) {
            let mid = ((start + end) / 2.0).to_radians();
            let (sin, cos) = mid.sin_cos();
            let h = if cos >= 0.0 { HAlign::Left } else { HAlign::Right };
            fig.text(
                label,
                cx + radius * LABEL_DISTANCE * cos,
                cy + radius * LABEL_DISTANCE * sin,
                style.font_size,
                TextAnchor::new(h, VAlign::Center),
                false,
            );
        }

        fig.text(
            &self.title,
            cx,
            fig.height() - pad,
            style.title_size,
            TextAnchor::new(HAlign::Center, VAlign::Top),
            false,
        );
        Ok(())
    }
}
