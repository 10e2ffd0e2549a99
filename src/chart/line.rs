//! Line chart over categorical x values.

use super::axis::{labelled, nice_ticks, AxesSpec, Scale, XLabelMode};
use super::{require_labels, require_same_len, require_title, require_values};
use super::{Chart, ChartStyle, FigureSize, DEFAULT_DPI};
use crate::error::Result;
use crate::layout::Figure;

/// Series line width (nominal points).
const LINE_WIDTH: f32 = 1.5;

/// Line chart: one point per label, joined in order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Chart title
    pub title: String,
    /// X positions, evenly spaced in the given order
    pub labels: Vec<String>,
    /// Y values
    pub values: Vec<f64>,
    /// Label under the x axis
    pub x_label: String,
    /// Label left of the y axis
    pub y_label: String,
    /// Figure dimensions
    pub size: FigureSize,
}

impl LineChart {
    /// Line chart, 3 x 2 inches.
    pub fn new(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            labels,
            values,
            x_label: String::new(),
            y_label: String::new(),
            size: FigureSize::new(3.0, 2.0, DEFAULT_DPI),
        }
    }

    /// Set the axis labels.
    pub fn with_axis_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Set the figure size.
    pub fn with_size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }
}

impl Chart for LineChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn figure_size(&self) -> FigureSize {
        self.size
    }

    fn validate(&self) -> Result<()> {
        require_title(&self.title)?;
        require_labels(&self.labels)?;
        require_values(&self.values)?;
        require_same_len(&self.labels, &self.values)?;
        self.size.validate()
    }

    fn draw(&self, fig: &mut Figure<'_>, style: &ChartStyle) -> Result<()> {
        let lo = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let y_ticks = labelled(&nice_ticks(lo, hi, 6));
        let x_ticks: Vec<(f64, String)> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i as f64, l.clone()))
            .collect();

        let spec = AxesSpec {
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            y_ticks: &y_ticks,
            x_ticks: &x_ticks,
        };
        let frame = spec.layout(fig, style, XLabelMode::Horizontal);

        let last_index = self.labels.len().saturating_sub(1) as f64;
        let pad = (last_index * 0.05).max(0.5);
        let x_scale = Scale::new(-pad, last_index + pad, frame.left, frame.right);
        let first = y_ticks.first().map(|t| t.0).unwrap_or(0.0);
        let last = y_ticks.last().map(|t| t.0).unwrap_or(1.0);
        let y_scale = Scale::new(first, last, frame.bottom, frame.top);

        let points: Vec<(f32, f32)> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (x_scale.map(i as f64), y_scale.map(*v)))
            .collect();
        if let [(x, y)] = points.as_slice() {
            fig.circle(*x, *y, 2.0 * fig.scale(), style.color(0));
        } else {
            fig.polyline(&points, style.color(0), LINE_WIDTH);
        }

        spec.draw(fig, style, frame, x_scale, y_scale, XLabelMode::Horizontal);
        Ok(())
    }
}
