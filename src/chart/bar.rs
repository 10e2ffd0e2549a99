//! Vertical and horizontal bar graphs.

use super::axis::{labelled, nice_ticks, AxesSpec, Frame, Scale, XLabelMode};
use super::{require_labels, require_same_len, require_title, require_values};
use super::{Chart, ChartStyle, FigureSize, DEFAULT_DPI};
use crate::error::Result;
use crate::layout::Figure;

/// Bar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories along x, bars grow upwards
    Vertical,
    /// Categories along y, bars grow to the right
    Horizontal,
}

/// Share of a category slot covered by its bar.
const BAR_WIDTH: f32 = 0.8;

/// Bar graph with one bar per label.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGraph {
    /// Chart title
    pub title: String,
    /// Category labels
    pub labels: Vec<String>,
    /// Bar values
    pub values: Vec<f64>,
    /// Label under the x axis
    pub x_label: String,
    /// Label left of the y axis
    pub y_label: String,
    /// Bar direction
    pub orientation: Orientation,
    /// Figure dimensions
    pub size: FigureSize,
}

impl BarGraph {
    /// Vertical bars, 2 x 2.2 inches.
    pub fn vertical(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            labels,
            values,
            x_label: String::new(),
            y_label: String::new(),
            orientation: Orientation::Vertical,
            size: FigureSize::new(2.0, 2.2, DEFAULT_DPI),
        }
    }

    /// Horizontal bars, 3 x 2 inches.
    pub fn horizontal(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            size: FigureSize::new(3.0, 2.0, DEFAULT_DPI),
            ..Self::vertical(title, labels, values)
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

    fn value_ticks(&self) -> Vec<(f64, String)> {
        let lo = self.values.iter().copied().fold(0.0f64, f64::min);
        let hi = self.values.iter().copied().fold(0.0f64, f64::max);
        labelled(&nice_ticks(lo, hi, 6))
    }

    fn category_ticks(&self) -> Vec<(f64, String)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (i as f64, label.clone()))
            .collect()
    }

    fn draw_vertical(&self, fig: &mut Figure<'_>, style: &ChartStyle) {
        let y_ticks = self.value_ticks();
        let x_ticks = self.category_ticks();
        let spec = AxesSpec {
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            y_ticks: &y_ticks,
            x_ticks: &x_ticks,
        };

        let n = self.labels.len();
        let mut mode = XLabelMode::Horizontal;
        let mut frame = spec.layout(fig, style, mode);
        let widest = self
            .labels
            .iter()
            .map(|l| fig.text_width(l, style.tick_size, false))
            .fold(0.0f32, f32::max);
        if widest > frame.width() / n as f32 * 0.95 {
            mode = XLabelMode::Slanted;
            frame = spec.layout(fig, style, mode);
        }

        let (x_scale, y_scale) = vertical_scales(frame, n, &y_ticks);
        let slot = frame.width() / n as f32;
        let base = y_scale.map(0.0);
        for (i, value) in self.values.iter().enumerate() {
            let center = x_scale.map(i as f64);
            let top = y_scale.map(*value);
            fig.fill_rect(
                center - slot * BAR_WIDTH / 2.0,
                base.min(top),
                slot * BAR_WIDTH,
                (top - base).abs(),
                style.color(0),
            );
        }

        spec.draw(fig, style, frame, x_scale, y_scale, mode);
    }

    fn draw_horizontal(&self, fig: &mut Figure<'_>, style: &ChartStyle) {
        let x_ticks = self.value_ticks();
        let y_ticks = self.category_ticks();
        let spec = AxesSpec {
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            y_ticks: &y_ticks,
            x_ticks: &x_ticks,
        };
        let frame = spec.layout(fig, style, XLabelMode::Horizontal);

        let n = self.labels.len();
        let first = x_ticks.first().map(|t| t.0).unwrap_or(0.0);
        let last = x_ticks.last().map(|t| t.0).unwrap_or(1.0);
        let x_scale = Scale::new(first, last, frame.left, frame.right);
        let y_scale = Scale::new(-0.5, n as f64 - 0.5, frame.bottom, frame.top);

        let slot = frame.height() / n as f32;
        let base = x_scale.map(0.0);
        for (i, value) in self.values.iter().enumerate() {
            let center = y_scale.map(i as f64);
            let end = x_scale.map(*value);
            fig.fill_rect(
                base.min(end),
                center - slot * BAR_WIDTH / 2.0,
                (end - base).abs(),
                slot * BAR_WIDTH,
                style.color(0),
            );
        }

        spec.draw(fig, style, frame, x_scale, y_scale, XLabelMode::Horizontal);
    }
}

fn vertical_scales(frame: Frame, n: usize, y_ticks: &[(f64, String)]) -> (Scale, Scale) {
    let first = y_ticks.first().map(|t| t.0).unwrap_or(0.0);
    let last = y_ticks.last().map(|t| t.0).unwrap_or(1.0);
    (
        Scale::new(-0.5, n as f64 - 0.5, frame.left, frame.right),
        Scale::new(first, last, frame.bottom, frame.top),
    )
}

impl Chart for BarGraph {
    fn title(&self) -> &str {
        &self.title
    }

    fn figure_size(&self) -> FigureSize {
        self.size
    }

    fn validate(&self) -> Result<()> {
        require_labels(&self.labels)?;
        require_values(&self.values)?;
        self.size.validate()?;
        require_title(&self.title)?;
        require_same_len(&self.labels, &self.values)
    }

    fn draw(&self, figure: &mut Figure<'_>, style: &ChartStyle) -> Result<()> {
        match self.orientation {
            Orientation::Vertical => self.draw_vertical(figure, style),
            Orientation::Horizontal => self.draw_horizontal(figure, style),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let v = BarGraph::vertical("t", labels(&["a"]), vec![1.0]);
        assert_eq!(v.size, FigureSize::new(2.0, 2.2, 120));
        assert_eq!(v.orientation, Orientation::Vertical);
        let h = BarGraph::horizontal("t", labels(&["a"]), vec![1.0]);
        assert_eq!(h.size, FigureSize::new(3.0, 2.0, 120));
        assert_eq!(h.orientation, Orientation::Horizontal);
    }

    #[test]
    fn test_validation_order() {
        let chart = BarGraph::vertical("", Vec::new(), Vec::new());
        assert_eq!(chart.validate().unwrap_err().to_string(), "Labels must be specified");

        let chart = BarGraph::vertical("", labels(&["a"]), Vec::new());
        assert_eq!(chart.validate().unwrap_err().to_string(), "Values must be specified");

        let chart = BarGraph::vertical("", labels(&["a"]), vec![1.0])
            .with_size(FigureSize::new(0.0, 2.0, 120));
        assert_eq!(
            chart.validate().unwrap_err().to_string(),
            "Please specify the width and height of the graph"
        );

        let chart = BarGraph::vertical("", labels(&["a"]), vec![1.0]);
        assert_eq!(chart.validate().unwrap_err().to_string(), "A title must be specified");

        let chart = BarGraph::vertical("t", labels(&["a", "b"]), vec![1.0]);
        assert!(matches!(chart.validate(), Err(Error::LengthMismatch { .. })));

        let chart = BarGraph::vertical("t", labels(&["a", "b"]), vec![1.0, 2.0]);
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn test_value_ticks_include_zero() {
        let chart = BarGraph::vertical("t", labels(&["a", "b"]), vec![3.0, 7.0]);
        let ticks = chart.value_ticks();
        assert_eq!(ticks[0].0, 0.0);
        assert!(ticks.last().unwrap().0 >= 7.0);

        let chart = BarGraph::vertical("t", labels(&["a", "b"]), vec![-2.0, 5.0]);
        let ticks = chart.value_ticks();
        assert!(ticks[0].0 <= -2.0);
    }
}
