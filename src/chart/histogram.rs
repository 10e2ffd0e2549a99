//! Histogram of a numeric sample.

use super::axis::{labelled, nice_ticks, AxesSpec, Scale, XLabelMode};
use super::{require_plottable, require_title, Chart, ChartStyle, FigureSize, DEFAULT_DPI};
use crate::error::{Error, Result};
use crate::layout::Figure;

/// Number of equal-width bins.
pub const HISTOGRAM_BINS: usize = 10;

/// Split `data` into `bins` equal-width bins over `[min, max]`.
///
/// Returns the `bins + 1` edges and the count per bin. Every bin is half-open
/// except the last, which includes `max`. A sample with a single distinct
/// value `v` is binned over `[v - 0.5, v + 0.5]`. Empty data yields an empty
/// result.
pub fn histogram_bins(data: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    if data.is_empty() || bins == 0 {
        return (Vec::new(), Vec::new());
    }
    let mut lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &value in data {
        let index = ((value - lo) / width).floor() as usize;
        // Values equal to max land one past the end.
        counts[index.min(bins - 1)] += 1;
    }

    (edges, counts)
}

/// Histogram with ten bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Chart title
    pub title: String,
    /// Sample values
    pub data: Vec<f64>,
    /// Label under the x axis
    pub x_label: String,
    /// Label left of the y axis
    pub y_label: String,
    /// Figure dimensions
    pub size: FigureSize,
}

impl Histogram {
    /// Histogram of `data`, 3 x 2 inches.
    pub fn new(title: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            title: title.into(),
            data,
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

impl Chart for Histogram {
    fn title(&self) -> &str {
        &self.title
    }

    fn figure_size(&self) -> FigureSize {
        self.size
    }

    fn validate(&self) -> Result<()> {
        require_title(&self.title)?;
        if self.data.is_empty() {
            return Err(Error::MissingArgument("Values must be specified"));
        }
        require_plottable("data", &self.data)?;
        self.size.validate()
    }

    fn draw(&self, fig: &mut Figure<'_>, style: &ChartStyle) -> Result<()> {
        let (edges, counts) = histogram_bins(&self.data, HISTOGRAM_BINS);
        let (Some(&lo), Some(&hi)) = (edges.first(), edges.last()) else {
            return Ok(());
        };
        let max_count = counts.iter().copied().max().unwrap_or(0);

        let x_ticks: Vec<(f64, String)> = labelled(&nice_ticks(lo, hi, 6))
            .into_iter()
            .filter(|(v, _)| *v >= lo - 1e-9 * (hi - lo) && *v <= hi + 1e-9 * (hi - lo))
            .collect();
        let y_ticks = labelled(&nice_ticks(0.0, max_count as f64, 6));

        let spec = AxesSpec {
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            y_ticks: &y_ticks,
            x_ticks: &x_ticks,
        };
        let frame = spec.layout(fig, style, XLabelMode::Horizontal);

        // Five percent padding on both sides of the data, as plotting tools do.
        let pad = (hi - lo) * 0.05;
        let x_scale = Scale::new(lo - pad, hi + pad, frame.left, frame.right);
        let y_top = y_ticks.last().map(|t| t.0).unwrap_or(1.0);
        let y_scale = Scale::new(0.0, y_top, frame.bottom, frame.top);

        for (i, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let x0 = x_scale.map(edges[i]);
            let x1 = x_scale.map(edges[i + 1]);
            let y1 = y_scale.map(count as f64);
            fig.fill_rect(x0, frame.bottom, x1 - x0, y1 - frame.bottom, style.color(0));
        }

        spec.draw(fig, style, frame, x_scale, y_scale, XLabelMode::Horizontal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bins_sample() {
        let (edges, counts) = histogram_bins(&[2.0, 2.0, 3.0, 7.0, 4.0, 4.0, 5.0, 7.0], 10);
        assert_eq!(edges.len(), 11);
        assert_eq!(edges[0], 2.0);
        assert_eq!(edges[10], 7.0);
        // Width 0.5: [2, 2.5) [2.5, 3) [3, 3.5) ... [6.5, 7]
        assert_eq!(counts, vec![2, 0, 1, 0, 2, 0, 1, 0, 0, 2]);
    }

    #[test]
    fn test_bins_single_value() {
        let (edges, counts) = histogram_bins(&[4.0, 4.0, 4.0], 10);
        assert_eq!(edges[0], 3.5);
        assert_eq!(edges[10], 4.5);
        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert_eq!(counts[5], 3);
    }

    #[test]
    fn test_bins_empty() {
        let (edges, counts) = histogram_bins(&[], 10);
        assert!(edges.is_empty());
        assert!(counts.is_empty());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Histogram::new("", vec![1.0]).validate().unwrap_err().to_string(),
            "A title must be specified"
        );
        assert_eq!(
            Histogram::new("h", Vec::new()).validate().unwrap_err().to_string(),
            "Values must be specified"
        );
        assert!(Histogram::new("h", vec![f64::INFINITY]).validate().is_err());
        assert!(Histogram::new("h", vec![1.0, 2.0]).validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_counts_sum_to_len(data in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let (edges, counts) = histogram_bins(&data, HISTOGRAM_BINS);
            prop_assert_eq!(counts.iter().sum::<usize>(), data.len());
            prop_assert_eq!(edges.len(), HISTOGRAM_BINS + 1);
            for pair in edges.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
