//! Axis ticks and the common axes frame.

use super::ChartStyle;
use crate::geometry::Color;
use crate::layout::{Figure, HAlign, TextAnchor, VAlign};

/// Tick mark length (nominal points).
const TICK_LEN: f32 = 3.5;
/// Gap between a tick mark and its label.
const TICK_PAD: f32 = 2.0;
/// Gap between tick labels and the axis label.
const LABEL_PAD: f32 = 3.0;
/// Gap between the title and the plot area.
const TITLE_PAD: f32 = 4.0;
/// Gap kept free along the figure edges.
const EDGE_PAD: f32 = 4.0;
/// Axes line width.
const FRAME_WIDTH: f32 = 0.8;

/// Evenly spaced "nice" tick values covering `[min, max]`.
///
/// Steps are 1, 2, 2.5 or 5 times a power of ten, chosen so that at most
/// `max_ticks` ticks are produced. The first tick is at or below `min` and the
/// last at or above `max`. A degenerate range is widened around its value.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let (mut lo, mut hi) = if min <= max { (min, max) } else { (max, min) };
    if !lo.is_finite() || !hi.is_finite() {
        return vec![0.0, 1.0];
    }
    if hi - lo < f64::EPSILON * hi.abs().max(1.0) {
        if lo == 0.0 {
            hi = 1.0;
        } else {
            let pad = lo.abs() * 0.1;
            lo -= pad;
            hi += pad;
        }
    }

    let intervals = max_ticks.max(2) as f64 - 1.0;
    let mut candidates = Vec::new();
    let raw = (hi - lo) / intervals;
    let magnitude = 10f64.powf(raw.log10().floor());
    for exp_shift in [1.0, 10.0] {
        for nice in [1.0, 2.0, 2.5, 5.0] {
            candidates.push(nice * magnitude * exp_shift);
        }
    }

    for step in candidates {
        let start = (lo / step + 1e-9).floor() * step;
        let end = (hi / step - 1e-9).ceil() * step;
        let count = ((end - start) / step).round() as usize + 1;
        if count <= max_ticks.max(2) {
            return (0..count).map(|i| clean(start + step * i as f64, step)).collect();
        }
    }

    vec![lo, hi]
}

/// Round away floating point noise relative to the tick step.
fn clean(value: f64, step: f64) -> f64 {
    let decimals = (6 - step.log10().floor() as i32).clamp(0, 15);
    let factor = 10f64.powi(decimals);
    let cleaned = (value * factor).round() / factor;
    if cleaned == 0.0 {
        0.0
    } else {
        cleaned
    }
}

/// Format ticks with the fewest decimals that represent every value.
pub fn format_ticks(ticks: &[f64]) -> Vec<String> {
    let decimals = (0..=6)
        .find(|&d| {
            let factor = 10f64.powi(d);
            ticks
                .iter()
                .all(|v| ((v * factor).round() / factor - v).abs() <= 1e-9 * v.abs().max(1.0))
        })
        .unwrap_or(6) as usize;

    ticks
        .iter()
        .map(|v| {
            let s = format!("{:.*}", decimals, v);
            if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
                s[1..].to_string()
            } else {
                s
            }
        })
        .collect()
}

/// Linear map from a data interval onto a figure interval.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scale {
    d0: f64,
    d1: f64,
    p0: f32,
    p1: f32,
}

impl Scale {
    pub(crate) fn new(d0: f64, d1: f64, p0: f32, p1: f32) -> Self {
        Self { d0, d1, p0, p1 }
    }

    pub(crate) fn map(&self, value: f64) -> f32 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return (self.p0 + self.p1) / 2.0;
        }
        self.p0 + ((value - self.d0) / span) as f32 * (self.p1 - self.p0)
    }
}

/// Plot area in figure coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Frame {
    pub(crate) fn width(&self) -> f32 {
        self.right - self.left
    }

    pub(crate) fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Texts and tick labels around a rectangular plot area.
pub(crate) struct AxesSpec<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Labels along the left edge, bottom to top
    pub y_ticks: &'a [(f64, String)],
    /// Labels along the bottom edge, left to right
    pub x_ticks: &'a [(f64, String)],
}

/// How x tick labels are set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum XLabelMode {
    Horizontal,
    /// Rotated 45 degrees, right-aligned under the tick
    Slanted,
}

impl<'a> AxesSpec<'a> {
    /// Fit the plot area inside the figure, leaving room for every text.
    pub(crate) fn layout(&self, fig: &Figure<'_>, style: &ChartStyle, mode: XLabelMode) -> Frame {
        let s = fig.scale();
        let tick_h = fig.line_height(style.tick_size);

        let y_tick_w = self
            .y_ticks
            .iter()
            .map(|(_, l)| fig.text_width(l, style.tick_size, false))
            .fold(0.0f32, f32::max);
        let mut left = EDGE_PAD * s + y_tick_w + (TICK_LEN + TICK_PAD) * s;
        if !self.y_label.is_empty() {
            left += fig.line_height(style.label_size) + LABEL_PAD * s;
        }

        let x_tick_h = match mode {
            XLabelMode::Horizontal => tick_h,
            XLabelMode::Slanted => {
                let widest = self
                    .x_ticks
                    .iter()
                    .map(|(_, l)| fig.text_width(l, style.tick_size, false))
                    .fold(0.0f32, f32::max);
                (widest + tick_h) * std::f32::consts::FRAC_1_SQRT_2
            },
        };
        let mut bottom = EDGE_PAD * s + (TICK_LEN + TICK_PAD) * s;
        if !self.x_ticks.is_empty() {
            bottom += x_tick_h;
        }
        if !self.x_label.is_empty() {
            bottom += fig.line_height(style.label_size) + LABEL_PAD * s;
        }

        let mut top = fig.height() - EDGE_PAD * s;
        if !self.title.is_empty() {
            top -= fig.line_height(style.title_size) + TITLE_PAD * s;
        }

        // Half of the last x tick label may hang past the frame.
        let overhang = self
            .x_ticks
            .last()
            .filter(|_| mode == XLabelMode::Horizontal)
            .map(|(_, l)| fig.text_width(l, style.tick_size, false) / 2.0)
            .unwrap_or(0.0);
        let right = fig.width() - EDGE_PAD * s - overhang.min(fig.width() * 0.2);

        // Keep a minimal plot area on tiny figures.
        let min_w = fig.width() * 0.2;
        let min_h = fig.height() * 0.2;
        Frame {
            left: left.min(right - min_w),
            bottom: bottom.min(top - min_h),
            right,
            top,
        }
    }

    /// Draw the frame, ticks, tick labels, axis labels and title.
    pub(crate) fn draw(
        &self,
        fig: &mut Figure<'_>,
        style: &ChartStyle,
        frame: Frame,
        x_scale: Scale,
        y_scale: Scale,
        mode: XLabelMode,
    ) {
        let s = fig.scale();
        let black = Color::black();
        fig.stroke_rect(frame.left, frame.bottom, frame.width(), frame.height(), black, FRAME_WIDTH);

        for (value, label) in self.y_ticks {
            let y = y_scale.map(*value);
            fig.line(frame.left - TICK_LEN * s, y, frame.left, y, black, FRAME_WIDTH);
            fig.text(
                label,
                frame.left - (TICK_LEN + TICK_PAD) * s,
                y,
                style.tick_size,
                TextAnchor::new(HAlign::Right, VAlign::Center),
                false,
            );
        }

        let label_top = frame.bottom - (TICK_LEN + TICK_PAD) * s;
        for (value, label) in self.x_ticks {
            let x = x_scale.map(*value);
            fig.line(x, frame.bottom - TICK_LEN * s, x, frame.bottom, black, FRAME_WIDTH);
            match mode {
                XLabelMode::Horizontal => fig.text(
                    label,
                    x,
                    label_top,
                    style.tick_size,
                    TextAnchor::new(HAlign::Center, VAlign::Top),
                    false,
                ),
                XLabelMode::Slanted => fig.rotated_text(
                    label,
                    x,
                    label_top,
                    style.tick_size,
                    TextAnchor::new(HAlign::Right, VAlign::Top),
                    false,
                    45.0,
                ),
            }
        }

        if !self.x_label.is_empty() {
            fig.text(
                self.x_label,
                (frame.left + frame.right) / 2.0,
                EDGE_PAD * s,
                style.label_size,
                TextAnchor::new(HAlign::Center, VAlign::Bottom),
                false,
            );
        }
        if !self.y_label.is_empty() {
            fig.rotated_text(
                self.y_label,
                EDGE_PAD * s,
                (frame.bottom + frame.top) / 2.0,
                style.label_size,
                TextAnchor::new(HAlign::Center, VAlign::Top),
                false,
                90.0,
            );
        }
        if !self.title.is_empty() {
            fig.text(
                self.title,
                (frame.left + frame.right) / 2.0,
                frame.top + TITLE_PAD * s,
                style.title_size,
                TextAnchor::new(HAlign::Center, VAlign::Bottom),
                false,
            );
        }
    }
}

/// Pair tick values with their formatted labels.
pub(crate) fn labelled(ticks: &[f64]) -> Vec<(f64, String)> {
    ticks.iter().copied().zip(format_ticks(ticks)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nice_ticks_simple() {
        assert_eq!(nice_ticks(0.0, 2.0, 6), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(nice_ticks(0.0, 10.0, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.0, 7.0, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_nice_ticks_degenerate() {
        assert_eq!(nice_ticks(0.0, 0.0, 6), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        let ticks = nice_ticks(5.0, 5.0, 6);
        assert!(ticks[0] < 5.0 && *ticks.last().unwrap() > 5.0);
    }

    #[test]
    fn test_nice_ticks_negative() {
        let ticks = nice_ticks(-3.0, 4.0, 6);
        assert!(ticks[0] <= -3.0);
        assert!(*ticks.last().unwrap() >= 4.0);
        assert!(ticks.contains(&0.0));
    }

    #[test]
    fn test_format_ticks() {
        assert_eq!(format_ticks(&[0.0, 0.5, 1.0]), vec!["0.0", "0.5", "1.0"]);
        assert_eq!(format_ticks(&[0.0, 2.0, 4.0]), vec!["0", "2", "4"]);
        assert_eq!(format_ticks(&[0.0, 0.25, 0.5]), vec!["0.00", "0.25", "0.50"]);
        assert_eq!(format_ticks(&[-0.0000000001]), vec!["0"]);
    }

    #[test]
    fn test_scale_map() {
        let scale = Scale::new(0.0, 10.0, 100.0, 200.0);
        assert_eq!(scale.map(0.0), 100.0);
        assert_eq!(scale.map(5.0), 150.0);
        assert_eq!(scale.map(10.0), 200.0);
        assert_eq!(Scale::new(1.0, 1.0, 0.0, 10.0).map(1.0), 5.0);
    }

    proptest! {
        #[test]
        fn prop_ticks_cover_range(a in -1e6f64..1e6, b in -1e6f64..1e6, n in 3usize..10) {
            let ticks = nice_ticks(a, b, n);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ticks.len() >= 2);
            prop_assert!(ticks.len() <= n);
            let tol = (hi - lo).abs().max(1.0) * 1e-6;
            prop_assert!(ticks[0] <= lo + tol);
            prop_assert!(*ticks.last().unwrap() >= hi - tol);
        }

        #[test]
        fn prop_ticks_evenly_spaced(a in -1e4f64..1e4, span in 0.001f64..1e4) {
            let ticks = nice_ticks(a, a + span, 6);
            let step = ticks[1] - ticks[0];
            prop_assert!(step > 0.0);
            for pair in ticks.windows(2) {
                prop_assert!(((pair[1] - pair[0]) - step).abs() <= step * 1e-4);
            }
        }
    }
}
