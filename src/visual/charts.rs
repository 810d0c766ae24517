//! Chart drawing. Each function returns a complete SVG document.

use super::svg::{Anchor, SvgCanvas, palette};
use super::units::format_number;
use crate::constants::chart;

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 70.0;

struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn of(canvas: &SvgCanvas) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: canvas.width() - MARGIN_LEFT - MARGIN_RIGHT,
            height: canvas.height() - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// y coordinate for `value` on a scale from `min` to `max`
    fn y(&self, value: f64, min: f64, max: f64) -> f64 {
        let span = if (max - min).abs() < f64::EPSILON { 1.0 } else { max - min };
        self.bottom() - (value - min) / span * self.height
    }
}

fn axes(canvas: &mut SvgCanvas, area: &PlotArea, y_label: &str) {
    canvas
        .line(area.left, area.top, area.left, area.bottom(), palette::GRAY, 1.0)
        .line(area.left, area.bottom(), area.left + area.width, area.bottom(), palette::GRAY, 1.0)
        .text(24.0, area.top + area.height / 2.0, y_label, 12, Anchor::Start, true);
}

/// Vertical bars with value labels
pub fn bar_chart(title: &str, labels: &[String], values: &[f64], y_label: &str) -> String {
    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);
    let area = PlotArea::of(&canvas);
    axes(&mut canvas, &area, y_label);

    let max = values.iter().copied().fold(0.0_f64, f64::max) * 1.1;
    let slot = area.width / values.len().max(1) as f64;
    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let x = area.left + slot * i as f64 + slot * 0.2;
        let y = area.y(value.max(0.0), 0.0, max);
        let color = palette::SERIES[i % palette::SERIES.len()];
        canvas
            .rect(x, y, slot * 0.6, area.bottom() - y, color)
            .text(x + slot * 0.3, y - 8.0, &format_number(*value), 12, Anchor::Middle, true)
            .text(x + slot * 0.3, area.bottom() + 24.0, label, 12, Anchor::Middle, false);
    }
    canvas.finish()
}

/// One labeled, colored series for a line chart
pub struct Series<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub values: &'a [f64],
}

pub fn line_chart(title: &str, x_labels: &[String], series: &[Series<'_>], y_label: &str) -> String {
    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);
    let area = PlotArea::of(&canvas);
    axes(&mut canvas, &area, y_label);

    let all = series.iter().flat_map(|s| s.values.iter().copied());
    let max = all.clone().fold(f64::MIN, f64::max);
    let min = all.fold(f64::MAX, f64::min).min(0.0);
    let steps = x_labels.len().saturating_sub(1).max(1) as f64;
    let x_at = |i: usize| area.left + area.width * i as f64 / steps;

    for (i, label) in x_labels.iter().enumerate() {
        canvas.text(x_at(i), area.bottom() + 24.0, label, 12, Anchor::Middle, false);
    }

    for (n, s) in series.iter().enumerate() {
        let points: Vec<(f64, f64)> = s
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (x_at(i), area.y(*v, min, max * 1.05)))
            .collect();
        canvas.polyline(&points, s.color, 3.0);
        for (x, y) in &points {
            canvas.circle(*x, *y, 4.0, s.color);
        }
        let legend_y = area.top + 16.0 + n as f64 * 20.0;
        canvas
            .rect(area.left + 16.0, legend_y - 10.0, 12.0, 12.0, s.color)
            .text(area.left + 34.0, legend_y, s.label, 12, Anchor::Start, false);
    }
    canvas.finish()
}

/// Share breakdown; `shares` are percentages
pub fn pie_chart(title: &str, labels: &[String], shares: &[f64]) -> String {
    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);

    let total: f64 = shares.iter().sum();
    let (cx, cy, r) = (canvas.width() * 0.35, canvas.height() * 0.55, 160.0);
    let legend_x = canvas.width() * 0.68;
    let mut angle = 0.0;

    for (i, (label, share)) in labels.iter().zip(shares).enumerate() {
        let color = palette::SERIES[i % palette::SERIES.len()];
        let sweep = if total > 0.0 {
            share / total * std::f64::consts::TAU
        } else {
            0.0
        };
        if sweep >= std::f64::consts::TAU - 1e-9 {
            canvas.circle(cx, cy, r, color);
        } else if sweep > 0.0 {
            canvas.slice(cx, cy, r, angle, angle + sweep, color);
        }
        angle += sweep;

        let legend_y = 120.0 + i as f64 * 26.0;
        canvas
            .rect(legend_x, legend_y - 12.0, 14.0, 14.0, color)
            .text(
                legend_x + 22.0,
                legend_y,
                &format!("{} ({}%)", label, format_number(*share)),
                13,
                Anchor::Start,
                false,
            );
    }
    canvas.finish()
}

/// A named point in the unit square
pub struct MatrixPoint<'a> {
    pub label: &'a str,
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

/// 2×2 positioning matrix with quadrant lines at 0.5
pub fn matrix_chart(title: &str, x_label: &str, y_label: &str, points: &[MatrixPoint<'_>]) -> String {
    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);
    let area = PlotArea::of(&canvas);
    let to_x = |x: f64| area.left + x * area.width;
    let to_y = |y: f64| area.bottom() - y * area.height;

    canvas
        .rect(area.left, area.top, area.width, area.height, palette::LIGHT_GRAY)
        .line(to_x(0.5), area.top, to_x(0.5), area.bottom(), palette::GRAY, 1.0)
        .line(area.left, to_y(0.5), area.left + area.width, to_y(0.5), palette::GRAY, 1.0)
        .text(area.left + area.width / 2.0, area.bottom() + 40.0, x_label, 12, Anchor::Middle, true)
        .text(24.0, area.top + area.height / 2.0, y_label, 12, Anchor::Start, true)
        .text(to_x(0.25), area.bottom() + 20.0, "Low", 11, Anchor::Middle, false)
        .text(to_x(0.75), area.bottom() + 20.0, "High", 11, Anchor::Middle, false);

    for (i, p) in points.iter().enumerate() {
        let color = if i == 0 { palette::ACCENT } else { palette::GRAY };
        let radius = 8.0 + p.weight.clamp(0.0, 100.0) * 0.3;
        canvas
            .circle(to_x(p.x), to_y(p.y), radius, color)
            .text(to_x(p.x) + radius + 4.0, to_y(p.y) - radius, p.label, 12, Anchor::Start, true);
    }
    canvas.finish()
}

/// Waterfall: first and last values are totals, the rest are deltas
pub fn waterfall_chart(title: &str, categories: &[&str], values: &[f64], y_label: &str) -> String {
    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);
    let area = PlotArea::of(&canvas);
    axes(&mut canvas, &area, y_label);

    let last = values.len().saturating_sub(1);
    let mut running = 0.0;
    let mut spans = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        if i == 0 || i == last {
            spans.push((0.0, *value));
            running = *value;
        } else {
            spans.push((running, running + value));
            running += value;
        }
    }
    let max = spans.iter().map(|(a, b)| a.max(*b)).fold(0.0, f64::max) * 1.1;
    let min = spans.iter().map(|(a, b)| a.min(*b)).fold(0.0, f64::min);
    let slot = area.width / values.len().max(1) as f64;

    let zero = area.y(0.0, min, max);
    canvas.line(area.left, zero, area.left + area.width, zero, palette::PRIMARY, 0.5);
    for (i, ((from, to), label)) in spans.iter().zip(categories).enumerate() {
        let color = if i == 0 || i == last {
            palette::PRIMARY
        } else if to >= from {
            palette::ACCENT
        } else {
            palette::ORANGE
        };
        let top = area.y(from.max(*to), min, max);
        let bottom = area.y(from.min(*to), min, max);
        let x = area.left + slot * i as f64 + slot * 0.15;
        canvas
            .rect(x, top, slot * 0.7, bottom - top, color)
            .text(x + slot * 0.35, top - 6.0, &format_number(values[i]), 11, Anchor::Middle, true)
            .text(x + slot * 0.35, area.bottom() + 22.0, label, 10, Anchor::Middle, false);
    }
    canvas.finish()
}

/// Heat map over a square matrix of levels 0..=4
pub fn heatmap_chart(title: &str, row_label: &str, col_label: &str, labels: &[&str], matrix: &[[u8; 3]; 3]) -> String {
    const SCALE: [&str; 5] = ["#1A9850", "#91CF60", "#FEE08B", "#FC8D59", "#D73027"];

    let mut canvas = SvgCanvas::new(chart::WIDTH, chart::HEIGHT);
    canvas.title(title);
    let area = PlotArea::of(&canvas);
    let cell_w = area.width / 3.0;
    let cell_h = area.height / 3.0;

    for (r, row) in matrix.iter().enumerate() {
        for (c, level) in row.iter().enumerate() {
            let x = area.left + c as f64 * cell_w;
            let y = area.top + r as f64 * cell_h;
            canvas
                .rect(x + 1.0, y + 1.0, cell_w - 2.0, cell_h - 2.0, SCALE[(*level as usize).min(4)])
                .text(x + cell_w / 2.0, y + cell_h / 2.0 + 6.0, &level.to_string(), 16, Anchor::Middle, true);
        }
    }
    for (i, label) in labels.iter().enumerate() {
        canvas
            .text(area.left + cell_w * (i as f64 + 0.5), area.bottom() + 22.0, label, 12, Anchor::Middle, false)
            .text(area.left - 8.0, area.top + cell_h * (i as f64 + 0.5), label, 12, Anchor::End, false);
    }
    canvas
        .text(area.left + area.width / 2.0, area.bottom() + 46.0, col_label, 12, Anchor::Middle, true)
        .text(16.0, area.top - 12.0, row_label, 12, Anchor::Start, true);
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_chart_has_bars_and_labels() {
        let svg = bar_chart(
            "Market sizing",
            &["TAM".into(), "SAM".into()],
            &[5.2, 2.1],
            "Market Size ($ Billions)",
        );
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(">5.2<"));
        assert!(svg.contains(">SAM<"));
    }

    #[test]
    fn test_line_chart_draws_each_series() {
        let labels: Vec<String> = (1..=3).map(|i| format!("Y{}", i)).collect();
        let svg = line_chart(
            "Growth",
            &labels,
            &[
                Series { label: "Baseline", color: palette::GRAY, values: &[100.0, 110.0, 121.0] },
                Series { label: "Strategic", color: palette::ACCENT, values: &[100.0, 115.0, 132.25] },
            ],
            "Growth Index",
        );
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(palette::ACCENT));
        assert!(svg.contains(">Strategic<"));
    }

    #[test]
    fn test_pie_full_share_is_circle() {
        let svg = pie_chart("Share", &["Only".into()], &[100.0]);
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_waterfall_colors_direction() {
        let svg = waterfall_chart("Impact", &["Start", "Down", "End"], &[100.0, -20.0, 80.0], "%");
        assert!(svg.contains(palette::ORANGE));
        assert!(svg.contains(">-20<"));
    }
}
