//! Plotters-powered monthly trend chart widget for Ratatui.
//!
//! Rendered into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed by the caller; x is the month index.
pub struct TrendPlottersChart<'a> {
    /// Monthly totals, one point per month.
    pub totals: &'a [(f64, f64)],
    /// Fitted trend line, same x positions (empty below two months).
    pub trend: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Month labels indexed by x.
    pub x_labels: &'a [String],
    pub y_label: String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> TrendPlottersChart<'a> {
    /// Label for an x tick; only whole month indices get one.
    fn month_label(&self, x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        self.x_labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

impl<'a> Widget for TrendPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // Plotters picks tick positions; keep them on whole months.
        let x_ticks = self.x_labels.len().clamp(1, 6);

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(&self.y_label)
                .x_labels(x_ticks)
                .y_labels(4)
                .x_label_formatter(&|v| self.month_label(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let totals_color = RGBColor(0, 255, 255);
            let trend_color = RGBColor(255, 255, 0);

            chart.draw_series(LineSeries::new(self.totals.iter().copied(), &totals_color))?;
            // Pixels rather than circles: the backend scales circle radii badly.
            chart.draw_series(self.totals.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            if self.trend.len() >= 2 {
                chart.draw_series(LineSeries::new(self.trend.iter().copied(), &trend_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
