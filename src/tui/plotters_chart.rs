//! Plotters-powered imputation chart widget for Ratatui.
//!
//! Ratatui's built-in `Chart` would work for two lines, but Plotters gives
//! nicer axis rendering with less manual tick work. Output is drawn into the
//! Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only description of the original vs imputed comparison.
///
/// All series and bounds are computed before rendering.
pub struct ImputationChart<'a> {
    /// Rating → mean usefulness before any cell was blanked.
    pub original: &'a [(f64, f64)],
    /// The same line after simulation and imputation.
    pub imputed: &'a [(f64, f64)],
    /// Imputed points on rows that had a blanked cell.
    pub filled: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl Widget for ImputationChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
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
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let imputed_color = RGBColor(0, 255, 255);
            let filled_color = RGBColor(255, 255, 0);

            chart.draw_series(LineSeries::new(self.original.iter().copied(), &WHITE))?;
            chart.draw_series(LineSeries::new(self.imputed.iter().copied(), &imputed_color))?;

            // `Circle` radii are mis-scaled by the backend; single pixels render cleanly.
            chart.draw_series(
                self.filled
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), filled_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
