use crate::models::{Dataset, Schedule, SensorField};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Paragraph, Widget},
};

/// Multi-series time chart: whichever of NDVI, soil moisture, ET0, rain
/// forecast, and irrigation depth the dataset carries, keyed by timestamp.
pub struct ChartScreen<'a> {
    pub dataset: &'a Dataset,
    pub schedule: Option<&'a Schedule>,
}

impl<'a> ChartScreen<'a> {
    pub fn new(dataset: &'a Dataset, schedule: Option<&'a Schedule>) -> Self {
        Self { dataset, schedule }
    }

    fn field_series(&self, field: SensorField) -> Vec<(f64, f64)> {
        self.dataset
            .readings
            .iter()
            .filter_map(|r| {
                r.field(field)
                    .map(|v| (r.timestamp.and_utc().timestamp() as f64, v))
            })
            .collect()
    }

    fn irrigation_series(&self) -> Vec<(f64, f64)> {
        self.schedule
            .map(|schedule| {
                schedule
                    .rows
                    .iter()
                    .filter_map(|row| {
                        row.decision.map(|d| {
                            (
                                row.reading.timestamp.and_utc().timestamp() as f64,
                                d.irrigation_mm,
                            )
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn field_color(field: SensorField) -> Color {
        match field {
            SensorField::Ndvi => Theme::SERIES_NDVI,
            SensorField::SoilMoisture => Theme::SERIES_MOISTURE,
            SensorField::Et0 => Theme::SERIES_ET0,
            SensorField::ForecastRain => Theme::SERIES_RAIN,
        }
    }
}

impl Widget for ChartScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Chart
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Irrigation Scheduling Data", Theme::title()),
            Span::styled(
                format!("  {}", self.dataset.file_name()),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_chart(chunks[1], buf);

        let nav = Line::from(vec![
            Span::styled("[1]", Theme::nav_key()),
            Span::styled("Dashboard ", Theme::nav_label()),
            Span::styled("[2]", Theme::nav_key()),
            Span::styled("Schedule ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl ChartScreen<'_> {
    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        // Collect present series first; datasets borrow from these buffers.
        let mut series: Vec<(&'static str, Color, Vec<(f64, f64)>)> = Vec::new();
        for field in SensorField::all() {
            if self.dataset.has_field(*field) {
                let points = self.field_series(*field);
                if !points.is_empty() {
                    series.push((field.display_name(), Self::field_color(*field), points));
                }
            }
        }
        let irrigation = self.irrigation_series();
        if !irrigation.is_empty() {
            series.push(("Irrigation (mm)", Theme::SERIES_IRRIGATION, irrigation));
        }

        if series.is_empty() {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border());
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No numeric series to plot", Theme::dim()))
                .render(inner, buf);
            return;
        }

        let x_min = series
            .iter()
            .flat_map(|(_, _, pts)| pts.iter().map(|p| p.0))
            .fold(f64::INFINITY, f64::min);
        let x_max = series
            .iter()
            .flat_map(|(_, _, pts)| pts.iter().map(|p| p.0))
            .fold(f64::NEG_INFINITY, f64::max);
        let y_max = series
            .iter()
            .flat_map(|(_, _, pts)| pts.iter().map(|p| p.1))
            .fold(f64::NEG_INFINITY, f64::max)
            .max(1.0);

        let datasets: Vec<ChartDataset> = series
            .iter()
            .map(|(name, color, points)| {
                ChartDataset::default()
                    .name(*name)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(*color))
                    .data(points)
            })
            .collect();

        let (start_label, end_label) = self
            .dataset
            .span()
            .map(|(first, last)| {
                (
                    first.format("%m/%d").to_string(),
                    last.format("%m/%d").to_string(),
                )
            })
            .unwrap_or_default();

        let x_axis = Axis::default()
            .title(Span::styled("Date", Theme::dim()))
            .style(Theme::border())
            .bounds([x_min, x_max.max(x_min + 1.0)])
            .labels(vec![
                Span::styled(start_label, Theme::dim()),
                Span::styled(end_label, Theme::dim()),
            ]);

        let y_axis = Axis::default()
            .title(Span::styled("Values", Theme::dim()))
            .style(Theme::border())
            .bounds([0.0, y_max])
            .labels(vec![
                Span::styled("0", Theme::dim()),
                Span::styled(format!("{:.1}", y_max / 2.0), Theme::dim()),
                Span::styled(format!("{:.1}", y_max), Theme::dim()),
            ]);

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .x_axis(x_axis)
            .y_axis(y_axis);

        chart.render(area, buf);
    }
}
