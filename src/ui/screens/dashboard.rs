use crate::logic::ThresholdConfig;
use crate::models::{Dataset, Schedule, Treatment};
use crate::ui::components::{et0_gauge, moisture_gauge, ndvi_gauge, rain_gauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

pub struct DashboardScreen<'a> {
    pub dataset: Option<&'a Dataset>,
    pub schedule: Option<&'a Schedule>,
    pub treatment: Treatment,
    pub thresholds: &'a ThresholdConfig,
    pub status_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(
        dataset: Option<&'a Dataset>,
        schedule: Option<&'a Schedule>,
        treatment: Treatment,
        thresholds: &'a ThresholdConfig,
    ) -> Self {
        Self {
            dataset,
            schedule,
            treatment,
            thresholds,
            status_message: None,
        }
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(5), // Gauges row
                Constraint::Min(8),    // Summary and upcoming irrigation
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);

        match self.dataset {
            Some(_) => {
                self.render_gauges(chunks[1], buf);

                let middle = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[2]);

                self.render_summary(middle[0], buf);
                self.render_irrigation_days(middle[1], buf);
            }
            None => self.render_idle_prompt(chunks[2], buf),
        }

        self.render_status_message(chunks[3], buf);
        self.render_nav(chunks[4], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = format!("IrriOps - {}", self.treatment.label());

        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let info = match self.dataset {
            Some(dataset) => {
                let span = dataset
                    .span()
                    .map(|(first, last)| {
                        format!(
                            "{} to {}",
                            first.format("%Y-%m-%d"),
                            last.format("%Y-%m-%d")
                        )
                    })
                    .unwrap_or_else(|| "empty".to_string());
                format!(
                    "Dataset: {} ({} rows, {})",
                    dataset.file_name(),
                    dataset.len(),
                    span
                )
            }
            None => "No dataset loaded".to_string(),
        };

        let para = Paragraph::new(Span::styled(info, Theme::dim())).block(block);
        para.render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        let latest = self.dataset.and_then(|d| d.latest());

        let moisture = latest.and_then(|r| r.soil_moisture);
        moisture_gauge("Soil Moisture", moisture, self.thresholds.moisture_threshold())
            .render(gauge_chunks[0], buf);

        let ndvi = latest.and_then(|r| r.ndvi);
        ndvi_gauge("NDVI", ndvi, self.thresholds.ndvi_threshold).render(gauge_chunks[1], buf);

        let et0 = latest.and_then(|r| r.et0);
        et0_gauge("ET0", et0).render(gauge_chunks[2], buf);

        let rain = latest.and_then(|r| r.forecast_rain);
        rain_gauge("Rain Forecast", rain).render(gauge_chunks[3], buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Schedule Summary", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(schedule) = self.schedule else {
            let para = Paragraph::new(Span::styled("No schedule computed", Theme::dim()));
            para.render(inner, buf);
            return;
        };

        let mut lines = vec![Line::from(vec![
            Span::styled("Treatment: ", Theme::dim()),
            Span::styled(
                self.treatment.label(),
                Style::default().fg(self.treatment.color()),
            ),
        ])];

        if self.treatment.is_control() {
            lines.push(Line::from(Span::styled(
                "Control group - data displayed without irrigation logic",
                Theme::dim(),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled("Irrigation events: ", Theme::dim()),
                Span::styled(
                    format!("{} of {} rows", schedule.irrigation_events(), schedule.len()),
                    Theme::normal(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Total depth: ", Theme::dim()),
                Span::styled(
                    format!("{:.1} mm", schedule.total_irrigation_mm()),
                    Theme::highlight(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Kc: ", Theme::dim()),
                Span::styled(format!("{:.2}", self.thresholds.kc), Theme::normal()),
                Span::styled("  Moisture trigger: ", Theme::dim()),
                Span::styled(
                    format!("{:.1}%", self.thresholds.moisture_threshold()),
                    Theme::normal(),
                ),
            ]));
        }

        let para = Paragraph::new(lines);
        para.render(inner, buf);
    }

    fn render_irrigation_days(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Irrigation Days", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let rows = self
            .schedule
            .map(|s| s.irrigation_rows())
            .unwrap_or_default();

        if rows.is_empty() {
            let para = Paragraph::new(Span::styled("No irrigation scheduled", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .take(inner.height as usize)
            .map(|row| {
                let depth = row
                    .decision
                    .map(|d| d.irrigation_mm)
                    .unwrap_or_default();
                let line = Line::from(vec![
                    Span::styled(
                        row.reading.timestamp.format("%m/%d").to_string(),
                        Theme::dim(),
                    ),
                    Span::raw(" "),
                    Span::styled(format!("{:.2} mm", depth), Theme::highlight()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_idle_prompt(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = vec![
            Line::from(Span::styled(
                "Please load a dataset to proceed.",
                Theme::normal(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Start with `irriops --input <file.csv>`, then press [r] to reload after edits.",
                Theme::dim(),
            )),
        ];
        let para = Paragraph::new(lines);
        para.render(inner, buf);
    }

    fn render_status_message(&self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.status_message {
            let style = if msg.contains("failed") || msg.contains("error") {
                Theme::warning()
            } else {
                Theme::success()
            };
            let para = Paragraph::new(Span::styled(msg, style));
            para.render(area, buf);
        }
    }

    fn render_nav(&self, area: Rect, buf: &mut Buffer) {
        let nav = Line::from(vec![
            Span::styled("[1]", Theme::nav_key()),
            Span::styled("Dashboard ", Theme::nav_label()),
            Span::styled("[2]", Theme::nav_key()),
            Span::styled("Schedule ", Theme::nav_label()),
            Span::styled("[3]", Theme::nav_key()),
            Span::styled("Chart ", Theme::nav_label()),
            Span::styled("[s]", Theme::nav_key()),
            Span::styled("Settings ", Theme::nav_label()),
            Span::styled("[t]", Theme::nav_key()),
            Span::styled("Treatment ", Theme::nav_label()),
            Span::styled("[r]", Theme::nav_key()),
            Span::styled("Reload ", Theme::nav_label()),
            Span::styled("[e]", Theme::nav_key()),
            Span::styled("Export ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Quit", Theme::nav_label()),
        ]);

        let para = Paragraph::new(nav);
        para.render(area, buf);
    }
}
