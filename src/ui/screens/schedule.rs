use crate::models::{Dataset, Schedule, SensorField};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Widget},
};

pub struct ScheduleScreen<'a> {
    pub dataset: &'a Dataset,
    pub schedule: Option<&'a Schedule>,
    pub selected_index: usize,
}

impl<'a> ScheduleScreen<'a> {
    pub fn new(dataset: &'a Dataset, schedule: Option<&'a Schedule>) -> Self {
        Self {
            dataset,
            schedule,
            selected_index: 0,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    fn sensor_columns(&self) -> Vec<SensorField> {
        SensorField::all()
            .iter()
            .copied()
            .filter(|f| self.dataset.has_field(*f))
            .collect()
    }

    fn has_decisions(&self) -> bool {
        self.schedule
            .map(|s| !s.treatment.is_control())
            .unwrap_or(false)
    }
}

impl Widget for ScheduleScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Table
                Constraint::Length(1), // Nav
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_table(chunks[1], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[t]", Theme::nav_key()),
            Span::styled("Treatment ", Theme::nav_label()),
            Span::styled("[e]", Theme::nav_key()),
            Span::styled("Export ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl ScheduleScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Irrigation Schedule", Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let info = match self.schedule {
            Some(schedule) => {
                if schedule.treatment.is_control() {
                    format!("{} - rows shown as-is", schedule.treatment.label())
                } else {
                    format!(
                        "{} - {} irrigation events, {:.1} mm total",
                        schedule.treatment.label(),
                        schedule.irrigation_events(),
                        schedule.total_irrigation_mm()
                    )
                }
            }
            None => "No schedule computed".to_string(),
        };

        let para = Paragraph::new(Span::styled(info, Theme::dim())).block(block);
        para.render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let Some(schedule) = self.schedule else {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border());
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No schedule computed", Theme::dim())).render(inner, buf);
            return;
        };

        let sensor_columns = self.sensor_columns();
        let with_decisions = self.has_decisions();

        let mut header_names: Vec<&str> = vec!["Timestamp"];
        header_names.extend(sensor_columns.iter().map(|f| f.column()));
        if with_decisions {
            header_names.extend(["Irrigate", "ETc", "irrigation_mm"]);
        }

        let header_cells = header_names
            .iter()
            .map(|h| Cell::from(*h).style(Theme::header()));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = schedule
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::from(
                    row.reading.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                )];
                for field in &sensor_columns {
                    cells.push(Cell::from(
                        row.reading
                            .field(*field)
                            .map(|v| format!("{:.2}", v))
                            .unwrap_or_else(|| "-".to_string()),
                    ));
                }
                if with_decisions {
                    match row.decision {
                        Some(d) if d.irrigate => {
                            cells.push(
                                Cell::from("yes").style(Style::default().fg(Theme::HIGHLIGHT)),
                            );
                            cells.push(Cell::from(format!("{:.2}", d.etc_mm)));
                            cells.push(Cell::from(format!("{:.2}", d.irrigation_mm)));
                        }
                        Some(_) => {
                            cells.push(Cell::from("no").style(Theme::dim()));
                            cells.push(Cell::from("0.00"));
                            cells.push(Cell::from("0.00"));
                        }
                        None => {
                            cells.push(Cell::from("-"));
                            cells.push(Cell::from("-"));
                            cells.push(Cell::from("-"));
                        }
                    }
                }
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(17)];
        widths.extend(sensor_columns.iter().map(|_| Constraint::Length(14)));
        if with_decisions {
            widths.extend([
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Min(13),
            ]);
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .highlight_style(Theme::selected());

        let mut state = TableState::default();
        state.select(Some(self.selected_index));

        ratatui::widgets::StatefulWidget::render(table, area, buf, &mut state);
    }
}
