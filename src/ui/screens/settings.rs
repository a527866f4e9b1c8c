use crate::logic::ThresholdConfig;
use crate::models::Treatment;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Treatment,
    Kc,
    FieldCapacity,
    RainThreshold,
    NdviThreshold,
    Et0Threshold,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::Treatment,
            SettingsField::Kc,
            SettingsField::FieldCapacity,
            SettingsField::RainThreshold,
            SettingsField::NdviThreshold,
            SettingsField::Et0Threshold,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Treatment => "Treatment",
            SettingsField::Kc => "Crop Coefficient (Kc)",
            SettingsField::FieldCapacity => "Field Capacity [%]",
            SettingsField::RainThreshold => "Rain Threshold (mm)",
            SettingsField::NdviThreshold => "NDVI Stress Threshold",
            SettingsField::Et0Threshold => "ET0 Threshold (mm)",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SettingsField::Treatment => SettingsField::Kc,
            SettingsField::Kc => SettingsField::FieldCapacity,
            SettingsField::FieldCapacity => SettingsField::RainThreshold,
            SettingsField::RainThreshold => SettingsField::NdviThreshold,
            SettingsField::NdviThreshold => SettingsField::Et0Threshold,
            SettingsField::Et0Threshold => SettingsField::Treatment,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SettingsField::Treatment => SettingsField::Et0Threshold,
            SettingsField::Kc => SettingsField::Treatment,
            SettingsField::FieldCapacity => SettingsField::Kc,
            SettingsField::RainThreshold => SettingsField::FieldCapacity,
            SettingsField::NdviThreshold => SettingsField::RainThreshold,
            SettingsField::Et0Threshold => SettingsField::NdviThreshold,
        }
    }

    /// Whether the selected treatment reads this parameter.
    pub fn used_by(&self, treatment: Treatment) -> bool {
        match self {
            SettingsField::Treatment => true,
            SettingsField::Kc => !treatment.is_control(),
            SettingsField::FieldCapacity => matches!(
                treatment,
                Treatment::MoistureWeather | Treatment::NdviSoilWeather
            ),
            SettingsField::RainThreshold => !treatment.is_control(),
            SettingsField::NdviThreshold | SettingsField::Et0Threshold => matches!(
                treatment,
                Treatment::NdviWeather | Treatment::NdviSoilWeather
            ),
        }
    }
}

pub struct SettingsScreen<'a> {
    pub treatment: Treatment,
    pub thresholds: &'a ThresholdConfig,
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl<'a> SettingsScreen<'a> {
    pub fn new(treatment: Treatment, thresholds: &'a ThresholdConfig) -> Self {
        Self {
            treatment,
            thresholds,
            focused_field: SettingsField::Treatment,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn with_focus(mut self, field: SettingsField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &str) -> Self {
        self.editing = editing;
        self.edit_buffer = buffer.to_string();
        self
    }

    fn get_field_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::Treatment => self.treatment.label().to_string(),
            SettingsField::Kc => format!("{:.2}", self.thresholds.kc),
            SettingsField::FieldCapacity => format!("{:.1}", self.thresholds.field_capacity),
            SettingsField::RainThreshold => format!("{:.1}", self.thresholds.rain_threshold_mm),
            SettingsField::NdviThreshold => format!("{:.2}", self.thresholds.ndvi_threshold),
            SettingsField::Et0Threshold => format!("{:.1}", self.thresholds.et0_threshold_mm),
        }
    }
}

impl Widget for SettingsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(20),   // Form (6 fields * 3 lines + borders)
                Constraint::Length(5), // Help
                Constraint::Length(1), // Nav
            ])
            .split(area);

        // Title
        let title = Line::from(vec![
            Span::styled("Settings", Theme::title()),
            Span::styled(" - Treatment & Thresholds", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        // Form
        self.render_form(chunks[1], buf);

        // Help
        self.render_help(chunks[2], buf);

        // Navigation
        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Edit/Apply ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Cancel/Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl SettingsScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Rule Parameters")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let field_height = 3;
        let constraints: Vec<Constraint> = SettingsField::all()
            .iter()
            .map(|_| Constraint::Length(field_height))
            .collect();

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in SettingsField::all().iter().enumerate() {
            let is_focused = *field == self.focused_field;

            let mut value = if is_focused && self.editing {
                format!("{}_", self.edit_buffer)
            } else {
                self.get_field_value(*field)
            };
            if !field.used_by(self.treatment) && !(is_focused && self.editing) {
                value.push_str("  (unused by this treatment)");
            }

            let border_style = if is_focused {
                Theme::border_focused()
            } else {
                Theme::border()
            };

            let value_style = if is_focused && self.editing {
                Theme::highlight()
            } else if is_focused {
                Theme::selected()
            } else if field.used_by(self.treatment) {
                Theme::normal()
            } else {
                Theme::dim()
            };

            let field_block = Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border_style);

            let field_inner = field_block.inner(field_areas[i]);
            field_block.render(field_areas[i], buf);

            let para = Paragraph::new(Span::styled(value, value_style));
            para.render(field_inner, buf);
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Field Options")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = match self.focused_field {
            SettingsField::Treatment => {
                "Options: T1 - Control, T2 - Soil Moisture + Weather, T3 - NDVI + Weather, T4 - NDVI + Soil + Weather (or t1-t4)"
            }
            SettingsField::Kc => "Crop coefficient used to scale ET0 into crop demand (ETc)",
            SettingsField::FieldCapacity => {
                "Saturated-but-drained soil moisture; the irrigation trigger is 70% of this value"
            }
            SettingsField::RainThreshold => {
                "Forecast rain at or above this depth cancels irrigation"
            }
            SettingsField::NdviThreshold => "NDVI below this value indicates canopy stress",
            SettingsField::Et0Threshold => {
                "Reference evapotranspiration above this indicates atmospheric demand"
            }
        };

        let para = Paragraph::new(Span::styled(help_text, Theme::dim()));
        para.render(inner, buf);
    }
}
