use super::reading::SensorField;
use serde::{Deserialize, Serialize};

/// The four predefined treatment rule sets. Selection is exclusive - rules
/// are never combined across treatments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Treatment {
    /// T1 - control group, no irrigation logic applied.
    Control,
    /// T2 - soil moisture plus weather forecast.
    MoistureWeather,
    /// T3 - NDVI stress plus weather forecast.
    NdviWeather,
    /// T4 - NDVI stress, soil moisture, and weather forecast combined.
    NdviSoilWeather,
}

impl Treatment {
    pub fn all() -> &'static [Treatment] {
        &[
            Treatment::Control,
            Treatment::MoistureWeather,
            Treatment::NdviWeather,
            Treatment::NdviSoilWeather,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Treatment::Control => "T1",
            Treatment::MoistureWeather => "T2",
            Treatment::NdviWeather => "T3",
            Treatment::NdviSoilWeather => "T4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Treatment::Control => "T1 - Control",
            Treatment::MoistureWeather => "T2 - Soil Moisture + Weather",
            Treatment::NdviWeather => "T3 - NDVI + Weather",
            Treatment::NdviSoilWeather => "T4 - NDVI + Soil + Weather",
        }
    }

    /// Parse a selector as given on the CLI or in config: the short code
    /// ("t2"), the full label, or a keyword from it.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Treatment::all()
            .iter()
            .copied()
            .find(|t| s.eq_ignore_ascii_case(t.code()) || s.eq_ignore_ascii_case(t.label()))
            .or_else(|| match s.to_ascii_lowercase().as_str() {
                "control" => Some(Treatment::Control),
                "moisture" | "moisture-weather" => Some(Treatment::MoistureWeather),
                "ndvi" | "ndvi-weather" => Some(Treatment::NdviWeather),
                "ndvi-soil" | "ndvi-soil-weather" => Some(Treatment::NdviSoilWeather),
                _ => None,
            })
    }

    /// Sensor columns the dataset must carry for this treatment.
    pub fn required_fields(&self) -> &'static [SensorField] {
        match self {
            Treatment::Control => &[],
            Treatment::MoistureWeather => &[
                SensorField::SoilMoisture,
                SensorField::Et0,
                SensorField::ForecastRain,
            ],
            Treatment::NdviWeather => &[
                SensorField::Ndvi,
                SensorField::Et0,
                SensorField::ForecastRain,
            ],
            Treatment::NdviSoilWeather => &[
                SensorField::Ndvi,
                SensorField::SoilMoisture,
                SensorField::Et0,
                SensorField::ForecastRain,
            ],
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Treatment::Control)
    }

    /// Export filename: the label with spaces replaced by underscores.
    pub fn schedule_filename(&self) -> String {
        format!("{}_schedule.csv", self.label().replace(' ', "_"))
    }

    /// Cycle to the next treatment (wraps after T4).
    pub fn next(&self) -> Self {
        match self {
            Treatment::Control => Treatment::MoistureWeather,
            Treatment::MoistureWeather => Treatment::NdviWeather,
            Treatment::NdviWeather => Treatment::NdviSoilWeather,
            Treatment::NdviSoilWeather => Treatment::Control,
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            Treatment::Control => Color::Gray,
            Treatment::MoistureWeather => Color::Cyan,
            Treatment::NdviWeather => Color::Green,
            Treatment::NdviSoilWeather => Color::Magenta,
        }
    }
}

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
