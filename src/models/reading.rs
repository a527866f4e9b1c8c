use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The sensor and forecast columns the evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorField {
    SoilMoisture,
    Ndvi,
    Et0,
    ForecastRain,
}

impl SensorField {
    pub fn all() -> &'static [SensorField] {
        &[
            SensorField::SoilMoisture,
            SensorField::Ndvi,
            SensorField::Et0,
            SensorField::ForecastRain,
        ]
    }

    /// CSV header name for this field.
    pub fn column(&self) -> &'static str {
        match self {
            SensorField::SoilMoisture => "soil_moisture",
            SensorField::Ndvi => "NDVI",
            SensorField::Et0 => "ET0",
            SensorField::ForecastRain => "forecast_rain",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        SensorField::all()
            .iter()
            .copied()
            .find(|f| f.column() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SensorField::SoilMoisture => "Soil Moisture",
            SensorField::Ndvi => "NDVI",
            SensorField::Et0 => "ET0",
            SensorField::ForecastRain => "Rain Forecast",
        }
    }

}

impl std::fmt::Display for SensorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One row of uploaded input. Which fields must be present depends on the
/// selected treatment; absent cells stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub soil_moisture: Option<f64>,
    pub ndvi: Option<f64>,
    pub et0: Option<f64>,
    pub forecast_rain: Option<f64>,
    /// Values of unrecognized columns, aligned with `Dataset::extra_headers`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

impl SensorReading {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            soil_moisture: None,
            ndvi: None,
            et0: None,
            forecast_rain: None,
            extra: Vec::new(),
        }
    }

    pub fn field(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::SoilMoisture => self.soil_moisture,
            SensorField::Ndvi => self.ndvi,
            SensorField::Et0 => self.et0,
            SensorField::ForecastRain => self.forecast_rain,
        }
    }

    pub fn set_field(&mut self, field: SensorField, value: f64) {
        match field {
            SensorField::SoilMoisture => self.soil_moisture = Some(value),
            SensorField::Ndvi => self.ndvi = Some(value),
            SensorField::Et0 => self.et0 = Some(value),
            SensorField::ForecastRain => self.forecast_rain = Some(value),
        }
    }
}

/// An uploaded table, with the original column order preserved for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub source: Option<PathBuf>,
    pub headers: Vec<String>,
    pub extra_headers: Vec<String>,
    pub readings: Vec<SensorReading>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn has_field(&self, field: SensorField) -> bool {
        self.has_column(field.column())
    }

    /// Most recent reading by timestamp.
    pub fn latest(&self) -> Option<&SensorReading> {
        self.readings.iter().max_by_key(|r| r.timestamp)
    }

    /// Earliest and latest timestamps in the dataset.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.readings.iter().map(|r| r.timestamp).min()?;
        let last = self.readings.iter().map(|r| r.timestamp).max()?;
        Some((first, last))
    }

    pub fn file_name(&self) -> String {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn field_accessors_round_trip() {
        let mut reading = SensorReading::new(ts(1));
        assert!(reading.field(SensorField::Et0).is_none());

        reading.set_field(SensorField::Et0, 4.2);
        reading.set_field(SensorField::SoilMoisture, 31.0);
        assert_eq!(reading.field(SensorField::Et0), Some(4.2));
        assert_eq!(reading.field(SensorField::SoilMoisture), Some(31.0));
        assert!(reading.field(SensorField::Ndvi).is_none());
    }

    #[test]
    fn sensor_field_column_round_trip() {
        for field in SensorField::all() {
            assert_eq!(SensorField::from_column(field.column()), Some(*field));
        }
        assert!(SensorField::from_column("humidity").is_none());
    }

    #[test]
    fn dataset_span_and_latest() {
        let dataset = Dataset {
            source: None,
            headers: vec!["timestamp".into()],
            extra_headers: Vec::new(),
            readings: vec![
                SensorReading::new(ts(3)),
                SensorReading::new(ts(1)),
                SensorReading::new(ts(2)),
            ],
        };

        assert_eq!(dataset.span(), Some((ts(1), ts(3))));
        assert_eq!(dataset.latest().map(|r| r.timestamp), Some(ts(3)));
    }
}
