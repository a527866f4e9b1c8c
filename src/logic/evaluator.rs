use super::thresholds::ThresholdConfig;
use crate::error::{IrriOpsError, Result};
use crate::models::{Decision, SensorField, SensorReading, Treatment};

/// Evaluate one reading against the selected treatment's rules.
///
/// Pure: the same reading and thresholds always produce the same decision.
/// All comparisons are strict, so a value exactly at its threshold does not
/// trigger irrigation. Every field the treatment requires must carry a value
/// even when the stress condition turns out false.
pub fn evaluate(
    reading: &SensorReading,
    treatment: Treatment,
    thresholds: &ThresholdConfig,
) -> Result<Decision> {
    let stressed = match treatment {
        Treatment::Control => return Ok(Decision::no_irrigation()),
        Treatment::MoistureWeather => {
            let moisture = require(reading, treatment, SensorField::SoilMoisture)?;
            require(reading, treatment, SensorField::Et0)?;
            let rain = require(reading, treatment, SensorField::ForecastRain)?;
            moisture < thresholds.moisture_threshold() && rain < thresholds.rain_threshold_mm
        }
        Treatment::NdviWeather => {
            let ndvi = require(reading, treatment, SensorField::Ndvi)?;
            let et0 = require(reading, treatment, SensorField::Et0)?;
            let rain = require(reading, treatment, SensorField::ForecastRain)?;
            ndvi < thresholds.ndvi_threshold
                && et0 > thresholds.et0_threshold_mm
                && rain < thresholds.rain_threshold_mm
        }
        Treatment::NdviSoilWeather => {
            let ndvi = require(reading, treatment, SensorField::Ndvi)?;
            let moisture = require(reading, treatment, SensorField::SoilMoisture)?;
            let et0 = require(reading, treatment, SensorField::Et0)?;
            let rain = require(reading, treatment, SensorField::ForecastRain)?;
            ndvi < thresholds.ndvi_threshold
                && moisture < thresholds.moisture_threshold()
                && et0 > thresholds.et0_threshold_mm
                && rain < thresholds.rain_threshold_mm
        }
    };

    if !stressed {
        return Ok(Decision::no_irrigation());
    }

    let et0 = require(reading, treatment, SensorField::Et0)?;
    let rain = require(reading, treatment, SensorField::ForecastRain)?;
    let etc_mm = et0 * thresholds.kc;
    let irrigation_mm = (etc_mm - rain).max(0.0);

    Ok(Decision {
        irrigate: true,
        etc_mm,
        irrigation_mm,
    })
}

fn require(reading: &SensorReading, treatment: Treatment, field: SensorField) -> Result<f64> {
    reading
        .field(field)
        .ok_or_else(|| IrriOpsError::MissingValue {
            timestamp: reading.timestamp,
            column: field.column(),
            treatment: treatment.label(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(
        moisture: Option<f64>,
        ndvi: Option<f64>,
        et0: Option<f64>,
        rain: Option<f64>,
    ) -> SensorReading {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut r = SensorReading::new(ts);
        r.soil_moisture = moisture;
        r.ndvi = ndvi;
        r.et0 = et0;
        r.forecast_rain = rain;
        r
    }

    #[test]
    fn moisture_weather_triggers_below_thresholds() {
        // Kc=1.15, fc=38.0 -> moisture threshold 26.6
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(20.0), None, Some(5.0), Some(1.0));

        let d = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap();
        assert!(d.irrigate);
        assert!((d.etc_mm - 5.75).abs() < 1e-9);
        assert!((d.irrigation_mm - 4.75).abs() < 1e-9);
    }

    #[test]
    fn moisture_weather_skips_when_soil_is_wet() {
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(30.0), None, Some(5.0), Some(1.0));

        let d = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap();
        assert_eq!(d, Decision::no_irrigation());
    }

    #[test]
    fn moisture_weather_skips_when_rain_is_coming() {
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(20.0), None, Some(5.0), Some(3.0));

        let d = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap();
        assert_eq!(d, Decision::no_irrigation());
    }

    #[test]
    fn moisture_boundary_is_exclusive() {
        let thresholds = ThresholdConfig::default();
        // Exactly at the derived threshold: 0.70 x 38.0 = 26.6
        let r = reading(Some(26.6), None, Some(5.0), Some(1.0));

        let d = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap();
        assert!(!d.irrigate);
    }

    #[test]
    fn ndvi_weather_requires_all_three_conditions() {
        let thresholds = ThresholdConfig::default();

        let stressed = reading(None, Some(0.5), Some(4.0), Some(0.5));
        let d = evaluate(&stressed, Treatment::NdviWeather, &thresholds).unwrap();
        assert!(d.irrigate);

        // Healthy canopy
        let healthy = reading(None, Some(0.8), Some(4.0), Some(0.5));
        let d = evaluate(&healthy, Treatment::NdviWeather, &thresholds).unwrap();
        assert!(!d.irrigate);

        // Low atmospheric demand
        let low_et0 = reading(None, Some(0.5), Some(2.0), Some(0.5));
        let d = evaluate(&low_et0, Treatment::NdviWeather, &thresholds).unwrap();
        assert!(!d.irrigate);
    }

    #[test]
    fn ndvi_soil_weather_full_conjunction() {
        // Worked scenario: NDVI=0.5, moisture=20, ET0=4.0, rain=0.5
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(20.0), Some(0.5), Some(4.0), Some(0.5));

        let d = evaluate(&r, Treatment::NdviSoilWeather, &thresholds).unwrap();
        assert!(d.irrigate);
        assert!((d.etc_mm - 4.6).abs() < 1e-9);
        assert!((d.irrigation_mm - 4.1).abs() < 1e-9);

        // Breaking any one condition cancels irrigation
        let wet_soil = reading(Some(30.0), Some(0.5), Some(4.0), Some(0.5));
        let d = evaluate(&wet_soil, Treatment::NdviSoilWeather, &thresholds).unwrap();
        assert_eq!(d, Decision::no_irrigation());
    }

    #[test]
    fn irrigation_depth_never_negative() {
        let thresholds = ThresholdConfig::default();
        // Forecast rain exceeds demand: ETc = 1.15, rain = 1.9 -> clamp to 0
        let r = reading(Some(20.0), None, Some(1.0), Some(1.9));

        let d = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap();
        assert!(d.irrigate);
        assert_eq!(d.irrigation_mm, 0.0);
    }

    #[test]
    fn control_never_irrigates() {
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(1.0), Some(0.1), Some(9.0), Some(0.0));

        let d = evaluate(&r, Treatment::Control, &thresholds).unwrap();
        assert_eq!(d, Decision::no_irrigation());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(20.0), None, None, Some(1.0));

        let err = evaluate(&r, Treatment::MoistureWeather, &thresholds).unwrap_err();
        assert!(err.to_string().contains("ET0"));
    }

    #[test]
    fn required_field_checked_even_when_condition_fails() {
        let thresholds = ThresholdConfig::default();
        // Soil is wet so no irrigation would happen, but ET0 is required
        let r = reading(Some(30.0), None, None, Some(1.0));

        assert!(evaluate(&r, Treatment::MoistureWeather, &thresholds).is_err());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let thresholds = ThresholdConfig::default();
        let r = reading(Some(20.0), Some(0.5), Some(4.0), Some(0.5));

        let first = evaluate(&r, Treatment::NdviSoilWeather, &thresholds).unwrap();
        let second = evaluate(&r, Treatment::NdviSoilWeather, &thresholds).unwrap();
        assert_eq!(first, second);
    }
}
