use crate::error::{IrriOpsError, Result};
use serde::{Deserialize, Serialize};

/// Scalar rule parameters, adjustable per session. Each treatment reads a
/// subset of these; the rest are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Crop coefficient (Kc).
    pub kc: f64,
    /// Field capacity [%].
    pub field_capacity: f64,
    /// Forecast rain above this cancels irrigation [mm].
    pub rain_threshold_mm: f64,
    /// NDVI below this indicates plant stress.
    pub ndvi_threshold: f64,
    /// ET0 above this indicates atmospheric demand [mm].
    pub et0_threshold_mm: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            kc: 1.15,
            field_capacity: 38.0,
            rain_threshold_mm: 2.0,
            ndvi_threshold: 0.65,
            et0_threshold_mm: 3.5,
        }
    }
}

impl ThresholdConfig {
    /// Soil moisture trigger level: 70% of field capacity.
    pub fn moisture_threshold(&self) -> f64 {
        0.70 * self.field_capacity
    }

    /// Reject nonsensical parameters before any row is evaluated.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.kc,
            self.field_capacity,
            self.rain_threshold_mm,
            self.ndvi_threshold,
            self.et0_threshold_mm,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(IrriOpsError::InvalidThreshold(
                "all thresholds must be finite numbers".into(),
            ));
        }
        if self.kc <= 0.0 {
            return Err(IrriOpsError::InvalidThreshold(format!(
                "crop coefficient must be positive, got {}",
                self.kc
            )));
        }
        if self.field_capacity <= 0.0 {
            return Err(IrriOpsError::InvalidThreshold(format!(
                "field capacity must be positive, got {}",
                self.field_capacity
            )));
        }
        if self.rain_threshold_mm < 0.0 {
            return Err(IrriOpsError::InvalidThreshold(format!(
                "rain threshold must not be negative, got {}",
                self.rain_threshold_mm
            )));
        }
        if self.et0_threshold_mm < 0.0 {
            return Err(IrriOpsError::InvalidThreshold(format!(
                "ET0 threshold must not be negative, got {}",
                self.et0_threshold_mm
            )));
        }
        if !(0.0..=1.0).contains(&self.ndvi_threshold) {
            return Err(IrriOpsError::InvalidThreshold(format!(
                "NDVI threshold must be within [0, 1], got {}",
                self.ndvi_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_moisture_threshold() {
        let thresholds = ThresholdConfig::default();
        // 0.70 x 38.0
        assert!((thresholds.moisture_threshold() - 26.6).abs() < 1e-9);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let negative_fc = ThresholdConfig {
            field_capacity: -5.0,
            ..Default::default()
        };
        assert!(negative_fc.validate().is_err());

        let nan_kc = ThresholdConfig {
            kc: f64::NAN,
            ..Default::default()
        };
        assert!(nan_kc.validate().is_err());

        let ndvi_out_of_range = ThresholdConfig {
            ndvi_threshold: 1.5,
            ..Default::default()
        };
        assert!(ndvi_out_of_range.validate().is_err());

        let negative_rain = ThresholdConfig {
            rain_threshold_mm: -1.0,
            ..Default::default()
        };
        assert!(negative_rain.validate().is_err());
    }
}
