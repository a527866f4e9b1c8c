use crate::error::{IrriOpsError, Result};
use crate::logic::ThresholdConfig;
use crate::models::Treatment;
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Treatment selected at startup when none is given on the CLI.
    pub treatment: Option<String>,
    pub thresholds: ThresholdConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory schedules are written into.
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration, falling back to built-in defaults when no config
    /// file exists. Default thresholds are compiled in, so the program is
    /// fully usable without running `irriops init` first.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            tracing::debug!("no config file found, using built-in defaults");
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| IrriOpsError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| IrriOpsError::Config(format!("Failed to parse config: {}", e)))?;

        config.thresholds.validate()?;
        config.default_treatment()?;

        Ok(config)
    }

    /// Treatment named in the config file, if any.
    pub fn default_treatment(&self) -> Result<Option<Treatment>> {
        match &self.treatment {
            None => Ok(None),
            Some(s) => Treatment::from_str(s)
                .map(Some)
                .ok_or_else(|| IrriOpsError::UnknownTreatment(s.clone())),
        }
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("irriops").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger the defaults fallback in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| IrriOpsError::Config("Cannot determine config directory".into()))?
            .join("irriops")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Default path for writing new config files (~/.config/irriops/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| IrriOpsError::Config("Cannot determine config directory".into()))?
            .join("irriops");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        let defaults = ThresholdConfig::default();

        println!();
        println!("Let's set up IrriOps!");
        println!();

        println!("Default Treatment");
        let treatment: String = Input::new()
            .with_prompt("  Treatment (t1-t4)")
            .default("t1".into())
            .validate_with(|s: &String| match Treatment::from_str(s) {
                Some(_) => Ok(()),
                None => Err("expected t1, t2, t3, or t4"),
            })
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        println!();
        println!("Thresholds");

        let kc: f64 = Input::new()
            .with_prompt("  Crop coefficient (Kc)")
            .default(defaults.kc)
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        let field_capacity: f64 = Input::new()
            .with_prompt("  Field capacity [%]")
            .default(defaults.field_capacity)
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        let rain_threshold_mm: f64 = Input::new()
            .with_prompt("  Rain threshold [mm]")
            .default(defaults.rain_threshold_mm)
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        let ndvi_threshold: f64 = Input::new()
            .with_prompt("  NDVI stress threshold")
            .default(defaults.ndvi_threshold)
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        let et0_threshold_mm: f64 = Input::new()
            .with_prompt("  ET0 threshold [mm]")
            .default(defaults.et0_threshold_mm)
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Export");
        let export_dir: String = Input::new()
            .with_prompt("  Schedule export directory")
            .default(".".into())
            .interact_text()
            .map_err(|e| IrriOpsError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            treatment: Some(treatment),
            thresholds: ThresholdConfig {
                kc,
                field_capacity,
                rain_threshold_mm,
                ndvi_threshold,
                et0_threshold_mm,
            },
            export: ExportConfig {
                directory: PathBuf::from(export_dir),
            },
        };
        config.thresholds.validate()?;

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| IrriOpsError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# IrriOps Configuration\n# Generated by `irriops init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap();
        assert!(config.treatment.is_none());
        assert_eq!(config.thresholds, ThresholdConfig::default());
        assert_eq!(config.export.directory, PathBuf::from("."));
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"treatment: t2\nthresholds:\n  kc: 1.05\n")
            .unwrap();

        let config = Config::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(
            config.default_treatment().unwrap(),
            Some(Treatment::MoistureWeather)
        );
        assert_eq!(config.thresholds.kc, 1.05);
        // Unspecified thresholds keep their defaults
        assert_eq!(config.thresholds.field_capacity, 38.0);
    }

    #[test]
    fn unknown_treatment_is_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"treatment: t9\n").unwrap();

        assert!(matches!(
            Config::load(Some(file.path().to_path_buf())),
            Err(IrriOpsError::UnknownTreatment(_))
        ));
    }

    #[test]
    fn out_of_range_thresholds_are_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"thresholds:\n  field_capacity: -10.0\n")
            .unwrap();

        assert!(matches!(
            Config::load(Some(file.path().to_path_buf())),
            Err(IrriOpsError::InvalidThreshold(_))
        ));
    }
}
