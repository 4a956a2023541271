//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bstviz/bstviz.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `BSTVIZ__*` prefix, `__` between section and field

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::LayoutConfig;

/// Keys the visualizer starts with and returns to on reset.
pub const SAMPLE_KEYS: [f64; 7] = [50.0, 30.0, 70.0, 20.0, 40.0, 60.0, 80.0];

/// Animation pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Pause after each replayed step, in milliseconds
    pub step_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { step_delay_ms: 650 }
    }
}

impl AnimationConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

/// Raw layout config for intermediate parsing (None = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub min_width: Option<f64>,
    pub node_spacing: Option<f64>,
    pub min_height: Option<f64>,
    pub y_base: Option<f64>,
    pub y_step: Option<f64>,
    pub node_radius: Option<f64>,
}

/// Raw animation config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAnimationConfig {
    pub step_delay_ms: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub sample: Option<Vec<f64>>,
    pub layout: RawLayoutConfig,
    pub animation: RawAnimationConfig,
}

/// Unified configuration for bstviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Keys inserted on startup and on reset
    pub sample: Vec<f64>,
    /// Layout geometry
    pub layout: LayoutConfig,
    /// Animation pacing
    pub animation: AnimationConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample: SAMPLE_KEYS.to_vec(),
            layout: LayoutConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Get the XDG config directory for bstviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bstviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bstviz.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay values wins if specified, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let layout = &overlay.layout;
        Self {
            sample: overlay.sample.clone().unwrap_or_else(|| self.sample.clone()),
            layout: LayoutConfig {
                min_width: layout.min_width.unwrap_or(self.layout.min_width),
                node_spacing: layout.node_spacing.unwrap_or(self.layout.node_spacing),
                min_height: layout.min_height.unwrap_or(self.layout.min_height),
                y_base: layout.y_base.unwrap_or(self.layout.y_base),
                y_step: layout.y_step.unwrap_or(self.layout.y_step),
                node_radius: layout.node_radius.unwrap_or(self.layout.node_radius),
            },
            animation: AnimationConfig {
                step_delay_ms: overlay
                    .animation
                    .step_delay_ms
                    .unwrap_or(self.animation.step_delay_ms),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional explicit config file; it must exist when given
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Load defaults plus one explicit file, ignoring global config and env.
    pub fn load_file(path: &Path) -> ApplicationResult<Self> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply BSTVIZ__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("BSTVIZ")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("sample")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<f64>>("sample") {
            settings.sample = val;
        }
        if let Ok(val) = config.get::<u64>("animation.step_delay_ms") {
            settings.animation.step_delay_ms = val;
        }
        let layout = &mut settings.layout;
        for (key, slot) in [
            ("layout.min_width", &mut layout.min_width),
            ("layout.node_spacing", &mut layout.node_spacing),
            ("layout.min_height", &mut layout.min_height),
            ("layout.y_base", &mut layout.y_base),
            ("layout.y_step", &mut layout.y_step),
            ("layout.node_radius", &mut layout.node_radius),
        ] {
            if let Ok(val) = config.get::<f64>(key) {
                *slot = val;
            }
        }

        Ok(settings)
    }

    /// Reject geometry the layout engine cannot work with.
    pub fn validate(&self) -> ApplicationResult<()> {
        let l = &self.layout;
        let positive = [
            ("layout.min_width", l.min_width),
            ("layout.node_spacing", l.node_spacing),
            ("layout.min_height", l.min_height),
            ("layout.y_step", l.y_step),
            ("layout.node_radius", l.node_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ApplicationError::Config {
                    message: format!("{} must be a positive number, got {}", name, value),
                });
            }
        }
        if !l.y_base.is_finite() || l.y_base < 0.0 {
            return Err(ApplicationError::Config {
                message: format!("layout.y_base must be >= 0, got {}", l.y_base),
            });
        }
        if let Some(bad) = self.sample.iter().find(|v| !v.is_finite()) {
            return Err(ApplicationError::Config {
                message: format!("sample contains a non-finite key: {}", bad),
            });
        }
        Ok(())
    }

    /// Serialize as TOML, e.g. for `bstviz info`.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_validating_then_ok() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.sample, SAMPLE_KEYS.to_vec());
        assert_eq!(settings.animation.step_delay(), Duration::from_millis(650));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let raw: RawSettings = toml::from_str("[layout]\ny_step = 100.0\n").unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.layout.y_step, 100.0);
        assert_eq!(merged.layout.y_base, 70.0);
        assert_eq!(merged.sample, SAMPLE_KEYS.to_vec());
    }

    #[test]
    fn given_zero_spacing_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.layout.node_spacing = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
