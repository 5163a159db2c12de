//! Ball and hitbox configuration, loaded from YAML.
//!
//! ```yaml
//! ball:
//!   hitbox_size: 4.0
//!   size: small
//! hitbox:
//!   correction_delay_ticks: 20
//!   debug: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("ball.hitbox_size must be at least 1, got {0}")]
    HitboxSize(f64),
    #[error("hitbox.staging_depth must be a positive distance, got {0}")]
    StagingDepth(f64),
    #[error("hitbox.{field} must be finite, got {value}")]
    Offset { field: &'static str, value: f64 },
}

/// Size class of the rendered ball model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallSize {
    #[default]
    Normal,
    Small,
}

/// Per-ball settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallMeta {
    /// Hitbox scale in whole size steps. Fractions are truncated.
    pub hitbox_size: f64,
    pub size: BallSize,
}

impl Default for BallMeta {
    fn default() -> Self {
        Self {
            hitbox_size: 2.0,
            size: BallSize::Normal,
        }
    }
}

impl BallMeta {
    /// Size parameter handed to the collision entity: one step below the
    /// configured hitbox size.
    pub fn collision_size(&self) -> i32 {
        (self.hitbox_size.trunc() as i32).saturating_sub(1)
    }
}

/// Tuning for the collision proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxConfig {
    /// How far below the target the proxy is registered before correction.
    pub staging_depth: f64,
    pub correction_delay_ticks: u64,
    /// Vertical lift applied over a small ball.
    pub small_offset: f64,
    /// Vertical lift applied over a normal ball.
    pub normal_offset: f64,
    /// Emit a trace line every time the proxy moves.
    pub debug: bool,
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            staging_depth: 200.0,
            correction_delay_ticks: 20,
            small_offset: 0.5,
            normal_offset: 1.05,
            debug: false,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub ball: BallMeta,
    pub hitbox: HitboxConfig,
}

impl PluginConfig {
    /// Read and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.ball.hitbox_size;
        if !(size >= 1.0) || !size.is_finite() {
            return Err(ConfigError::HitboxSize(size));
        }
        let depth = self.hitbox.staging_depth;
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(ConfigError::StagingDepth(depth));
        }
        for (field, value) in [
            ("small_offset", self.hitbox.small_offset),
            ("normal_offset", self.hitbox.normal_offset),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Offset { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_timing() {
        let config = PluginConfig::default();
        assert_eq!(config.hitbox.staging_depth, 200.0);
        assert_eq!(config.hitbox.correction_delay_ticks, 20);
        assert_eq!(config.hitbox.small_offset, 0.5);
        assert_eq!(config.hitbox.normal_offset, 1.05);
        assert!(!config.hitbox.debug);
    }

    #[test]
    fn collision_size_is_one_below_hitbox_size() {
        let meta = BallMeta {
            hitbox_size: 4.0,
            ..BallMeta::default()
        };
        assert_eq!(meta.collision_size(), 3);

        let fractional = BallMeta {
            hitbox_size: 2.9,
            ..BallMeta::default()
        };
        assert_eq!(fractional.collision_size(), 1);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config = PluginConfig::from_yaml("ball:\n  hitbox_size: 4.0\n  size: small\n").unwrap();
        assert_eq!(config.ball.hitbox_size, 4.0);
        assert_eq!(config.ball.size, BallSize::Small);
        assert_eq!(config.hitbox, HitboxConfig::default());
    }

    #[test]
    fn rejects_tiny_hitbox() {
        let err = PluginConfig::from_yaml("ball:\n  hitbox_size: 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::HitboxSize(_)));
    }

    #[test]
    fn rejects_staging_at_or_above_target() {
        for depth in ["0", "-5.0", ".nan", ".inf"] {
            let text = format!("hitbox:\n  staging_depth: {depth}\n");
            let err = PluginConfig::from_yaml(&text).unwrap_err();
            assert!(matches!(err, ConfigError::StagingDepth(_)), "{depth}: {err}");
        }
    }

    #[test]
    fn rejects_non_finite_offsets() {
        let err = PluginConfig::from_yaml("hitbox:\n  small_offset: .nan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Offset { field: "small_offset", .. }));

        let mut config = PluginConfig::default();
        config.hitbox.normal_offset = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "hitbox.normal_offset must be finite, got inf");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(PluginConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_ball_size() {
        let err = PluginConfig::from_yaml("ball:\n  size: huge\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ball.yml");
        std::fs::write(
            &path,
            "hitbox:\n  correction_delay_ticks: 40\n  debug: true\n",
        )
        .unwrap();

        let config = PluginConfig::load(&path).unwrap();
        assert_eq!(config.hitbox.correction_delay_ticks, 40);
        assert!(config.hitbox.debug);
        assert_eq!(config.ball, BallMeta::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PluginConfig::load(dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn yaml_round_trip_keeps_values() {
        let mut config = PluginConfig::default();
        config.ball.size = BallSize::Small;
        config.hitbox.debug = true;
        let text = config.to_yaml().unwrap();
        assert_eq!(PluginConfig::from_yaml(&text).unwrap(), config);
    }
}
