//! Runtime rain configuration loaded from `assets/rain.toml`.
//!
//! [`RainConfig`] is a Bevy [`Resource`] that mirrors every default in
//! [`crate::constants`].  At startup, [`load_rain_config`] reads the config
//! file and overwrites the defaults with any values present in it.  Missing
//! keys fall back to the compile-time defaults, so a minimal TOML can override
//! just the values you care about:
//!
//! ```toml
//! [emitter]
//! particle_count = 40
//!
//! [trail]
//! length = 6
//! ```
//!
//! The file path can be overridden with the `RAINFALL_CONFIG` environment
//! variable.  Keep `src/constants.rs` in sync: it remains the authoritative
//! default source used by `RainConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_non_negative, validate_positive, validate_unit_interval, RainError, RainResult,
};
use bevy::prelude::*;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    pub particle_count: usize,
    pub emission_interval_ms: u64,
    pub deletion_interval_ms: u64,
    pub emission_radius: f32,
    pub position: [f32; 3],
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            emission_interval_ms: EMISSION_INTERVAL_MS,
            deletion_interval_ms: DELETION_INTERVAL_MS,
            emission_radius: EMISSION_RADIUS,
            position: EMITTER_POSITION,
        }
    }
}

impl EmitterSettings {
    pub fn emission_interval(&self) -> Duration {
        Duration::from_millis(self.emission_interval_ms)
    }

    pub fn deletion_interval(&self) -> Duration {
        Duration::from_millis(self.deletion_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropSettings {
    pub radius: f32,
    pub mass: f32,
    pub color: String,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for DropSettings {
    fn default() -> Self {
        Self {
            radius: PARTICLE_RADIUS,
            mass: PARTICLE_MASS,
            color: PARTICLE_COLOR.to_string(),
            opacity: PARTICLE_OPACITY,
            metalness: PARTICLE_METALNESS,
            roughness: PARTICLE_ROUGHNESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrailSettings {
    /// Drops spawn without a trail when `false`.
    pub enabled: bool,
    pub length: usize,
    pub width: f32,
    pub opacity: f32,
    pub color: String,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            length: TRAIL_LENGTH,
            width: TRAIL_WIDTH,
            opacity: TRAIL_OPACITY,
            color: TRAIL_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroundSettings {
    pub level: f32,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            level: GROUND_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindSettings {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub std: f32,
}

impl Default for WindSettings {
    fn default() -> Self {
        let [x, y, z] = WIND_FORCE;
        Self {
            x,
            y,
            z,
            std: WIND_STD,
        }
    }
}

impl WindSettings {
    pub fn force(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Runtime-tunable rain configuration, one section per behavior.
#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    pub emitter: EmitterSettings,
    pub drop: DropSettings,
    pub trail: TrailSettings,
    pub ground: GroundSettings,
    pub wind: WindSettings,
}

impl RainConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> RainResult<Self> {
        let config: RainConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RainResult<()> {
        if self.emitter.emission_interval_ms == 0 {
            return Err(RainError::OutOfRange {
                field: "emitter.emission_interval_ms",
                value: 0.0,
                expected: "[1, ∞)",
            });
        }
        if self.trail.length == 0 {
            return Err(RainError::OutOfRange {
                field: "trail.length",
                value: 0.0,
                expected: "[1, ∞)",
            });
        }
        validate_non_negative("emitter.emission_radius", self.emitter.emission_radius)?;
        validate_positive("drop.radius", self.drop.radius)?;
        validate_positive("drop.mass", self.drop.mass)?;
        validate_unit_interval("drop.opacity", self.drop.opacity)?;
        validate_unit_interval("drop.metalness", self.drop.metalness)?;
        validate_unit_interval("drop.roughness", self.drop.roughness)?;
        validate_non_negative("trail.width", self.trail.width)?;
        validate_unit_interval("trail.opacity", self.trail.opacity)?;
        validate_non_negative("wind.std", self.wind.std)?;
        self.drop_color()?;
        self.trail_color()?;
        Ok(())
    }

    pub fn drop_color(&self) -> RainResult<Color> {
        parse_color("drop.color", &self.drop.color)
    }

    pub fn trail_color(&self) -> RainResult<Color> {
        parse_color("trail.color", &self.trail.color)
    }
}

/// Parse a `#RRGGBB` (or `#RRGGBBAA`, `#RGB`) colour string.
pub fn parse_color(field: &'static str, value: &str) -> RainResult<Color> {
    Srgba::hex(value)
        .map(Color::from)
        .map_err(|_| RainError::InvalidColor {
            field,
            value: value.to_string(),
        })
}

/// Path of the config file: `RAINFALL_CONFIG` if set, else `assets/rain.toml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string())
}

/// Startup system: attempt to load the config file and overwrite the
/// `RainConfig` resource with any values present in it.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged and the defaults are kept.  A missing file is not an error.
pub fn load_rain_config(mut config: ResMut<RainConfig>) {
    let path = config_path();
    match std::fs::read_to_string(&path) {
        Ok(contents) => match RainConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded rain config from {}", path);
            }
            Err(err) => {
                warn!("Failed to load {}: {}; using defaults", path, err);
            }
        },
        Err(_) => {
            info!("No {} found; using compiled defaults", path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RainConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = RainConfig::from_toml_str("").expect("empty TOML is valid");
        assert_eq!(config, RainConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = RainConfig::from_toml_str(
            r#"
            [emitter]
            particle_count = 5
            position = [1.0, 8.0, -2.0]

            [trail]
            length = 6
            enabled = false
            "#,
        )
        .expect("valid override");

        assert_eq!(config.emitter.particle_count, 5);
        assert_eq!(config.emitter.position, [1.0, 8.0, -2.0]);
        assert_eq!(config.emitter.emission_interval_ms, EMISSION_INTERVAL_MS);
        assert_eq!(config.trail.length, 6);
        assert!(!config.trail.enabled);
        assert_eq!(config.ground.level, GROUND_LEVEL);
    }

    #[test]
    fn zero_trail_length_is_rejected() {
        let err = RainConfig::from_toml_str("[trail]\nlength = 0").unwrap_err();
        assert!(matches!(
            err,
            RainError::OutOfRange {
                field: "trail.length",
                ..
            }
        ));
    }

    #[test]
    fn negative_std_is_rejected() {
        assert!(RainConfig::from_toml_str("[wind]\nstd = -0.1").is_err());
    }

    #[test]
    fn bad_colour_is_rejected() {
        let err = RainConfig::from_toml_str("[drop]\ncolor = \"rain\"").unwrap_err();
        assert!(matches!(
            err,
            RainError::InvalidColor {
                field: "drop.color",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = RainConfig::from_toml_str("[emitter\nparticle_count = ").unwrap_err();
        assert!(matches!(err, RainError::Parse { .. }));
    }

    #[test]
    fn default_colour_parses() {
        let color = RainConfig::default().drop_color().expect("default colour");
        assert_eq!(color, Color::srgb_u8(0x9C, 0xE3, 0xF9));
    }
}
