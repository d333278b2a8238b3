//! TOML configuration for the `waypose` demo binary.
//!
//! Every field has a default, so a missing file or an empty table yields
//! the original deployment tuning (Tenerife bounds, multiplier 5, smoothing
//! 2, deadband 0.1, 10 Hz ticks).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use tracing::warn;
use waypose_control::MotionConfig;
use waypose_types::{GeoBounds, WayposeError};

/// User-tunable controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default = "default_min_lat")]
    pub min_lat: f32,
    #[serde(default = "default_max_lat")]
    pub max_lat: f32,
    #[serde(default = "default_min_lon")]
    pub min_lon: f32,
    #[serde(default = "default_max_lon")]
    pub max_lon: f32,

    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    #[serde(default = "default_rotation_smoothing")]
    pub rotation_smoothing: f32,
    #[serde(default = "default_deadband")]
    pub deadband: f32,

    /// Demo tick rate in Hz.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f32,
}

fn default_min_lat() -> f32 {
    28.0
}
fn default_max_lat() -> f32 {
    29.0
}
fn default_min_lon() -> f32 {
    -17.0
}
fn default_max_lon() -> f32 {
    -15.0
}
fn default_speed_multiplier() -> f32 {
    5.0
}
fn default_rotation_smoothing() -> f32 {
    2.0
}
fn default_deadband() -> f32 {
    0.1
}
fn default_tick_hz() -> f32 {
    10.0
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_lat: default_min_lat(),
            max_lat: default_max_lat(),
            min_lon: default_min_lon(),
            max_lon: default_max_lon(),
            speed_multiplier: default_speed_multiplier(),
            rotation_smoothing: default_rotation_smoothing(),
            deadband: default_deadband(),
            tick_hz: default_tick_hz(),
        }
    }
}

impl ControllerConfig {
    /// Convert to the controller's [`MotionConfig`].
    pub fn motion(&self) -> MotionConfig {
        MotionConfig {
            bounds: GeoBounds::new(self.min_lat, self.max_lat, self.min_lon, self.max_lon),
            speed_multiplier: self.speed_multiplier,
            rotation_smoothing: self.rotation_smoothing,
            deadband: self.deadband,
        }
    }
}

/// Load the config from `path`, or the defaults when `path` is `None`.
///
/// A missing file is not an error (the defaults apply, with a warning); a
/// file that exists but fails to read or parse is.
pub fn load(path: Option<&Path>) -> Result<ControllerConfig, WayposeError> {
    let mut cfg = match path {
        None => ControllerConfig::default(),
        Some(path) if !path.exists() => {
            warn!(path = %path.display(), "config file not found; using defaults");
            ControllerConfig::default()
        }
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| {
                WayposeError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            toml::from_str(&raw).map_err(|e| {
                WayposeError::Config(format!("failed to parse {}: {e}", path.display()))
            })?
        }
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `WAYPOSE_*` environment variable overrides to `cfg`.
///
/// Extracted for testability without mutating environment variables.
pub fn apply_env_overrides(cfg: &mut ControllerConfig) {
    if let Ok(v) = std::env::var("WAYPOSE_TICK_HZ")
        && let Ok(hz) = v.parse::<f32>()
    {
        cfg.tick_hz = hz;
    }
    if let Ok(v) = std::env::var("WAYPOSE_SPEED_MULTIPLIER")
        && let Ok(mult) = v.parse::<f32>()
    {
        cfg.speed_multiplier = mult;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_tuning() {
        let cfg = ControllerConfig::default();
        assert!((cfg.speed_multiplier - 5.0).abs() < f32::EPSILON);
        assert!((cfg.rotation_smoothing - 2.0).abs() < f32::EPSILON);
        assert!((cfg.deadband - 0.1).abs() < f32::EPSILON);
        assert!(cfg.motion().bounds.contains(28.5, -16.0));
    }

    #[test]
    fn missing_path_yields_defaults() {
        let cfg = load(Some(Path::new("/nonexistent/waypose.toml"))).unwrap();
        assert!((cfg.tick_hz - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "speed_multiplier = 2.5").unwrap();
        let cfg = load(Some(file.path())).unwrap();
        assert!((cfg.speed_multiplier - 2.5).abs() < f32::EPSILON);
        // Untouched fields keep their defaults.
        assert!((cfg.rotation_smoothing - 2.0).abs() < f32::EPSILON);
        assert!((cfg.min_lat - 28.0).abs() < f32::EPSILON);
    }

    #[test]
    fn full_file_overrides_everything() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "min_lat = 40.0\nmax_lat = 41.0\nmin_lon = -4.0\nmax_lon = -3.0\n\
             speed_multiplier = 1.0\nrotation_smoothing = 4.0\ndeadband = 0.05\ntick_hz = 30.0"
        )
        .unwrap();
        let cfg = load(Some(file.path())).unwrap();
        assert!(cfg.motion().bounds.contains(40.5, -3.5));
        assert!(!cfg.motion().bounds.contains(28.5, -16.0));
        assert!((cfg.tick_hz - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn env_override_changes_tick_rate() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("WAYPOSE_TICK_HZ", "25") };
        let mut cfg = ControllerConfig::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.tick_hz - 25.0).abs() < f32::EPSILON);
        unsafe { std::env::remove_var("WAYPOSE_TICK_HZ") };
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "speed_multiplier = \"fast\"").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(matches!(err, WayposeError::Config(_)));
    }
}
