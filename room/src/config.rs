//! Engine configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::HashMap;
use std::env::VarError;

use crate::consts::{EXPORT_TILE_HEIGHT, EXPORT_TILE_WIDTH, MAX_FRAME_EDGE, MODEL_TARGET_HEIGHT, ROTATE_SPEED};
use crate::error::ConfigError;
use crate::grid::LengthUnit;

/// What happens to paint mode after a wall is painted.
///
/// A click that misses every wall always leaves paint mode armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintPolicy {
    /// Stay armed so several walls can be painted in a row.
    #[default]
    Persist,
    /// Return to idle after one successful paint.
    OneShot,
}

/// How a new model selection interacts with loads already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Every load that completes adds an object.
    #[default]
    Append,
    /// A new selection cancels loads still in flight; only the newest lands.
    CancelPrevious,
    /// Each completed load replaces every previously placed object.
    SingleActive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub paint_policy: PaintPolicy,
    pub load_policy: LoadPolicy,
    /// Radians of rotation per pixel of horizontal pointer travel.
    pub rotate_speed: f64,
    /// Height placed models are normalized to.
    pub model_target_height: f64,
    pub export_tile_width: u32,
    pub export_tile_height: u32,
    pub unit: LengthUnit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            paint_policy: PaintPolicy::default(),
            load_policy: LoadPolicy::default(),
            rotate_speed: ROTATE_SPEED,
            model_target_height: MODEL_TARGET_HEIGHT,
            export_tile_width: EXPORT_TILE_WIDTH,
            export_tile_height: EXPORT_TILE_HEIGHT,
            unit: LengthUnit::default(),
        }
    }
}

impl EngineConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `ROOM_PAINT_POLICY`: `persist` (default) or `one_shot`
    /// - `ROOM_LOAD_POLICY`: `append` (default), `cancel_previous` or `single_active`
    /// - `ROOM_ROTATE_SPEED`: default 0.01
    /// - `ROOM_MODEL_TARGET_HEIGHT`: default 100
    /// - `ROOM_EXPORT_TILE_WIDTH` / `ROOM_EXPORT_TILE_HEIGHT`: default 640 / 480, at most 8192
    /// - `ROOM_UNIT`: `feet` (default) or `meters`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a value that is set but unparseable
    /// or not valid UTF-8.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for key in KEYS {
            if let Some(value) = env_value(key, std::env::var(key))? {
                values.insert(key, value);
            }
        }
        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a value that is present but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Ok(Self {
            paint_policy: parse_paint_policy(lookup("ROOM_PAINT_POLICY").as_deref())?,
            load_policy: parse_load_policy(lookup("ROOM_LOAD_POLICY").as_deref())?,
            rotate_speed: parse_positive("ROOM_ROTATE_SPEED", lookup("ROOM_ROTATE_SPEED"), d.rotate_speed)?,
            model_target_height: parse_positive(
                "ROOM_MODEL_TARGET_HEIGHT",
                lookup("ROOM_MODEL_TARGET_HEIGHT"),
                d.model_target_height,
            )?,
            export_tile_width: parse_pixels("ROOM_EXPORT_TILE_WIDTH", lookup("ROOM_EXPORT_TILE_WIDTH"), d.export_tile_width)?,
            export_tile_height: parse_pixels(
                "ROOM_EXPORT_TILE_HEIGHT",
                lookup("ROOM_EXPORT_TILE_HEIGHT"),
                d.export_tile_height,
            )?,
            unit: parse_unit(lookup("ROOM_UNIT").as_deref())?,
        })
    }
}

const KEYS: [&str; 7] = [
    "ROOM_PAINT_POLICY",
    "ROOM_LOAD_POLICY",
    "ROOM_ROTATE_SPEED",
    "ROOM_MODEL_TARGET_HEIGHT",
    "ROOM_EXPORT_TILE_WIDTH",
    "ROOM_EXPORT_TILE_HEIGHT",
    "ROOM_UNIT",
];

/// An unset variable is `None`; a set but non-UTF-8 one is an error.
fn env_value(key: &'static str, raw: Result<String, VarError>) -> Result<Option<String>, ConfigError> {
    match raw {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(value)) => Err(ConfigError::Invalid {
            key,
            value: value.to_string_lossy().into_owned(),
            expected: "UTF-8 text",
        }),
    }
}

fn parse_paint_policy(raw: Option<&str>) -> Result<PaintPolicy, ConfigError> {
    match raw.unwrap_or("persist") {
        "persist" => Ok(PaintPolicy::Persist),
        "one_shot" => Ok(PaintPolicy::OneShot),
        other => Err(ConfigError::Invalid {
            key: "ROOM_PAINT_POLICY",
            value: other.to_string(),
            expected: "persist or one_shot",
        }),
    }
}

fn parse_load_policy(raw: Option<&str>) -> Result<LoadPolicy, ConfigError> {
    match raw.unwrap_or("append") {
        "append" => Ok(LoadPolicy::Append),
        "cancel_previous" => Ok(LoadPolicy::CancelPrevious),
        "single_active" => Ok(LoadPolicy::SingleActive),
        other => Err(ConfigError::Invalid {
            key: "ROOM_LOAD_POLICY",
            value: other.to_string(),
            expected: "append, cancel_previous or single_active",
        }),
    }
}

fn parse_unit(raw: Option<&str>) -> Result<LengthUnit, ConfigError> {
    match raw.unwrap_or("feet") {
        "feet" => Ok(LengthUnit::Feet),
        "meters" => Ok(LengthUnit::Meters),
        other => Err(ConfigError::Invalid { key: "ROOM_UNIT", value: other.to_string(), expected: "feet or meters" }),
    }
}

fn parse_positive(key: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ConfigError::Invalid { key, value: raw, expected: "a positive number" }),
    }
}

fn parse_pixels(key: &'static str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 && v <= MAX_FRAME_EDGE => Ok(v),
        _ => Err(ConfigError::Invalid { key, value: raw, expected: "a pixel count from 1 to 8192" }),
    }
}
