//! Engine configuration: viewport limits, interaction policy, and hit-test sizes.
//!
//! Every field has a default (see [`crate::consts`]), so a host can start from
//! `EngineConfig::default()`, deserialize a partial JSON document, or read
//! overrides from `MOODBOARD_*` environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    EMPTY_FIT_SCALE, FIT_MAX_SCALE, FIT_PADDING_RATIO, MAX_SCALE, MIN_SCALE, RESIZE_HANDLE_PX, SELECTED_Z_INDEX,
    ZOOM_STEP,
};
use crate::input::CommitPolicy;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{0}")]
    OutOfRange(String),
}

/// Auto-fit and manual zoom parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    /// Fraction of each container dimension reserved on both sides.
    pub fit_padding_ratio: f64,
    pub fit_max_scale: f64,
    /// Scale used when auto-fit has nothing to frame.
    pub empty_fit_scale: f64,
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fit_padding_ratio: FIT_PADDING_RATIO,
            fit_max_scale: FIT_MAX_SCALE,
            empty_fit_scale: EMPTY_FIT_SCALE,
            zoom_step: ZOOM_STEP,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub viewport: ViewportConfig,
    /// Effective z-index floor of the selected item during a paint pass.
    pub selected_z_index: i64,
    /// Side of the resize hotspot in screen pixels.
    pub resize_handle_px: f64,
    pub commit_policy: CommitPolicy,
    /// Whether dragging on empty canvas pans the viewport.
    pub pan_on_empty_drag: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            selected_z_index: SELECTED_Z_INDEX,
            resize_handle_px: RESIZE_HANDLE_PX,
            commit_policy: CommitPolicy::default(),
            pan_on_empty_drag: true,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `MOODBOARD_FIT_PADDING_RATIO`: default 0.1
    /// - `MOODBOARD_FIT_MAX_SCALE`: default 0.9
    /// - `MOODBOARD_EMPTY_FIT_SCALE`: default 0.5
    /// - `MOODBOARD_ZOOM_STEP`: default 0.1
    /// - `MOODBOARD_MIN_SCALE` / `MOODBOARD_MAX_SCALE`: default 0.2 / 1.5
    /// - `MOODBOARD_SELECTED_Z_INDEX`: default 100
    /// - `MOODBOARD_RESIZE_HANDLE_PX`: default 16
    /// - `MOODBOARD_COMMIT_POLICY`: `on_release` (default) or `continuous`
    /// - `MOODBOARD_PAN_ON_EMPTY_DRAG`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but unparseable, or if the
    /// resulting values are inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env_value(std::env::var(key)))
    }

    /// Build config from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let viewport = ViewportConfig {
            fit_padding_ratio: parse_var(&lookup, "MOODBOARD_FIT_PADDING_RATIO", d.viewport.fit_padding_ratio)?,
            fit_max_scale: parse_var(&lookup, "MOODBOARD_FIT_MAX_SCALE", d.viewport.fit_max_scale)?,
            empty_fit_scale: parse_var(&lookup, "MOODBOARD_EMPTY_FIT_SCALE", d.viewport.empty_fit_scale)?,
            zoom_step: parse_var(&lookup, "MOODBOARD_ZOOM_STEP", d.viewport.zoom_step)?,
            min_scale: parse_var(&lookup, "MOODBOARD_MIN_SCALE", d.viewport.min_scale)?,
            max_scale: parse_var(&lookup, "MOODBOARD_MAX_SCALE", d.viewport.max_scale)?,
        };
        let commit_policy = match lookup("MOODBOARD_COMMIT_POLICY") {
            Some(raw) => parse_commit_policy(&raw)?,
            None => d.commit_policy,
        };
        let cfg = Self {
            viewport,
            selected_z_index: parse_var(&lookup, "MOODBOARD_SELECTED_Z_INDEX", d.selected_z_index)?,
            resize_handle_px: parse_var(&lookup, "MOODBOARD_RESIZE_HANDLE_PX", d.resize_handle_px)?,
            commit_policy,
            pan_on_empty_drag: parse_var(&lookup, "MOODBOARD_PAN_ON_EMPTY_DRAG", d.pan_on_empty_drag)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that values are usable together.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.viewport;
        let positive = [
            ("fitMaxScale", v.fit_max_scale),
            ("emptyFitScale", v.empty_fit_scale),
            ("zoomStep", v.zoom_step),
            ("minScale", v.min_scale),
            ("maxScale", v.max_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange(format!("{name} must be a positive number, got {value}")));
            }
        }
        if v.min_scale > v.max_scale {
            return Err(ConfigError::OutOfRange(format!(
                "minScale {} exceeds maxScale {}",
                v.min_scale, v.max_scale
            )));
        }
        if !(0.0..0.5).contains(&v.fit_padding_ratio) {
            return Err(ConfigError::OutOfRange(format!(
                "fitPaddingRatio must be in [0, 0.5), got {}",
                v.fit_padding_ratio
            )));
        }
        if !(self.resize_handle_px.is_finite() && self.resize_handle_px >= 0.0) {
            return Err(ConfigError::OutOfRange(format!(
                "resizeHandlePx must be non-negative, got {}",
                self.resize_handle_px
            )));
        }
        Ok(())
    }
}

/// A variable that is set but not UTF-8 still counts as set, so it fails
/// parsing with `InvalidValue` instead of silently taking the default.
fn env_value(result: Result<String, VarError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

fn parse_commit_policy(raw: &str) -> Result<CommitPolicy, ConfigError> {
    match raw.trim() {
        "on_release" => Ok(CommitPolicy::OnRelease),
        "continuous" => Ok(CommitPolicy::Continuous),
        other => Err(ConfigError::InvalidValue { var: "MOODBOARD_COMMIT_POLICY", value: other.to_owned() }),
    }
}
