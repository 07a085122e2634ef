#![forbid(unsafe_code)]

//! Configuration-as-data for a tapline list session.
//!
//! Groups the gesture thresholds, the reorder activation constraint and the
//! list policy into one [`TaplineConfig`] that can be loaded from TOML or
//! JSON.
//!
//! # Loading
//!
//! ```toml
//! # tapline.toml
//! [gesture]
//! long_press_delay_ms = 500
//!
//! [reorder]
//! activation_delay_ms = 150
//!
//! [list]
//! max_items = 20
//! ```
//!
//! ```rust,ignore
//! let config = TaplineConfig::load("tapline.toml")?;
//! let gesture = config.to_gesture_config();
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the runtime config types use, so an
//! empty file behaves exactly like `TaplineConfig::default()`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tapline_core::GestureConfig;
use tapline_list::{ListPolicyConfig, ReorderConfig};

// ---------------------------------------------------------------------------
// Top-level TaplineConfig
// ---------------------------------------------------------------------------

/// Every tunable of a tapline list session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaplineConfig {
    pub gesture: GestureSection,
    pub reorder: ReorderSection,
    pub list: ListSection,
}

impl TaplineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a `.json` or TOML file (by extension) and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.to_gesture_config().validate();
        errors.extend(self.to_reorder_config().validate());
        errors.extend(self.to_list_config().validate());
        if self.reorder.activation_delay_ms >= self.gesture.long_press_delay_ms {
            errors.push(format!(
                "reorder.activation_delay_ms ({}) must be below gesture.long_press_delay_ms ({})",
                self.reorder.activation_delay_ms, self.gesture.long_press_delay_ms
            ));
        }
        errors
    }

    /// Build a [`GestureConfig`] from this config.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            tap_slop: self.gesture.tap_slop,
            resolve_threshold: self.gesture.resolve_threshold,
            tap_timeout: Duration::from_millis(self.gesture.tap_timeout_ms),
            double_tap_delay: Duration::from_millis(self.gesture.double_tap_delay_ms),
            long_press_delay: Duration::from_millis(self.gesture.long_press_delay_ms),
        }
    }

    /// Build a [`ReorderConfig`] from this config.
    #[must_use]
    pub fn to_reorder_config(&self) -> ReorderConfig {
        ReorderConfig {
            activation_distance: self.reorder.activation_distance,
            tolerance: self.reorder.tolerance,
            activation_delay: Duration::from_millis(self.reorder.activation_delay_ms),
        }
    }

    /// Build a [`ListPolicyConfig`] from this config.
    #[must_use]
    pub fn to_list_config(&self) -> ListPolicyConfig {
        ListPolicyConfig {
            swipe_delete_threshold: self.list.swipe_delete_threshold,
            max_items: self.list.max_items,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[gesture]`: recognition thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureSection {
    /// Tap slop in px. Default: 5.
    pub tap_slop: f64,
    /// Swipe/drag resolve threshold in px. Default: 15.
    pub resolve_threshold: f64,
    /// Default: 300.
    pub tap_timeout_ms: u64,
    /// Default: 300.
    pub double_tap_delay_ms: u64,
    /// Default: 600.
    pub long_press_delay_ms: u64,
}

impl Default for GestureSection {
    fn default() -> Self {
        let defaults = GestureConfig::default();
        Self {
            tap_slop: defaults.tap_slop,
            resolve_threshold: defaults.resolve_threshold,
            tap_timeout_ms: defaults.tap_timeout.as_millis() as u64,
            double_tap_delay_ms: defaults.double_tap_delay.as_millis() as u64,
            long_press_delay_ms: defaults.long_press_delay.as_millis() as u64,
        }
    }
}

/// `[reorder]`: drag-to-reorder activation constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReorderSection {
    /// Default: 3.
    pub activation_distance: f64,
    /// Default: 5.
    pub tolerance: f64,
    /// Default: 120.
    pub activation_delay_ms: u64,
}

impl Default for ReorderSection {
    fn default() -> Self {
        let defaults = ReorderConfig::default();
        Self {
            activation_distance: defaults.activation_distance,
            tolerance: defaults.tolerance,
            activation_delay_ms: defaults.activation_delay.as_millis() as u64,
        }
    }
}

/// `[list]`: list editing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListSection {
    /// Default: 80.
    pub swipe_delete_threshold: f64,
    /// Default: 10.
    pub max_items: usize,
}

impl Default for ListSection {
    fn default() -> Self {
        let defaults = ListPolicyConfig::default();
        Self {
            swipe_delete_threshold: defaults.swipe_delete_threshold,
            max_items: defaults.max_items,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// TOML render error.
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::TomlSer(e) => write!(f, "TOML render error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::TomlSer(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_runtime_configs() {
        let config = TaplineConfig::default();
        assert_eq!(config.to_gesture_config(), GestureConfig::default());
        assert_eq!(config.to_reorder_config(), ReorderConfig::default());
        assert_eq!(config.to_list_config(), ListPolicyConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            TaplineConfig::from_toml_str("").expect("parse"),
            TaplineConfig::default()
        );
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = TaplineConfig::from_toml_str(
            "[gesture]\nlong_press_delay_ms = 450\n\n[list]\nmax_items = 3\n",
        )
        .expect("parse");
        assert_eq!(
            config.to_gesture_config().long_press_delay,
            Duration::from_millis(450)
        );
        assert_eq!(config.gesture.tap_slop, 5.0);
        assert_eq!(config.list.max_items, 3);
        assert_eq!(config.reorder, ReorderSection::default());
    }

    #[test]
    fn json_loads() {
        let config =
            TaplineConfig::from_json_str(r#"{"reorder":{"tolerance":8.0}}"#).expect("parse");
        assert_eq!(config.to_reorder_config().tolerance, 8.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TaplineConfig::from_toml_str("[gesture]\nlong_pres_delay_ms = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn default_toml_parses_back() {
        let text = TaplineConfig::default().to_toml_string().expect("render");
        assert!(text.contains("[gesture]"));
        assert!(text.contains("long_press_delay_ms = 600"));
        assert_eq!(
            TaplineConfig::from_toml_str(&text).expect("parse"),
            TaplineConfig::default()
        );
    }

    #[test]
    fn validation_collects_every_section() {
        let mut config = TaplineConfig::default();
        config.gesture.tap_timeout_ms = 0;
        config.reorder.tolerance = -1.0;
        config.list.max_items = 0;
        config.reorder.activation_delay_ms = 700;
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("gesture.")));
        assert!(errors.iter().any(|e| e.starts_with("reorder.tolerance")));
        assert!(errors.iter().any(|e| e.starts_with("list.")));
    }

    #[test]
    fn load_picks_format_by_extension_and_validates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = dir.path().join("tapline.json");
        std::fs::write(&json, r#"{"list":{"max_items":4}}"#).expect("write");
        assert_eq!(TaplineConfig::load(&json).expect("load").list.max_items, 4);

        let toml = dir.path().join("tapline.toml");
        std::fs::write(&toml, "[list]\nmax_items = 0\n").expect("write");
        let err = TaplineConfig::load(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("list.max_items"));
    }
}
