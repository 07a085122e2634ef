#![forbid(unsafe_code)]

//! Thresholds and timeouts for pointer gesture recognition.

use std::time::Duration;

/// Thresholds and timeouts for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Movement (px, per axis) a press may drift and still count as a tap.
    /// Reaching it also cancels the long-press timer (default: 5).
    ///
    /// The boundary is inclusive for both rules: a drift of exactly
    /// `tap_slop` is no longer a tap and no longer a long-press.
    pub tap_slop: f64,
    /// Movement (px, per axis) that resolves a session into swipe or drag.
    /// The horizontal axis is checked first (default: 15).
    pub resolve_threshold: f64,
    /// Longest press still classified as a tap (default: 300ms).
    pub tap_timeout: Duration,
    /// Window after a tap in which a second tap becomes a double-tap (default: 300ms).
    pub double_tap_delay: Duration,
    /// Stationary hold before a long-press fires (default: 600ms).
    pub long_press_delay: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_slop: 5.0,
            resolve_threshold: 15.0,
            tap_timeout: Duration::from_millis(300),
            double_tap_delay: Duration::from_millis(300),
            long_press_delay: Duration::from_millis(600),
        }
    }
}

impl GestureConfig {
    /// Check that every threshold is usable.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.tap_slop.is_finite() || self.tap_slop < 0.0 {
            errors.push(format!("gesture.tap_slop must be >= 0, got {}", self.tap_slop));
        }
        if !self.resolve_threshold.is_finite() || self.resolve_threshold <= 0.0 {
            errors.push(format!(
                "gesture.resolve_threshold must be > 0, got {}",
                self.resolve_threshold
            ));
        }
        if self.resolve_threshold < self.tap_slop {
            errors.push(format!(
                "gesture.resolve_threshold ({}) must not be below gesture.tap_slop ({})",
                self.resolve_threshold, self.tap_slop
            ));
        }
        if self.tap_timeout.is_zero() {
            errors.push("gesture.tap_timeout must be > 0".into());
        }
        if self.long_press_delay.is_zero() {
            errors.push("gesture.long_press_delay must be > 0".into());
        }

        errors
    }
}
