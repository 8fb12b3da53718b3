//! Sizing and behaviour options accepted at mount time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the book reacts to the size of its mount surface.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Pages keep the configured width/height.
    #[default]
    Fixed,
    /// Pages scale with the surface inside the min/max bounds.
    Stretch,
}

impl std::fmt::Display for SizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SizeMode::Fixed => "fixed",
            SizeMode::Stretch => "stretch",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ReaderOptions {
    #[serde(default = "default_page_width")]
    pub width: f32,
    #[serde(default = "default_page_height")]
    pub height: f32,
    #[serde(default)]
    pub size: SizeMode,
    #[serde(default = "default_min_width")]
    pub min_width: f32,
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    #[serde(default = "default_min_height")]
    pub min_height: f32,
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    #[serde(default = "default_flip_duration_ms")]
    pub flip_duration_ms: u64,
    #[serde(default = "default_show_cover")]
    pub show_cover: bool,
    #[serde(default)]
    pub use_portrait: bool,
    /// Minimum horizontal drag (surface units) that commits a page turn.
    #[serde(default = "default_swipe_distance")]
    pub swipe_distance: f32,
    #[serde(default = "default_pagination_radius")]
    pub pagination_radius: usize,
    #[serde(default = "default_draw_shadow")]
    pub draw_shadow: bool,
    #[serde(default = "default_max_shadow_opacity")]
    pub max_shadow_opacity: f32,
    #[serde(default = "default_auto_size")]
    pub auto_size: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            width: default_page_width(),
            height: default_page_height(),
            size: SizeMode::Fixed,
            min_width: default_min_width(),
            max_width: default_max_width(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            flip_duration_ms: default_flip_duration_ms(),
            show_cover: default_show_cover(),
            use_portrait: false,
            swipe_distance: default_swipe_distance(),
            pagination_radius: default_pagination_radius(),
            draw_shadow: default_draw_shadow(),
            max_shadow_opacity: default_max_shadow_opacity(),
            auto_size: default_auto_size(),
        }
    }
}

impl ReaderOptions {
    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms)
    }

    /// Snap-back after an uncommitted drag runs at half the flip duration.
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms / 2)
    }

    /// Bring user-supplied values back into a usable range.
    /// Non-finite sizes fall back to their defaults before clamping.
    pub fn sanitized(mut self) -> Self {
        self.min_width = finite_or(self.min_width, default_min_width()).max(1.0);
        self.max_width = finite_or(self.max_width, default_max_width()).max(self.min_width);
        self.min_height = finite_or(self.min_height, default_min_height()).max(1.0);
        self.max_height = finite_or(self.max_height, default_max_height()).max(self.min_height);
        self.width =
            finite_or(self.width, default_page_width()).clamp(self.min_width, self.max_width);
        self.height =
            finite_or(self.height, default_page_height()).clamp(self.min_height, self.max_height);
        if !self.swipe_distance.is_finite() || self.swipe_distance < 0.0 {
            self.swipe_distance = default_swipe_distance();
        }
        self.max_shadow_opacity =
            finite_or(self.max_shadow_opacity, default_max_shadow_opacity()).clamp(0.0, 1.0);
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn default_page_width() -> f32 {
    600.0
}

fn default_page_height() -> f32 {
    800.0
}

fn default_min_width() -> f32 {
    315.0
}

fn default_max_width() -> f32 {
    1000.0
}

fn default_min_height() -> f32 {
    420.0
}

fn default_max_height() -> f32 {
    1350.0
}

fn default_flip_duration_ms() -> u64 {
    600
}

fn default_show_cover() -> bool {
    true
}

fn default_swipe_distance() -> f32 {
    50.0
}

fn default_pagination_radius() -> usize {
    2
}

fn default_draw_shadow() -> bool {
    true
}

fn default_max_shadow_opacity() -> f32 {
    0.25
}

fn default_auto_size() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: ReaderOptions = serde_json::from_str(r#"{"size":"stretch"}"#).unwrap();
        assert_eq!(options.size, SizeMode::Stretch);
        assert_eq!(options.flip_duration(), Duration::from_millis(600));
        assert_eq!(options.swipe_distance, 50.0);
        assert!(options.show_cover);
    }

    #[test]
    fn sanitized_clamps_page_size_into_bounds() {
        let options = ReaderOptions {
            width: 50.0,
            height: 5000.0,
            swipe_distance: -3.0,
            ..ReaderOptions::default()
        }
        .sanitized();
        assert_eq!(options.width, 315.0);
        assert_eq!(options.height, 1350.0);
        assert_eq!(options.swipe_distance, 50.0);
    }

    #[test]
    fn sanitized_replaces_non_finite_values_with_defaults() {
        let options = ReaderOptions {
            width: f32::NAN,
            height: f32::INFINITY,
            min_width: f32::NAN,
            max_height: f32::NEG_INFINITY,
            max_shadow_opacity: f32::NAN,
            ..ReaderOptions::default()
        }
        .sanitized();
        assert_eq!(options.width, 600.0);
        assert_eq!(options.height, 800.0);
        assert_eq!(options.min_width, 315.0);
        assert_eq!(options.max_height, 1350.0);
        assert_eq!(options.max_shadow_opacity, default_max_shadow_opacity());
    }
}
