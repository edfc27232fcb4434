//! Shared geometric primitives used by the layout calculator, host and toolkit.
use serde::Deserialize;

/// Measured size of the host mount point (the body element).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pixel bounds the editing surface may occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxDimensions {
    pub max_width: f64,
    pub max_height: f64,
}

/// Layout values derived on every show or resize. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutMetrics {
    pub max_width: f64,
    pub max_height: f64,
    pub vertical_offset: f64,
}

impl LayoutMetrics {
    pub fn with_dimensions(self, dimensions: MaxDimensions) -> Self {
        Self {
            max_width: dimensions.max_width,
            max_height: dimensions.max_height,
            ..self
        }
    }

    pub fn with_offset(self, vertical_offset: f64) -> Self {
        Self {
            vertical_offset,
            ..self
        }
    }
}

/// Vertical point of interest the popup centers on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Anchor {
    #[serde(default)]
    pub top: f64,
}

impl Anchor {
    pub const fn new(top: f64) -> Self {
        Self { top }
    }

    /// Returns the anchor with a non-finite `top` replaced by 0.
    pub fn sanitized(self) -> Self {
        if self.top.is_finite() {
            self
        } else {
            tracing::debug!(top = self.top, "non-finite anchor top; using 0");
            Self::default()
        }
    }

    /// Parses `{"top": <number>}`. Anything malformed degrades to `top = 0`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match serde_json::from_value::<Anchor>(value.clone()) {
            Ok(anchor) => anchor.sanitized(),
            Err(err) => {
                tracing::debug!(?err, %value, "malformed anchor; using 0");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn anchor_from_json_reads_top() {
        assert_eq!(Anchor::from_json(&json!({ "top": 120.5 })), Anchor::new(120.5));
    }

    #[test]
    fn anchor_from_json_defaults_missing_top_to_zero() {
        assert_eq!(Anchor::from_json(&json!({})), Anchor::new(0.0));
    }

    #[test]
    fn anchor_from_json_degrades_malformed_input_to_zero() {
        assert_eq!(Anchor::from_json(&json!({ "top": "abc" })), Anchor::default());
        assert_eq!(Anchor::from_json(&json!(42)), Anchor::default());
        assert_eq!(Anchor::from_json(&json!(null)), Anchor::default());
    }

    #[test]
    fn sanitized_replaces_non_finite_top() {
        assert_eq!(Anchor::new(f64::NAN).sanitized(), Anchor::default());
        assert_eq!(Anchor::new(f64::INFINITY).sanitized(), Anchor::default());
        assert_eq!(Anchor::new(-12.0).sanitized(), Anchor::new(-12.0));
    }
}
