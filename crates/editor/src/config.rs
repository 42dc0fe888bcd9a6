//! Editor tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Size;

/// Geometry and history settings for one editor instance.
///
/// Every field has a default, so a partial JSON file is enough to override
/// a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas surface size used when the renderer mounts without one.
    pub surface: Size,
    /// Footprint of a rendered node; new nodes are centred under the cursor
    /// by subtracting half of it.
    pub node_size: Size,
    /// Offset applied to both axes when duplicating a node.
    pub duplicate_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Constant added to the vertical control-point offset of edge curves.
    pub curve_padding: f64,
    /// Maximum number of undo entries kept; oldest are dropped first.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface: Size::new(1600.0, 900.0),
            node_size: Size::new(200.0, 80.0),
            duplicate_offset: 30.0,
            min_zoom: 0.5,
            max_zoom: 2.0,
            zoom_step: 0.1,
            curve_padding: 20.0,
            history_limit: 100,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON settings file and validate it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::ZoomRange { min, max });
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: EditorConfig = serde_json::from_str(r#"{ "history_limit": 5 }"#).unwrap();
        assert_eq!(cfg.history_limit, 5);
        assert_eq!(cfg.max_zoom, 2.0);
        assert_eq!(cfg.node_size, Size::new(200.0, 80.0));
    }

    #[test]
    fn inverted_or_degenerate_zoom_is_rejected() {
        assert_eq!(
            EditorConfig::from_json(r#"{ "min_zoom": 3.0 }"#),
            Err(ConfigError::ZoomRange { min: 3.0, max: 2.0 })
        );
        assert_eq!(
            EditorConfig::from_json(r#"{ "zoom_step": 0.0 }"#),
            Err(ConfigError::ZoomStep(0.0))
        );
        assert!(matches!(EditorConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
        assert_eq!(EditorConfig::from_json(r#"{ "max_zoom": 4.0 }"#).unwrap().max_zoom, 4.0);
    }
}
