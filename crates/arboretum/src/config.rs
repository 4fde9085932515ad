use crate::color::Palette;
use crate::easing::Easing;
use crate::{Error, Result};
use arboretum_layout::config::{config_f64, config_string};
use arboretum_layout::{Dimensions, Margin, TreeLayoutConfig, TreemapConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn invalid(message: String) -> Error {
    Error::Layout(arboretum_layout::Error::InvalidConfig { message })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    pub duration_ms: f64,
    /// Curve for element moves.
    pub easing: Easing,
    /// Curve for the node-link viewport reframing.
    pub frame_easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 700.0,
            easing: Easing::CubicInOut,
            frame_easing: Easing::SineInOut,
        }
    }
}

impl TransitionConfig {
    pub fn from_value(cfg: &Value) -> Result<Self> {
        let d = Self::default();
        let easing = |key: &str, fallback: Easing| -> Result<Easing> {
            match config_string(cfg, &["transition", key]) {
                None => Ok(fallback),
                Some(name) => Easing::from_name(&name)
                    .ok_or_else(|| invalid(format!("unknown easing `{name}` for transition.{key}"))),
            }
        };
        let out = Self {
            duration_ms: config_f64(cfg, &["transition", "durationMs"]).unwrap_or(d.duration_ms),
            easing: easing("easing", d.easing)?,
            frame_easing: easing("frameEasing", d.frame_easing)?,
        };
        if !(out.duration_ms.is_finite() && out.duration_ms >= 0.0) {
            return Err(invalid(format!(
                "transition.durationMs must be a non-negative number, got {}",
                out.duration_ms
            )));
        }
        Ok(out)
    }
}

/// Everything a [`crate::Session`] needs besides the data.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub nodelink: Dimensions,
    pub treemap: Dimensions,
    pub tree_layout: TreeLayoutConfig,
    pub treemap_layout: TreemapConfig,
    pub transition: TransitionConfig,
    pub palette: Palette,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nodelink: Dimensions::new(720.0, 830.0),
            treemap: Dimensions::new(720.0, 830.0).with_margin(Margin::uniform(20.0)),
            tree_layout: TreeLayoutConfig::default(),
            treemap_layout: TreemapConfig::default(),
            transition: TransitionConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl SessionConfig {
    /// Reads a partial JSON config; every missing key keeps its default.
    ///
    /// ```json
    /// { "nodelink": { "width": 800 }, "treemap": { "paddingTop": 24 },
    ///   "transition": { "durationMs": 400 }, "palette": "greens" }
    /// ```
    pub fn from_value(cfg: &Value) -> Result<Self> {
        let d = Self::default();
        let palette = match config_string(cfg, &["palette"]) {
            None => d.palette,
            Some(name) => {
                Palette::from_name(&name).ok_or_else(|| invalid(format!("unknown palette `{name}`")))?
            }
        };
        Ok(Self {
            nodelink: Dimensions::from_value(cfg, &["nodelink"], d.nodelink)?,
            treemap: Dimensions::from_value(cfg, &["treemap"], d.treemap)?,
            tree_layout: TreeLayoutConfig::from_value(cfg)?,
            treemap_layout: TreemapConfig::from_value(cfg)?,
            transition: TransitionConfig::from_value(cfg)?,
            palette,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Value = serde_json::from_str(text)?;
        Self::from_value(&cfg)
    }
}
