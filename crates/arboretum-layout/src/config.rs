use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
}

pub fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    json_f64(cur)
}

pub fn config_bool(cfg: &Value, path: &[&str]) -> Option<bool> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_bool()
}

pub fn config_string(cfg: &Value, path: &[&str]) -> Option<String> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str().map(|s| s.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Viewport size for one panel, `{ width, height, margin: { top, right, bottom, left } }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 830.0,
            margin: Margin::default(),
        }
    }
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin::default(),
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Reads `width`, `height` and `margin.*` under `path`, falling back to `defaults` per key.
    pub fn from_value(cfg: &Value, path: &[&str], defaults: Dimensions) -> Result<Self> {
        let key = |k: &[&str]| {
            let mut full: Vec<&str> = path.to_vec();
            full.extend_from_slice(k);
            config_f64(cfg, &full)
        };
        let dims = Self {
            width: key(&["width"]).unwrap_or(defaults.width),
            height: key(&["height"]).unwrap_or(defaults.height),
            margin: Margin {
                top: key(&["margin", "top"]).unwrap_or(defaults.margin.top),
                right: key(&["margin", "right"]).unwrap_or(defaults.margin.right),
                bottom: key(&["margin", "bottom"]).unwrap_or(defaults.margin.bottom),
                left: key(&["margin", "left"]).unwrap_or(defaults.margin.left),
            },
        };
        dims.validate()?;
        Ok(dims)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(Error::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        let m = &self.margin;
        if ![m.top, m.right, m.bottom, m.left]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::InvalidConfig {
                message: "margin values must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Spacing constants for the node-link tidy tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeLayoutConfig {
    /// Distance between adjacent siblings (`dx`).
    pub node_spacing: f64,
    /// Added to the viewport width before dividing by tree height.
    pub depth_padding: f64,
    /// Added to the tree height in the `dy` denominator, leaving room for leaf labels.
    pub depth_slack: f64,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 25.0,
            depth_padding: 50.0,
            depth_slack: 1.3,
        }
    }
}

impl TreeLayoutConfig {
    pub fn from_value(cfg: &Value) -> Result<Self> {
        let d = Self::default();
        let out = Self {
            node_spacing: config_f64(cfg, &["tree", "nodeSpacing"]).unwrap_or(d.node_spacing),
            depth_padding: config_f64(cfg, &["tree", "depthPadding"]).unwrap_or(d.depth_padding),
            depth_slack: config_f64(cfg, &["tree", "depthSlack"]).unwrap_or(d.depth_slack),
        };
        if !(out.node_spacing.is_finite() && out.node_spacing > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("tree.nodeSpacing must be positive, got {}", out.node_spacing),
            });
        }
        if !(out.depth_slack.is_finite() && out.depth_slack > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("tree.depthSlack must be positive, got {}", out.depth_slack),
            });
        }
        Ok(out)
    }

    /// Horizontal distance between depth levels for a tree of full height `tree_height`.
    pub fn depth_spacing(&self, width: f64, tree_height: usize) -> f64 {
        (width + self.depth_padding) / (tree_height as f64 + self.depth_slack)
    }
}

/// Padding and header constants for the binary treemap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreemapConfig {
    /// Right, bottom and left inset of a parent around its children.
    pub padding_outer: f64,
    /// Gap between siblings.
    pub padding_inner: f64,
    /// Top inset of a parent, reserving room for its label.
    pub padding_top: f64,
    pub round: bool,
    /// Height of the zoomed root's header band.
    pub header_height: f64,
    /// Vertical offset of the header band from the viewport top.
    pub header_offset: f64,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            padding_outer: 3.0,
            padding_inner: 1.0,
            padding_top: 28.0,
            round: true,
            header_height: 30.0,
            header_offset: -5.0,
        }
    }
}

impl TreemapConfig {
    pub fn from_value(cfg: &Value) -> Result<Self> {
        let d = Self::default();
        let out = Self {
            padding_outer: config_f64(cfg, &["treemap", "paddingOuter"])
                .unwrap_or(d.padding_outer),
            padding_inner: config_f64(cfg, &["treemap", "paddingInner"])
                .unwrap_or(d.padding_inner),
            padding_top: config_f64(cfg, &["treemap", "paddingTop"]).unwrap_or(d.padding_top),
            round: config_bool(cfg, &["treemap", "round"]).unwrap_or(d.round),
            header_height: config_f64(cfg, &["treemap", "headerHeight"])
                .unwrap_or(d.header_height),
            header_offset: config_f64(cfg, &["treemap", "headerOffset"])
                .unwrap_or(d.header_offset),
        };
        for (name, v) in [
            ("paddingOuter", out.padding_outer),
            ("paddingInner", out.padding_inner),
            ("paddingTop", out.padding_top),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("treemap.{name} must be a non-negative number, got {v}"),
                });
            }
        }
        Ok(out)
    }
}
