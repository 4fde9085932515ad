#![forbid(unsafe_code)]

//! Pure geometry for the two views of an [`arboretum_core::HierarchyTree`].
//!
//! Both entry points read the tree's *current* visibility and return fresh geometry; nothing is
//! written back to the tree.
//!
//! - [`layout_tree`]: tidy node-link tree, horizontal orientation, alphabetical siblings.
//! - [`layout_treemap`]: binary-partition treemap, siblings by descending value.

pub mod binary;
pub mod config;
pub mod geom;
pub mod tidy;
pub mod tree;
pub mod treemap;

pub use config::{Dimensions, Margin, TreeLayoutConfig, TreemapConfig};
pub use geom::{LinearScale, Point, Tile, ViewFrame, ZoomWindow, point, tile};
pub use tree::{PlacedLink, PlacedNode, TreeLayout, layout_tree};
pub use treemap::{PlacedTile, TreemapLayout, layout_treemap};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("viewport must have positive finite size, got {width}x{height}")]
    EmptyViewport { width: f64, height: f64 },
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("layout config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
