#![forbid(unsafe_code)]

//! Two linked views over one hierarchy: a node-link tree and a treemap.
//!
//! [`Session`] owns the [`arboretum_core::HierarchyTree`] and both views. Interactions mutate
//! the tree's fold state first, then both views are laid out from scratch and reconciled
//! against what they drew last time. Rendering is headless: a [`SessionFrame`] sampled at a
//! given time is plain data that a front end can draw or serialize.

pub mod color;
pub mod config;
pub mod dataset;
pub mod easing;
pub mod error;
pub mod format;
pub mod nodelink;
pub mod reconcile;
pub mod router;
pub mod session;
pub mod treemap;
pub mod tween;

pub use color::{ColorScale, Palette, Rgb, SequentialScale};
pub use config::{SessionConfig, TransitionConfig};
pub use dataset::{DatasetSpec, ValueStyle};
pub use easing::Easing;
pub use error::{Error, Result};
pub use format::{GroupedFormat, LabelFormatter, SiFormat};
pub use nodelink::{LinkPath, NodeGlyph, NodeLinkFrame, NodeLinkView};
pub use reconcile::{Join, Keyed, Phase, Reconciler};
pub use router::{Intent, InteractionRouter, ViewKind};
pub use session::{ClickOutcome, RootChange, Session, SessionFrame};
pub use treemap::{TreemapFrame, TreemapView, ZoomOutcome};
pub use tween::{Transition, Tween};

use arboretum_core::{HierarchyTree, NodeId};

/// Read-only inputs shared by both views for one render pass.
pub struct RenderContext<'a> {
    pub tree: &'a HierarchyTree,
    pub color: &'a dyn ColorScale,
    pub formatter: &'a dyn LabelFormatter,
    /// Current treemap zoom root; outlined in the node-link view.
    pub zoom_root: NodeId,
    /// The node the interaction happened on.
    pub source: NodeId,
    pub now: f64,
}
