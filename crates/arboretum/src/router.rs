use arboretum_core::{HierarchyTree, NodeId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    NodeLink,
    Treemap,
}

/// What a click asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Toggle(NodeId),
    ZoomIn(NodeId),
    ZoomOut(NodeId),
}

/// Hover state shared by both views.
///
/// Either view reports hovers here; both read highlight state back from it, so a hover in one
/// view always lights up the same things in the other.
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    hovered: Option<NodeId>,
    chain: FxHashSet<NodeId>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&mut self, tree: &HierarchyTree, node: NodeId) {
        self.hovered = Some(node);
        self.chain = tree.ancestor_set(node);
        tracing::trace!(node = node.index(), chain = self.chain.len(), "hover");
    }

    pub fn exit(&mut self) {
        self.hovered = None;
        self.chain.clear();
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Edge highlight: both endpoints lie on the hovered node's path to the root.
    pub fn is_link_highlighted(&self, source: NodeId, target: NodeId) -> bool {
        self.chain.contains(&source) && self.chain.contains(&target)
    }

    /// Only the tile of the hovered node itself is highlighted (and raised).
    pub fn is_tile_highlighted(&self, node: NodeId) -> bool {
        self.hovered == Some(node)
    }

    pub fn route_click(&self, view: ViewKind, node: NodeId, zoom_root: NodeId) -> Intent {
        match view {
            ViewKind::NodeLink => Intent::Toggle(node),
            ViewKind::Treemap if node == zoom_root => Intent::ZoomOut(node),
            ViewKind::Treemap => Intent::ZoomIn(node),
        }
    }
}
