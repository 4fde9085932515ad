use crate::config::{Dimensions, TreeLayoutConfig};
use crate::geom::{Point, ViewFrame, point};
use crate::tidy::tidy_offsets;
use crate::Result;
use arboretum_core::{HierarchyTree, NodeId, compare_names};
use rustc_hash::FxHashMap;

/// A visible node in layout space: `x` runs across siblings, `y` grows with depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl PlacedNode {
    /// Screen position. The tree grows left to right, so layout axes are swapped.
    pub fn screen(&self) -> Point {
        point(self.y, self.x)
    }
}

/// A visible parent/child edge, identified by its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedLink {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone)]
pub struct TreeLayout {
    /// Visible nodes in pre-order.
    pub nodes: Vec<PlacedNode>,
    pub links: Vec<PlacedLink>,
    /// Sibling spacing.
    pub dx: f64,
    /// Depth spacing.
    pub dy: f64,
    /// Min and max of `x` over visible nodes.
    pub extent: (f64, f64),
    /// Viewport sized to content plus margins.
    pub frame: ViewFrame,
    index: FxHashMap<NodeId, usize>,
}

impl TreeLayout {
    pub fn node(&self, id: NodeId) -> Option<&PlacedNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn screen(&self, id: NodeId) -> Option<Point> {
        self.node(id).map(PlacedNode::screen)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }
}

/// Lays out the visible part of `tree` as a tidy tree.
///
/// `dy` depends on the full height of the dataset, not on what is currently unfolded, so depth
/// columns stay put while the user expands and collapses.
pub fn layout_tree(
    tree: &HierarchyTree,
    dims: &Dimensions,
    cfg: &TreeLayoutConfig,
) -> Result<TreeLayout> {
    dims.validate()?;
    let root = tree.root();
    let visible = tree.visible_descendants(root);
    let _span = tracing::debug_span!("layout_tree", visible = visible.len()).entered();

    let index: FxHashMap<NodeId, usize> =
        visible.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut adjacency: Vec<Vec<usize>> = Vec::with_capacity(visible.len());
    for id in &visible {
        let mut kids: Vec<NodeId> = tree.node(*id).children().to_vec();
        kids.sort_by(|a, b| compare_names(tree.node(*a).name(), tree.node(*b).name()));
        adjacency.push(kids.iter().map(|k| index[k]).collect());
    }

    let offsets = tidy_offsets(&adjacency, 0);
    let dx = cfg.node_spacing;
    let dy = cfg.depth_spacing(dims.width, tree.node(root).height());

    let nodes: Vec<PlacedNode> = visible
        .iter()
        .zip(&offsets)
        .map(|(id, off)| PlacedNode {
            id: *id,
            x: off * dx,
            y: tree.node(*id).depth() as f64 * dy,
        })
        .collect();

    let ids = visible.as_slice();
    let links: Vec<PlacedLink> = ids
        .iter()
        .zip(&adjacency)
        .flat_map(|(id, kids)| {
            kids.iter().map(move |&c| PlacedLink {
                source: *id,
                target: ids[c],
            })
        })
        .collect();

    let (x0, x1) = nodes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
            (lo.min(n.x), hi.max(n.x))
        });
    let frame = ViewFrame::new(
        -dy * 3.0 / 4.0,
        x0 - dx,
        dims.width + dy / 2.0,
        x1 - x0 + dx * 2.0,
    );

    tracing::trace!(dx, dy, x0, x1, links = links.len(), "tree layout done");
    Ok(TreeLayout {
        nodes,
        links,
        dx,
        dy,
        extent: (x0, x1),
        frame,
        index,
    })
}
