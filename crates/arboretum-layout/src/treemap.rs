use crate::Result;
use crate::binary::partition;
use crate::config::{Dimensions, TreemapConfig};
use crate::geom::{Tile, ViewFrame, ZoomWindow, tile};
use arboretum_core::{HierarchyTree, NodeId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub id: NodeId,
    pub depth: usize,
    /// Rectangle in layout space, before the zoom window is applied.
    pub tile: Tile,
}

#[derive(Debug, Clone)]
pub struct TreemapLayout {
    /// Visible nodes in pre-order, siblings by descending value. Parents precede children.
    pub tiles: Vec<PlacedTile>,
    pub width: f64,
    pub height: f64,
    index: FxHashMap<NodeId, usize>,
}

impl TreemapLayout {
    pub fn get(&self, id: NodeId) -> Option<&PlacedTile> {
        self.index.get(&id).map(|&i| &self.tiles[i])
    }

    pub fn tile(&self, id: NodeId) -> Option<Tile> {
        self.get(id).map(|t| t.tile)
    }

    /// Tiles lying entirely inside the window's domain, in drawing order.
    pub fn visible_in<'a>(
        &'a self,
        window: &'a ZoomWindow,
    ) -> impl Iterator<Item = &'a PlacedTile> + 'a {
        self.tiles.iter().filter(move |t| window.contains(&t.tile))
    }

    /// `viewBox` of the treemap panel: the layout area plus margins, with the top margin above
    /// the origin for the header band.
    pub fn frame(&self, dims: &Dimensions) -> ViewFrame {
        let m = &dims.margin;
        ViewFrame::new(
            0.0,
            -m.top,
            self.width + m.right,
            self.height + m.top + m.bottom,
        )
    }
}

/// Lays out the visible part of `tree` as a binary-partition treemap of `dims.width` ×
/// `dims.height`.
///
/// Collapsed nodes are laid out as leaves weighted by their aggregate value.
pub fn layout_treemap(
    tree: &HierarchyTree,
    dims: &Dimensions,
    cfg: &TreemapConfig,
) -> Result<TreemapLayout> {
    dims.validate()?;
    let root = tree.root();
    let _span = tracing::debug_span!("layout_treemap", width = dims.width, height = dims.height)
        .entered();

    let mut rects: FxHashMap<NodeId, Tile> = FxHashMap::default();
    rects.insert(root, tile(0.0, 0.0, dims.width, dims.height));

    // Inner padding is applied half by the parent and half by each child on the next level.
    let mut padding_stack: Vec<f64> = vec![0.0];
    let mut order: Vec<NodeId> = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        order.push(id);
        let node = tree.node(id);
        let depth = node.depth();
        if padding_stack.len() <= depth + 1 {
            padding_stack.resize(depth + 2, 0.0);
        }

        let p = padding_stack[depth];
        let b = rects[&id];
        let outer = shrink(b.min.x + p, b.min.y + p, b.max.x - p, b.max.y - p);
        rects.insert(id, outer);

        let mut kids: Vec<NodeId> = node.children().to_vec();
        if kids.is_empty() {
            continue;
        }
        kids.sort_by(|a, b| tree.node(*b).value().total_cmp(&tree.node(*a).value()));

        let p = cfg.padding_inner / 2.0;
        padding_stack[depth + 1] = p;
        let inner = shrink(
            outer.min.x + cfg.padding_outer - p,
            outer.min.y + cfg.padding_top - p,
            outer.max.x - (cfg.padding_outer - p),
            outer.max.y - (cfg.padding_outer - p),
        );

        let values: Vec<f64> = kids.iter().map(|k| tree.node(*k).value()).collect();
        for (k, t) in kids.iter().zip(partition(&values, node.value(), inner)) {
            rects.insert(*k, t);
        }
        for k in kids.iter().rev() {
            stack.push(*k);
        }
    }

    let tiles: Vec<PlacedTile> = order
        .iter()
        .map(|id| {
            let t = rects[id];
            PlacedTile {
                id: *id,
                depth: tree.node(*id).depth(),
                tile: if cfg.round { round_tile(t) } else { t },
            }
        })
        .collect();
    let index = tiles.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    tracing::trace!(tiles = tiles.len(), "treemap layout done");
    Ok(TreemapLayout {
        tiles,
        width: dims.width,
        height: dims.height,
        index,
    })
}

/// Builds a tile, collapsing inverted axes to their midpoint.
fn shrink(mut x0: f64, mut y0: f64, mut x1: f64, mut y1: f64) -> Tile {
    if x1 < x0 {
        x0 = (x0 + x1) / 2.0;
        x1 = x0;
    }
    if y1 < y0 {
        y0 = (y0 + y1) / 2.0;
        y1 = y0;
    }
    tile(x0, y0, x1, y1)
}

fn round_tile(t: Tile) -> Tile {
    tile(
        t.min.x.round(),
        t.min.y.round(),
        t.max.x.round(),
        t.max.y.round(),
    )
}
