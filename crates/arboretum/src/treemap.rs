//! Treemap view: one zoom window over a fixed binary-partition layout, drilled one level per
//! click.

use crate::RenderContext;
use crate::color::{BLACK, NEUTRAL, Rgb, WHITE};
use crate::config::TransitionConfig;
use crate::reconcile::{Join, Keyed, Phase, Reconciler};
use crate::router::InteractionRouter;
use arboretum_core::{HierarchyTree, NodeId, RenderKey};
use arboretum_layout::{Dimensions, Tile, TreemapConfig, TreemapLayout, ViewFrame, ZoomWindow, tile};
use serde::Serialize;

/// Share of the color domain above which tile text switches to white.
const DARK_TEXT_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    ZoomedIn { from: NodeId, to: NodeId },
    ZoomedOut { from: NodeId, to: NodeId },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileAttrs {
    pub id: NodeId,
    /// The zoomed root, drawn as the header band.
    pub header: bool,
    pub fill: Rgb,
    pub text_color: Rgb,
    pub lines: Vec<String>,
    pub title: String,
    pub pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSprite {
    pub key: RenderKey,
    pub phase: Phase,
    #[serde(flatten)]
    pub attrs: TileAttrs,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub highlighted: bool,
    /// Whether the value line (the last label line) is shown.
    pub value_visible: bool,
}

/// One sampled picture of the treemap view, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreemapFrame {
    pub view_box: ViewFrame,
    pub zoom_root: NodeId,
    pub depth: usize,
    pub tiles: Vec<TileSprite>,
}

impl TreemapFrame {
    pub fn tile(&self, id: NodeId) -> Option<&TileSprite> {
        self.tiles.iter().find(|t| t.attrs.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct TreemapView {
    root: NodeId,
    depth: usize,
    window: ZoomWindow,
    tiles: Reconciler<TileAttrs, Tile>,
    dims: Dimensions,
    cfg: TreemapConfig,
    view_box: ViewFrame,
}

impl TreemapView {
    pub fn new(
        root: NodeId,
        dims: Dimensions,
        cfg: TreemapConfig,
        transition: TransitionConfig,
    ) -> Self {
        Self {
            root,
            depth: 0,
            window: ZoomWindow::new(dims.width, dims.height),
            tiles: Reconciler::new(transition.duration_ms, transition.easing),
            dims,
            cfg,
            view_box: ViewFrame::default(),
        }
    }

    pub fn zoom_root(&self) -> NodeId {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn window(&self) -> &ZoomWindow {
        &self.window
    }

    /// Drills one level towards `node`: the ancestor of `node` right below the zoomed root
    /// becomes the new zoomed root, opened one level deep.
    ///
    /// Returns the node the transition should be anchored on.
    pub fn zoom_in(&mut self, tree: &mut HierarchyTree, node: NodeId) -> (ZoomOutcome, NodeId) {
        let target = tree
            .ancestor_at_depth(node, self.depth + 1)
            .unwrap_or(node);
        if !tree.node(target).has_any_children() {
            return (ZoomOutcome::Unchanged, node);
        }
        let from = self.root;
        self.root = target;
        self.depth = tree.node(target).depth();
        tree.open_one_level(target);
        tracing::debug!(to = target.index(), depth = self.depth, "treemap zoom in");
        (ZoomOutcome::ZoomedIn { from, to: target }, target)
    }

    /// Backs out to the zoomed root's parent, re-folding its siblings. No-op at the dataset root.
    pub fn zoom_out(&mut self, tree: &mut HierarchyTree, node: NodeId) -> (ZoomOutcome, NodeId) {
        let Some(parent) = tree.node(self.root).parent() else {
            return (ZoomOutcome::Unchanged, node);
        };
        let from = self.root;
        self.root = parent;
        self.depth = tree.node(parent).depth();
        tree.open_one_level(parent);
        tracing::debug!(to = parent.index(), depth = self.depth, "treemap zoom out");
        (ZoomOutcome::ZoomedOut { from, to: parent }, node)
    }

    /// Points the zoom window at the zoomed root's tile in a freshly computed layout.
    ///
    /// If the zoomed root was folded away in the node-link view, the zoom retreats to its
    /// nearest visible ancestor first.
    pub fn sync(&mut self, tree: &HierarchyTree, layout: &TreemapLayout) {
        if !tree.is_visible(self.root) {
            let retreat = tree
                .ancestors(self.root)
                .into_iter()
                .find(|a| tree.is_visible(*a))
                .unwrap_or_else(|| tree.root());
            tracing::debug!(
                from = self.root.index(),
                to = retreat.index(),
                "zoom root hidden, retreating"
            );
            self.root = retreat;
            self.depth = tree.node(retreat).depth();
        }
        self.window.resize(self.dims.width, self.dims.height);
        if let Some(t) = layout.tile(self.root) {
            self.window.set_domain(t);
        }
        self.view_box = layout.frame(&self.dims);
    }

    /// Where `key` is drawn at `now`, if it is drawn at all.
    pub fn anchor(&self, key: Option<RenderKey>, now: f64) -> Option<Tile> {
        key.and_then(|k| self.tiles.geometry(k, now))
    }

    fn header_band(&self) -> Tile {
        let top = self.cfg.header_offset;
        tile(0.0, top, self.dims.width, top + self.cfg.header_height)
    }

    fn attrs(&self, ctx: &RenderContext<'_>, id: NodeId) -> TileAttrs {
        let tree = ctx.tree;
        let node = tree.node(id);
        let header = id == self.root;
        let domain_max = ctx.color.domain().1;
        let dark = header || node.value() / domain_max < DARK_TEXT_CUTOFF;
        let lines = if header {
            vec![tree.path_names(id).join("/")]
        } else {
            vec![node.name().to_string(), ctx.formatter.format(node.value())]
        };
        TileAttrs {
            id,
            header,
            fill: if header {
                NEUTRAL
            } else {
                ctx.color.color(node.value())
            },
            text_color: if dark { BLACK } else { WHITE },
            lines,
            title: tooltip(tree, id),
            pointer: node.has_any_children(),
        }
    }

    /// Reconciles the tiles inside the zoom window. `anchor` is where the source node's tile was
    /// drawn before the interaction.
    pub fn update(
        &mut self,
        ctx: &RenderContext<'_>,
        layout: &TreemapLayout,
        anchor: Option<Tile>,
    ) -> Join {
        let tree = ctx.tree;
        let mut items = Vec::new();
        for placed in layout.visible_in(&self.window) {
            let Some(key) = tree.key(placed.id) else {
                continue;
            };
            let geometry = if placed.id == self.root {
                self.header_band()
            } else {
                self.window.map(&placed.tile)
            };
            items.push(Keyed {
                key,
                data: self.attrs(ctx, placed.id),
                geometry,
            });
        }
        tracing::trace!(tiles = items.len(), depth = self.depth, "treemap items");

        let origin = anchor
            .or_else(|| layout.tile(ctx.source).map(|t| self.window.map(&t)))
            .or_else(|| layout.tile(tree.root()).map(|t| self.window.map(&t)))
            .unwrap_or_else(|| tile(0.0, 0.0, 0.0, 0.0));
        self.tiles.reconcile(items, origin, ctx.now)
    }

    /// Samples every tile at `now`. The hovered tile is painted last with its value shown.
    pub fn frame(&self, router: &InteractionRouter, now: f64) -> TreemapFrame {
        let mut tiles: Vec<TileSprite> = self
            .tiles
            .sample(now)
            .map(|(e, t)| {
                let highlighted = router.is_tile_highlighted(e.data.id);
                TileSprite {
                    key: e.key,
                    phase: e.phase,
                    attrs: e.data.clone(),
                    x: t.min.x,
                    y: t.min.y,
                    width: t.width(),
                    height: t.height(),
                    highlighted,
                    value_visible: highlighted && !e.data.header,
                }
            })
            .collect();
        if let Some(pos) = tiles.iter().position(|t| t.highlighted) {
            let raised = tiles.remove(pos);
            tiles.push(raised);
        }
        TreemapFrame {
            view_box: self.view_box,
            zoom_root: self.root,
            depth: self.depth,
            tiles,
        }
    }

    pub fn prune(&mut self, now: f64) {
        self.tiles.prune(now);
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.tiles.is_settled(now)
    }
}

/// The dataset root's name, then every ancestor below it on its own line, indented one tab
/// deeper per level.
fn tooltip(tree: &HierarchyTree, id: NodeId) -> String {
    let names = tree.path_names(id);
    let Some((root, rest)) = names.split_first() else {
        return String::new();
    };
    let mut out = (*root).to_string();
    for (i, name) in rest.iter().enumerate() {
        out.push('\n');
        out.push_str(&"\t".repeat(i + 1));
        out.push_str(name);
    }
    out
}
