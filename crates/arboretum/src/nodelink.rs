//! Node-link view: a horizontal tidy tree whose nodes grow out of, and fold back into, the node
//! that was clicked.

use crate::RenderContext;
use crate::color::NEUTRAL;
use crate::config::TransitionConfig;
use crate::reconcile::{Join, Keyed, Phase, Reconciler};
use crate::router::InteractionRouter;
use crate::tween::{Transition, Tween};
use arboretum_core::{NodeId, RenderKey};
use arboretum_layout::{Point, TreeLayout, ViewFrame, point};
use serde::Serialize;

const COLLAPSED_RADIUS: f64 = 9.0;
const EXPANDED_RADIUS: f64 = 6.0;

/// Animated part of a node: where its circle is and how visible its label is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeGlyph {
    pub center: Point,
    pub radius: f64,
    pub label_opacity: f64,
}

impl NodeGlyph {
    /// A glyph shrunk to nothing at `at`; where nodes enter from and exit to.
    pub fn collapsed_at(at: Point) -> Self {
        Self {
            center: at,
            radius: 1e-6,
            label_opacity: 0.0,
        }
    }
}

impl Tween for NodeGlyph {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            center: self.center.lerp(to.center, t),
            radius: Tween::lerp(self.radius, to.radius, t),
            label_opacity: Tween::lerp(self.label_opacity, to.label_opacity, t),
        }
    }
}

/// A horizontal link between two screen points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPath {
    pub source: Point,
    pub target: Point,
}

impl LinkPath {
    pub fn collapsed_at(at: Point) -> Self {
        Self {
            source: at,
            target: at,
        }
    }

    /// Cubic Bézier with both control points at the horizontal midpoint.
    pub fn path_data(&self) -> String {
        let (s, t) = (self.source, self.target);
        let mx = (s.x + t.x) / 2.0;
        format!(
            "M{},{} C{},{} {},{} {},{}",
            s.x, s.y, mx, s.y, mx, t.y, t.x, t.y
        )
    }
}

impl Tween for LinkPath {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            source: self.source.lerp(to.source, t),
            target: self.target.lerp(to.target, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

/// Static attributes of a node, replaced wholesale on every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttrs {
    pub id: NodeId,
    pub name: String,
    pub fill: crate::Rgb,
    /// Label offset from the circle center; labels of branches sit to the left.
    pub label_x: f64,
    pub anchor: TextAnchor,
    /// Set on the current treemap zoom root.
    pub outlined: bool,
    pub pointer: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkAttrs {
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSprite {
    pub key: RenderKey,
    pub phase: Phase,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
    pub glyph: NodeGlyph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSprite {
    pub key: RenderKey,
    pub phase: Phase,
    pub source: NodeId,
    pub target: NodeId,
    pub path: String,
    pub highlighted: bool,
}

/// One sampled picture of the node-link view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLinkFrame {
    pub view_box: ViewFrame,
    pub nodes: Vec<NodeSprite>,
    pub links: Vec<LinkSprite>,
}

impl NodeLinkFrame {
    pub fn node(&self, id: NodeId) -> Option<&NodeSprite> {
        self.nodes.iter().find(|n| n.attrs.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct NodeLinkView {
    nodes: Reconciler<NodeAttrs, NodeGlyph>,
    links: Reconciler<LinkAttrs, LinkPath>,
    view_box: Option<Transition<ViewFrame>>,
    transition: TransitionConfig,
}

impl NodeLinkView {
    pub fn new(transition: TransitionConfig) -> Self {
        Self {
            nodes: Reconciler::new(transition.duration_ms, transition.easing),
            links: Reconciler::new(transition.duration_ms, transition.easing),
            view_box: None,
            transition,
        }
    }

    /// Where `key` is drawn at `now`, if it is drawn at all.
    pub fn anchor(&self, key: Option<RenderKey>, now: f64) -> Option<Point> {
        key.and_then(|k| self.nodes.geometry(k, now))
            .map(|g| g.center)
    }

    /// Reconciles against a fresh layout. `anchor` is where the source node was drawn before the
    /// interaction; entering nodes grow out of it and exiting nodes shrink back into it.
    pub fn update(
        &mut self,
        ctx: &RenderContext<'_>,
        layout: &TreeLayout,
        anchor: Option<Point>,
    ) -> (Join, Join) {
        let tree = ctx.tree;
        let origin = anchor
            .or_else(|| layout.screen(ctx.source))
            .or_else(|| layout.screen(tree.root()))
            .unwrap_or_else(|| point(0.0, 0.0));

        let mut nodes = Vec::with_capacity(layout.nodes.len());
        for placed in &layout.nodes {
            let Some(key) = tree.key(placed.id) else {
                continue;
            };
            let node = tree.node(placed.id);
            let branch = node.has_any_children();
            let fill = if placed.id == tree.root() {
                NEUTRAL
            } else {
                ctx.color.color(node.value())
            };
            nodes.push(Keyed {
                key,
                data: NodeAttrs {
                    id: placed.id,
                    name: node.name().to_string(),
                    fill,
                    label_x: if branch { -12.0 } else { 10.0 },
                    anchor: if branch {
                        TextAnchor::End
                    } else {
                        TextAnchor::Start
                    },
                    outlined: placed.id == ctx.zoom_root,
                    pointer: branch,
                    collapsed: node.is_collapsed(),
                },
                geometry: NodeGlyph {
                    center: placed.screen(),
                    radius: if node.is_collapsed() {
                        COLLAPSED_RADIUS
                    } else {
                        EXPANDED_RADIUS
                    },
                    label_opacity: 1.0,
                },
            });
        }

        let mut links = Vec::with_capacity(layout.links.len());
        for link in &layout.links {
            let (Some(key), Some(source), Some(target)) = (
                tree.key(link.target),
                layout.screen(link.source),
                layout.screen(link.target),
            ) else {
                continue;
            };
            links.push(Keyed {
                key,
                data: LinkAttrs {
                    source: link.source,
                    target: link.target,
                },
                geometry: LinkPath { source, target },
            });
        }

        let node_join = self
            .nodes
            .reconcile(nodes, NodeGlyph::collapsed_at(origin), ctx.now);
        let link_join = self
            .links
            .reconcile(links, LinkPath::collapsed_at(origin), ctx.now);

        let view_box = match self.view_box {
            None => Transition::settled(layout.frame),
            Some(mut tr) => {
                tr.retarget(
                    layout.frame,
                    ctx.now,
                    self.transition.duration_ms,
                    self.transition.frame_easing,
                );
                tr
            }
        };
        self.view_box = Some(view_box);
        (node_join, link_join)
    }

    pub fn frame(&self, router: &InteractionRouter, now: f64) -> NodeLinkFrame {
        NodeLinkFrame {
            view_box: self
                .view_box
                .map(|tr| tr.sample(now))
                .unwrap_or_default(),
            nodes: self
                .nodes
                .sample(now)
                .map(|(e, glyph)| NodeSprite {
                    key: e.key,
                    phase: e.phase,
                    attrs: e.data.clone(),
                    glyph,
                })
                .collect(),
            links: self
                .links
                .sample(now)
                .map(|(e, path)| LinkSprite {
                    key: e.key,
                    phase: e.phase,
                    source: e.data.source,
                    target: e.data.target,
                    path: path.path_data(),
                    highlighted: router.is_link_highlighted(e.data.source, e.data.target),
                })
                .collect(),
        }
    }

    pub fn prune(&mut self, now: f64) {
        self.nodes.prune(now);
        self.links.prune(now);
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.nodes.is_settled(now)
            && self.links.is_settled(now)
            && self.view_box.is_none_or(|tr| tr.is_finished(now))
    }
}
