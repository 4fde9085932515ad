use crate::color::{ColorScale, Palette, SequentialScale};
use crate::config::SessionConfig;
use crate::dataset::DatasetSpec;
use crate::format::{GroupedFormat, LabelFormatter};
use crate::nodelink::{NodeLinkFrame, NodeLinkView};
use crate::router::{Intent, InteractionRouter, ViewKind};
use crate::treemap::{TreemapFrame, TreemapView, ZoomOutcome};
use crate::{Error, RenderContext, Result};
use arboretum_core::{HierarchyTree, NodeId, Toggle, ValueAccessor};
use arboretum_layout::{Tile, layout_tree, layout_treemap};
use serde::Serialize;
use serde_json::Value;

/// Fired whenever a new dataset becomes the session root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootChange {
    pub root: NodeId,
    pub name: String,
    pub nodes: usize,
    /// Min/max aggregate value over non-root nodes; `None` for a one-node tree.
    pub extent: Option<(f64, f64)>,
    /// The extent widened to round numbers; what fills are computed from.
    pub color_domain: (f64, f64),
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Toggled(Toggle),
    Zoomed(ZoomOutcome),
}

impl ClickOutcome {
    /// Whether the click changed what is drawn.
    pub fn changed(&self) -> bool {
        !matches!(
            self,
            ClickOutcome::Toggled(Toggle::Leaf) | ClickOutcome::Zoomed(ZoomOutcome::Unchanged)
        )
    }
}

/// Both views sampled at the same instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFrame {
    pub time: f64,
    pub nodelink: NodeLinkFrame,
    pub treemap: TreemapFrame,
    pub settled: bool,
}

type RootListener = Box<dyn FnMut(&RootChange)>;

struct Loaded {
    tree: HierarchyTree,
    color: SequentialScale,
    nodelink: NodeLinkView,
    treemap: TreemapView,
    router: InteractionRouter,
}

impl Loaded {
    /// Lays both views out from the current fold state and reconciles them, anchoring
    /// transitions on `source`.
    fn render(
        &mut self,
        config: &SessionConfig,
        formatter: &dyn LabelFormatter,
        source: NodeId,
        now: f64,
    ) -> Result<()> {
        let _span = tracing::debug_span!("render", source = source.index(), now).entered();

        let prior = self.tree.key(source);
        let node_anchor = self.nodelink.anchor(prior, now);
        let tile_anchor = self.treemap.anchor(prior, now);

        self.tree.assign_keys();
        let tree_layout = layout_tree(&self.tree, &config.nodelink, &config.tree_layout)?;
        let treemap_layout = layout_treemap(&self.tree, &config.treemap, &config.treemap_layout)?;
        self.treemap.sync(&self.tree, &treemap_layout);

        let ctx = RenderContext {
            tree: &self.tree,
            color: &self.color,
            formatter,
            zoom_root: self.treemap.zoom_root(),
            source,
            now,
        };
        let (nodes, links) = self.nodelink.update(&ctx, &tree_layout, node_anchor);
        let tiles = self.treemap.update(&ctx, &treemap_layout, tile_anchor);
        tracing::debug!(
            nodes_enter = nodes.enter.len(),
            nodes_exit = nodes.exit.len(),
            links_enter = links.enter.len(),
            links_exit = links.exit.len(),
            tiles_enter = tiles.enter.len(),
            tiles_exit = tiles.exit.len(),
            "rendered"
        );
        Ok(())
    }
}

/// Single owner of the current hierarchy and both views over it.
///
/// Every interaction runs to completion: the fold state is mutated first, then both views are
/// re-laid out and reconciled at the given time. Transitions in flight are retargeted from
/// wherever they are at that moment.
pub struct Session {
    config: SessionConfig,
    palette: Palette,
    formatter: Box<dyn LabelFormatter>,
    listeners: Vec<RootListener>,
    state: Option<Loaded>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            palette: config.palette,
            config,
            formatter: Box::new(GroupedFormat),
            listeners: Vec::new(),
            state: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn on_root_change(&mut self, listener: impl FnMut(&RootChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn load(&mut self, record: &Value, accessor: &dyn ValueAccessor, now: f64) -> Result<()> {
        let tree = HierarchyTree::from_record(record, accessor)?;
        self.set_root(tree, now)
    }

    /// Loads `record` with the dataset's value field and label style.
    pub fn load_dataset(&mut self, spec: &DatasetSpec, record: &Value, now: f64) -> Result<()> {
        let tree = HierarchyTree::from_record(record, &spec.accessor())?;
        self.formatter = spec.formatter();
        self.set_root(tree, now)
    }

    /// Replaces the dataset. Everything drawn for the previous one is dropped, including
    /// transitions still in flight.
    pub fn set_root(&mut self, mut tree: HierarchyTree, now: f64) -> Result<()> {
        let _span = tracing::debug_span!("set_root", nodes = tree.len()).entered();
        self.state = None;
        tree.initialize_collapsed();

        let extent = tree.value_extent();
        let color = SequentialScale::new(self.palette, extent.unwrap_or((0.0, 0.0))).nice();
        let root = tree.root();
        let change = RootChange {
            root,
            name: tree.node(root).name().to_string(),
            nodes: tree.len(),
            extent,
            color_domain: color.domain(),
            palette: self.palette,
        };
        for listener in &mut self.listeners {
            listener(&change);
        }

        let transition = self.config.transition;
        let mut loaded = Loaded {
            tree,
            color,
            nodelink: NodeLinkView::new(transition),
            treemap: TreemapView::new(
                root,
                self.config.treemap,
                self.config.treemap_layout,
                transition,
            ),
            router: InteractionRouter::new(),
        };
        loaded.render(&self.config, self.formatter.as_ref(), root, now)?;
        self.state = Some(loaded);
        Ok(())
    }

    pub fn set_palette(&mut self, palette: Palette, now: f64) -> Result<()> {
        self.palette = palette;
        self.refresh(now)
    }

    pub fn set_formatter(&mut self, formatter: impl LabelFormatter + 'static, now: f64) -> Result<()> {
        self.formatter = Box::new(formatter);
        self.refresh(now)
    }

    fn refresh(&mut self, now: f64) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        state.color = state.color.clone().with_palette(self.palette);
        let root = state.tree.root();
        state.render(&self.config, self.formatter.as_ref(), root, now)
    }

    /// A click on `node` in `view`: toggles in the node-link view, zooms in the treemap.
    ///
    /// Clicks that change nothing skip the re-render: toggling a leaf, zooming into a leaf,
    /// zooming out at the dataset root.
    pub fn click(&mut self, view: ViewKind, node: NodeId, now: f64) -> Result<ClickOutcome> {
        let state = self.state.as_mut().ok_or(Error::NoDataset)?;
        let intent = state
            .router
            .route_click(view, node, state.treemap.zoom_root());
        let (outcome, source) = match intent {
            Intent::Toggle(id) => (ClickOutcome::Toggled(state.tree.toggle(id)), id),
            Intent::ZoomIn(id) => {
                let (o, source) = state.treemap.zoom_in(&mut state.tree, id);
                (ClickOutcome::Zoomed(o), source)
            }
            Intent::ZoomOut(id) => {
                let (o, source) = state.treemap.zoom_out(&mut state.tree, id);
                (ClickOutcome::Zoomed(o), source)
            }
        };
        if outcome.changed() {
            state.render(&self.config, self.formatter.as_ref(), source, now)?;
        }
        Ok(outcome)
    }

    pub fn hover(&mut self, node: NodeId) -> Result<()> {
        let state = self.state.as_mut().ok_or(Error::NoDataset)?;
        state.router.hover(&state.tree, node);
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        let state = self.state.as_mut().ok_or(Error::NoDataset)?;
        state.router.exit();
        Ok(())
    }

    pub fn frame(&self, now: f64) -> Result<SessionFrame> {
        let state = self.state.as_ref().ok_or(Error::NoDataset)?;
        Ok(SessionFrame {
            time: now,
            nodelink: state.nodelink.frame(&state.router, now),
            treemap: state.treemap.frame(&state.router, now),
            settled: self.is_settled(now),
        })
    }

    /// Drops elements whose exit transition has finished by `now`.
    pub fn tick(&mut self, now: f64) -> Result<()> {
        let state = self.state.as_mut().ok_or(Error::NoDataset)?;
        state.nodelink.prune(now);
        state.treemap.prune(now);
        Ok(())
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.state
            .as_ref()
            .is_none_or(|s| s.nodelink.is_settled(now) && s.treemap.is_settled(now))
    }

    pub fn tree(&self) -> Option<&HierarchyTree> {
        self.state.as_ref().map(|s| &s.tree)
    }

    pub fn zoom_root(&self) -> Option<NodeId> {
        self.state.as_ref().map(|s| s.treemap.zoom_root())
    }

    pub fn zoom_depth(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.treemap.depth())
    }

    /// The layout-space rectangle the treemap is currently zoomed to.
    pub fn zoom_domain(&self) -> Option<Tile> {
        self.state.as_ref().map(|s| s.treemap.window().domain())
    }

    pub fn color_domain(&self) -> Option<(f64, f64)> {
        self.state.as_ref().map(|s| s.color.domain())
    }

    /// Resolves a `/`-separated name path starting at the root name, e.g. `"flare/vis"`.
    ///
    /// A name that itself contains `/` is written with `\/`; `\\` stands for a backslash.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let parts = split_path(path);
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
        self.find_path(&parts)
    }

    /// Resolves a path given as one name per level, starting at the root name.
    pub fn find_path(&self, names: &[&str]) -> Option<NodeId> {
        self.tree()?.find_path(names)
    }
}

fn split_path(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cur = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ ('/' | '\\')) => cur.push(next),
                Some(next) => {
                    cur.push(c);
                    cur.push(next);
                }
                None => cur.push(c),
            },
            '/' => {
                if !cur.is_empty() {
                    parts.push(std::mem::take(&mut cur));
                }
            }
            _ => cur.push(c),
        }
    }
    if !cur.is_empty() {
        parts.push(cur);
    }
    parts
}
