use arboretum::{
    ClickOutcome, DatasetSpec, Error, Palette, Phase, RootChange, Session, SessionConfig,
    ViewKind, ZoomOutcome,
};
use arboretum_core::{Toggle, field};
use arboretum_layout::layout_treemap;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

fn flat() -> Value {
    json!({"name": "root", "children": [
        {"name": "b", "size": 5},
        {"name": "a", "size": 10}
    ]})
}

fn nested() -> Value {
    json!({"name": "root", "children": [
        {"name": "X", "children": [
            {"name": "p", "children": [
                {"name": "p1", "children": [{"name": "p1a", "size": 1}]},
                {"name": "p2", "size": 2}
            ]},
            {"name": "q", "size": 7}
        ]},
        {"name": "Y", "children": [
            {"name": "y1", "children": [{"name": "y1a", "size": 3}]}
        ]},
        {"name": "z", "size": 1}
    ]})
}

fn session(record: &Value) -> Session {
    let mut s = Session::default();
    s.load(record, &field("size"), 0.0).unwrap();
    s
}

#[test]
fn flat_dataset_renders_both_views() {
    let s = session(&flat());
    let tree = s.tree().unwrap();
    let root = tree.root();
    let a = s.find("root/a").unwrap();
    let b = s.find("root/b").unwrap();
    assert_eq!(tree.node(root).value(), 15.0);
    assert_eq!(tree.node(root).children(), &[a, b]);
    assert_eq!(s.color_domain(), Some((5.0, 10.0)));

    let frame = s.frame(700.0).unwrap();
    assert!(frame.settled);
    assert_eq!(frame.nodelink.nodes.len(), 3);
    assert_eq!(frame.nodelink.links.len(), 2);

    let root_node = frame.nodelink.node(root).unwrap();
    assert_eq!(root_node.attrs.fill.to_string(), "#cccccc");
    assert_eq!(root_node.attrs.label_x, -12.0);
    assert!(root_node.attrs.outlined);
    assert_eq!(root_node.glyph.radius, 6.0);
    let a_node = frame.nodelink.node(a).unwrap();
    assert_eq!(a_node.attrs.label_x, 10.0);
    assert!(!a_node.attrs.pointer);
    assert!(!a_node.attrs.outlined);

    let header = frame.treemap.tile(root).unwrap();
    assert!(header.attrs.header);
    assert_eq!(header.attrs.lines, vec!["root".to_string()]);
    assert_eq!(
        (header.x, header.y, header.width, header.height),
        (0.0, -5.0, 720.0, 30.0)
    );

    let a_tile = frame.treemap.tile(a).unwrap();
    assert_eq!(a_tile.attrs.lines, vec!["a".to_string(), "10".to_string()]);
    assert_eq!(a_tile.attrs.text_color.to_string(), "#ffffff");
    assert!(!a_tile.value_visible);
    let b_tile = frame.treemap.tile(b).unwrap();
    assert_eq!(b_tile.attrs.text_color.to_string(), "#000000");
    assert_eq!(b_tile.attrs.title, "root\n\tb");
}

#[test]
fn treemap_zoom_in_and_out() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let p1 = s.find("root/X/p/p1").unwrap();
    let y1 = s.find("root/Y/y1").unwrap();
    let root = s.tree().unwrap().root();
    assert_eq!(s.zoom_depth(), Some(0));
    assert!(s.tree().unwrap().node(p).is_collapsed());

    let outcome = s.click(ViewKind::Treemap, x, 1000.0).unwrap();
    assert_eq!(
        outcome,
        ClickOutcome::Zoomed(ZoomOutcome::ZoomedIn { from: root, to: x })
    );
    assert_eq!(s.zoom_root(), Some(x));
    assert_eq!(s.zoom_depth(), Some(1));
    let tree = s.tree().unwrap();
    assert!(!tree.node(p).is_collapsed());
    assert!(tree.node(p1).is_collapsed());

    let config = s.config().clone();
    let layout = layout_treemap(tree, &config.treemap, &config.treemap_layout).unwrap();
    assert_eq!(s.zoom_domain(), layout.tile(x));

    let frame = s.frame(1700.0).unwrap();
    assert!(frame.nodelink.node(x).unwrap().attrs.outlined);
    assert!(!frame.nodelink.node(root).unwrap().attrs.outlined);
    assert_eq!(frame.treemap.zoom_root, x);
    assert_eq!(
        frame.treemap.tile(x).unwrap().attrs.lines,
        vec!["root/X".to_string()]
    );
    for t in frame.treemap.tiles.iter().filter(|t| t.phase != Phase::Exit) {
        assert!(tree.is_ancestor_or_self(x, t.attrs.id));
    }

    // Unfold something under a sibling, then back out.
    assert_eq!(
        s.click(ViewKind::NodeLink, y1, 2000.0).unwrap(),
        ClickOutcome::Toggled(Toggle::Expanded)
    );
    let outcome = s.click(ViewKind::Treemap, x, 3000.0).unwrap();
    assert_eq!(
        outcome,
        ClickOutcome::Zoomed(ZoomOutcome::ZoomedOut { from: x, to: root })
    );
    assert_eq!(s.zoom_depth(), Some(0));
    let tree = s.tree().unwrap();
    assert!(tree.node(y1).is_collapsed());
    assert!(tree.node(p).is_collapsed());
    assert_eq!(tree.node(root).value(), 14.0);
}

#[test]
fn zoom_in_steps_through_the_level_below_the_zoom_root() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let q = s.find("root/X/q").unwrap();

    // Clicking a grandchild zooms to its parent first.
    s.click(ViewKind::Treemap, p, 0.0).unwrap();
    assert_eq!(s.zoom_root(), Some(x));

    // q is a leaf one level down: nothing to drill into.
    assert_eq!(
        s.click(ViewKind::Treemap, q, 100.0).unwrap(),
        ClickOutcome::Zoomed(ZoomOutcome::Unchanged)
    );
    assert_eq!(s.zoom_root(), Some(x));

    s.click(ViewKind::Treemap, p, 200.0).unwrap();
    assert_eq!(s.zoom_root(), Some(p));
    assert_eq!(s.zoom_depth(), Some(2));
}

#[test]
fn folding_the_zoom_root_away_retreats_the_treemap() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let root = s.tree().unwrap().root();
    s.click(ViewKind::Treemap, x, 0.0).unwrap();
    assert_eq!(s.zoom_root(), Some(x));

    s.click(ViewKind::NodeLink, root, 100.0).unwrap();
    assert_eq!(s.zoom_root(), Some(root));
    assert_eq!(s.zoom_depth(), Some(0));
}

#[test]
fn render_keys_survive_re_renders() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let key_x = s.frame(0.0).unwrap().nodelink.node(x).unwrap().key;
    let key_p = s.frame(0.0).unwrap().nodelink.node(p).unwrap().key;

    s.click(ViewKind::NodeLink, x, 1000.0).unwrap();
    s.click(ViewKind::NodeLink, x, 2000.0).unwrap();
    s.click(ViewKind::Treemap, x, 3000.0).unwrap();

    let frame = s.frame(4000.0).unwrap();
    assert_eq!(frame.nodelink.node(x).unwrap().key, key_x);
    assert_eq!(frame.nodelink.node(p).unwrap().key, key_p);
    assert_eq!(frame.treemap.tile(p).unwrap().key, key_p);
}

#[test]
fn hover_highlights_in_both_views() {
    let mut s = session(&nested());
    let root = s.tree().unwrap().root();
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let y = s.find("root/Y").unwrap();

    s.hover(p).unwrap();
    let frame = s.frame(700.0).unwrap();
    let link = |source, target| {
        frame
            .nodelink
            .links
            .iter()
            .find(|l| l.source == source && l.target == target)
            .unwrap()
            .highlighted
    };
    assert!(link(root, x));
    assert!(link(x, p));
    assert!(!link(root, y));

    let last = frame.treemap.tiles.last().unwrap();
    assert_eq!(last.attrs.id, p);
    assert!(last.highlighted);
    assert!(last.value_visible);
    assert_eq!(frame.treemap.tiles.iter().filter(|t| t.highlighted).count(), 1);

    s.exit().unwrap();
    let frame = s.frame(700.0).unwrap();
    assert!(frame.nodelink.links.iter().all(|l| !l.highlighted));
    assert!(frame.treemap.tiles.iter().all(|t| !t.highlighted && !t.value_visible));
}

#[test]
fn collapse_shrinks_children_into_the_clicked_node() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let x_at = s.frame(999.0).unwrap().nodelink.node(x).unwrap().glyph.center;

    s.click(ViewKind::NodeLink, x, 1000.0).unwrap();
    let frame = s.frame(1700.0).unwrap();
    assert!(frame.nodelink.node(p).is_none());
    let frame = s.frame(1699.0).unwrap();
    let exiting = frame.nodelink.node(p).unwrap();
    assert_eq!(exiting.phase, Phase::Exit);
    assert!((exiting.glyph.center.x - x_at.x).abs() < 0.5);
    assert!((exiting.glyph.center.y - x_at.y).abs() < 0.5);
    assert!(frame.nodelink.node(x).unwrap().glyph.radius > 8.9);
}

#[test]
fn a_second_click_mid_transition_continues_from_the_current_geometry() {
    let mut s = session(&nested());
    let x = s.find("root/X").unwrap();
    let p = s.find("root/X/p").unwrap();
    let home = s.frame(999.0).unwrap().nodelink.node(p).unwrap().glyph.center;

    s.click(ViewKind::NodeLink, x, 1000.0).unwrap();
    let midway = s.frame(1350.0).unwrap().nodelink.node(p).unwrap().glyph;

    s.click(ViewKind::NodeLink, x, 1350.0).unwrap();
    let resumed = s.frame(1350.0).unwrap();
    let node = resumed.nodelink.node(p).unwrap();
    assert_eq!(node.phase, Phase::Update);
    assert_eq!(node.glyph.center, midway.center);

    assert!(!s.is_settled(1700.0));
    let settled = s.frame(2050.0).unwrap();
    assert!(settled.settled);
    assert_eq!(settled.nodelink.node(p).unwrap().glyph.center, home);
}

#[test]
fn switching_datasets_discards_everything_in_flight() {
    let changes: Rc<RefCell<Vec<RootChange>>> = Rc::default();
    let mut s = Session::default();
    let seen = Rc::clone(&changes);
    s.on_root_change(move |c| seen.borrow_mut().push(c.clone()));

    s.load(&nested(), &field("size"), 0.0).unwrap();
    let x = s.find("root/X").unwrap();
    s.click(ViewKind::NodeLink, x, 1000.0).unwrap();

    let sp500 = DatasetSpec::lookup("sp500").unwrap();
    let record = json!({"name": "S&P", "children": [
        {"name": "Tech", "children": [
            {"name": "AAPL", "marketcap": 2.5e12},
            {"name": "MSFT", "marketcap": 2.1e12}
        ]},
        {"name": "Energy", "children": [{"name": "XOM", "marketcap": 4.4e11}]}
    ]});
    s.load_dataset(&sp500, &record, 1200.0).unwrap();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].name, "S&P");
    assert_eq!(changes[1].nodes, 6);
    assert_eq!(changes[1].extent, Some((4.4e11, 4.6e12)));

    let frame = s.frame(1200.0).unwrap();
    assert_eq!(frame.nodelink.nodes.len(), 6);
    assert!(frame.nodelink.nodes.iter().all(|n| n.phase == Phase::Enter));
    assert!(frame.treemap.tiles.iter().all(|t| t.phase == Phase::Enter));
    assert_eq!(s.zoom_root(), s.tree().map(|t| t.root()));

    let tech = s.find("S&P/Tech").unwrap();
    let settled = s.frame(1900.0).unwrap();
    assert_eq!(
        settled.treemap.tile(tech).unwrap().attrs.lines,
        vec!["Tech".to_string(), "4.6T".to_string()]
    );
}

#[test]
fn one_node_datasets_are_inert() {
    let mut s = session(&json!({"name": "solo"}));
    let root = s.tree().unwrap().root();
    assert_eq!(s.color_domain(), Some((0.0, 0.0)));

    let outcome = s.click(ViewKind::NodeLink, root, 10.0).unwrap();
    assert_eq!(outcome, ClickOutcome::Toggled(Toggle::Leaf));
    assert!(!outcome.changed());
    let outcome = s.click(ViewKind::Treemap, root, 20.0).unwrap();
    assert_eq!(outcome, ClickOutcome::Zoomed(ZoomOutcome::Unchanged));

    let frame = s.frame(1000.0).unwrap();
    assert_eq!(frame.nodelink.nodes.len(), 1);
    assert!(frame.nodelink.links.is_empty());
    assert_eq!(frame.treemap.tiles.len(), 1);
}

#[test]
fn operations_before_loading_report_no_dataset() {
    let mut s = Session::default();
    assert!(s.tree().is_none());
    assert!(matches!(s.frame(0.0), Err(Error::NoDataset)));
    assert!(matches!(s.hover(arboretum_core::NodeId::ROOT), Err(Error::NoDataset)));
    assert!(matches!(
        s.click(ViewKind::Treemap, arboretum_core::NodeId::ROOT, 0.0),
        Err(Error::NoDataset)
    ));
    assert!(s.set_palette(Palette::Greens, 0.0).is_ok());
}

#[test]
fn palette_changes_recolor_without_moving() {
    let mut s = session(&flat());
    let a = s.find("root/a").unwrap();
    let before = s.frame(700.0).unwrap();
    s.set_palette(Palette::Greens, 800.0).unwrap();
    let after = s.frame(800.0).unwrap();
    let (b, g) = (
        before.nodelink.node(a).unwrap(),
        after.nodelink.node(a).unwrap(),
    );
    assert_eq!(b.glyph.center, g.glyph.center);
    assert_eq!(g.attrs.fill, Palette::Greens.stops()[8]);
}

#[test]
fn frames_serialize_as_plain_json() {
    let s = session(&flat());
    let value = serde_json::to_value(s.frame(700.0).unwrap()).unwrap();
    let node = &value["nodelink"]["nodes"][0];
    assert_eq!(node["name"], "root");
    assert_eq!(node["fill"], "#cccccc");
    assert_eq!(node["labelX"], -12.0);
    assert_eq!(node["anchor"], "end");
    assert_eq!(value["treemap"]["tiles"][0]["header"], true);
    assert_eq!(value["settled"], true);
}

#[test]
fn names_containing_slashes_resolve_by_escape_or_slice() {
    let s = session(&json!({"name": "root", "children": [
        {"name": "A/B", "children": [{"name": "c", "size": 2}]},
        {"name": "A", "children": [{"name": "B", "size": 3}]}
    ]}));
    let tree = s.tree().unwrap();
    let slashed = s.find(r"root/A\/B").unwrap();
    assert_eq!(tree.node(slashed).name(), "A/B");
    assert_eq!(s.find_path(&["root", "A/B"]), Some(slashed));
    assert_eq!(s.find(r"root/A\/B/c"), s.find_path(&["root", "A/B", "c"]));

    let nested_b = s.find("root/A/B").unwrap();
    assert_ne!(nested_b, slashed);
    assert_eq!(tree.node(nested_b).value(), 3.0);
}

#[test]
fn partial_config_flows_into_layouts() {
    let config = SessionConfig::from_value(&json!({
        "treemap": {"width": 400, "height": 200},
        "transition": {"durationMs": 100}
    }))
    .unwrap();
    let mut s = Session::new(config);
    s.load(&flat(), &field("size"), 0.0).unwrap();
    assert!(s.is_settled(100.0));
    let root = s.tree().unwrap().root();
    let header = s.frame(100.0).unwrap().treemap.tile(root).cloned().unwrap();
    assert_eq!(header.width, 400.0);
}

proptest! {
    #[test]
    fn zoom_moves_at_most_one_level_deeper(
        clicks in prop::collection::vec((any::<bool>(), 0usize..64), 0..24)
    ) {
        let mut s = session(&nested());
        let ids: Vec<_> = s.tree().unwrap().ids().collect();
        let mut now = 0.0;
        for (on_map, i) in clicks {
            let node = ids[i % ids.len()];
            let before = s.zoom_depth().unwrap();
            let view = if on_map { ViewKind::Treemap } else { ViewKind::NodeLink };
            let outcome = s.click(view, node, now).unwrap();
            let after = s.zoom_depth().unwrap();
            prop_assert!(after <= before + 1);
            if let ClickOutcome::Zoomed(ZoomOutcome::ZoomedOut { .. }) = outcome {
                prop_assert_eq!(after + 1, before);
            }
            let tree = s.tree().unwrap();
            prop_assert_eq!(tree.node(tree.root()).value(), 14.0);
            prop_assert_eq!(tree.node(s.zoom_root().unwrap()).depth(), after);
            now += 250.0;
        }
    }
}
