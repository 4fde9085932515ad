//! Folding and unfolding of subtrees.
//!
//! A node's children live in exactly one of two lists: `children` (drawn) or `hidden_children`
//! (folded away). Every operation here moves whole lists between the two, so a node never shows
//! part of its children and aggregates are untouched.

use crate::tree::{HierarchyTree, NodeId};

/// Result of [`HierarchyTree::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Collapsed,
    Expanded,
    /// True leaves have nothing to fold.
    Leaf,
}

impl HierarchyTree {
    /// Flips the visibility of a node's children.
    pub fn toggle(&mut self, id: NodeId) -> Toggle {
        let node = &mut self.nodes[id.index()];
        let outcome = if !node.children.is_empty() {
            node.hidden_children = std::mem::take(&mut node.children);
            Toggle::Collapsed
        } else if !node.hidden_children.is_empty() {
            node.children = std::mem::take(&mut node.hidden_children);
            Toggle::Expanded
        } else {
            Toggle::Leaf
        };
        tracing::trace!(node = id.index(), ?outcome, "toggle");
        outcome
    }

    /// Hides a node's visible children. No-op when already folded or a leaf.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.index()];
        if node.children.is_empty() {
            return false;
        }
        node.hidden_children = std::mem::take(&mut node.children);
        true
    }

    /// Reveals a node's hidden children without touching deeper levels.
    pub fn expand_one_level(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.index()];
        if node.hidden_children.is_empty() {
            return false;
        }
        node.children = std::mem::take(&mut node.hidden_children);
        true
    }

    /// Folds `id` and every descendant beneath it, visible or already hidden.
    pub fn collapse_subtree(&mut self, id: NodeId) {
        for d in self.all_descendants(id) {
            self.collapse(d);
        }
    }

    /// Shows `id`, its children and grandchildren, with every grandchild folded.
    ///
    /// This is the shape both the initial view and treemap zooms put a subtree into.
    pub fn open_one_level(&mut self, id: NodeId) {
        self.expand_one_level(id);
        let children = self.nodes[id.index()].children.clone();
        for child in children {
            self.expand_one_level(child);
            let grandchildren = self.nodes[child.index()].children.clone();
            for g in grandchildren {
                self.collapse_subtree(g);
            }
        }
    }

    /// Puts a freshly built tree into its initial shape: root and its children open,
    /// everything from the grandchildren down folded.
    pub fn initialize_collapsed(&mut self) {
        let root = self.root();
        self.open_one_level(root);
        tracing::debug!(
            visible = self.visible_descendants(root).len(),
            total = self.len(),
            "initial collapse applied"
        );
    }

    /// Whether `id` is drawn, i.e. every proper ancestor has its children visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .into_iter()
            .skip(1)
            .all(|a| !self.node(a).is_collapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use serde_json::json;

    fn deep() -> HierarchyTree {
        HierarchyTree::from_record(
            &json!({
                "name": "r",
                "children": [
                    {"name": "a", "children": [
                        {"name": "a1", "children": [{"name": "a1x", "v": 1}]},
                        {"name": "a2", "v": 2}
                    ]},
                    {"name": "b", "v": 3}
                ]
            }),
            &field("v"),
        )
        .unwrap()
    }

    #[test]
    fn toggle_round_trips_and_reports_leaves() {
        let mut tree = deep();
        let a = tree.find_path(&["r", "a"]).unwrap();
        let b = tree.find_path(&["r", "b"]).unwrap();
        assert_eq!(tree.toggle(a), Toggle::Collapsed);
        assert!(tree.node(a).children().is_empty());
        assert_eq!(tree.node(a).hidden_children().len(), 2);
        assert_eq!(tree.toggle(a), Toggle::Expanded);
        assert_eq!(tree.toggle(b), Toggle::Leaf);
    }

    #[test]
    fn initial_shape_keeps_two_levels_open() {
        let mut tree = deep();
        tree.initialize_collapsed();
        let a = tree.find_path(&["r", "a"]).unwrap();
        let a1 = tree.find_path(&["r", "a", "a1"]).unwrap();
        let a1x = tree.find_path(&["r", "a", "a1", "a1x"]).unwrap();
        assert!(!tree.node(a).is_collapsed());
        assert!(tree.node(a1).is_collapsed());
        assert!(tree.is_visible(a1));
        assert!(!tree.is_visible(a1x));
    }

    #[test]
    fn collapse_subtree_folds_hidden_descendants_too() {
        let mut tree = deep();
        let a = tree.find_path(&["r", "a"]).unwrap();
        let a1 = tree.find_path(&["r", "a", "a1"]).unwrap();
        tree.collapse(a);
        tree.collapse_subtree(a);
        assert!(tree.node(a).is_collapsed());
        // a1 sat under an already folded parent but is folded as well
        assert!(tree.node(a1).is_collapsed());
    }
}
