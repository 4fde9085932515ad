use crate::record::{ValueAccessor, leaf_value};
use crate::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Arena index of a node. Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Stable reconciliation key, handed out the first time a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderKey(pub u32);

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) name: String,
    pub(crate) raw_value: f64,
    pub(crate) value: f64,
    pub(crate) depth: usize,
    pub(crate) height: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) hidden_children: Vec<NodeId>,
    pub(crate) key: Option<RenderKey>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value read from the record (leaves only; 0 for branches and missing values).
    pub fn raw_value(&self) -> f64 {
        self.raw_value
    }

    /// Sum of `raw_value` over all leaf descendants. Fixed at construction.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Longest distance to a descendant leaf, counted over the full (unfolded) tree.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn hidden_children(&self) -> &[NodeId] {
        &self.hidden_children
    }

    pub fn key(&self) -> Option<RenderKey> {
        self.key
    }

    /// True leaf: no children, visible or hidden.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.hidden_children.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        !self.hidden_children.is_empty()
    }

    pub fn has_any_children(&self) -> bool {
        !self.is_leaf()
    }

    /// Children regardless of visibility. At most one of the two lists is non-empty.
    pub fn all_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .chain(self.hidden_children.iter())
            .copied()
    }
}

/// Case-insensitive lexical order used for sibling placement in the node-link view.
///
/// Ties between names that only differ in case fall back to byte order so sorting is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone)]
pub struct HierarchyTree {
    pub(crate) nodes: Vec<TreeNode>,
    next_key: u32,
}

impl HierarchyTree {
    /// Builds a tree from a nested `{ name, children?: [...] }` record.
    ///
    /// Leaf values come from `accessor`; anything it cannot read counts as 0. Siblings are sorted
    /// by name and aggregate values are summed bottom-up before the tree is returned.
    pub fn from_record(record: &Value, accessor: &dyn ValueAccessor) -> Result<Self> {
        let mut nodes: Vec<TreeNode> = Vec::new();
        push_record(&mut nodes, record, accessor, None, 0, "$")?;

        let mut tree = Self { nodes, next_key: 0 };
        tree.sort_children_by_name();
        tree.sum_values();

        tracing::debug!(
            nodes = tree.nodes.len(),
            height = tree.nodes[0].height,
            value = tree.nodes[0].value,
            "hierarchy built"
        );
        Ok(tree)
    }

    pub fn from_json_str(text: &str, accessor: &dyn ValueAccessor) -> Result<Self> {
        let record: Value = serde_json::from_str(text)?;
        Self::from_record(&record, accessor)
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        debug_assert!(id.index() < self.nodes.len(), "node id from another tree");
        &self.nodes[id.index()]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.node(p).parent;
        }
        out
    }

    pub fn ancestor_set(&self, id: NodeId) -> FxHashSet<NodeId> {
        self.ancestors(id).into_iter().collect()
    }

    /// The ancestor-or-self of `id` sitting exactly at `depth`.
    pub fn ancestor_at_depth(&self, id: NodeId, depth: usize) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.node(*a).depth == depth)
    }

    /// Whether `ancestor` is `id` itself or lies on its path to the root.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let target_depth = self.node(ancestor).depth;
        let mut cur = id;
        loop {
            if cur == ancestor {
                return true;
            }
            let node = self.node(cur);
            if node.depth <= target_depth {
                return false;
            }
            match node.parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Names from the root down to `id`.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| self.node(a).name.as_str())
            .collect();
        names.reverse();
        names
    }

    /// Resolves a name path starting at the root name, looking through hidden children too.
    pub fn find_path(&self, path: &[&str]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let root = self.root();
        if self.node(root).name != *first {
            return None;
        }
        let mut cur = root;
        for name in rest {
            cur = self
                .node(cur)
                .all_children()
                .find(|c| self.node(*c).name == *name)?;
        }
        Some(cur)
    }

    /// Pre-order walk over visible children only.
    pub fn visible_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, |n| n.children.as_slice())
    }

    /// Pre-order walk over every descendant, visible or hidden.
    pub fn all_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            let node = self.node(cur);
            for c in node.all_children().collect::<Vec<_>>().into_iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Visible parent/child pairs in pre-order of the child.
    pub fn visible_links(&self, id: NodeId) -> Vec<(NodeId, NodeId)> {
        self.visible_descendants(id)
            .into_iter()
            .filter_map(|c| {
                if c == id {
                    None
                } else {
                    self.node(c).parent.map(|p| (p, c))
                }
            })
            .collect()
    }

    /// Hands out reconciliation keys to visible nodes drawn for the first time.
    ///
    /// Keys are never reassigned, so a node keeps its key through any number of collapses,
    /// expands and re-renders. Returns how many keys were assigned by this call.
    pub fn assign_keys(&mut self) -> usize {
        let mut assigned = 0;
        for id in self.visible_descendants(self.root()) {
            let node = &mut self.nodes[id.index()];
            if node.key.is_none() {
                node.key = Some(RenderKey(self.next_key));
                self.next_key += 1;
                assigned += 1;
            }
        }
        if assigned > 0 {
            tracing::trace!(assigned, next_key = self.next_key, "render keys assigned");
        }
        assigned
    }

    pub fn key(&self, id: NodeId) -> Option<RenderKey> {
        self.node(id).key
    }

    /// Min/max aggregate value over every node except the root.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        let mut it = self.nodes.iter().skip(1).map(|n| n.value);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    fn walk<'a>(&'a self, id: NodeId, kids: impl Fn(&'a TreeNode) -> &'a [NodeId]) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for &c in kids(self.node(cur)).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    fn sort_children_by_name(&mut self) {
        for idx in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[idx].children);
            children.sort_by(|a, b| {
                compare_names(&self.nodes[a.index()].name, &self.nodes[b.index()].name)
            });
            self.nodes[idx].children = children;
        }
    }

    fn sum_values(&mut self) {
        // Arena order is pre-order, so walking it backwards visits children before parents.
        for idx in (0..self.nodes.len()).rev() {
            let (value, height) = {
                let node = &self.nodes[idx];
                if node.children.is_empty() {
                    (node.raw_value, 0)
                } else {
                    node.children.iter().fold((0.0, 0), |(sum, h), c| {
                        let child = &self.nodes[c.index()];
                        (sum + child.value, h.max(child.height + 1))
                    })
                }
            };
            self.nodes[idx].value = value;
            self.nodes[idx].height = height;
        }
    }
}

fn push_record(
    nodes: &mut Vec<TreeNode>,
    record: &Value,
    accessor: &dyn ValueAccessor,
    parent: Option<NodeId>,
    depth: usize,
    path: &str,
) -> Result<NodeId> {
    let Some(obj) = record.as_object() else {
        return Err(Error::InvalidRecord {
            path: path.to_string(),
            message: "expected an object".to_string(),
        });
    };
    let Some(name) = obj.get("name").and_then(Value::as_str) else {
        return Err(Error::InvalidRecord {
            path: path.to_string(),
            message: "missing string field `name`".to_string(),
        });
    };
    let children = match obj.get("children") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            return Err(Error::InvalidRecord {
                path: path.to_string(),
                message: "`children` must be an array".to_string(),
            });
        }
    };

    let raw_value = if children.is_empty() {
        leaf_value(accessor.value(record))
    } else {
        0.0
    };

    let id = NodeId::from_index(nodes.len());
    nodes.push(TreeNode {
        name: name.to_string(),
        raw_value,
        value: 0.0,
        depth,
        height: 0,
        parent,
        children: Vec::with_capacity(children.len()),
        hidden_children: Vec::new(),
        key: None,
    });

    for (i, child) in children.iter().enumerate() {
        let child_path = format!("{path}.children[{i}]");
        let child_id = push_record(nodes, child, accessor, Some(id), depth + 1, &child_path)?;
        nodes[id.index()].children.push(child_id);
    }

    Ok(id)
}
