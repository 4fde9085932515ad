//! Reingold–Tilford tidy tree in linear time (Buchheim, Jünger and Leipert).
//!
//! Works on a compact adjacency list so callers can feed it any visible subtree. Outputs breadth
//! offsets in sibling units: adjacent siblings sit 1 apart, adjacent cousins 2 apart, and the root
//! is at 0.

#[derive(Debug, Clone)]
struct Walker {
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    ancestor: usize,
    default_ancestor: Option<usize>,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    x: f64,
}

impl Walker {
    fn new(idx: usize) -> Self {
        Self {
            parent: idx,
            children: Vec::new(),
            number: 0,
            ancestor: idx,
            default_ancestor: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            x: 0.0,
        }
    }
}

/// Computes breadth offsets for every node of `children`, rooted at `root`.
///
/// `children[i]` lists the child indices of node `i` in drawing order. Nodes not reachable from
/// `root` keep offset 0.
pub fn tidy_offsets(children: &[Vec<usize>], root: usize) -> Vec<f64> {
    let n = children.len();
    if n == 0 {
        return Vec::new();
    }
    debug_assert!(root < n, "root outside adjacency list");

    // Slot `n` is a synthetic parent of the root so the root has siblings to look at.
    let virt = n;
    let mut w: Vec<Walker> = (0..=n).map(Walker::new).collect();
    for (p, kids) in children.iter().enumerate() {
        for (i, &c) in kids.iter().enumerate() {
            w[c].parent = p;
            w[c].number = i;
        }
        w[p].children = kids.clone();
    }
    w[virt].children = vec![root];
    w[root].parent = virt;
    w[root].number = 0;

    for v in post_order(&w, root) {
        first_walk(&mut w, v);
    }
    w[virt].modifier = -w[root].prelim;
    for v in pre_order(&w, root) {
        let p = w[v].parent;
        w[v].x = w[v].prelim + w[p].modifier;
        w[v].modifier += w[p].modifier;
    }

    w.truncate(n);
    w.into_iter().map(|node| node.x).collect()
}

fn pre_order(w: &[Walker], root: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        out.push(v);
        for &c in w[v].children.iter().rev() {
            stack.push(c);
        }
    }
    out
}

fn post_order(w: &[Walker], root: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        out.push(v);
        for &c in &w[v].children {
            stack.push(c);
        }
    }
    out.reverse();
    out
}

fn separation(w: &[Walker], a: usize, b: usize) -> f64 {
    if w[a].parent == w[b].parent { 1.0 } else { 2.0 }
}

fn next_left(w: &[Walker], v: usize) -> Option<usize> {
    w[v].children.first().copied().or(w[v].thread)
}

fn next_right(w: &[Walker], v: usize) -> Option<usize> {
    w[v].children.last().copied().or(w[v].thread)
}

fn next_ancestor(w: &[Walker], vim: usize, v: usize, ancestor: usize) -> usize {
    let a = w[vim].ancestor;
    if w[a].parent == w[v].parent { a } else { ancestor }
}

fn move_subtree(w: &mut [Walker], wm: usize, wp: usize, shift: f64) {
    let change = shift / (w[wp].number - w[wm].number) as f64;
    w[wp].change -= change;
    w[wp].shift += shift;
    w[wm].change += change;
    w[wp].prelim += shift;
    w[wp].modifier += shift;
}

fn execute_shifts(w: &mut [Walker], v: usize) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = w[v].children.clone();
    for &c in children.iter().rev() {
        w[c].prelim += shift;
        w[c].modifier += shift;
        change += w[c].change;
        shift += w[c].shift + change;
    }
}

fn first_walk(w: &mut [Walker], v: usize) {
    let p = w[v].parent;
    let left = match w[v].number {
        0 => None,
        i => Some(w[p].children[i - 1]),
    };

    if let (Some(&first), Some(&last)) = (w[v].children.first(), w[v].children.last()) {
        execute_shifts(w, v);
        let midpoint = (w[first].prelim + w[last].prelim) / 2.0;
        match left {
            Some(l) => {
                w[v].prelim = w[l].prelim + separation(w, v, l);
                w[v].modifier = w[v].prelim - midpoint;
            }
            None => w[v].prelim = midpoint,
        }
    } else if let Some(l) = left {
        w[v].prelim = w[l].prelim + separation(w, v, l);
    }

    let fallback = w[p].default_ancestor.unwrap_or(w[p].children[0]);
    w[p].default_ancestor = Some(apportion(w, v, left, fallback));
}

fn apportion(w: &mut [Walker], v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
    let Some(left) = left else {
        return ancestor;
    };

    // i/o = inside/outside contour, p/m = right (plus) / left (minus) subtree.
    let mut vip = v;
    let mut vop = v;
    let mut vim = left;
    let mut vom = w[w[v].parent].children[0];
    let mut sip = w[vip].modifier;
    let mut sop = w[vop].modifier;
    let mut sim = w[vim].modifier;
    let mut som = w[vom].modifier;

    let (tail_im, tail_ip) = loop {
        match (next_right(w, vim), next_left(w, vip)) {
            (Some(im), Some(ip)) => {
                vim = im;
                vip = ip;
            }
            tail => break tail,
        }
        vom = next_left(w, vom).unwrap_or(vom);
        vop = next_right(w, vop).unwrap_or(vop);
        w[vop].ancestor = v;

        let shift = w[vim].prelim + sim - w[vip].prelim - sip + separation(w, vim, vip);
        if shift > 0.0 {
            let a = next_ancestor(w, vim, v, ancestor);
            move_subtree(w, a, v, shift);
            sip += shift;
            sop += shift;
        }
        sim += w[vim].modifier;
        sip += w[vip].modifier;
        som += w[vom].modifier;
        sop += w[vop].modifier;
    };

    if let Some(im) = tail_im {
        if next_right(w, vop).is_none() {
            w[vop].thread = Some(im);
            w[vop].modifier += sim - sop;
        }
    }
    if let Some(ip) = tail_ip {
        if next_left(w, vom).is_none() {
            w[vom].thread = Some(ip);
            w[vom].modifier += sip - som;
            ancestor = v;
        }
    }
    ancestor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node_sits_at_origin() {
        assert_eq!(tidy_offsets(&[vec![]], 0), vec![0.0]);
    }

    #[test]
    fn siblings_are_one_unit_apart_and_centered() {
        // 0 -> 1, 2, 3
        let kids = vec![vec![1, 2, 3], vec![], vec![], vec![]];
        assert_eq!(tidy_offsets(&kids, 0), vec![0.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn cousins_are_two_units_apart() {
        // 0 -> 1, 2; 1 -> 3; 2 -> 4
        let kids = vec![vec![1, 2], vec![3], vec![4], vec![], vec![]];
        let x = tidy_offsets(&kids, 0);
        assert_eq!(x[4] - x[3], 2.0);
        assert_eq!(x[2] - x[1], 2.0);
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn small_subtrees_between_large_ones_are_spread_evenly() {
        // 0 -> 1, 2, 3; 1 and 3 each have two children, 2 is a leaf.
        let kids = vec![
            vec![1, 2, 3],
            vec![4, 5],
            vec![],
            vec![6, 7],
            vec![],
            vec![],
            vec![],
            vec![],
        ];
        let x = tidy_offsets(&kids, 0);
        assert_eq!(x[5] - x[4], 1.0);
        assert_eq!(x[7] - x[6], 1.0);
        // the leaf between the two branches sits midway
        assert!((x[2] - (x[1] + x[3]) / 2.0).abs() < 1e-9);
        // no overlap between cousins on the deepest level
        assert!(x[6] - x[5] >= 2.0 - 1e-9);
    }
}
