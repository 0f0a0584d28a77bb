//! Tidy tree layout.
//!
//! Port of the linear-time Walker algorithm as improved by Buchheim, Jünger and Leipert, with the
//! exact traversal order and separation rule of d3-hierarchy's `tree()`. Output coordinates are
//! unitless: callers scale `x` by their horizontal node size.
//!
//! The root always lands on `x = 0`; parents are centered over their first and last child.

use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum distance between neighbouring nodes on the same level, in node widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separation {
    /// Nodes sharing a parent.
    pub siblings: f64,
    /// Neighbours with different parents.
    pub cousins: f64,
}

impl Default for Separation {
    fn default() -> Self {
        Self {
            siblings: 1.0,
            cousins: 2.0,
        }
    }
}

/// An ordered rooted tree addressed by dense indices. Index [`OrderedTree::ROOT`] is the root.
#[derive(Debug, Clone)]
pub struct OrderedTree {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl Default for OrderedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedTree {
    pub const ROOT: usize = 0;

    pub fn new() -> Self {
        Self {
            parent: vec![None],
            children: vec![Vec::new()],
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut parent = Vec::with_capacity(capacity.max(1));
        let mut children = Vec::with_capacity(capacity.max(1));
        parent.push(None);
        children.push(Vec::new());
        Self { parent, children }
    }

    /// Appends a new last child under `parent`. Returns `None` if `parent` does not exist.
    pub fn push_child(&mut self, parent: usize) -> Option<usize> {
        if parent >= self.children.len() {
            return None;
        }
        let idx = self.children.len();
        self.parent.push(Some(parent));
        self.children.push(Vec::new());
        self.children[parent].push(idx);
        Some(idx)
    }

    pub fn node_count(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parent.get(idx).copied().flatten()
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TidyLayout {
    /// Horizontal position per node index, in separation units.
    pub x: Vec<f64>,
    /// Distance from the root per node index.
    pub depth: Vec<usize>,
}

#[derive(Debug, Clone)]
struct WalkNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Default ancestor for the next sibling's apportion.
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    number: usize,
}

struct Walk {
    nodes: Vec<WalkNode>,
    separation: Separation,
}

/// Lays out `tree`.
pub fn layout(tree: &OrderedTree, separation: Separation) -> TidyLayout {
    let n = tree.node_count();
    let virtual_root = n;

    let mut nodes: Vec<WalkNode> = (0..n)
        .map(|idx| WalkNode {
            parent: Some(tree.parent(idx).unwrap_or(virtual_root)),
            children: tree.children(idx).to_vec(),
            default_ancestor: None,
            ancestor: idx,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            number: 0,
        })
        .collect();
    for idx in 0..n {
        for (number, &child) in tree.children(idx).iter().enumerate() {
            nodes[child].number = number;
        }
    }
    nodes.push(WalkNode {
        parent: None,
        children: vec![OrderedTree::ROOT],
        default_ancestor: None,
        ancestor: virtual_root,
        prelim: 0.0,
        modifier: 0.0,
        change: 0.0,
        shift: 0.0,
        thread: None,
        number: 0,
    });

    let mut walk = Walk { nodes, separation };

    for v in post_order(tree) {
        walk.first_walk(v);
    }
    walk.nodes[virtual_root].modifier = -walk.nodes[OrderedTree::ROOT].prelim;

    let mut x = vec![0.0; n];
    let mut depth = vec![0usize; n];
    let mut stack = vec![OrderedTree::ROOT];
    while let Some(v) = stack.pop() {
        let parent = walk.nodes[v].parent.unwrap_or(virtual_root);
        let parent_mod = walk.nodes[parent].modifier;
        x[v] = walk.nodes[v].prelim + parent_mod;
        walk.nodes[v].modifier += parent_mod;
        if parent != virtual_root {
            depth[v] = depth[parent] + 1;
        }
        stack.extend(tree.children(v).iter().rev());
    }

    TidyLayout { x, depth }
}

/// Children before parents, left subtrees before right ones.
fn post_order(tree: &OrderedTree) -> Vec<usize> {
    let mut pending = vec![OrderedTree::ROOT];
    let mut visited = Vec::with_capacity(tree.node_count());
    while let Some(v) = pending.pop() {
        visited.push(v);
        pending.extend(tree.children(v).iter().copied());
    }
    visited.reverse();
    visited
}

impl Walk {
    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            self.separation.siblings
        } else {
            self.separation.cousins
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.nodes[v].parent else {
            return;
        };
        let number = self.nodes[v].number;
        let left_sibling = number
            .checked_sub(1)
            .map(|i| self.nodes[parent].children[i]);

        let first = self.nodes[v].children.first().copied();
        let last = self.nodes[v].children.last().copied();
        if let (Some(first), Some(last)) = (first, last) {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            if let Some(w) = left_sibling {
                self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
            } else {
                self.nodes[v].prelim = midpoint;
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let ancestor = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        self.nodes[parent].default_ancestor = Some(self.apportion(v, left_sibling, ancestor));
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let Some(parent) = self.nodes[v].parent else {
            return ancestor;
        };

        // i = inside, o = outside, p = this subtree, m = the forest to its left.
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vim = im;
            vip = ip;
            vom = om;
            vop = op;
            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(im);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(ip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = self.nodes[wp]
            .number
            .saturating_sub(self.nodes[wm].number)
            .max(1) as f64;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for k in (0..self.nodes[v].children.len()).rev() {
            let w = self.nodes[v].children[k];
            self.nodes[w].prelim += shift;
            self.nodes[w].modifier += shift;
            change += self.nodes[w].change;
            shift += self.nodes[w].shift + change;
        }
    }
}
