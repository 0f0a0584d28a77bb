//! The collapsible tree model.
//!
//! A [`Tree`] owns every [`Node`] in an arena indexed by [`NodeId`]. Child lists hold ids, parent
//! links are plain ids as well, so the only owner of a node is the arena slot it was allocated in.
//! Nodes are never removed: collapsing a node moves its child list into the hidden slot of
//! [`Branch`], it does not destroy anything.

mod load;
mod visible;

pub use load::{LoadOptions, load, load_with};
pub use visible::VisibleDescendants;

use crate::geom::{Point, Size, point};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identity. Allocated once by the tree's [`IdAllocator`] and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out identities in allocation order. Owned by a single [`Tree`].
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    pub fn allocated(&self) -> usize {
        self.next as usize
    }
}

/// Where a node keeps its children.
///
/// The two lists are mutually exclusive by construction; both variants hold at least one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Leaf,
    Expanded(Vec<NodeId>),
    Collapsed(Vec<NodeId>),
}

impl Branch {
    fn all_children(&self) -> &[NodeId] {
        match self {
            Self::Leaf => &[],
            Self::Expanded(children) | Self::Collapsed(children) => children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Collapsed,
    Expanded,
    /// Leaves have nothing to hide.
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    parent: Option<NodeId>,
    branch: Branch,
    depth: usize,
    size: Option<Size>,
    position: Point,
    previous: Point,
}

impl Node {
    fn new(id: NodeId, label: String, parent: Option<NodeId>) -> Self {
        Self {
            id,
            label,
            parent,
            branch: Branch::Leaf,
            depth: 0,
            size: None,
            position: point(0.0, 0.0),
            previous: point(0.0, 0.0),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    /// Children drawn by the diagram (empty when collapsed).
    pub fn children(&self) -> &[NodeId] {
        match &self.branch {
            Branch::Expanded(children) => children,
            Branch::Leaf | Branch::Collapsed(_) => &[],
        }
    }

    pub fn hidden_children(&self) -> &[NodeId] {
        match &self.branch {
            Branch::Collapsed(hidden) => hidden,
            Branch::Leaf | Branch::Expanded(_) => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.branch, Branch::Leaf)
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.branch, Branch::Collapsed(_))
    }

    /// Distance from the root as of the last applied layout.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cached label measurement, `None` until the first layout pass measures it.
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Where the node was last drawn; the start point of its next transition.
    pub fn previous_position(&self) -> Point {
        self.previous
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    ids: IdAllocator,
    root: NodeId,
}

impl Tree {
    /// A single-node tree.
    pub fn new(root_label: impl Into<String>) -> Self {
        let mut ids = IdAllocator::default();
        let root = ids.allocate();
        Self {
            nodes: vec![Node::new(root, root_label.into(), None)],
            ids,
            root,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        load(&raw)
    }

    pub fn from_value(raw: &serde_json::Value) -> Result<Self> {
        load(raw)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[self.root.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::UnknownNode { id })
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(Error::UnknownNode { id })
    }

    /// Every node in allocation order, hidden ones included.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Appends a child to `parent`. A collapsed parent receives it in its hidden list.
    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>) -> Result<NodeId> {
        self.get(parent)?;
        let id = self.ids.allocate();
        self.nodes.push(Node::new(id, label.into(), Some(parent)));

        let parent = self.get_mut(parent)?;
        match &mut parent.branch {
            Branch::Leaf => parent.branch = Branch::Expanded(vec![id]),
            Branch::Expanded(children) | Branch::Collapsed(children) => children.push(id),
        }
        Ok(id)
    }

    /// Swaps a node between its expanded and collapsed forms. Does not lay anything out.
    pub fn toggle(&mut self, id: NodeId) -> Result<ToggleOutcome> {
        let node = self.get_mut(id)?;
        let (branch, outcome) = match std::mem::replace(&mut node.branch, Branch::Leaf) {
            Branch::Leaf => (Branch::Leaf, ToggleOutcome::Unchanged),
            Branch::Expanded(children) => (Branch::Collapsed(children), ToggleOutcome::Collapsed),
            Branch::Collapsed(hidden) => (Branch::Expanded(hidden), ToggleOutcome::Expanded),
        };
        node.branch = branch;
        Ok(outcome)
    }

    /// Collapses every expanded node whose distance from the root is at least `depth`.
    ///
    /// Returns how many nodes were collapsed.
    pub fn collapse_below(&mut self, depth: usize) -> usize {
        let mut targets = Vec::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, d)) = stack.pop() {
            let node = &self.nodes[id.index()];
            if d >= depth && matches!(node.branch, Branch::Expanded(_)) {
                targets.push(id);
            }
            for child in node.branch.all_children() {
                stack.push((*child, d + 1));
            }
        }
        for id in &targets {
            let node = &mut self.nodes[id.index()];
            if let Branch::Expanded(children) = std::mem::replace(&mut node.branch, Branch::Leaf) {
                node.branch = Branch::Collapsed(children);
            }
        }
        targets.len()
    }

    /// The `{ "name", "children" }` form of the whole tree, hidden children included.
    ///
    /// Expand/collapse state is not part of the data shape and is dropped.
    pub fn to_value(&self) -> serde_json::Value {
        use serde_json::{Map, Value};

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.index()].branch.all_children().iter().rev());
        }

        // Children are built before their parents when walking the pre-order backwards.
        let mut built: Vec<Option<Value>> = vec![None; self.nodes.len()];
        for id in order.iter().rev() {
            let node = &self.nodes[id.index()];
            let mut obj = Map::new();
            obj.insert("name".to_string(), Value::String(node.label.clone()));
            let kids = node.branch.all_children();
            if !kids.is_empty() {
                let children = kids
                    .iter()
                    .map(|c| built[c.index()].take().unwrap_or(Value::Null))
                    .collect();
                obj.insert("children".to_string(), Value::Array(children));
            }
            built[id.index()] = Some(Value::Object(obj));
        }
        built[self.root.index()].take().unwrap_or(Value::Null)
    }

    /// Depth-first pre-order walk over the drawn subtree rooted at `from`.
    ///
    /// Only `children` edges are followed. An unknown `from` yields nothing.
    pub fn visible_descendants(&self, from: NodeId) -> VisibleDescendants<'_> {
        VisibleDescendants::new(self, from)
    }

    /// `true` when every ancestor of `id` is expanded.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nearest_visible_ancestor(id) == Some(id)
    }

    /// `id` itself when it is drawn, otherwise the collapsed ancestor that hides it.
    pub fn nearest_visible_ancestor(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?;
        let mut chain = vec![id];
        let mut cur = id;
        while let Some(parent) = self.nodes[cur.index()].parent {
            if chain.len() > self.nodes.len() {
                return None;
            }
            chain.push(parent);
            cur = parent;
        }

        // `chain` runs leaf-to-root; walk it root-first until an edge is hidden.
        let mut visible = self.root;
        for pair in chain.windows(2).rev() {
            let (child, parent) = (pair[0], pair[1]);
            if !self.nodes[parent.index()].children().contains(&child) {
                break;
            }
            visible = child;
        }
        Some(visible)
    }

    /// Measures every node that has no cached size yet. Returns the number of new measurements.
    pub fn measure_with(&mut self, mut measure: impl FnMut(&str) -> Size) -> usize {
        let mut measured = 0usize;
        for node in self.nodes.iter_mut().filter(|n| n.size.is_none()) {
            let size = measure(&node.label);
            tracing::trace!(id = %node.id, width = size.width, height = size.height, "measured label");
            node.size = Some(size);
            measured += 1;
        }
        measured
    }

    /// Records a freshly computed layout position and depth.
    pub fn set_layout(&mut self, id: NodeId, depth: usize, position: Point) -> Result<()> {
        let node = self.get_mut(id)?;
        node.depth = depth;
        node.position = position;
        Ok(())
    }

    /// Moves the transition baseline to the node's current position.
    pub fn settle(&mut self, id: NodeId) -> Result<()> {
        let node = self.get_mut(id)?;
        node.previous = node.position;
        Ok(())
    }

    /// Seeds the root's transition baseline before the first layout.
    pub fn set_anchor(&mut self, anchor: Point) {
        let root = self.root.index();
        self.nodes[root].previous = anchor;
    }
}
