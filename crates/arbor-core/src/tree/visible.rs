use super::{Node, NodeId, Tree};

/// Lazy pre-order walk over drawn nodes; see [`Tree::visible_descendants`].
///
/// Cloning the iterator restarts nothing, it forks the walk at the current point. Create a new
/// one from the tree to start over.
#[derive(Debug, Clone)]
pub struct VisibleDescendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> VisibleDescendants<'a> {
    pub(super) fn new(tree: &'a Tree, from: NodeId) -> Self {
        let stack = if tree.contains(from) {
            vec![from]
        } else {
            Vec::new()
        };
        Self { tree, stack }
    }
}

impl<'a> Iterator for VisibleDescendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.index()];
        self.stack.extend(node.children().iter().rev().copied());
        Some(node)
    }
}
