//! Line-oriented dependency lists: one `parent --> child` edge per line.
//!
//! Lines without an arrow are ignored. A graph with several roots (nodes nobody points at) is
//! hung under a synthetic [`SYNTHETIC_ROOT`] node. Nodes reachable from more than one parent are
//! copied under each of them, so the result is always a strict tree.

use crate::tree::{NodeId, Tree};
use crate::{ArborConfig, Error, Result};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

pub const SYNTHETIC_ROOT: &str = "Root";

const ARROW: &str = "-->";

#[derive(Debug, Clone, Copy)]
pub struct ExpandOptions {
    /// Upper bound on the number of tree nodes produced (shared subgraphs are duplicated).
    pub max_nodes: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
        }
    }
}

impl ExpandOptions {
    pub fn from_config(config: &ArborConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_nodes: config
                .get_u64("limits.maxNodes")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_nodes),
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    successors: IndexSet<String>,
    in_degree: usize,
}

/// A parsed edge list. Node and successor order is first-seen order.
#[derive(Debug, Default)]
pub struct EdgeList {
    nodes: IndexMap<String, Entry>,
}

impl EdgeList {
    pub fn parse(text: &str) -> Result<Self> {
        let mut out = Self::default();
        for (idx, line) in text.lines().enumerate() {
            if !line.contains(ARROW) {
                continue;
            }
            let path = format!("line {}", idx + 1);
            let mut parts = line.split(ARROW);
            let (Some(parent), Some(child), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(Error::malformed(path, "more than one `-->` on a line"));
            };
            let (parent, child) = (parent.trim(), child.trim());
            if parent.is_empty() || child.is_empty() {
                return Err(Error::malformed(path, "empty node name"));
            }
            out.add_edge(parent, child);
        }
        if out.nodes.is_empty() {
            return Err(Error::malformed("/", "no `parent --> child` lines"));
        }
        Ok(out)
    }

    fn add_edge(&mut self, parent: &str, child: &str) {
        self.nodes.entry(parent.to_string()).or_default();
        self.nodes.entry(child.to_string()).or_default();
        let inserted = self
            .nodes
            .get_mut(parent)
            .is_some_and(|entry| entry.successors.insert(child.to_string()));
        if inserted {
            if let Some(entry) = self.nodes.get_mut(child) {
                entry.in_degree += 1;
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes without incoming edges, in first-seen order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, entry)| entry.in_degree == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn successors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(name)
            .into_iter()
            .flat_map(|entry| entry.successors.iter().map(String::as_str))
    }

    /// Expands the graph into a tree, duplicating shared descendants per parent.
    pub fn to_tree(&self, options: &ExpandOptions) -> Result<Tree> {
        enum Step<'a> {
            Visit { name: &'a str, parent: NodeId },
            Expand { name: &'a str, node: NodeId },
            Leave(&'a str),
        }

        let roots = self.roots();
        let mut stack: Vec<Step<'_>> = Vec::new();
        let mut tree = match roots.as_slice() {
            [single] => {
                let tree = Tree::new(*single);
                stack.push(Step::Expand {
                    name: *single,
                    node: tree.root(),
                });
                tree
            }
            _ => {
                let tree = Tree::new(SYNTHETIC_ROOT);
                for &name in roots.iter().rev() {
                    stack.push(Step::Visit {
                        name,
                        parent: tree.root(),
                    });
                }
                tree
            }
        };

        let mut on_path: FxHashSet<&str> = FxHashSet::default();
        let mut reached: FxHashSet<&str> = FxHashSet::default();

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit { name, parent } => {
                    if tree.node_count() >= options.max_nodes {
                        return Err(Error::overflow(format!(
                            "expanding the edge list exceeds {} nodes",
                            options.max_nodes
                        )));
                    }
                    let node = tree.add_child(parent, name)?;
                    stack.push(Step::Expand { name, node });
                }
                Step::Expand { name, node } => {
                    if !on_path.insert(name) {
                        return Err(Error::overflow(format!(
                            "cyclic dependency through `{name}`"
                        )));
                    }
                    reached.insert(name);
                    stack.push(Step::Leave(name));
                    let successors: Vec<&str> = self.successors(name).collect();
                    for succ in successors.into_iter().rev() {
                        stack.push(Step::Visit {
                            name: succ,
                            parent: node,
                        });
                    }
                }
                Step::Leave(name) => {
                    on_path.remove(name);
                }
            }
        }

        if reached.len() < self.nodes.len() {
            let stray = self
                .nodes
                .keys()
                .find(|name| !reached.contains(name.as_str()))
                .map(String::as_str)
                .unwrap_or_default();
            return Err(Error::overflow(format!(
                "`{stray}` is only reachable through a cycle"
            )));
        }

        tracing::debug!(
            graph_nodes = self.nodes.len(),
            tree_nodes = tree.node_count(),
            roots = roots.len(),
            "expanded edge list"
        );
        Ok(tree)
    }
}

/// Parses `text` and expands it with default limits.
pub fn to_tree(text: &str) -> Result<Tree> {
    EdgeList::parse(text)?.to_tree(&ExpandOptions::default())
}
