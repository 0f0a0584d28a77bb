//! Fixed-band tidy tree layout of the drawn part of a [`Tree`].
//!
//! `y` is `depth * node_size_y` for every node, so all nodes of one depth share a row no matter
//! how tall their subtrees are. `x` comes from [`walker::layout`] scaled by `node_size_x`.

use crate::model::{EdgeGeometry, EdgePath, LayoutEdge, LayoutNode, LayoutResult};
use crate::settings::Settings;
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use crate::{Error, Result};
use arbor_core::geom::{Size, size};
use arbor_core::{Node, NodeId, Tree};
use std::sync::Arc;
use walker::OrderedTree;

#[derive(Clone)]
pub struct LayoutEngine {
    settings: Settings,
    text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl LayoutEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.text_measurer = measurer;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn edge_geometry(&self) -> EdgeGeometry {
        EdgeGeometry {
            node_height: self.settings.node_height,
            arrow_clearance: self.settings.arrow_clearance,
        }
    }

    fn text_style(&self) -> TextStyle {
        TextStyle {
            font_family: None,
            font_size: self.settings.font_size,
        }
    }

    /// Label width plus padding by the fixed node height.
    pub fn measure_label(&self, label: &str) -> Size {
        let metrics = self.text_measurer.measure(label, &self.text_style());
        size(
            metrics.width + self.settings.label_padding,
            self.settings.node_height,
        )
    }

    /// Fills the size cache of every node that has not been measured yet.
    pub fn measure(&self, tree: &mut Tree) -> usize {
        let style = self.text_style();
        let padding = self.settings.label_padding;
        let height = self.settings.node_height;
        let measurer = self.text_measurer.as_ref();
        tree.measure_with(|label| {
            let metrics = measurer.measure(label, &style);
            size(metrics.width + padding, height)
        })
    }

    fn node_size(&self, node: &Node) -> Size {
        node.size().unwrap_or_else(|| self.measure_label(node.label()))
    }

    /// Lays out the subtree drawn below `root`.
    ///
    /// Reads only the visibility state and cached sizes of `tree`; the same input always gives
    /// the same result.
    pub fn compute(&self, tree: &Tree, root: NodeId) -> Result<LayoutResult> {
        tree.get(root)?;

        let bound = tree.node_count();
        let mut slots: Vec<Option<usize>> = vec![None; bound];
        let mut order: Vec<&Node> = Vec::new();
        let mut ordered = OrderedTree::with_capacity(bound);
        let mut depth: Vec<usize> = Vec::new();

        for node in tree.visible_descendants(root) {
            if order.len() >= bound {
                return Err(Error::LayoutOverflow {
                    message: format!("visited more than {bound} nodes below {root}"),
                });
            }
            let (slot, d) = if order.is_empty() {
                (OrderedTree::ROOT, 0)
            } else {
                let parent_slot = node
                    .parent()
                    .and_then(|p| slots.get(p.get() as usize).copied().flatten())
                    .ok_or_else(|| Error::LayoutOverflow {
                        message: format!("{} reached before its parent", node.id()),
                    })?;
                let d = depth[parent_slot] + 1;
                if d > self.settings.max_depth {
                    return Err(Error::LayoutOverflow {
                        message: format!(
                            "{} lies deeper than the bound of {}",
                            node.id(),
                            self.settings.max_depth
                        ),
                    });
                }
                let slot = ordered
                    .push_child(parent_slot)
                    .ok_or(Error::NotInLayout { id: node.id() })?;
                (slot, d)
            };
            depth.push(d);
            let Some(entry) = slots.get_mut(node.id().get() as usize) else {
                return Err(Error::NotInLayout { id: node.id() });
            };
            if entry.replace(slot).is_some() {
                return Err(Error::LayoutOverflow {
                    message: format!("{} reached twice", node.id()),
                });
            }
            order.push(node);
        }

        let tidy = walker::layout(&ordered, self.settings.separation);

        let nodes: Vec<LayoutNode> = order
            .iter()
            .enumerate()
            .map(|(slot, node)| {
                let size = self.node_size(node);
                LayoutNode {
                    id: node.id(),
                    parent: node.parent().filter(|_| slot != OrderedTree::ROOT),
                    label: node.label().to_string(),
                    depth: tidy.depth[slot],
                    x: tidy.x[slot] * self.settings.node_size_x,
                    y: tidy.depth[slot] as f64 * self.settings.node_size_y,
                    width: size.width,
                    height: size.height,
                    collapsed: node.is_collapsed(),
                }
            })
            .collect();

        let geometry = self.edge_geometry();
        let edges: Vec<LayoutEdge> = (0..nodes.len())
            .filter_map(|slot| {
                let parent_slot = ordered.parent(slot)?;
                let (parent, child) = (&nodes[parent_slot], &nodes[slot]);
                Some(LayoutEdge {
                    id: child.id,
                    parent: parent.id,
                    path: EdgePath::between(parent.position(), child.position(), &geometry),
                })
            })
            .collect();

        Ok(LayoutResult::new(nodes, edges))
    }
}
