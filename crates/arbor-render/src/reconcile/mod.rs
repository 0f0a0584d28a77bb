//! Identity-keyed diff between two layouts.
//!
//! Node identities split into three disjoint groups: `enter` (only in the next layout), `update`
//! (in both) and `exit` (only in the previous one). Edges are keyed by their child node, so they
//! partition the same way. Positions are only described here; interpolation belongs to the
//! drawing layer.

mod state;

pub use state::{AdvanceReport, VisualState};

use crate::model::{EdgeGeometry, EdgePath, LayoutPoint, LayoutResult};
use crate::{Error, Result};
use arbor_core::{NodeId, Tree};
use serde::Serialize;
use state::VisualStates;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition<T> {
    pub enter: Vec<T>,
    pub update: Vec<T>,
    pub exit: Vec<T>,
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<T> Partition<T> {
    pub fn len(&self) -> usize {
        self.enter.len() + self.update.len() + self.exit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransition {
    pub identity: NodeId,
    pub label: String,
    pub width: f64,
    pub height: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// Has hidden children (drawn with the "expandable" style).
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTransition {
    pub identity: NodeId,
    pub path_start: EdgePath,
    pub path_end: EdgePath,
}

/// Everything the drawing layer needs for one transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationPlan {
    /// The clicked node (or the root on first load) everything grows out of and shrinks into.
    pub trigger: NodeId,
    pub started_at: f64,
    pub duration: f64,
    pub nodes: Partition<NodeTransition>,
    pub edges: Partition<EdgeTransition>,
}

impl AnimationPlan {
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct ReconciliationAnimator {
    duration: f64,
    geometry: EdgeGeometry,
    states: VisualStates,
}

impl ReconciliationAnimator {
    pub fn new(duration: f64, geometry: EdgeGeometry) -> Self {
        Self {
            duration,
            geometry,
            states: VisualStates::default(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn state(&self, id: NodeId) -> VisualState {
        self.states.get(id)
    }

    /// Number of elements currently on screen (entering, settled or exiting).
    pub fn live_elements(&self) -> usize {
        self.states.len()
    }

    /// Settles finished entrances and drops finished exits.
    pub fn advance(&mut self, now: f64) -> AdvanceReport {
        self.states.advance(now)
    }

    /// Diffs `next` against `previous` (nothing drawn yet when `None`).
    ///
    /// Must run after `next` positions were written to `tree` but before the transition
    /// baselines are moved: entering elements start at the trigger's previous position and
    /// updating ones at their own.
    pub fn reconcile(
        &mut self,
        tree: &Tree,
        previous: Option<&LayoutResult>,
        next: &LayoutResult,
        trigger: NodeId,
        now: f64,
    ) -> Result<AnimationPlan> {
        let trigger_node = tree.get(trigger)?;
        let origin = LayoutPoint::from(trigger_node.previous_position());
        let target = next
            .node(trigger)
            .map(|n| n.position())
            .ok_or(Error::NotInLayout { id: trigger })?;
        let until = now + self.duration;
        let was_drawn = |id: NodeId| previous.is_some_and(|p| p.contains(id));

        let mut nodes = Partition::default();
        for n in &next.nodes {
            let start = if was_drawn(n.id) {
                self.states.update(n.id, until);
                LayoutPoint::from(tree.get(n.id)?.previous_position())
            } else {
                self.states.enter(n.id, until);
                origin
            };
            let transition = NodeTransition {
                identity: n.id,
                label: n.label.clone(),
                width: n.width,
                height: n.height,
                start_x: start.x,
                start_y: start.y,
                end_x: n.x,
                end_y: n.y,
                collapsed: n.collapsed,
            };
            if was_drawn(n.id) {
                nodes.update.push(transition);
            } else {
                nodes.enter.push(transition);
            }
        }

        let mut edges = Partition::default();
        for e in &next.edges {
            match previous.and_then(|p| p.edge(e.id)) {
                Some(old) => edges.update.push(EdgeTransition {
                    identity: e.id,
                    path_start: old.path,
                    path_end: e.path,
                }),
                None => edges.enter.push(EdgeTransition {
                    identity: e.id,
                    path_start: EdgePath::collapsed_at(origin, &self.geometry),
                    path_end: e.path,
                }),
            }
        }

        if let Some(previous) = previous {
            for p in previous.nodes.iter().filter(|p| !next.contains(p.id)) {
                self.states.exit(p.id, until);
                nodes.exit.push(NodeTransition {
                    identity: p.id,
                    label: p.label.clone(),
                    width: p.width,
                    height: p.height,
                    start_x: p.x,
                    start_y: p.y,
                    end_x: target.x,
                    end_y: target.y,
                    collapsed: tree.get(p.id).map(|n| n.is_collapsed()).unwrap_or(p.collapsed),
                });
            }
            for e in previous.edges.iter().filter(|e| next.edge(e.id).is_none()) {
                edges.exit.push(EdgeTransition {
                    identity: e.id,
                    path_start: e.path,
                    path_end: EdgePath::collapsed_at(target, &self.geometry),
                });
            }
        }

        tracing::debug!(
            %trigger,
            enter = nodes.enter.len(),
            update = nodes.update.len(),
            exit = nodes.exit.len(),
            "reconciled layout"
        );

        Ok(AnimationPlan {
            trigger,
            started_at: now,
            duration: self.duration,
            nodes,
            edges,
        })
    }
}
