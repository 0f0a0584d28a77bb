//! The load/click pipeline.

use crate::Result;
use crate::layout::LayoutEngine;
use crate::model::LayoutResult;
use crate::reconcile::{AdvanceReport, AnimationPlan, ReconciliationAnimator};
use crate::settings::Settings;
use crate::text::TextMeasurer;
use arbor_core::geom::point;
use arbor_core::source::edge_list::{EdgeList, ExpandOptions};
use arbor_core::tree::LoadOptions;
use arbor_core::{ArborConfig, NodeId, ToggleOutcome, Tree};
use std::sync::Arc;

/// Owns the tree and the last committed layout.
///
/// Every cycle runs to completion before returning. A failed cycle leaves the tree, the committed
/// layout and the visual states as they were.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    engine: LayoutEngine,
    animator: ReconciliationAnimator,
    current: Option<LayoutResult>,
}

impl Session {
    pub fn new(mut tree: Tree, settings: Settings) -> Self {
        tree.set_anchor(settings.anchor);
        let engine = LayoutEngine::new(settings);
        let animator =
            ReconciliationAnimator::new(engine.settings().duration, engine.edge_geometry());
        Self {
            tree,
            engine,
            animator,
            current: None,
        }
    }

    /// Loads the `{ "name", "children" }` hierarchy.
    pub fn from_json_str(text: &str, config: &ArborConfig) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(text).map_err(arbor_core::Error::from)?;
        let tree = arbor_core::tree::load_with(&raw, &LoadOptions::from_config(config))?;
        Ok(Self::new(tree, Settings::from_config(config)))
    }

    /// Loads `parent --> child` lines.
    pub fn from_edge_list(text: &str, config: &ArborConfig) -> Result<Self> {
        let tree = EdgeList::parse(text)?.to_tree(&ExpandOptions::from_config(config))?;
        Ok(Self::new(tree, Settings::from_config(config)))
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.engine = self.engine.with_text_measurer(measurer);
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Collapses everything at or below `depth` before the first render.
    pub fn collapse_below(&mut self, depth: usize) -> usize {
        self.tree.collapse_below(depth)
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub fn animator(&self) -> &ReconciliationAnimator {
        &self.animator
    }

    pub fn current_layout(&self) -> Option<&LayoutResult> {
        self.current.as_ref()
    }

    /// First render: everything grows out of the configured anchor.
    pub fn render_initial(&mut self, now: f64) -> Result<AnimationPlan> {
        let root = self.tree.root();
        self.run_cycle(root, now)
    }

    /// Toggles `id` and re-renders around it.
    ///
    /// Clicks during a running transition are fine; the new plan starts from the positions the
    /// last plan was heading to. On failure the toggle is undone.
    pub fn click(&mut self, id: NodeId, now: f64) -> Result<AnimationPlan> {
        let outcome = self.tree.toggle(id)?;
        tracing::debug!(%id, ?outcome, "toggled node");

        let trigger = match self.tree.nearest_visible_ancestor(id) {
            Some(visible) if visible != id => {
                tracing::warn!(
                    %id,
                    anchor = %visible,
                    "clicked node is hidden, anchoring at its visible ancestor"
                );
                visible
            }
            Some(_) => id,
            None => self.tree.root(),
        };

        match self.run_cycle(trigger, now) {
            Ok(plan) => Ok(plan),
            Err(err) => {
                if outcome != ToggleOutcome::Unchanged {
                    tracing::warn!(%id, error = %err, "layout cycle failed, reverting toggle");
                    self.tree.toggle(id)?;
                }
                Err(err)
            }
        }
    }

    pub fn advance(&mut self, now: f64) -> AdvanceReport {
        self.animator.advance(now)
    }

    fn run_cycle(&mut self, trigger: NodeId, now: f64) -> Result<AnimationPlan> {
        let measured = self.engine.measure(&mut self.tree);
        let root = self.tree.root();
        let next = match self.engine.compute(&self.tree, root) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(%trigger, error = %err, "layout cycle aborted");
                return Err(err);
            }
        };
        let plan = self
            .animator
            .reconcile(&self.tree, self.current.as_ref(), &next, trigger, now)?;

        for n in &next.nodes {
            self.tree.set_layout(n.id, n.depth, point(n.x, n.y))?;
            self.tree.settle(n.id)?;
        }

        tracing::debug!(
            %trigger,
            measured,
            visible = next.nodes.len(),
            edges = next.edges.len(),
            "layout cycle committed"
        );
        self.current = Some(next);
        Ok(plan)
    }
}
