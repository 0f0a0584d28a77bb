#![forbid(unsafe_code)]

//! `arbor` computes collapsible tree diagrams without drawing them.
//!
//! The tree model, loaders and configuration live in `arbor-core` and are re-exported at the
//! root. Layout and transition planning are behind a feature.
//!
//! # Features
//!
//! - `render`: enable tidy layout and enter/update/exit animation plans (`arbor::render`)

pub use arbor_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use arbor_render::model::{Bounds, EdgePath, LayoutEdge, LayoutNode, LayoutResult};
    pub use arbor_render::text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
    pub use arbor_render::{
        AdvanceReport, AnimationPlan, EdgeTransition, LayoutEngine, NodeTransition, Partition,
        ReconciliationAnimator, Session, Settings, VisualState,
    };

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Load(#[from] arbor_core::Error),
        #[error(transparent)]
        Render(#[from] arbor_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Lays out a `{ "name", "children" }` document in one call, with every node expanded.
    pub fn layout_json(text: &str, config: &arbor_core::ArborConfig) -> Result<LayoutResult> {
        let raw: serde_json::Value =
            serde_json::from_str(text).map_err(arbor_core::Error::from)?;
        let limits = arbor_core::tree::LoadOptions::from_config(config);
        let mut tree = arbor_core::tree::load_with(&raw, &limits)?;
        let engine = LayoutEngine::new(Settings::from_config(config));
        engine.measure(&mut tree);
        let root = tree.root();
        Ok(engine.compute(&tree, root)?)
    }
}
