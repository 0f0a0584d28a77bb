#![forbid(unsafe_code)]

//! Headless layout and transition planning for collapsible trees.
//!
//! One cycle is: measure labels (once per node), lay out the visible nodes, diff the new layout
//! against the last one by node identity and emit an [`AnimationPlan`] for the drawing layer.
//! [`Session`] runs that cycle for the initial load and for every click.

pub mod layout;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod settings;
pub mod text;

pub use layout::LayoutEngine;
pub use model::{Bounds, EdgePath, LayoutEdge, LayoutNode, LayoutPoint, LayoutResult};
pub use reconcile::{
    AdvanceReport, AnimationPlan, EdgeTransition, NodeTransition, Partition,
    ReconciliationAnimator, VisualState,
};
pub use session::Session;
pub use settings::Settings;

use arbor_core::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] arbor_core::Error),
    /// Traversal exceeded its visit or depth bound; the cycle is aborted.
    #[error("layout overflow: {message}")]
    LayoutOverflow { message: String },
    #[error("node {id} is not part of the layout")]
    NotInLayout { id: NodeId },
    #[error("plan JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_layout_overflow(&self) -> bool {
        matches!(
            self,
            Self::LayoutOverflow { .. } | Self::Core(arbor_core::Error::LayoutOverflow { .. })
        )
    }

    pub fn is_malformed_data(&self) -> bool {
        matches!(self, Self::Core(err) if err.is_malformed_data())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
