#![forbid(unsafe_code)]

//! Collapsible tree model (headless).
//!
//! Design goals:
//! - stable node identities that survive any number of collapse/expand cycles
//! - a single owner for every node (the [`Tree`] arena), parent links are non-owning
//! - deterministic, testable loading from the JSON hierarchy shape `{ "name", "children" }`

pub mod config;
pub mod error;
pub mod geom;
pub mod source;
pub mod tree;

pub use config::{ArborConfig, default_config};
pub use error::{Error, Result};
pub use tree::{
    Branch, IdAllocator, Node, NodeId, ToggleOutcome, Tree, VisibleDescendants, load,
};
