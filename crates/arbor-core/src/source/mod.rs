//! Conversions from other source formats into a [`crate::Tree`].

pub mod edge_list;
