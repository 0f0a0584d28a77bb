use crate::tree::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source data does not have the `{ "name": string, "children": [...] }` shape.
    #[error("Malformed tree data at {path}: {message}")]
    MalformedData { path: String, message: String },

    /// Traversal exceeded its depth or visit bound (cyclic parentage or runaway input).
    #[error("Layout overflow: {message}")]
    LayoutOverflow { message: String },

    #[error("Unknown node identity: {id}")]
    UnknownNode { id: NodeId },

    #[error("Invalid tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedData {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn overflow(message: impl Into<String>) -> Self {
        Self::LayoutOverflow {
            message: message.into(),
        }
    }

    /// Fatal for the initial render (as opposed to aborting a single layout cycle).
    pub fn is_malformed_data(&self) -> bool {
        matches!(self, Self::MalformedData { .. } | Self::Json(_))
    }
}
