use thiserror::Error;

/// Failures of the persistence port.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// A stored item is present but structurally unusable.
    #[error("malformed record {id}: {reason}")]
    Malformed { id: String, reason: String },

    /// Backing table-store call failed.
    #[error("{0}")]
    Service(String),
}
