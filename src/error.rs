use thiserror::Error;

/// Reasons a clustering run halts before producing a view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Required coordinate columns are missing or not numeric
    #[error("Schema error: {0}")]
    Schema(String),

    /// The feature selection violates the selection mode
    #[error("Invalid feature selection: {0}")]
    Selection(String),

    /// Not enough distinct or complete rows for the requested number of clusters
    #[error("Cannot form clusters: {0}")]
    DegenerateCluster(String),

    /// The number of clusters is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// The clustering backend rejected the input
    #[error("Clustering failed: {0}")]
    Clustering(String),
}
