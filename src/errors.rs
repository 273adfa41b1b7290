use thiserror::Error;

/// Error type for scloom export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Row/column count disagreement between the primary matrix and an
    /// attribute table. Raised before any bytes are written.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// A cell in the expression matrix has no annotation.
    #[error("cell '{0}' has no annotation")]
    IncompleteAnnotation(String),

    /// The category tree is deeper than the fixed SCope depth of 3.
    #[error("category tree has {0} levels; at most 3 are supported")]
    TreeDepthExceeded(usize),

    /// A matrix was constructed with a repeated row or column label.
    #[error("duplicate label: '{0}'")]
    DuplicateLabel(String),

    /// A supplied matrix carries a cell label unknown to the expression
    /// matrix, or is missing one of its labels.
    #[error("label '{0}' cannot be reconciled with the expression matrix")]
    UnknownLabel(String),

    /// A regulon was constructed without a name or without targets.
    #[error("invalid regulon '{0}': name and target set must be non-empty")]
    EmptyRegulon(String),

    /// An external activity/embedding/binarization call failed. Propagated
    /// unchanged, never retried.
    #[error("delegate computation failed: {0}")]
    Delegate(#[source] anyhow::Error),

    /// Failure in the underlying HDF5 container.
    #[error("container error: {0}")]
    Container(#[from] hdf5::Error),

    /// Failure while serializing the GraphML document.
    #[error("graph serialization error: {0}")]
    Graph(#[from] quick_xml::Error),

    /// Failure while encoding the MetaData JSON blob.
    #[error("metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for scloom operations.
pub type Result<T> = std::result::Result<T, ExportError>;
