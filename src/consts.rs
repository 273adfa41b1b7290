//! Compatibility-critical constants for the SCope loom schema.

/// Algorithm label recorded for every regulon threshold. SCope matches this
/// string verbatim, so the historical spelling is kept as-is.
pub const DEFAULT_THRESHOLD_NAME: &str = "guassian_mixture_split";

/// Name of the primary embedding descriptor in the loom metadata.
pub const DEFAULT_EMBEDDING_NAME: &str = "tSNE (default)";

/// Genome/nomenclature label used when the caller supplies none.
pub const DEFAULT_NOMENCLATURE: &str = "Unknown";

/// Group identifier of the single clustering entry.
pub const CLUSTERING_GROUP: &str = "celltype";

/// Display name of the single clustering entry.
pub const CLUSTERING_NAME: &str = "Cell Type";

/// File suffixes that mark a context tag as a motif logo reference.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".svg"];

/// Fixed depth of the SCope category tree; shorter trees are padded with
/// empty strings, deeper trees are rejected.
pub const SCOPE_TREE_DEPTH: usize = 3;

/// Context tag that marks a regulon as activating its targets.
pub const ACTIVATING_TAG: &str = "activating";
