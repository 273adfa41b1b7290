//! # scloom: single-cell regulatory network export
//!
//! Packages the outputs of a single-cell regulatory-network analysis — an
//! expression matrix, regulons with per-target weights, per-cell annotations,
//! activity (AUC) scores, a 2-D embedding and cluster assignments — into:
//!
//! - a SCope-compatible **loom** (HDF5) container with the primary matrix
//!   stored genes × cells, structured row/column attribute tables and the
//!   nested `MetaData` JSON blob, and
//! - a **GraphML** file describing the directed, weighted regulon wiring.
//!
//! The analysis algorithms themselves (AUCell scoring, binarization,
//! embedding) live elsewhere and are reached through the narrow traits in
//! [`delegates`]; this crate validates their outputs for mutual consistency
//! and handles all encoding.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scloom::{ExportOptions, LoomExporter, PrecomputedInputs};
//!
//! let exporter = LoomExporter::new(&scorer, &binarizer, &embedder);
//! exporter.export(
//!     &expression,
//!     &regulons,
//!     &annotations,
//!     PrecomputedInputs::default(),
//!     &ExportOptions::default(),
//!     "pbmc10k.loom".as_ref(),
//! )?;
//!
//! // The graph export is independent of the loom pipeline.
//! scloom::export_regulons(&regulons, "regulons.graphml".as_ref())?;
//! ```
//!
//! ## Module Structure
//!
//! - [`models`] - Input entities (matrices, regulons, thresholds, tree)
//! - [`delegates`] - Contracts for the external scoring/embedding calls
//! - [`validate`] - Cross-input shape validation
//! - [`attrs`] - Per-cell and per-gene attribute assembly
//! - [`metadata`] - The SCope `MetaData` schema and file attributes
//! - [`loom`] - The HDF5 container writer
//! - [`graph`] - Regulatory graph construction and GraphML output
//! - [`export`] - End-to-end orchestration

pub mod attrs;
pub mod consts;
pub mod delegates;
pub mod errors;
pub mod export;
pub mod graph;
pub mod loom;
pub mod metadata;
pub mod models;
pub mod validate;

// Re-export commonly used types
pub use attrs::{ColumnAttributes, RowAttributes};
pub use delegates::{ActivityScorer, Binarizer, Embedder};
pub use errors::{ExportError, Result};
pub use export::{ExportOptions, LoomExporter, PrecomputedInputs};
pub use graph::{build_regulatory_graph, export_regulons, RegulatoryGraph};
pub use metadata::{AnnotationDescriptor, LoomMetadata};
pub use models::{
    ActivityMatrix, CategoryTree, CellAnnotations, EmbeddingMatrix, ExpressionMatrix, Regulon,
    Threshold, ThresholdRecord,
};
