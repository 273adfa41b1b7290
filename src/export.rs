//! End-to-end loom export: validate, delegate, assemble, encode, write.

use std::path::Path;

use crate::attrs;
use crate::consts::{DEFAULT_EMBEDDING_NAME, DEFAULT_NOMENCLATURE};
use crate::delegates::{ActivityScorer, Binarizer, Embedder};
use crate::errors::{ExportError, Result};
use crate::loom;
use crate::metadata::{self, AnnotationDescriptor};
use crate::models::{
    ActivityMatrix, CategoryTree, CellAnnotations, EmbeddingMatrix, ExpressionMatrix, Regulon,
    ThresholdRecord,
};
use crate::validate;

/// Options controlling a loom export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Category tree for SCope's dataset browser, at most 3 levels.
    pub tree: CategoryTree,
    /// File title; defaults to the output filename without extension.
    pub title: Option<String>,
    /// Genome/nomenclature label.
    pub nomenclature: String,
    /// Worker count handed to the activity-scoring delegate. Deliberately an
    /// explicit setting, never derived from the host environment.
    pub num_workers: usize,
    /// Name of the primary embedding descriptor.
    pub embedding_name: String,
    /// Annotation descriptors for the metadata blob.
    pub annotations_metadata: Vec<AnnotationDescriptor>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            tree: CategoryTree::default(),
            title: None,
            nomenclature: DEFAULT_NOMENCLATURE.to_string(),
            num_workers: 1,
            embedding_name: DEFAULT_EMBEDDING_NAME.to_string(),
            annotations_metadata: vec![AnnotationDescriptor::placeholder()],
        }
    }
}

/// Upstream results the caller already has. Anything left `None` is computed
/// through the corresponding delegate.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedInputs {
    pub activity: Option<ActivityMatrix>,
    pub thresholds: Option<Vec<ThresholdRecord>>,
    pub embedding: Option<EmbeddingMatrix>,
}

/// Assembles and writes one SCope-compatible loom container.
///
/// The exporter itself is synchronous and single-threaded; the delegates are
/// blocking calls that may fan out internally up to
/// [`ExportOptions::num_workers`].
pub struct LoomExporter<'a> {
    scorer: &'a dyn ActivityScorer,
    binarizer: &'a dyn Binarizer,
    embedder: &'a dyn Embedder,
}

impl<'a> LoomExporter<'a> {
    pub fn new(
        scorer: &'a dyn ActivityScorer,
        binarizer: &'a dyn Binarizer,
        embedder: &'a dyn Embedder,
    ) -> Self {
        Self {
            scorer,
            binarizer,
            embedder,
        }
    }

    /// Validates all inputs, fills in missing activity/threshold/embedding
    /// results through the delegates, and writes the container to `out_path`.
    pub fn export(
        &self,
        expression: &ExpressionMatrix,
        regulons: &[Regulon],
        annotations: &CellAnnotations,
        precomputed: PrecomputedInputs,
        options: &ExportOptions,
        out_path: &Path,
    ) -> Result<()> {
        validate::validate_inputs(
            expression,
            precomputed.activity.as_ref(),
            precomputed.embedding.as_ref(),
            annotations,
        )?;

        let activity = match precomputed.activity {
            Some(activity) => activity.aligned_to(expression.cell_ids())?,
            None => self
                .scorer
                .compute_activity(expression, regulons, options.num_workers)
                .map_err(ExportError::Delegate)?
                .aligned_to(expression.cell_ids())?,
        };
        let thresholds = match precomputed.thresholds {
            Some(thresholds) => thresholds,
            None => {
                let (_, thresholds) = self
                    .binarizer
                    .compute_binarization(&activity)
                    .map_err(ExportError::Delegate)?;
                thresholds
            }
        };
        if thresholds.len() != activity.regulon_names().len() {
            return Err(ExportError::ShapeMismatch {
                what: "regulon thresholds".to_string(),
                expected: activity.regulon_names().len(),
                found: thresholds.len(),
            });
        }
        let embedding = match precomputed.embedding {
            Some(embedding) => embedding.aligned_to(expression.cell_ids())?,
            None => self
                .embedder
                .compute_embedding(&activity)
                .map_err(ExportError::Delegate)?
                .aligned_to(expression.cell_ids())?,
        };

        let name_to_index = attrs::cluster_index_map(annotations);
        let col_attrs =
            attrs::assemble_column_attrs(expression, activity, embedding, annotations, &name_to_index)?;
        let row_attrs = attrs::assemble_row_attrs(expression, regulons);

        let meta = metadata::encode_metadata(
            &name_to_index,
            regulons,
            &thresholds,
            &options.embedding_name,
            &options.annotations_metadata,
        );
        let general = metadata::encode_general_attrs(
            &meta,
            out_path,
            options.title.as_deref(),
            &options.nomenclature,
            &options.tree,
        )?;

        loom::write_loom(out_path, expression, &row_attrs, &col_attrs, &general)
    }
}
