//! Pre-encoding consistency checks across independently produced inputs.

use std::collections::HashSet;

use crate::errors::{ExportError, Result};
use crate::models::{ActivityMatrix, CellAnnotations, EmbeddingMatrix, ExpressionMatrix};

/// Checks that `actual` carries exactly the expression matrix's cell IDs.
/// Ordering may differ; it is reconciled later by label.
fn check_cell_labels(what: &str, expected: &[String], actual: &[String]) -> Result<()> {
    if expected.len() != actual.len() {
        return Err(ExportError::ShapeMismatch {
            what: what.to_string(),
            expected: expected.len(),
            found: actual.len(),
        });
    }
    let known: HashSet<&str> = expected.iter().map(String::as_str).collect();
    for label in actual {
        if !known.contains(label.as_str()) {
            return Err(ExportError::UnknownLabel(label.clone()));
        }
    }
    Ok(())
}

/// Validates dimensional consistency between the expression matrix and any
/// supplied activity matrix, embedding and the cell annotations.
///
/// Pure check: signals failure, mutates nothing, writes nothing. Absent
/// activity/embedding inputs are not checked here; they are computed through
/// the delegate traits after validation.
pub fn validate_inputs(
    expression: &ExpressionMatrix,
    activity: Option<&ActivityMatrix>,
    embedding: Option<&EmbeddingMatrix>,
    annotations: &CellAnnotations,
) -> Result<()> {
    if let Some(activity) = activity {
        check_cell_labels("activity matrix cells", expression.cell_ids(), activity.cell_ids())?;
    }
    if let Some(embedding) = embedding {
        check_cell_labels("embedding cells", expression.cell_ids(), embedding.cell_ids())?;
    }
    for cell_id in expression.cell_ids() {
        if !annotations.contains_key(cell_id) {
            return Err(ExportError::IncompleteAnnotation(cell_id.clone()));
        }
    }
    Ok(())
}
