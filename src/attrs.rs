//! Assembly of the per-cell and per-gene attribute tables.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;

use crate::errors::{ExportError, Result};
use crate::models::{ActivityMatrix, CellAnnotations, EmbeddingMatrix, ExpressionMatrix, Regulon};

/// Attribute table indexed by cell (one entry per column of the stored
/// matrix). Activity and embedding rows are already aligned to the
/// expression matrix's cell ordering.
#[derive(Debug, Clone)]
pub struct ColumnAttributes {
    pub cell_ids: Vec<String>,
    /// Count of genes with non-zero expression, per cell.
    pub gene_counts: Vec<u64>,
    pub embedding: EmbeddingMatrix,
    pub activity: ActivityMatrix,
    /// Integer cluster index per cell, from the canonical name→index mapping.
    pub cluster_ids: Vec<i64>,
}

/// Attribute table indexed by gene (one entry per row of the stored matrix).
#[derive(Debug, Clone)]
pub struct RowAttributes {
    pub gene_names: Vec<String>,
    pub regulon_names: Vec<String>,
    /// 0/1 gene-membership indicator, shape (n_genes × n_regulons). Zero
    /// regulons yield a valid zero-width matrix.
    pub membership: Array2<u8>,
}

/// Canonical cluster encoding: distinct annotation values, sorted
/// lexicographically, enumerated from 0.
///
/// This single mapping drives both the per-cell `ClusterID` column and the
/// cluster descriptors in the file metadata, so the two always agree.
pub fn cluster_index_map(annotations: &CellAnnotations) -> BTreeMap<String, i64> {
    let names: BTreeSet<&String> = annotations.values().collect();
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), idx as i64))
        .collect()
}

/// Builds the per-cell attribute table.
pub fn assemble_column_attrs(
    expression: &ExpressionMatrix,
    activity: ActivityMatrix,
    embedding: EmbeddingMatrix,
    annotations: &CellAnnotations,
    name_to_index: &BTreeMap<String, i64>,
) -> Result<ColumnAttributes> {
    let gene_counts = expression
        .values()
        .rows()
        .into_iter()
        .map(|row| row.iter().filter(|v| **v != 0.0).count() as u64)
        .collect();

    let cluster_ids = expression
        .cell_ids()
        .iter()
        .map(|cell_id| {
            let name = annotations
                .get(cell_id)
                .ok_or_else(|| ExportError::IncompleteAnnotation(cell_id.clone()))?;
            name_to_index
                .get(name)
                .copied()
                .ok_or_else(|| ExportError::UnknownLabel(name.clone()))
        })
        .collect::<Result<Vec<i64>>>()?;

    Ok(ColumnAttributes {
        cell_ids: expression.cell_ids().to_vec(),
        gene_counts,
        embedding,
        activity,
        cluster_ids,
    })
}

/// Builds the per-gene attribute table with the regulon membership indicator.
pub fn assemble_row_attrs(expression: &ExpressionMatrix, regulons: &[Regulon]) -> RowAttributes {
    let genes = expression.gene_names();
    let mut membership = Array2::<u8>::zeros((genes.len(), regulons.len()));
    for (col, regulon) in regulons.iter().enumerate() {
        for (row, gene) in genes.iter().enumerate() {
            if regulon.contains_target(gene) {
                membership[(row, col)] = 1;
            }
        }
    }
    RowAttributes {
        gene_names: genes.to_vec(),
        regulon_names: regulons.iter().map(|r| r.name().to_string()).collect(),
        membership,
    }
}
