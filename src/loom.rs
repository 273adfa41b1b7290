//! Writer for the SCope-compatible loom (HDF5) container.
//!
//! The primary matrix is stored genes × cells, transposed from the
//! analysis-time cells × genes orientation: the downstream viewer reads
//! reference data gene-wise and the columnar layout only allows selective
//! access along that axis. Structured attribute tables are stored as one
//! dataset per column inside a named group.

use std::path::Path;
use std::str::FromStr;

use hdf5::types::VarLenUnicode;
use hdf5::File;
use ndarray::aview1;

use crate::attrs::{ColumnAttributes, RowAttributes};
use crate::errors::{ExportError, Result};
use crate::metadata::GeneralAttributes;
use crate::models::ExpressionMatrix;

fn varlen(s: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(s)
        .map_err(|e| ExportError::Container(hdf5::Error::from(e.to_string())))
}

fn varlen_array(values: &[String]) -> Result<Vec<VarLenUnicode>> {
    values.iter().map(|s| varlen(s)).collect()
}

fn write_str_attr(location: &hdf5::Location, key: &str, value: &str) -> Result<()> {
    let value = varlen(value)?;
    location
        .new_attr::<VarLenUnicode>()
        .create(key)?
        .write_scalar(&value)?;
    Ok(())
}

fn check_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ExportError::ShapeMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Verifies that every attribute table agrees with the primary matrix
/// dimensions. Runs in full before the container is opened for writing.
fn check_shapes(
    expression: &ExpressionMatrix,
    row_attrs: &RowAttributes,
    col_attrs: &ColumnAttributes,
) -> Result<()> {
    let n_cells = expression.n_cells();
    let n_genes = expression.n_genes();

    check_len("row attribute genes", n_genes, row_attrs.gene_names.len())?;
    check_len("membership rows", n_genes, row_attrs.membership.nrows())?;
    check_len(
        "membership columns",
        row_attrs.regulon_names.len(),
        row_attrs.membership.ncols(),
    )?;

    check_len("column attribute cells", n_cells, col_attrs.cell_ids.len())?;
    check_len("gene counts", n_cells, col_attrs.gene_counts.len())?;
    check_len("cluster ids", n_cells, col_attrs.cluster_ids.len())?;
    check_len("activity rows", n_cells, col_attrs.activity.n_cells())?;
    check_len("embedding rows", n_cells, col_attrs.embedding.coords().nrows())?;
    Ok(())
}

/// Writes the primary matrix, both attribute tables and the file metadata
/// into one loom container at `path`.
///
/// All shape checks run before the file is created; a failure during writing
/// removes the partial file, so `path` is either complete or absent.
pub fn write_loom(
    path: &Path,
    expression: &ExpressionMatrix,
    row_attrs: &RowAttributes,
    col_attrs: &ColumnAttributes,
    general: &GeneralAttributes,
) -> Result<()> {
    check_shapes(expression, row_attrs, col_attrs)?;

    let file = File::create(path)?;
    let result = write_contents(&file, expression, row_attrs, col_attrs, general);
    drop(file);
    if result.is_err() {
        let _ = std::fs::remove_file(path);
    }
    result
}

fn write_contents(
    file: &File,
    expression: &ExpressionMatrix,
    row_attrs: &RowAttributes,
    col_attrs: &ColumnAttributes,
    general: &GeneralAttributes,
) -> Result<()> {
    // Genes become the outer (row) axis on disk.
    let matrix = expression.values().t().as_standard_layout().into_owned();
    file.new_dataset_builder().with_data(&matrix).create("matrix")?;

    let row_group = file.create_group("row_attrs")?;
    let gene_names = varlen_array(&row_attrs.gene_names)?;
    row_group
        .new_dataset_builder()
        .with_data(aview1(&gene_names))
        .create("Gene")?;
    let regulons = row_group.create_group("Regulons")?;
    for (idx, name) in row_attrs.regulon_names.iter().enumerate() {
        let column = row_attrs.membership.column(idx).to_owned();
        regulons
            .new_dataset_builder()
            .with_data(&column)
            .create(name.as_str())?;
    }

    let col_group = file.create_group("col_attrs")?;
    let cell_ids = varlen_array(&col_attrs.cell_ids)?;
    col_group
        .new_dataset_builder()
        .with_data(aview1(&cell_ids))
        .create("CellID")?;
    col_group
        .new_dataset_builder()
        .with_data(aview1(&col_attrs.gene_counts))
        .create("nGene")?;

    let embedding = col_group.create_group("Embedding")?;
    let coords = col_attrs.embedding.coords();
    embedding
        .new_dataset_builder()
        .with_data(&coords.column(0).to_owned())
        .create("_X")?;
    embedding
        .new_dataset_builder()
        .with_data(&coords.column(1).to_owned())
        .create("_Y")?;

    let auc = col_group.create_group("RegulonsAUC")?;
    for (idx, name) in col_attrs.activity.regulon_names().iter().enumerate() {
        let column = col_attrs.activity.values().column(idx).to_owned();
        auc.new_dataset_builder()
            .with_data(&column)
            .create(name.as_str())?;
    }

    let clusterings = col_group.create_group("Clusterings")?;
    clusterings
        .new_dataset_builder()
        .with_data(aview1(&col_attrs.cluster_ids))
        .create("0")?;
    col_group
        .new_dataset_builder()
        .with_data(aview1(&col_attrs.cluster_ids))
        .create("ClusterID")?;

    write_str_attr(file, "title", &general.title)?;
    write_str_attr(file, "Genome", &general.genome)?;
    write_str_attr(file, "MetaData", &general.metadata_json)?;
    for (level, value) in general.tree.iter().enumerate() {
        write_str_attr(file, &format!("SCopeTreeL{}", level + 1), value)?;
    }
    Ok(())
}
