use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use ndarray::{Array2, Axis};
use serde_json::Value;

use crate::consts::{ACTIVATING_TAG, IMAGE_EXTENSIONS, SCOPE_TREE_DEPTH};
use crate::errors::{ExportError, Result};

/// Maps a cell ID to its cell-type annotation.
pub type CellAnnotations = HashMap<String, String>;

fn check_unique(what: &str, labels: &[String]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(ExportError::DuplicateLabel(format!("{what} '{label}'")));
        }
    }
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

/// Row indices that reorder `actual` labels into `expected` order.
///
/// Fails when the two label sets differ; ordering differences are fine.
fn reconcile_labels(expected: &[String], actual: &[String]) -> Result<Vec<usize>> {
    check_len("cell labels", expected.len(), actual.len())?;
    let positions: HashMap<&str, usize> = actual
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();
    expected
        .iter()
        .map(|label| {
            positions
                .get(label.as_str())
                .copied()
                .ok_or_else(|| ExportError::UnknownLabel(label.clone()))
        })
        .collect()
}

// ============================================================================
// Expression Matrix
// ============================================================================

/// A cells × genes expression matrix with unique row and column labels.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    values: Array2<f64>,
    cell_ids: Vec<String>,
    gene_names: Vec<String>,
}

impl ExpressionMatrix {
    pub fn new(
        values: Array2<f64>,
        cell_ids: Vec<String>,
        gene_names: Vec<String>,
    ) -> Result<Self> {
        check_len("expression matrix rows", cell_ids.len(), values.nrows())?;
        check_len("expression matrix columns", gene_names.len(), values.ncols())?;
        check_unique("cell", &cell_ids)?;
        check_unique("gene", &gene_names)?;
        Ok(Self {
            values,
            cell_ids,
            gene_names,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_genes(&self) -> usize {
        self.values.ncols()
    }

    pub fn cell_ids(&self) -> &[String] {
        &self.cell_ids
    }

    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

// ============================================================================
// Activity Matrix
// ============================================================================

/// A cells × regulons activity (AUC) score matrix.
#[derive(Debug, Clone)]
pub struct ActivityMatrix {
    values: Array2<f64>,
    cell_ids: Vec<String>,
    regulon_names: Vec<String>,
}

impl ActivityMatrix {
    pub fn new(
        values: Array2<f64>,
        cell_ids: Vec<String>,
        regulon_names: Vec<String>,
    ) -> Result<Self> {
        check_len("activity matrix rows", cell_ids.len(), values.nrows())?;
        check_len("activity matrix columns", regulon_names.len(), values.ncols())?;
        check_unique("cell", &cell_ids)?;
        check_unique("regulon", &regulon_names)?;
        Ok(Self {
            values,
            cell_ids,
            regulon_names,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.values.nrows()
    }

    pub fn cell_ids(&self) -> &[String] {
        &self.cell_ids
    }

    pub fn regulon_names(&self) -> &[String] {
        &self.regulon_names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Reorders rows so that cell IDs match `cell_ids` exactly.
    pub fn aligned_to(&self, cell_ids: &[String]) -> Result<Self> {
        if self.cell_ids == cell_ids {
            return Ok(self.clone());
        }
        let order = reconcile_labels(cell_ids, &self.cell_ids)?;
        Ok(Self {
            values: self.values.select(Axis(0), &order),
            cell_ids: cell_ids.to_vec(),
            regulon_names: self.regulon_names.clone(),
        })
    }
}

// ============================================================================
// Embedding Matrix
// ============================================================================

/// A 2-D projection with one (x, y) coordinate pair per cell.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    coords: Array2<f64>,
    cell_ids: Vec<String>,
}

impl EmbeddingMatrix {
    pub fn new(coords: Array2<f64>, cell_ids: Vec<String>) -> Result<Self> {
        check_len("embedding rows", cell_ids.len(), coords.nrows())?;
        check_len("embedding columns", 2, coords.ncols())?;
        check_unique("cell", &cell_ids)?;
        Ok(Self { coords, cell_ids })
    }

    pub fn cell_ids(&self) -> &[String] {
        &self.cell_ids
    }

    pub fn coords(&self) -> &Array2<f64> {
        &self.coords
    }

    /// Reorders rows so that cell IDs match `cell_ids` exactly.
    pub fn aligned_to(&self, cell_ids: &[String]) -> Result<Self> {
        if self.cell_ids == cell_ids {
            return Ok(self.clone());
        }
        let order = reconcile_labels(cell_ids, &self.cell_ids)?;
        Ok(Self {
            coords: self.coords.select(Axis(0), &order),
            cell_ids: cell_ids.to_vec(),
        })
    }
}

// ============================================================================
// Regulon
// ============================================================================

/// A transcription factor together with its weighted target genes and a set
/// of free-form context tags (activation sign, provenance, logo reference).
#[derive(Debug, Clone)]
pub struct Regulon {
    name: String,
    targets: BTreeMap<String, f64>,
    context: BTreeSet<String>,
}

impl Regulon {
    pub fn new(name: impl Into<String>, targets: BTreeMap<String, f64>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || targets.is_empty() {
            return Err(ExportError::EmptyRegulon(name));
        }
        Ok(Self {
            name,
            targets,
            context: BTreeSet::new(),
        })
    }

    pub fn with_context<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The transcription factor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &BTreeMap<String, f64> {
        &self.targets
    }

    pub fn context(&self) -> &BTreeSet<String> {
        &self.context
    }

    pub fn contains_target(&self, gene: &str) -> bool {
        self.targets.contains_key(gene)
    }

    /// A regulon is either activating or inhibiting as a whole, decided by
    /// the presence of the `activating` context tag.
    pub fn is_activating(&self) -> bool {
        self.context.contains(ACTIVATING_TAG)
    }

    /// First context tag that references a motif logo image, if any.
    pub fn logo(&self) -> Option<&str> {
        self.context
            .iter()
            .map(String::as_str)
            .find(|tag| IMAGE_EXTENSIONS.iter().any(|ext| tag.ends_with(ext)))
    }
}

// ============================================================================
// Threshold
// ============================================================================

/// Decision boundary for binarizing one regulon's activity scores.
///
/// Upstream binarization emits either a plain scalar or a tuple whose first
/// element is the scalar; both resolve through [`Threshold::value`].
#[derive(Debug, Clone)]
pub enum Threshold {
    Scalar(f64),
    ScalarWithExtra(f64, Value),
}

impl Threshold {
    pub fn value(&self) -> f64 {
        match self {
            Threshold::Scalar(v) => *v,
            Threshold::ScalarWithExtra(v, _) => *v,
        }
    }
}

/// A binarization threshold for one regulon.
#[derive(Debug, Clone)]
pub struct ThresholdRecord {
    pub regulon: String,
    pub threshold: Threshold,
}

impl ThresholdRecord {
    pub fn new(regulon: impl Into<String>, threshold: Threshold) -> Self {
        Self {
            regulon: regulon.into(),
            threshold,
        }
    }
}

// ============================================================================
// Category Tree
// ============================================================================

/// Hierarchical grouping label for the whole dataset, at most 3 levels deep.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    levels: Vec<String>,
}

impl CategoryTree {
    pub fn new<I, S>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        if levels.len() > SCOPE_TREE_DEPTH {
            return Err(ExportError::TreeDepthExceeded(levels.len()));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// The tree right-padded with empty strings to exactly 3 levels.
    pub fn padded(&self) -> [String; 3] {
        let mut out: [String; 3] = Default::default();
        for (slot, level) in out.iter_mut().zip(&self.levels) {
            *slot = level.clone();
        }
        out
    }
}
