//! Writes a loom container and reads it back through the HDF5 API to verify
//! orientation, attribute tables and the metadata schema.

use std::collections::BTreeMap;

use hdf5::types::VarLenUnicode;
use ndarray::{array, Array2};
use pretty_assertions::assert_eq;
use serde_json::Value;

use scloom::{
    ActivityMatrix, ActivityScorer, Binarizer, CategoryTree, CellAnnotations, Embedder,
    EmbeddingMatrix, ExportOptions, ExpressionMatrix, LoomExporter, PrecomputedInputs, Regulon,
    Threshold, ThresholdRecord,
};

struct UnusedScorer;

impl ActivityScorer for UnusedScorer {
    fn compute_activity(
        &self,
        _: &ExpressionMatrix,
        _: &[Regulon],
        _: usize,
    ) -> anyhow::Result<ActivityMatrix> {
        unreachable!("activity was precomputed")
    }
}

struct UnusedBinarizer;

impl Binarizer for UnusedBinarizer {
    fn compute_binarization(
        &self,
        _: &ActivityMatrix,
    ) -> anyhow::Result<(Array2<f64>, Vec<ThresholdRecord>)> {
        unreachable!("thresholds were precomputed")
    }
}

struct UnusedEmbedder;

impl Embedder for UnusedEmbedder {
    fn compute_embedding(&self, _: &ActivityMatrix) -> anyhow::Result<EmbeddingMatrix> {
        unreachable!("embedding was precomputed")
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn read_str_attr(file: &hdf5::File, key: &str) -> String {
    file.attr(key)
        .unwrap()
        .read_scalar::<VarLenUnicode>()
        .unwrap()
        .to_string()
}

#[test]
fn loom_round_trip_preserves_values_and_orientation() {
    let expression = ExpressionMatrix::new(
        array![[1.0, 5.0, 0.0], [0.0, 2.0, 0.0]],
        labels(&["c1", "c2"]),
        labels(&["g1", "g2", "g3"]),
    )
    .unwrap();
    let regulons = [Regulon::new(
        "TF1",
        BTreeMap::from([("g1".to_string(), 0.9), ("g2".to_string(), 0.4)]),
    )
    .unwrap()
    .with_context(["activating", "TF1_logo.png"])];
    let annotations: CellAnnotations = [("c1", "A"), ("c2", "B")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // Activity and embedding arrive in reversed cell order; the exporter
    // must reconcile them by label.
    let precomputed = PrecomputedInputs {
        activity: Some(
            ActivityMatrix::new(array![[0.8], [0.3]], labels(&["c2", "c1"]), labels(&["TF1"]))
                .unwrap(),
        ),
        thresholds: Some(vec![ThresholdRecord::new(
            "TF1",
            Threshold::ScalarWithExtra(0.17, Value::String("extra".into())),
        )]),
        embedding: Some(
            EmbeddingMatrix::new(array![[3.0, 4.0], [1.0, 2.0]], labels(&["c2", "c1"])).unwrap(),
        ),
    };
    let options = ExportOptions {
        tree: CategoryTree::new(["Brain"]).unwrap(),
        nomenclature: "hg38".to_string(),
        ..ExportOptions::default()
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pbmc_small.loom");
    let exporter = LoomExporter::new(&UnusedScorer, &UnusedBinarizer, &UnusedEmbedder);
    exporter
        .export(&expression, &regulons, &annotations, precomputed, &options, &path)
        .unwrap();

    let file = hdf5::File::open(&path).unwrap();

    // Primary matrix is stored genes × cells.
    let matrix = file.dataset("matrix").unwrap().read_2d::<f64>().unwrap();
    assert_eq!(matrix, array![[1.0, 0.0], [5.0, 2.0], [0.0, 0.0]]);

    // Row attributes, keyed by gene.
    let row_attrs = file.group("row_attrs").unwrap();
    let genes: Vec<String> = row_attrs
        .dataset("Gene")
        .unwrap()
        .read_1d::<VarLenUnicode>()
        .unwrap()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(genes, labels(&["g1", "g2", "g3"]));
    let membership = row_attrs
        .group("Regulons")
        .unwrap()
        .dataset("TF1")
        .unwrap()
        .read_1d::<u8>()
        .unwrap();
    assert_eq!(membership.to_vec(), vec![1, 1, 0]);

    // Column attributes, keyed by cell, in expression order.
    let col_attrs = file.group("col_attrs").unwrap();
    let cells: Vec<String> = col_attrs
        .dataset("CellID")
        .unwrap()
        .read_1d::<VarLenUnicode>()
        .unwrap()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(cells, labels(&["c1", "c2"]));
    let n_gene = col_attrs.dataset("nGene").unwrap().read_1d::<u64>().unwrap();
    assert_eq!(n_gene.to_vec(), vec![2, 1]);
    let cluster_ids = col_attrs
        .dataset("ClusterID")
        .unwrap()
        .read_1d::<i64>()
        .unwrap();
    assert_eq!(cluster_ids.to_vec(), vec![0, 1]);
    let auc = col_attrs
        .group("RegulonsAUC")
        .unwrap()
        .dataset("TF1")
        .unwrap()
        .read_1d::<f64>()
        .unwrap();
    assert_eq!(auc.to_vec(), vec![0.3, 0.8]);
    let embedding = col_attrs.group("Embedding").unwrap();
    let x = embedding.dataset("_X").unwrap().read_1d::<f64>().unwrap();
    let y = embedding.dataset("_Y").unwrap().read_1d::<f64>().unwrap();
    assert_eq!(x.to_vec(), vec![1.0, 3.0]);
    assert_eq!(y.to_vec(), vec![2.0, 4.0]);
    let clustering = col_attrs
        .group("Clusterings")
        .unwrap()
        .dataset("0")
        .unwrap()
        .read_1d::<i64>()
        .unwrap();
    assert_eq!(clustering.to_vec(), vec![0, 1]);

    // File attributes.
    assert_eq!(read_str_attr(&file, "title"), "pbmc_small");
    assert_eq!(read_str_attr(&file, "Genome"), "hg38");
    assert_eq!(read_str_attr(&file, "SCopeTreeL1"), "Brain");
    assert_eq!(read_str_attr(&file, "SCopeTreeL2"), "");
    assert_eq!(read_str_attr(&file, "SCopeTreeL3"), "");

    let metadata: Value = serde_json::from_str(&read_str_attr(&file, "MetaData")).unwrap();
    assert_eq!(metadata["embeddings"][0]["name"], "tSNE (default)");
    assert_eq!(metadata["clusterings"][0]["clusters"][0]["description"], "A");
    let threshold = &metadata["regulonThresholds"][0];
    assert_eq!(threshold["regulon"], "TF1");
    assert_eq!(threshold["defaultThresholdValue"], 0.17);
    assert_eq!(threshold["motifData"], "TF1_logo.png");
}

struct FixedScorer(ActivityMatrix);

impl ActivityScorer for FixedScorer {
    fn compute_activity(
        &self,
        _: &ExpressionMatrix,
        _: &[Regulon],
        _: usize,
    ) -> anyhow::Result<ActivityMatrix> {
        Ok(self.0.clone())
    }
}

struct FixedBinarizer(Vec<ThresholdRecord>);

impl Binarizer for FixedBinarizer {
    fn compute_binarization(
        &self,
        activity: &ActivityMatrix,
    ) -> anyhow::Result<(Array2<f64>, Vec<ThresholdRecord>)> {
        Ok((Array2::zeros(activity.values().dim()), self.0.clone()))
    }
}

struct FixedEmbedder(EmbeddingMatrix);

impl Embedder for FixedEmbedder {
    fn compute_embedding(&self, _: &ActivityMatrix) -> anyhow::Result<EmbeddingMatrix> {
        Ok(self.0.clone())
    }
}

#[test]
fn missing_inputs_are_computed_through_delegates() {
    let expression = ExpressionMatrix::new(
        array![[1.0, 0.0], [2.0, 3.0]],
        labels(&["c1", "c2"]),
        labels(&["g1", "g2"]),
    )
    .unwrap();
    let regulons = [Regulon::new("TF1", BTreeMap::from([("g1".to_string(), 1.0)])).unwrap()];
    let annotations: CellAnnotations = [("c1", "A"), ("c2", "A")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let scorer = FixedScorer(
        ActivityMatrix::new(array![[0.5], [0.6]], labels(&["c1", "c2"]), labels(&["TF1"]))
            .unwrap(),
    );
    let binarizer = FixedBinarizer(vec![ThresholdRecord::new("TF1", Threshold::Scalar(0.55))]);
    let embedder = FixedEmbedder(
        EmbeddingMatrix::new(array![[0.0, 1.0], [2.0, 3.0]], labels(&["c1", "c2"])).unwrap(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("delegated.loom");
    let exporter = LoomExporter::new(&scorer, &binarizer, &embedder);
    exporter
        .export(
            &expression,
            &regulons,
            &annotations,
            PrecomputedInputs::default(),
            &ExportOptions::default(),
            &path,
        )
        .unwrap();

    let file = hdf5::File::open(&path).unwrap();
    let auc = file
        .group("col_attrs")
        .unwrap()
        .group("RegulonsAUC")
        .unwrap()
        .dataset("TF1")
        .unwrap()
        .read_1d::<f64>()
        .unwrap();
    assert_eq!(auc.to_vec(), vec![0.5, 0.6]);

    let metadata: Value =
        serde_json::from_str(&read_str_attr(&file, "MetaData")).unwrap();
    assert_eq!(
        metadata["regulonThresholds"][0]["defaultThresholdValue"],
        0.55
    );
}
