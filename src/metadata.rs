//! Encoding of the nested SCope metadata object and the file-level
//! attributes.
//!
//! The `MetaData` blob is a versioned schema with fixed top-level keys
//! (`embeddings`, `annotations`, `clusterings`, `regulonThresholds`), not a
//! freeform dictionary; it is modelled as serde structs so the contract is
//! testable independent of the container.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::consts::{
    CLUSTERING_GROUP, CLUSTERING_NAME, DEFAULT_THRESHOLD_NAME,
};
use crate::errors::Result;
use crate::models::{CategoryTree, Regulon, ThresholdRecord};

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingDescriptor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationDescriptor {
    pub name: String,
    pub values: Vec<String>,
}

impl AnnotationDescriptor {
    /// The placeholder entry historically written when no annotation
    /// descriptors are supplied.
    pub fn placeholder() -> Self {
        Self {
            name: String::new(),
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterDescriptor {
    pub id: i64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusteringDescriptor {
    pub id: i64,
    pub group: String,
    pub name: String,
    pub clusters: Vec<ClusterDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegulonThresholdEntry {
    pub regulon: String,
    #[serde(rename = "defaultThresholdValue")]
    pub default_threshold_value: f64,
    #[serde(rename = "defaultThresholdName")]
    pub default_threshold_name: String,
    #[serde(rename = "allThresholds")]
    pub all_thresholds: BTreeMap<String, f64>,
    #[serde(rename = "motifData")]
    pub motif_data: String,
}

/// The nested descriptive object stored in the `MetaData` file attribute.
#[derive(Debug, Clone, Serialize)]
pub struct LoomMetadata {
    pub embeddings: Vec<EmbeddingDescriptor>,
    pub annotations: Vec<AnnotationDescriptor>,
    pub clusterings: Vec<ClusteringDescriptor>,
    #[serde(rename = "regulonThresholds")]
    pub regulon_thresholds: Vec<RegulonThresholdEntry>,
}

/// Scalar file-level attributes written next to the `MetaData` blob.
#[derive(Debug, Clone)]
pub struct GeneralAttributes {
    pub title: String,
    pub genome: String,
    pub metadata_json: String,
    /// `SCopeTreeL1`..`SCopeTreeL3`, always exactly three entries.
    pub tree: [String; 3],
}

/// Builds the nested metadata object.
///
/// `name_to_index` must be the same mapping used for the `ClusterID` column
/// (see [`crate::attrs::cluster_index_map`]); `thresholds` carries one record
/// per regulon in the activity matrix, in column order.
pub fn encode_metadata(
    name_to_index: &BTreeMap<String, i64>,
    regulons: &[Regulon],
    thresholds: &[ThresholdRecord],
    embedding_name: &str,
    annotations: &[AnnotationDescriptor],
) -> LoomMetadata {
    let mut clusters: Vec<ClusterDescriptor> = name_to_index
        .iter()
        .map(|(name, idx)| ClusterDescriptor {
            id: *idx,
            description: name.clone(),
        })
        .collect();
    clusters.sort_by_key(|c| c.id);

    let logos: BTreeMap<&str, &str> = regulons
        .iter()
        .filter_map(|r| r.logo().map(|logo| (r.name(), logo)))
        .collect();

    let regulon_thresholds = thresholds
        .iter()
        .map(|record| {
            let value = record.threshold.value();
            RegulonThresholdEntry {
                regulon: record.regulon.clone(),
                default_threshold_value: value,
                default_threshold_name: DEFAULT_THRESHOLD_NAME.to_string(),
                all_thresholds: BTreeMap::from([(DEFAULT_THRESHOLD_NAME.to_string(), value)]),
                motif_data: logos
                    .get(record.regulon.as_str())
                    .map(|logo| logo.to_string())
                    .unwrap_or_default(),
            }
        })
        .collect();

    LoomMetadata {
        embeddings: vec![EmbeddingDescriptor {
            id: 0,
            name: embedding_name.to_string(),
        }],
        annotations: annotations.to_vec(),
        clusterings: vec![ClusteringDescriptor {
            id: 0,
            group: CLUSTERING_GROUP.to_string(),
            name: CLUSTERING_NAME.to_string(),
            clusters,
        }],
        regulon_thresholds,
    }
}

/// Builds the scalar file-level attributes. When no title is supplied, the
/// output filename without extension is used.
pub fn encode_general_attrs(
    metadata: &LoomMetadata,
    out_path: &Path,
    title: Option<&str>,
    nomenclature: &str,
    tree: &CategoryTree,
) -> Result<GeneralAttributes> {
    let title = match title {
        Some(title) => title.to_string(),
        None => out_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    Ok(GeneralAttributes {
        title,
        genome: nomenclature.to_string(),
        metadata_json: serde_json::to_string(metadata)?,
        tree: tree.padded(),
    })
}
