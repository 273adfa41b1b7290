//! Conversion of a regulon collection into a directed regulatory graph and
//! GraphML serialization.

use std::collections::HashMap;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::errors::Result;
use crate::models::Regulon;

const GROUP_TF: &str = "transcription_factor";
const GROUP_ACTIVATED: &str = "activated_target";
const GROUP_INHIBITED: &str = "inhibited_target";
const INTERACTION_ACTIVATING: &str = "activating";
const INTERACTION_INHIBITING: &str = "inhibiting";

/// A transcription factor or target gene in the regulatory graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulonNode {
    pub id: String,
    pub group: String,
    /// The owning regulon's context tags, `;`-joined. Empty for TF nodes.
    pub context: String,
}

/// A TF → target interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulonEdge {
    pub weight: f64,
    pub interaction: String,
    pub context: String,
}

/// The derived regulatory wiring graph.
pub type RegulatoryGraph = DiGraph<RegulonNode, RegulonEdge>;

fn joined_context(regulon: &Regulon) -> String {
    regulon
        .context()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

/// Builds a directed graph with one node per TF, one node per distinct
/// target gene, and one weighted edge per (TF, target) pair.
///
/// Target nodes are deduplicated by gene name. When several regulons share a
/// target, the node's group and context are overwritten by each regulon in
/// turn (last-write-wins), matching the interchange format's single-value
/// attributes. An empty regulon collection yields an empty graph.
pub fn build_regulatory_graph(regulons: &[Regulon]) -> RegulatoryGraph {
    let mut graph = RegulatoryGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

    for regulon in regulons {
        let tf = upsert_node(&mut graph, &mut nodes, regulon.name(), GROUP_TF, String::new());
        let (node_group, interaction) = if regulon.is_activating() {
            (GROUP_ACTIVATED, INTERACTION_ACTIVATING)
        } else {
            (GROUP_INHIBITED, INTERACTION_INHIBITING)
        };
        let context = joined_context(regulon);

        for (target, weight) in regulon.targets() {
            let dst = upsert_node(&mut graph, &mut nodes, target, node_group, context.clone());
            graph.update_edge(
                tf,
                dst,
                RegulonEdge {
                    weight: *weight,
                    interaction: interaction.to_string(),
                    context: context.clone(),
                },
            );
        }
    }
    graph
}

/// Inserts or updates a node by identity. Re-insertion overwrites the group
/// and context, mirroring single-valued attribute semantics.
fn upsert_node(
    graph: &mut RegulatoryGraph,
    nodes: &mut HashMap<String, NodeIndex>,
    id: &str,
    group: &str,
    context: String,
) -> NodeIndex {
    match nodes.get(id) {
        Some(&idx) => {
            let node = &mut graph[idx];
            node.group = group.to_string();
            node.context = context;
            idx
        }
        None => {
            let idx = graph.add_node(RegulonNode {
                id: id.to_string(),
                group: group.to_string(),
                context,
            });
            nodes.insert(id.to_string(), idx);
            idx
        }
    }
}

struct GraphmlKey {
    id: &'static str,
    domain: &'static str,
    name: &'static str,
    ty: &'static str,
}

const GRAPHML_KEYS: &[GraphmlKey] = &[
    GraphmlKey { id: "d0", domain: "node", name: "group", ty: "string" },
    GraphmlKey { id: "d1", domain: "node", name: "context", ty: "string" },
    GraphmlKey { id: "d2", domain: "edge", name: "weight", ty: "double" },
    GraphmlKey { id: "d3", domain: "edge", name: "interaction", ty: "string" },
    GraphmlKey { id: "d4", domain: "edge", name: "context", ty: "string" },
];

fn write_data(writer: &mut Writer<Vec<u8>>, key: &str, value: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    writer.write_event(Event::Start(data))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

/// Serializes the graph as a GraphML document.
pub fn graphml_document(graph: &RegulatoryGraph) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("graphml");
    root.push_attribute(("xmlns", "http://graphml.graphdrawing.org/xmlns"));
    writer.write_event(Event::Start(root))?;

    for key in GRAPHML_KEYS {
        let mut elem = BytesStart::new("key");
        elem.push_attribute(("id", key.id));
        elem.push_attribute(("for", key.domain));
        elem.push_attribute(("attr.name", key.name));
        elem.push_attribute(("attr.type", key.ty));
        writer.write_event(Event::Empty(elem))?;
    }

    let mut graph_elem = BytesStart::new("graph");
    graph_elem.push_attribute(("edgedefault", "directed"));
    writer.write_event(Event::Start(graph_elem))?;

    for idx in graph.node_indices() {
        let node = &graph[idx];
        let mut elem = BytesStart::new("node");
        elem.push_attribute(("id", node.id.as_str()));
        writer.write_event(Event::Start(elem))?;
        write_data(&mut writer, "d0", &node.group)?;
        if !node.context.is_empty() {
            write_data(&mut writer, "d1", &node.context)?;
        }
        writer.write_event(Event::End(BytesEnd::new("node")))?;
    }

    for edge in graph.edge_references() {
        let mut elem = BytesStart::new("edge");
        elem.push_attribute(("source", graph[edge.source()].id.as_str()));
        elem.push_attribute(("target", graph[edge.target()].id.as_str()));
        writer.write_event(Event::Start(elem))?;
        write_data(&mut writer, "d2", &edge.weight().weight.to_string())?;
        write_data(&mut writer, "d3", &edge.weight().interaction)?;
        if !edge.weight().context.is_empty() {
            write_data(&mut writer, "d4", &edge.weight().context)?;
        }
        writer.write_event(Event::End(BytesEnd::new("edge")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("graph")))?;
    writer.write_event(Event::End(BytesEnd::new("graphml")))?;
    Ok(writer.into_inner())
}

/// Converts `regulons` into a directed, attributed graph and writes it as a
/// GraphML file. Runs independently of the loom export pipeline.
pub fn export_regulons(regulons: &[Regulon], path: &Path) -> Result<()> {
    let graph = build_regulatory_graph(regulons);
    let document = graphml_document(&graph)?;
    std::fs::write(path, document)?;
    Ok(())
}
