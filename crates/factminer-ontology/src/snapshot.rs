//! JSON snapshot of an ontology.
//!
//! This is FactMiner's own interchange format for handing an already-loaded
//! ontology to the pipeline. It mirrors the graph shape: categories list
//! their individuals, individuals list their attribute values.

use std::path::Path;

use factminer_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::{OntologyGraph, Relation};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologySnapshot {
    pub categories: Vec<CategorySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    #[serde(default)]
    pub individuals: Vec<IndividualSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualSnapshot {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Any other relations, keyed by edge label.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSnapshot {
    pub relation: String,
    pub value: String,
}

impl OntologySnapshot {
    /// Read a snapshot file and build the graph.
    pub fn load(path: &Path) -> Result<OntologyGraph> {
        let data = std::fs::read_to_string(path)?;
        let snapshot: OntologySnapshot = serde_json::from_str(&data)?;
        let graph = snapshot.into_graph()?;
        let stats = graph.stats();
        info!(
            "Ontology loaded from {}: {} categories, {} individuals, {} edges",
            path.display(),
            stats.category_count,
            stats.individual_count,
            stats.edge_count
        );
        Ok(graph)
    }

    pub fn into_graph(self) -> Result<OntologyGraph> {
        let mut graph = OntologyGraph::new();
        for category in self.categories {
            let cat_id = graph.add_category(&category.name);
            for ind in category.individuals {
                let ind_id = graph.add_individual(&ind.name);
                graph.assign(ind_id, cat_id);
                for keyword in &ind.keywords {
                    graph.add_attribute(ind_id, Relation::HasKeyWord, keyword)?;
                }
                if let Some(script) = &ind.script {
                    graph.add_attribute(ind_id, Relation::HasScript, script)?;
                }
                if let Some(table) = &ind.table {
                    graph.add_attribute(ind_id, Relation::HasTable, table)?;
                }
                for attr in &ind.attributes {
                    graph.add_attribute(ind_id, Relation::from_name(&attr.relation), &attr.value)?;
                }
            }
        }
        Ok(graph)
    }
}
