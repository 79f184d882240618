//! Ontology graph backed by a petgraph arena.
//!
//! Nodes are addressed by stable indices; edges carry a [`Relation`].
//! Individuals point at the category they belong to (`InstanceOf`) and at
//! leaf value nodes through attribute relations. Value nodes are shared, so a
//! keyword reused by several individuals is stored once.

use std::collections::HashMap;
use std::fmt;

use factminer_core::{Error, Result};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// A node in the ontology graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum OntologyNode {
    Category(String),
    Individual(String),
    /// Leaf attribute value: a keyword, a script template or a table name.
    Value(String),
}

/// Edge type between ontology nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Individual → category it belongs to.
    InstanceOf,
    HasKeyWord,
    HasScript,
    HasTable,
    /// Relation the extraction pipeline does not know about.
    Other(String),
}

impl Relation {
    /// Map an edge label from an ontology source onto a relation.
    pub fn from_name(name: &str) -> Self {
        match name {
            "InstanceOf" => Self::InstanceOf,
            "HasKeyWord" => Self::HasKeyWord,
            "HasScript" => Self::HasScript,
            "HasTable" => Self::HasTable,
            other => Self::Other(other.to_string()),
        }
    }

    /// Relations an individual may carry at most once.
    fn is_single_valued(&self) -> bool {
        matches!(self, Self::HasScript | Self::HasTable)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstanceOf => write!(f, "InstanceOf"),
            Self::HasKeyWord => write!(f, "HasKeyWord"),
            Self::HasScript => write!(f, "HasScript"),
            Self::HasTable => write!(f, "HasTable"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Handle to a category node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(NodeIndex);

/// Handle to an individual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndividualId(NodeIndex);

/// In-memory ontology. Built once by a loader, then read-only.
#[derive(Debug, Clone)]
pub struct OntologyGraph {
    graph: DiGraph<OntologyNode, Relation>,
    categories: HashMap<String, NodeIndex>,
    individuals: HashMap<String, NodeIndex>,
    values: HashMap<String, NodeIndex>,
}

impl OntologyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            categories: HashMap::new(),
            individuals: HashMap::new(),
            values: HashMap::new(),
        }
    }

    // ---------------------------------------------------------------
    // Building
    // ---------------------------------------------------------------

    /// Get or create the category with this name.
    pub fn add_category(&mut self, name: &str) -> CategoryId {
        let graph = &mut self.graph;
        let idx = *self
            .categories
            .entry(name.to_string())
            .or_insert_with(|| graph.add_node(OntologyNode::Category(name.to_string())));
        CategoryId(idx)
    }

    /// Get or create the individual with this name.
    pub fn add_individual(&mut self, name: &str) -> IndividualId {
        let graph = &mut self.graph;
        let idx = *self
            .individuals
            .entry(name.to_string())
            .or_insert_with(|| graph.add_node(OntologyNode::Individual(name.to_string())));
        IndividualId(idx)
    }

    /// Make `individual` a member of `category`. Adding the same membership
    /// twice is a no-op.
    pub fn assign(&mut self, individual: IndividualId, category: CategoryId) {
        if self.graph.find_edge(individual.0, category.0).is_none() {
            self.graph.add_edge(individual.0, category.0, Relation::InstanceOf);
        }
    }

    /// Attach an attribute value to an individual.
    ///
    /// Repeating an identical attribute is a no-op. A second, different
    /// `HasScript` or `HasTable` value is rejected.
    pub fn add_attribute(
        &mut self,
        individual: IndividualId,
        relation: Relation,
        value: &str,
    ) -> Result<()> {
        if relation == Relation::InstanceOf {
            return Err(Error::Ontology(
                "InstanceOf links an individual to a category, use assign()".into(),
            ));
        }

        for (existing, existing_value) in self.attributes(individual) {
            if *existing != relation {
                continue;
            }
            if existing_value == value {
                return Ok(());
            }
            if relation.is_single_valued() {
                return Err(Error::Ontology(format!(
                    "{} already has a {} edge",
                    self.individual_name(individual),
                    relation
                )));
            }
        }

        let graph = &mut self.graph;
        let value_idx = *self
            .values
            .entry(value.to_string())
            .or_insert_with(|| graph.add_node(OntologyNode::Value(value.to_string())));
        self.graph.add_edge(individual.0, value_idx, relation);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn category(&self, name: &str) -> Option<CategoryId> {
        self.categories.get(name).copied().map(CategoryId)
    }

    pub fn individual(&self, name: &str) -> Option<IndividualId> {
        self.individuals.get(name).copied().map(IndividualId)
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        self.node_name(id.0)
    }

    pub fn individual_name(&self, id: IndividualId) -> &str {
        self.node_name(id.0)
    }

    /// Category names in creation order.
    pub fn category_names(&self) -> Vec<&str> {
        let mut ids: Vec<NodeIndex> = self.categories.values().copied().collect();
        ids.sort();
        ids.into_iter().map(|idx| self.node_name(idx)).collect()
    }

    /// Individuals of a category (the category's parent edges), in the order
    /// they were assigned.
    pub fn individuals(&self, category: CategoryId) -> Vec<IndividualId> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(category.0, Direction::Incoming)
            .filter(|e| *e.weight() == Relation::InstanceOf)
            .map(|e| (e.id(), e.source()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges
            .into_iter()
            .map(|(_, node)| IndividualId(node))
            .collect()
    }

    /// Attribute edges of an individual (its child edges), in insertion order.
    pub fn attributes(&self, individual: IndividualId) -> Vec<(&Relation, &str)> {
        let mut edges: Vec<(EdgeIndex, &Relation, NodeIndex)> = self
            .graph
            .edges_directed(individual.0, Direction::Outgoing)
            .filter(|e| *e.weight() != Relation::InstanceOf)
            .map(|e| (e.id(), e.weight(), e.target()))
            .collect();
        edges.sort_by_key(|(edge, _, _)| *edge);
        edges
            .into_iter()
            .map(|(_, relation, node)| (relation, self.node_name(node)))
            .collect()
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            category_count: self.categories.len(),
            individual_count: self.individuals.len(),
        }
    }

    fn node_name(&self, idx: NodeIndex) -> &str {
        match &self.graph[idx] {
            OntologyNode::Category(name)
            | OntologyNode::Individual(name)
            | OntologyNode::Value(name) => name,
        }
    }
}

impl Default for OntologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub category_count: usize,
    pub individual_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (OntologyGraph, CategoryId) {
        let mut g = OntologyGraph::new();
        let cat = g.add_category("Features");
        let engine = g.add_individual("Engine");
        let price = g.add_individual("Price");
        g.assign(engine, cat);
        g.assign(price, cat);
        g.add_attribute(engine, Relation::HasKeyWord, "двигатель").unwrap();
        g.add_attribute(engine, Relation::HasKeyWord, "мотор").unwrap();
        g.add_attribute(engine, Relation::HasScript, "S -> [ENTITY];").unwrap();
        g.add_attribute(engine, Relation::HasTable, "engine").unwrap();
        g.add_attribute(price, Relation::HasKeyWord, "мотор").unwrap();
        (g, cat)
    }

    #[test]
    fn test_individuals_in_assignment_order() {
        let (g, cat) = sample();
        let names: Vec<&str> = g
            .individuals(cat)
            .into_iter()
            .map(|i| g.individual_name(i))
            .collect();
        assert_eq!(names, vec!["Engine", "Price"]);
    }

    #[test]
    fn test_attributes_in_insertion_order() {
        let (g, _) = sample();
        let engine = g.individual("Engine").unwrap();
        let attrs = g.attributes(engine);
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0], (&Relation::HasKeyWord, "двигатель"));
        assert_eq!(attrs[2], (&Relation::HasScript, "S -> [ENTITY];"));
    }

    #[test]
    fn test_shared_value_node() {
        let (g, _) = sample();
        // Features, Engine, Price + 4 distinct values ("мотор" shared)
        let stats = g.stats();
        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.category_count, 1);
        assert_eq!(stats.individual_count, 2);
    }

    #[test]
    fn test_second_script_rejected() {
        let (mut g, _) = sample();
        let engine = g.individual("Engine").unwrap();
        let err = g
            .add_attribute(engine, Relation::HasScript, "other")
            .unwrap_err();
        assert!(matches!(err, Error::Ontology(_)));
        // Same value again is accepted and not duplicated
        g.add_attribute(engine, Relation::HasScript, "S -> [ENTITY];")
            .unwrap();
        assert_eq!(g.attributes(engine).len(), 4);
    }

    #[test]
    fn test_assign_is_idempotent() {
        let (mut g, cat) = sample();
        let engine = g.individual("Engine").unwrap();
        g.assign(engine, cat);
        assert_eq!(g.individuals(cat).len(), 2);
    }

    #[test]
    fn test_relation_from_name() {
        assert_eq!(Relation::from_name("HasKeyWord"), Relation::HasKeyWord);
        assert_eq!(
            Relation::from_name("HasSynonym"),
            Relation::Other("HasSynonym".into())
        );
    }
}
