//! FactMiner Ontology — arena graph of categories, individuals and typed
//! attribute edges, plus a JSON snapshot format to build one.

pub mod graph;
pub mod snapshot;

pub use graph::{CategoryId, GraphStats, IndividualId, OntologyGraph, OntologyNode, Relation};
pub use snapshot::{AttributeSnapshot, CategorySnapshot, IndividualSnapshot, OntologySnapshot};
