//! Fact extractor — runs every individual of an ontology category over a
//! text and groups the matched phrases by individual.

use factminer_core::Result;
use factminer_ontology::{CategoryId, IndividualId, OntologyGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::PatternEngine;
use crate::pattern::IndividualPattern;

/// One extracted phrase and the table it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    phrase: String,
    table_name: String,
}

impl Fact {
    pub fn new(phrase: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            table_name: table_name.into(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Empty when the individual has no table assigned.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Facts of one individual, for display. A node whose individual failed to
/// extract carries the error instead of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactNode {
    pub label: String,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FactNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            error: None,
        }
    }

    pub fn degraded(label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// `"Engine"`, or `"Engine: <error>"` for a degraded node.
    pub fn display_label(&self) -> String {
        match &self.error {
            Some(error) => format!("{}: {}", self.label, error),
            None => self.label.clone(),
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub facts: Vec<Fact>,
    pub tree: Vec<FactNode>,
}

pub struct FactExtractor<'a, E: PatternEngine + ?Sized> {
    ontology: &'a OntologyGraph,
    engine: &'a E,
}

impl<'a, E: PatternEngine + ?Sized> FactExtractor<'a, E> {
    pub fn new(ontology: &'a OntologyGraph, engine: &'a E) -> Self {
        Self { ontology, engine }
    }

    /// Extract facts for every individual of `category` from normalized text.
    ///
    /// An individual that fails (bad pattern, rejected by the engine) yields
    /// a degraded node; the remaining individuals still run.
    pub fn extract(&self, category: CategoryId, text: &str) -> Extraction {
        let mut extraction = Extraction::default();

        for individual in self.ontology.individuals(category) {
            let name = self.ontology.individual_name(individual);
            match self.extract_individual(individual, text) {
                Ok((phrases, table)) => {
                    let mut node = FactNode::new(name);
                    for phrase in phrases {
                        extraction.facts.push(Fact::new(phrase.as_str(), table.as_str()));
                        node.children.push(phrase);
                    }
                    extraction.tree.push(node);
                }
                Err(e) => {
                    warn!("Extraction failed for {}: {}", name, e);
                    extraction.tree.push(FactNode::degraded(name, e.to_string()));
                }
            }
        }

        debug!(
            "Extracted {} facts from {} individuals of {}",
            extraction.facts.len(),
            extraction.tree.len(),
            self.ontology.category_name(category)
        );
        extraction
    }

    fn extract_individual(
        &self,
        individual: IndividualId,
        text: &str,
    ) -> Result<(Vec<String>, String)> {
        let pattern = IndividualPattern::from_individual(self.ontology, individual);
        let compiled = pattern.compile()?;
        let phrases = self.engine.run(&compiled, text)?;
        Ok((phrases, pattern.table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EchoEngine;
    use factminer_ontology::Relation;

    fn ontology() -> (OntologyGraph, CategoryId) {
        let mut g = OntologyGraph::new();
        let cat = g.add_category("Car");

        let engine = g.add_individual("Engine");
        g.assign(engine, cat);
        g.add_attribute(engine, Relation::HasKeyWord, "foo").unwrap();
        g.add_attribute(engine, Relation::HasKeyWord, "bar").unwrap();
        g.add_attribute(engine, Relation::HasScript, "S -> [ENTITY];").unwrap();
        g.add_attribute(engine, Relation::HasTable, "engine").unwrap();

        // No keywords: must fail on its own without affecting the others.
        let empty = g.add_individual("Empty");
        g.assign(empty, cat);
        g.add_attribute(empty, Relation::HasScript, "S -> [ENTITY];").unwrap();

        let body = g.add_individual("Body");
        g.assign(body, cat);
        g.add_attribute(body, Relation::HasKeyWord, "here").unwrap();
        g.add_attribute(body, Relation::HasScript, "B -> [ENTITY];").unwrap();

        (g, cat)
    }

    #[test]
    fn test_round_trip() {
        let (g, cat) = ontology();
        let engine = EchoEngine::default();
        let extraction = FactExtractor::new(&g, &engine).extract(cat, "foo appears here");

        assert_eq!(
            extraction.facts,
            vec![Fact::new("foo", "engine"), Fact::new("here", "")]
        );
        assert_eq!(extraction.tree.len(), 3);
        assert_eq!(extraction.tree[0].label, "Engine");
        assert_eq!(extraction.tree[0].children, vec!["foo"]);
    }

    #[test]
    fn test_compile_failure_is_isolated() {
        let (g, cat) = ontology();
        let engine = EchoEngine::default();
        let extraction = FactExtractor::new(&g, &engine).extract(cat, "foo appears here");

        let empty = &extraction.tree[1];
        assert!(empty.is_degraded());
        assert!(empty.display_label().starts_with("Empty: Pattern error"));
        assert!(empty.children.is_empty());
        // Only the two valid individuals reached the engine
        assert_eq!(engine.calls.get(), 2);
        assert_eq!(extraction.tree[2].children, vec!["here"]);
    }

    #[test]
    fn test_engine_rejection_is_isolated() {
        let (g, cat) = ontology();
        let engine = EchoEngine {
            reject_marker: Some("S ->"),
            ..Default::default()
        };
        let extraction = FactExtractor::new(&g, &engine).extract(cat, "foo appears here");

        assert!(extraction.tree[0].is_degraded());
        assert_eq!(extraction.facts, vec![Fact::new("here", "")]);
    }

    #[test]
    fn test_empty_category() {
        let mut g = OntologyGraph::new();
        let cat = g.add_category("Nothing");
        let engine = EchoEngine::default();
        let extraction = FactExtractor::new(&g, &engine).extract(cat, "text");
        assert_eq!(extraction, Extraction::default());
    }
}
