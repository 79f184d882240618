//! Pattern compiler: turns an ontology individual into an engine script.

use factminer_core::{Error, Result};
use factminer_ontology::{IndividualId, OntologyGraph, Relation};

/// Placeholder in a script template that receives the keyword alternation.
pub const ENTITY_PLACEHOLDER: &str = "[ENTITY]";

/// Script used for plain keyword containment checks.
pub const CONTAINS_SCRIPT: &str = "#encoding \"utf-8\"\nEntity-> [ENTITY];";

/// Everything the extractor needs from one individual.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndividualPattern {
    pub keywords: Vec<String>,
    /// Script template; empty when the individual has no `HasScript` edge.
    pub script: String,
    /// Target table; empty when unassigned.
    pub table: String,
}

impl IndividualPattern {
    /// Collect keywords, script and table from the individual's edges.
    /// Unknown relations are ignored. Missing pieces surface later, in
    /// [`IndividualPattern::compile`].
    pub fn from_individual(ontology: &OntologyGraph, individual: IndividualId) -> Self {
        let mut pattern = Self::default();
        for (relation, value) in ontology.attributes(individual) {
            match relation {
                Relation::HasKeyWord => pattern.keywords.push(value.to_string()),
                Relation::HasScript => pattern.script = value.to_string(),
                Relation::HasTable => pattern.table = value.to_string(),
                Relation::InstanceOf | Relation::Other(_) => {}
            }
        }
        pattern
    }

    pub fn compile(&self) -> Result<String> {
        compile_pattern(&self.script, &self.keywords)
    }
}

/// Substitute the quoted, lower-cased keyword alternation into `script`.
///
/// `['Foo', 'bar']` becomes `'foo' | 'bar'`.
pub fn compile_pattern(script: &str, keywords: &[String]) -> Result<String> {
    if script.trim().is_empty() {
        return Err(Error::Pattern("pattern script is empty".into()));
    }
    if keywords.is_empty() {
        return Err(Error::Pattern("no keywords".into()));
    }

    let entity = keywords
        .iter()
        .map(|k| format!("'{}'", k.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" | ");

    Ok(script.replace(ENTITY_PLACEHOLDER, &entity))
}
