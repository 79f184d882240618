//! Review — one harvested comment and the facts extracted from it.

use std::fmt;

use factminer_core::Result;
use factminer_ontology::{CategoryId, OntologyGraph};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::PatternEngine;
use crate::extractor::{Fact, FactExtractor, FactNode};
use crate::normalize::ExtractOptions;
use crate::pattern::{compile_pattern, CONTAINS_SCRIPT};

/// Vowels stripped from the end of a keyword before relevance matching, so
/// "машина" also matches "машины".
const TRAILING_VOWELS: &[char] = &['а', 'е', 'ё', 'о', 'у', 'и', 'э', 'ю', 'я', 'ы'];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    uri: String,
    text: String,
    #[serde(default)]
    facts: Vec<Fact>,
    #[serde(default)]
    fact_tree: Vec<FactNode>,
    #[serde(default)]
    extracted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keyword_count: Option<usize>,
}

impl Review {
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
            facts: Vec::new(),
            fact_tree: Vec::new(),
            extracted: false,
            keyword_count: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn fact_tree(&self) -> &[FactNode] {
        &self.fact_tree
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn is_extracted(&self) -> bool {
        self.extracted
    }

    /// Result of the last [`Review::matched_keyword_count`], if any.
    pub fn keyword_count(&self) -> Option<usize> {
        self.keyword_count
    }

    /// Run fact extraction for `category` over this review's text.
    ///
    /// Runs at most once per review: later calls do nothing and return
    /// `false`, whatever their arguments.
    pub fn extract_facts<E: PatternEngine + ?Sized>(
        &mut self,
        ontology: &OntologyGraph,
        category: CategoryId,
        engine: &E,
        options: &ExtractOptions,
    ) -> bool {
        if self.extracted {
            debug!("Facts already extracted for {}", self.uri);
            return false;
        }

        let text = options.normalize(&self.text);
        let extraction = FactExtractor::new(ontology, engine).extract(category, &text);
        self.facts.extend(extraction.facts);
        self.fact_tree.extend(extraction.tree);
        self.extracted = true;
        true
    }

    /// Count keywords found in the text, case-insensitively, after dropping
    /// one trailing vowel from each keyword. The count is also stored on the
    /// review.
    pub fn matched_keyword_count(&mut self, keywords: &[String]) -> usize {
        let text = self.text.to_lowercase();
        let count = keywords
            .iter()
            .filter(|k| !k.is_empty())
            .filter(|k| {
                let mut stem = k.to_lowercase();
                if stem.ends_with(TRAILING_VOWELS) {
                    stem.pop();
                }
                text.contains(&stem)
            })
            .count();
        self.keyword_count = Some(count);
        count
    }

    /// Whether the engine finds any of `keywords` in the lower-cased text.
    /// An empty keyword list matches every review.
    pub fn contains_any<E: PatternEngine + ?Sized>(
        &self,
        engine: &E,
        keywords: &[String],
    ) -> Result<bool> {
        if keywords.is_empty() {
            return Ok(true);
        }
        let pattern = compile_pattern(CONTAINS_SCRIPT, keywords)?;
        let phrases = engine.run(&pattern, &self.text.to_lowercase())?;
        Ok(!phrases.is_empty())
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Score every review against `keywords` and order them by score, highest
/// first. Reviews with equal scores keep their relative order.
pub fn rank_by_keywords(reviews: &mut [Review], keywords: &[String]) {
    for review in reviews.iter_mut() {
        review.matched_keyword_count(keywords);
    }
    reviews.sort_by(|a, b| b.keyword_count.cmp(&a.keyword_count));
}
