//! FactMiner Extract — text normalization, pattern compilation, the external
//! engine adapter, and the fact extractor that ties them to an ontology.

pub mod engine;
pub mod extractor;
pub mod normalize;
pub mod pattern;
pub mod review;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{parse_output, FileEngine, PatternEngine, ProcessRunner, SystemRunner};
pub use extractor::{Extraction, Fact, FactExtractor, FactNode};
pub use normalize::{load_stop_words, ExtractMode, ExtractOptions};
pub use pattern::{compile_pattern, IndividualPattern};
pub use review::{rank_by_keywords, Review};
