//! Error types for FactMiner.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Empty script template or empty keyword set for an ontology individual.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// The external engine exited without writing its output file, which
    /// means it rejected the compiled pattern.
    #[error("Parser output missing: {}", .0.display())]
    ParserOutputMissing(PathBuf),

    /// The external engine could not be started.
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Harvest error: {0}")]
    Harvest(String),

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Ontology error: {0}")]
    Ontology(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
