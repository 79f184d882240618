//! FactMiner Core — error type, configuration, data directory management.

pub mod config;
pub mod error;

pub use config::{DataPaths, EngineConfig, FactMinerConfig, HarvestConfig};
pub use error::{Error, Result};
