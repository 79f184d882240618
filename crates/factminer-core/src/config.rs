//! Configuration and data directory management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Paths to all FactMiner data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Engine working directory (`data/engine/`). Holds the engine config
    /// and the transient script/input/output files.
    pub engine: PathBuf,
    /// Harvested reviews (`data/reviews/`).
    pub reviews: PathBuf,
    /// Harvest settings (`data/harvest.json`).
    pub harvest_file: PathBuf,
    /// Stop words for cleaned extraction (`data/stop-words.txt`).
    pub stop_words_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            engine: root.join("engine"),
            reviews: root.join("reviews"),
            harvest_file: root.join("harvest.json"),
            stop_words_file: root.join("stop-words.txt"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.engine)?;
        std::fs::create_dir_all(&self.reviews)?;
        Ok(())
    }
}

/// How the external pattern-matching engine is invoked.
///
/// The engine reads `script_file` and `input_file` from `working_dir`, and
/// writes `output_file` there when the script compiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    /// Single argument passed to the engine, relative to `working_dir`.
    pub config_file: String,
    pub script_file: String,
    pub input_file: String,
    pub output_file: String,
}

pub const DEFAULT_ENGINE_EXECUTABLE: &str = "tomita-parser";
pub const DEFAULT_CONFIG_FILE: &str = "config.proto";
pub const DEFAULT_SCRIPT_FILE: &str = "script.cxx";
pub const DEFAULT_INPUT_FILE: &str = "input.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "PrettyOutput.html";

impl EngineConfig {
    /// Engine configuration with the default file names in `working_dir`.
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_ENGINE_EXECUTABLE),
            working_dir: working_dir.as_ref().to_path_buf(),
            config_file: DEFAULT_CONFIG_FILE.into(),
            script_file: DEFAULT_SCRIPT_FILE.into(),
            input_file: DEFAULT_INPUT_FILE.into(),
            output_file: DEFAULT_OUTPUT_FILE.into(),
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.working_dir.join(&self.script_file)
    }

    pub fn input_path(&self) -> PathBuf {
        self.working_dir.join(&self.input_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_file)
    }
}

/// Persisted harvest settings (`harvest.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Host used when building review URIs.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Locale filter for group search. `None` searches everywhere.
    #[serde(default = "default_city_id")]
    pub city_id: Option<u32>,
    #[serde(default = "default_group_page_size")]
    pub group_page_size: usize,
    #[serde(default = "default_topic_page_size")]
    pub topic_page_size: usize,
    #[serde(default = "default_comment_page_size")]
    pub comment_page_size: usize,
    /// Stop paging a topic's comments once a page starts after the window.
    /// Comments are listed oldest first, so later pages cannot qualify.
    #[serde(default = "default_true")]
    pub stop_past_window: bool,
    #[serde(default)]
    pub search_terms: Vec<String>,
    /// Path to config file (not serialized).
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_host() -> String {
    "vk.com".into()
}
fn default_api_version() -> String {
    "5.131".into()
}
fn default_city_id() -> Option<u32> {
    Some(110)
}
fn default_group_page_size() -> usize {
    1000
}
fn default_topic_page_size() -> usize {
    100
}
fn default_comment_page_size() -> usize {
    100
}
fn default_true() -> bool {
    true
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_version: default_api_version(),
            city_id: default_city_id(),
            group_page_size: default_group_page_size(),
            topic_page_size: default_topic_page_size(),
            comment_page_size: default_comment_page_size(),
            stop_past_window: true,
            search_terms: Vec::new(),
            config_path: PathBuf::new(),
        }
    }
}

impl HarvestConfig {
    /// Load settings from a JSON file, or return defaults if it is absent.
    ///
    /// A file that exists but does not parse is an error, so a typo never
    /// silently resets page sizes.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str::<HarvestConfig>(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No harvest config at {}, using defaults", path.display());
                HarvestConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        Ok(())
    }

    /// Page sizes must be positive or pagination never advances.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("group_page_size", self.group_page_size),
            ("topic_page_size", self.topic_page_size),
            ("comment_page_size", self.comment_page_size),
        ] {
            if size == 0 {
                return Err(Error::Config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }
}

/// Top-level FactMiner configuration.
#[derive(Debug, Clone)]
pub struct FactMinerConfig {
    pub data_paths: DataPaths,
    pub engine: EngineConfig,
    pub harvest: HarvestConfig,
}

impl FactMinerConfig {
    /// Create configuration from environment and defaults.
    ///
    /// `FACTMINER_ENGINE` overrides the engine executable.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_paths = DataPaths::new(data_dir)?;

        let mut engine = EngineConfig::new(&data_paths.engine);
        if let Ok(exe) = std::env::var("FACTMINER_ENGINE") {
            engine.executable = PathBuf::from(exe);
        }

        let harvest = HarvestConfig::load(&data_paths.harvest_file)?;

        Ok(Self {
            data_paths,
            engine,
            harvest,
        })
    }
}
