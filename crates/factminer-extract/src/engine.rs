//! External pattern-matching engine adapter.
//!
//! The engine talks through files in its working directory: it reads the
//! script and input files, and writes an HTML report whose `<a href=...>`
//! spans are the matched phrases. No report means the script was rejected.
//! The exit code is not inspected.
//!
//! The three file names are fixed per working directory, so every call goes
//! through a process-wide lock.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use factminer_core::{EngineConfig, Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, warn};

static ENGINE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<a href=(.*?)</a>").unwrap());

/// Runs a compiled pattern over text and returns the matched phrases.
pub trait PatternEngine {
    fn run(&self, pattern: &str, text: &str) -> Result<Vec<String>>;
}

/// Starts the engine process and blocks until it exits.
pub trait ProcessRunner {
    fn run(&self, program: &Path, args: &[&str], working_dir: &Path) -> Result<()>;
}

/// Spawns the real executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str], working_dir: &Path) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::Engine(format!("failed to start {}: {}", program.display(), e)))?;
        debug!("Engine {} exited with {}", program.display(), status);
        Ok(())
    }
}

/// File-protocol engine adapter.
pub struct FileEngine<R = SystemRunner> {
    config: EngineConfig,
    runner: R,
}

impl FileEngine<SystemRunner> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: ProcessRunner> FileEngine<R> {
    pub fn with_runner(config: EngineConfig, runner: R) -> Self {
        Self { config, runner }
    }
}

impl<R: ProcessRunner> PatternEngine for FileEngine<R> {
    fn run(&self, pattern: &str, text: &str) -> Result<Vec<String>> {
        let _slot = ENGINE_LOCK.lock();
        let files = ExchangeFiles::new(&self.config);

        // A report left behind by an interrupted run must not be read as ours.
        remove_if_present(&files.output)?;
        std::fs::write(&files.script, pattern)?;
        std::fs::write(&files.input, text)?;

        self.runner.run(
            &self.config.executable,
            &[self.config.config_file.as_str()],
            &self.config.working_dir,
        )?;

        let report = match std::fs::read_to_string(&files.output) {
            Ok(report) => report,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ParserOutputMissing(files.output.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let phrases = parse_output(&report);
        debug!("Engine matched {} phrases", phrases.len());
        Ok(phrases)
    }
}

/// Extract matched phrases from an engine report: for every
/// `<a href=...>phrase</a>` span, the text after the span's first `>`.
pub fn parse_output(report: &str) -> Vec<String> {
    ANCHOR_RE
        .captures_iter(report)
        .filter_map(|cap| cap.get(1))
        .map(|m| {
            let span = m.as_str();
            match span.find('>') {
                Some(pos) => &span[pos + 1..],
                None => span,
            }
        })
        .filter(|phrase| !phrase.is_empty())
        .map(String::from)
        .collect()
}

/// The transient files of one engine call. Removed on drop, whatever the
/// outcome of the call.
struct ExchangeFiles {
    script: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl ExchangeFiles {
    fn new(config: &EngineConfig) -> Self {
        Self {
            script: config.script_path(),
            input: config.input_path(),
            output: config.output_path(),
        }
    }
}

impl Drop for ExchangeFiles {
    fn drop(&mut self) {
        for path in [&self.script, &self.input, &self.output] {
            if let Err(e) = remove_if_present(path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
