//! Engine stubs shared by the unit tests.

use std::cell::Cell;
use std::path::Path;

use factminer_core::config::{DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_SCRIPT_FILE};
use factminer_core::{Error, Result};
use regex::Regex;

use crate::engine::{PatternEngine, ProcessRunner};

/// Quoted alternation terms of a compiled pattern that occur in `text`.
fn echo_terms(pattern: &str, text: &str) -> Vec<String> {
    let quoted = Regex::new(r"'([^']*)'").unwrap();
    quoted
        .captures_iter(pattern)
        .map(|cap| cap[1].to_string())
        .filter(|term| !term.is_empty() && text.contains(term.as_str()))
        .collect()
}

/// Stands in for the engine process: writes one anchor per quoted term of
/// the script that occurs in the input.
pub struct EchoRunner;

impl ProcessRunner for EchoRunner {
    fn run(&self, _program: &Path, _args: &[&str], working_dir: &Path) -> Result<()> {
        let script = std::fs::read_to_string(working_dir.join(DEFAULT_SCRIPT_FILE))?;
        let input = std::fs::read_to_string(working_dir.join(DEFAULT_INPUT_FILE))?;
        let body: String = echo_terms(&script, &input)
            .iter()
            .map(|t| format!("<a href=\"#\">{}</a>\n", t))
            .collect();
        std::fs::write(
            working_dir.join(DEFAULT_OUTPUT_FILE),
            format!("<html><body>\n{}</body></html>", body),
        )?;
        Ok(())
    }
}

/// Behaves like an engine that rejected the script: writes no report.
pub struct RejectRunner;

impl ProcessRunner for RejectRunner {
    fn run(&self, _program: &Path, _args: &[&str], _working_dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// In-memory echo engine that counts calls.
#[derive(Default)]
pub struct EchoEngine {
    pub calls: Cell<usize>,
    /// Patterns containing this marker are rejected.
    pub reject_marker: Option<&'static str>,
}

impl PatternEngine for EchoEngine {
    fn run(&self, pattern: &str, text: &str) -> Result<Vec<String>> {
        self.calls.set(self.calls.get() + 1);
        if let Some(marker) = self.reject_marker {
            if pattern.contains(marker) {
                return Err(Error::ParserOutputMissing("PrettyOutput.html".into()));
            }
        }
        Ok(echo_terms(pattern, text))
    }
}
