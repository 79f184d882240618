//! Review text normalization before it is handed to the engine.
//!
//! Raw mode only rewrites line breaks (and lower-cases). Cleaned mode also
//! drops everything except letters, digits and a small punctuation set,
//! removes stop words, and collapses repeated spaces.

use std::path::Path;

use factminer_core::Result;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Punctuation kept by cleaned mode, besides letters and digits.
const KEPT_PUNCTUATION: &[char] = &['!', ',', '.', '?', ';', ' '];

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// How review text is prepared for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractMode {
    Raw,
    Cleaned { stop_words: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub mode: ExtractMode,
    pub lowercase: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::raw()
    }
}

impl ExtractOptions {
    pub fn raw() -> Self {
        Self {
            mode: ExtractMode::Raw,
            lowercase: true,
        }
    }

    pub fn cleaned(stop_words: Vec<String>) -> Self {
        Self {
            mode: ExtractMode::Cleaned { stop_words },
            lowercase: true,
        }
    }

    /// Apply this mode to review text.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("\r\n", "; ");
        match &self.mode {
            ExtractMode::Raw => {
                if self.lowercase {
                    text.to_lowercase()
                } else {
                    text
                }
            }
            ExtractMode::Cleaned { stop_words } => {
                let mut cleaned: String = text
                    .chars()
                    .filter(|c| c.is_alphanumeric() || KEPT_PUNCTUATION.contains(c))
                    .collect();
                if self.lowercase {
                    cleaned = cleaned.to_lowercase();
                }
                let without_stop_words = remove_stop_words(&cleaned, stop_words);
                MULTI_SPACE
                    .replace_all(&without_stop_words, " ")
                    .into_owned()
            }
        }
    }
}

/// Replace every case-insensitive occurrence of each stop word with a space.
/// Occurrences inside longer words are removed too.
fn remove_stop_words(text: &str, stop_words: &[String]) -> String {
    let mut result = text.to_string();
    for word in stop_words.iter().filter(|w| !w.is_empty()) {
        match RegexBuilder::new(&regex::escape(word))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => result = re.replace_all(&result, " ").into_owned(),
            Err(e) => warn!("Skipping stop word {:?}: {}", word, e),
        }
    }
    result
}

/// Read a stop-word list: one word per line, blank lines and `#` comments
/// skipped. A missing file yields an empty list.
pub fn load_stop_words(path: &Path) -> Result<Vec<String>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}
