//! Rule artifact persistence
//!
//! The mined RuleSet is stored as JSON Lines, one `ScoredRule` per line.
//! A run replaces the file wholesale; readers skip (and count) any line that
//! does not decode into a valid rule instead of failing the whole load.

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::mining::{RuleSet, ScoredRule};
use crate::types::Alphabet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Rules read back from disk
#[derive(Debug, Clone, Default)]
pub struct LoadedRules {
    pub rules: Vec<ScoredRule>,
    /// Lines that failed to parse or validate
    pub skipped: usize,
}

/// JSON Lines store for the mined rule set
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
    alphabet: Alphabet,
    window_sizes: Vec<usize>,
}

impl RuleStore {
    /// Records whose window is not in `window_sizes` are rejected on load
    pub fn new(path: impl Into<PathBuf>, alphabet: Alphabet, window_sizes: &[usize]) -> Self {
        Self {
            path: path.into(),
            alphabet,
            window_sizes: window_sizes.to_vec(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full rule set, replacing any previous artifact
    pub async fn save(&self, rule_set: &RuleSet) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut buf = Vec::with_capacity(rule_set.len() * 256);
        for rule in rule_set.rules() {
            serde_json::to_writer(&mut buf, rule)?;
            buf.push(b'\n');
        }

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&buf).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        info!("Saved {} rules to {}", rule_set.len(), self.path.display());
        Ok(())
    }

    /// Read every valid rule, in file order
    pub async fn load(&self) -> Result<LoadedRules> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(self.parse(&text))
    }

    /// Decode artifact text, skipping degenerate records
    pub fn parse(&self, text: &str) -> LoadedRules {
        let mut loaded = LoadedRules::default();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let decoded = serde_json::from_str::<ScoredRule>(line)
                .map_err(crate::error::RadarError::from)
                .and_then(|rule| rule.validate(&self.alphabet, &self.window_sizes).map(|_| rule));
            match decoded {
                Ok(rule) => loaded.rules.push(rule),
                Err(e) => {
                    warn!("Skipping rule on line {}: {}", line_no + 1, e);
                    loaded.skipped += 1;
                }
            }
        }
        loaded
    }

    /// Modification time, used to notice a fresh mining run
    pub async fn modified(&self) -> Option<std::time::SystemTime> {
        tokio::fs::metadata(&self.path).await.ok()?.modified().ok()
    }
}
