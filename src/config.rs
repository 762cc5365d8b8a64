use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from an optional TOML file. Every field has a default,
/// so an empty file (or no file at all) yields the stock configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub passages: PassageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PassageConfig {
    /// Paragraphs shorter than this never start a passage.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Paragraphs longer than this discard the passage in progress.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// A passage is cut once its buffer reaches this many characters.
    /// Zero splits by paragraph.
    #[serde(default = "default_target_passage_length")]
    pub target_passage_length: usize,
    #[serde(default = "default_max_newlines")]
    pub max_newlines: usize,
    #[serde(default = "default_paragraph_separator")]
    pub paragraph_separator: String,
    #[serde(default = "default_histogram_buckets")]
    pub histogram_buckets: usize,
}

impl Default for PassageConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            target_passage_length: default_target_passage_length(),
            max_newlines: default_max_newlines(),
            paragraph_separator: default_paragraph_separator(),
            histogram_buckets: default_histogram_buckets(),
        }
    }
}

fn default_min_length() -> usize {
    50
}
fn default_max_length() -> usize {
    2000
}
fn default_target_passage_length() -> usize {
    300
}
fn default_max_newlines() -> usize {
    7
}
fn default_paragraph_separator() -> String {
    r"\s*\n\s*\n\s*".to_string()
}
fn default_histogram_buckets() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Records per `.jsonl.gz` shard.
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            shard_size: default_shard_size(),
        }
    }
}

fn default_shard_size() -> usize {
    100_000
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    /// Window, in documents, of the per-document moving averages.
    #[serde(default = "default_average_window")]
    pub average_window: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval_secs(),
            average_window: default_average_window(),
        }
    }
}

fn default_report_interval_secs() -> u64 {
    60
}
fn default_average_window() -> usize {
    1000
}

impl Config {
    /// Check cross-field constraints. Called after CLI overrides are applied.
    ///
    /// `min_length > max_length` would make every paragraph unusable and the
    /// run would silently produce nothing, so it is rejected up front.
    pub fn validate(&self) -> Result<()> {
        if self.output.shard_size == 0 {
            anyhow::bail!("output.shard_size must be > 0");
        }

        if !(1..=64).contains(&self.passages.histogram_buckets) {
            anyhow::bail!("passages.histogram_buckets must be in [1, 64]");
        }

        if self.passages.min_length > self.passages.max_length {
            anyhow::bail!(
                "passages.min_length ({}) must not exceed passages.max_length ({})",
                self.passages.min_length,
                self.passages.max_length
            );
        }

        if self.progress.average_window == 0 {
            anyhow::bail!("progress.average_window must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.validate()?;

    Ok(config)
}
