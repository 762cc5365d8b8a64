//! # Passage builder CLI (`create-passages`)
//!
//! Reads WikiExtractor JSON lines (`{"id", "revid", "url", "title", "text"}`)
//! and writes passages (`{"id", "contents"}`) to gzip-compressed JSON-lines
//! shards.
//!
//! ## Usage
//!
//! ```bash
//! create-passages --wikiextracted <PATH|DIR|GLOB> --output <DIR> [options]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Stock settings: ~300 character passages, 100k passages per shard
//! create-passages --wikiextracted enwiki/text --output enwiki/passages
//!
//! # One passage per paragraph
//! create-passages --wikiextracted enwiki/text --output out --target_passage_length 0
//!
//! # Settings from a file, with one flag overridden
//! create-passages --config passages.toml --wikiextracted enwiki/text --output out --max_newlines 3
//! ```

use clap::Parser;
use std::path::PathBuf;

use wiki_passages::config::{self, Config};
use wiki_passages::ingest::{self, RunConfig};
use wiki_passages::progress::ProgressMode;

/// Build retrieval passages from WikiExtractor output.
///
/// Paragraphs are packed greedily until a passage reaches the target
/// length. Progress goes to stderr; the run summary, including the passage
/// length distribution, goes to stdout.
#[derive(Parser)]
#[command(
    name = "create-passages",
    about = "Build fixed-size retrieval passages from WikiExtractor JSON lines",
    version
)]
struct Cli {
    /// Input data: a file, a directory of WikiExtractor output, or a glob.
    #[arg(long)]
    wikiextracted: String,

    /// Output directory for `N.jsonl.gz` shards. Created if absent.
    #[arg(long)]
    output: PathBuf,

    /// Optional TOML file with `[passages]`, `[output]` and `[progress]` sections.
    /// Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum number of characters for a paragraph to start a passage.
    #[arg(long = "min_length", visible_alias = "min-length")]
    min_length: Option<usize>,

    /// Maximum number of characters for a paragraph.
    #[arg(long = "max_length", visible_alias = "max-length")]
    max_length: Option<usize>,

    /// Target number of characters for a passage. Set to zero to split by paragraph.
    #[arg(long = "target_passage_length", visible_alias = "target-passage-length")]
    target_passage_length: Option<usize>,

    /// Maximum number of newlines in a passage.
    #[arg(long = "max_newlines", visible_alias = "max-newlines")]
    max_newlines: Option<usize>,

    /// Passages per output shard.
    #[arg(long = "shard_size", visible_alias = "shard-size")]
    shard_size: Option<usize>,

    /// Seconds between progress lines.
    #[arg(long = "report_interval", visible_alias = "report-interval")]
    report_interval: Option<u64>,

    /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
    #[arg(long, value_enum)]
    progress: Option<ProgressMode>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        let passages = &mut config.passages;
        if let Some(v) = self.min_length {
            passages.min_length = v;
        }
        if let Some(v) = self.max_length {
            passages.max_length = v;
        }
        if let Some(v) = self.target_passage_length {
            passages.target_passage_length = v;
        }
        if let Some(v) = self.max_newlines {
            passages.max_newlines = v;
        }
        if let Some(v) = self.shard_size {
            config.output.shard_size = v;
        }
        if let Some(v) = self.report_interval {
            config.progress.report_interval_secs = v;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut cfg);

    let mode = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let reporter = mode.reporter();

    let run = RunConfig {
        input: cli.wikiextracted,
        output: cli.output,
        config: cfg,
    };
    let summary = ingest::run_create_passages(&run, reporter.as_ref())?;

    println!("create-passages");
    println!("  input files: {}", summary.files);
    println!("  documents: {}", summary.documents);
    println!("  passages written: {}", summary.passages);
    for bucket in summary.histogram.buckets() {
        println!(
            "  Passage length {}-{}: {}",
            bucket.lo, bucket.hi, bucket.count
        );
    }
    println!("  shards: {}", summary.shards);
    println!("  output: {}", run.output.display());
    println!("ok");

    Ok(())
}
