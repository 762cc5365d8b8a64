//! Passage pipeline orchestration.
//!
//! Coordinates the full run: input files → documents → normalization →
//! passage building → sharded output. Documents are processed strictly in
//! input order, one at a time.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::chunk::PassageBuilder;
use crate::config::Config;
use crate::connector_fs::{scan_inputs, DocumentReader};
use crate::export::{ShardSummary, ShardWriter};
use crate::progress::{MovingAverage, ProgressEvent, ProgressReporter, ReportTimer};
use crate::stats::LengthHistogram;

/// Everything a run needs besides the passage settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// File, directory, or glob of WikiExtractor output.
    pub input: String,
    pub output: PathBuf,
    pub config: Config,
}

/// Totals for a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub files: usize,
    pub documents: u64,
    pub passages: u64,
    pub shards: usize,
    pub histogram: LengthHistogram,
}

/// Run-scoped mutable state, owned by [`run_create_passages`].
struct RunContext {
    histogram: LengthHistogram,
    writer: ShardWriter,
    timer: ReportTimer,
    paragraphs_per_doc: MovingAverage,
    passages_per_doc: MovingAverage,
    documents: u64,
}

impl RunContext {
    fn report_progress(&self, reporter: &dyn ProgressReporter) {
        let secs = self.timer.elapsed().as_secs_f64();
        reporter.report(ProgressEvent::Documents {
            n: self.documents,
            docs_per_sec: if secs > 0.0 {
                self.documents as f64 / secs
            } else {
                0.0
            },
            paragraphs_per_doc: self.paragraphs_per_doc.value(),
            passages_per_doc: self.passages_per_doc.value(),
        });
    }
}

pub fn run_create_passages(
    run: &RunConfig,
    reporter: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let config = &run.config;
    config.validate()?;

    let builder = PassageBuilder::new(&config.passages)?;
    let files = scan_inputs(&run.input)?;
    let file_count = files.len();

    let mut ctx = RunContext {
        histogram: LengthHistogram::new(config.passages.histogram_buckets),
        writer: ShardWriter::new(&run.output, config.output.shard_size)?,
        timer: ReportTimer::new(Duration::from_secs(config.progress.report_interval_secs)),
        paragraphs_per_doc: MovingAverage::new(config.progress.average_window),
        passages_per_doc: MovingAverage::new(config.progress.average_window),
        documents: 0,
    };

    for doc in DocumentReader::new(files) {
        let doc = doc?;
        if ctx.timer.is_time() {
            ctx.report_progress(reporter);
        }

        let mut passages = builder.passages(&doc, &mut ctx.histogram);
        for passage in passages.by_ref() {
            ctx.writer.write(&passage)?;
        }
        let paragraphs = passages.paragraph_count();
        let emitted = passages.passage_count();

        ctx.documents += 1;
        ctx.paragraphs_per_doc.add(paragraphs as f64);
        ctx.passages_per_doc.add(emitted as f64);
    }

    let RunContext {
        histogram,
        writer,
        documents,
        ..
    } = ctx;
    let ShardSummary { shards, records } = writer.finish()?;

    for bucket in histogram.buckets() {
        reporter.report(ProgressEvent::LengthBucket {
            lo: bucket.lo,
            hi: bucket.hi,
            count: bucket.count,
        });
    }

    Ok(RunSummary {
        files: file_count,
        documents,
        passages: records,
        shards,
        histogram,
    })
}
