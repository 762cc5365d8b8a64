//! Sharded gzip JSON-lines output.
//!
//! Passages are written to `<dir>/0.jsonl.gz`, `<dir>/1.jsonl.gz`, ...,
//! each holding at most `shard_size` records. A shard is only created
//! once it has a record to hold, so a run with no passages leaves the
//! directory empty.

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::PassageRecord;

pub const SHARD_EXTENSION: &str = "jsonl.gz";

/// Path of shard `index` inside `dir`.
pub fn shard_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.{}", index, SHARD_EXTENSION))
}

struct OpenShard {
    path: PathBuf,
    encoder: GzEncoder<BufWriter<File>>,
    records: usize,
}

impl OpenShard {
    fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create shard: {}", path.display()))?;
        Ok(Self {
            path,
            encoder: GzEncoder::new(BufWriter::new(file), Compression::default()),
            records: 0,
        })
    }

    fn append(&mut self, record: &PassageRecord) -> Result<()> {
        serde_json::to_writer(&mut self.encoder, record)
            .with_context(|| format!("Failed to write to shard: {}", self.path.display()))?;
        self.encoder
            .write_all(b"\n")
            .with_context(|| format!("Failed to write to shard: {}", self.path.display()))?;
        self.records += 1;
        Ok(())
    }

    fn close(self) -> Result<()> {
        let path = self.path;
        let mut inner = self
            .encoder
            .finish()
            .with_context(|| format!("Failed to finish shard: {}", path.display()))?;
        inner
            .flush()
            .with_context(|| format!("Failed to flush shard: {}", path.display()))?;
        Ok(())
    }
}

/// Totals reported once the writer is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardSummary {
    pub shards: usize,
    pub records: u64,
}

/// Appends passage records to rotating gzip shards.
///
/// Call [`ShardWriter::finish`] to close the last shard and surface any
/// error. If the writer is dropped instead (e.g. while an error
/// propagates), the gzip stream is still terminated on a best-effort basis.
pub struct ShardWriter {
    dir: PathBuf,
    shard_size: usize,
    current: Option<OpenShard>,
    next_index: usize,
    records: u64,
}

impl ShardWriter {
    /// Create the output directory if needed.
    pub fn new(dir: &Path, shard_size: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            shard_size: shard_size.max(1),
            current: None,
            next_index: 0,
            records: 0,
        })
    }

    pub fn write(&mut self, record: &PassageRecord) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|s| s.records >= self.shard_size)
        {
            if let Some(full) = self.current.take() {
                full.close()?;
            }
        }

        if self.current.is_none() {
            self.current = Some(OpenShard::create(shard_path(&self.dir, self.next_index))?);
            self.next_index += 1;
        }

        if let Some(shard) = self.current.as_mut() {
            shard.append(record)?;
            self.records += 1;
        }
        Ok(())
    }

    /// Records written so far across all shards.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn finish(mut self) -> Result<ShardSummary> {
        if let Some(shard) = self.current.take() {
            shard.close()?;
        }
        Ok(ShardSummary {
            shards: self.next_index,
            records: self.records,
        })
    }
}
