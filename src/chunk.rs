//! Paragraph-boundary passage builder.
//!
//! Splits a document's normalized text into paragraphs on blank lines and
//! greedily packs consecutive paragraphs into passages of roughly
//! `target_passage_length` characters. Paragraphs are never split.
//!
//! Per paragraph, in order:
//!
//! 1. longer than `max_length`: the passage in progress is dropped;
//! 2. shorter than `min_length` with nothing buffered: skipped;
//! 3. otherwise appended, followed by `"\n\n"`.
//!
//! Once the buffer reaches `target_passage_length` it is trimmed and
//! emitted if it has at most `max_newlines` newlines, then cleared either
//! way. Whatever is left at the end of a document is dropped.
//!
//! All lengths count chars, not bytes.

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::PassageConfig;
use crate::models::{PassageRecord, RawDocument};
use crate::normalize::normalize;
use crate::stats::LengthHistogram;

const PARAGRAPH_JOINER: &str = "\n\n";

/// Compiled passage settings. Build once per run and reuse for every document.
#[derive(Debug, Clone)]
pub struct PassageBuilder {
    min_length: usize,
    max_length: usize,
    target_passage_length: usize,
    max_newlines: usize,
    separator: Regex,
}

impl PassageBuilder {
    pub fn new(config: &PassageConfig) -> Result<Self> {
        let separator = Regex::new(&config.paragraph_separator).with_context(|| {
            format!(
                "Invalid paragraph separator pattern: {}",
                config.paragraph_separator
            )
        })?;

        Ok(Self {
            min_length: config.min_length,
            max_length: config.max_length,
            target_passage_length: config.target_passage_length,
            max_newlines: config.max_newlines,
            separator,
        })
    }

    /// Split text on blank-line boundaries. Spans are returned untrimmed and
    /// may be empty.
    pub fn split_paragraphs<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        // Cloning a Regex shares the compiled program.
        let separator = self.separator.clone();
        Paragraphs {
            separator,
            text,
            pos: 0,
            done: false,
        }
    }

    /// Lazily build the passages of one document.
    ///
    /// The document text is trimmed and accent-stripped up front; paragraphs
    /// are then consumed one at a time as the iterator is driven. Each
    /// yielded record is counted in `histogram`.
    pub fn passages<'a>(
        &'a self,
        doc: &RawDocument,
        histogram: &'a mut LengthHistogram,
    ) -> Passages<'a> {
        Passages {
            builder: self,
            id: doc.id.clone(),
            text: normalize(doc.text.trim()),
            pos: 0,
            done: false,
            current: String::new(),
            current_chars: 0,
            paragraphs: 0,
            emitted: 0,
            histogram,
        }
    }
}

struct Paragraphs<'t> {
    separator: Regex,
    text: &'t str,
    pos: usize,
    done: bool,
}

impl<'t> Iterator for Paragraphs<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.done {
            return None;
        }
        let (span, next_pos) = next_span(&self.separator, self.text, self.pos);
        match next_pos {
            Some(p) => self.pos = p,
            None => self.done = true,
        }
        Some(span)
    }
}

/// The span starting at `pos` up to the next separator, and where the
/// following span begins (`None` once the text is exhausted).
fn next_span<'t>(separator: &Regex, text: &'t str, pos: usize) -> (&'t str, Option<usize>) {
    match separator.find_at(text, pos) {
        Some(m) => (&text[pos..m.start()], Some(m.end())),
        None => (&text[pos..], None),
    }
}

/// Passages of a single document, produced on demand.
///
/// Owns the normalized text and the accumulator; consuming it once is the
/// only supported use.
pub struct Passages<'a> {
    builder: &'a PassageBuilder,
    id: String,
    text: String,
    pos: usize,
    done: bool,
    current: String,
    current_chars: usize,
    paragraphs: u64,
    emitted: u64,
    histogram: &'a mut LengthHistogram,
}

impl Passages<'_> {
    /// Paragraphs consumed so far. Equals the document's paragraph count
    /// once the iterator is exhausted.
    pub fn paragraph_count(&self) -> u64 {
        self.paragraphs
    }

    /// Passages yielded so far.
    pub fn passage_count(&self) -> u64 {
        self.emitted
    }

    fn reset(&mut self) {
        self.current.clear();
        self.current_chars = 0;
    }

    /// Consume the buffered passage. Returns the trimmed text if it passes
    /// the newline and emptiness filters.
    fn take_passage(&mut self) -> Option<String> {
        let trimmed = self.current.trim();
        let keep = !trimmed.is_empty()
            && trimmed.matches('\n').count() <= self.builder.max_newlines;
        let passage = keep.then(|| trimmed.to_string());
        self.reset();
        passage
    }
}

impl Iterator for Passages<'_> {
    type Item = PassageRecord;

    fn next(&mut self) -> Option<PassageRecord> {
        while !self.done {
            let (para, next_pos) = next_span(&self.builder.separator, &self.text, self.pos);
            let para_chars = para.chars().count();
            // None: dropped with the buffer. Some(false): skipped.
            let accepted = if para_chars > self.builder.max_length {
                None
            } else if self.current.is_empty() && para_chars < self.builder.min_length {
                Some(false)
            } else {
                self.current.push_str(para);
                self.current.push_str(PARAGRAPH_JOINER);
                Some(true)
            };

            match next_pos {
                Some(p) => self.pos = p,
                None => self.done = true,
            }
            self.paragraphs += 1;

            match accepted {
                None => {
                    self.reset();
                    continue;
                }
                Some(false) => continue,
                Some(true) => {
                    self.current_chars += para_chars + PARAGRAPH_JOINER.len();
                }
            }

            if self.current_chars >= self.builder.target_passage_length {
                if let Some(contents) = self.take_passage() {
                    self.histogram.record(contents.chars().count());
                    self.emitted += 1;
                    return Some(PassageRecord {
                        id: self.id.clone(),
                        contents,
                    });
                }
            }
        }

        // A partial passage at the end of the document is dropped.
        self.reset();
        None
    }
}
