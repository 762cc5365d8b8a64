//! Input discovery and decoding.
//!
//! The `--wikiextracted` argument may name a single file, a directory
//! (walked recursively), or a glob such as `dumps/**/wiki_*`. Files ending
//! in `.gz` are decompressed on the fly; everything else is read as UTF-8
//! JSON lines.

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use globset::{GlobBuilder, GlobMatcher};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::models::RawDocument;

/// Resolve an input spec to a sorted list of files.
pub fn scan_inputs(spec: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(spec);

    let mut files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        walk_files(path, None)?
    } else if is_glob(spec) {
        // `*` stays within one path component; `**` recurses.
        let matcher = GlobBuilder::new(spec)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid input pattern: {}", spec))?
            .compile_matcher();
        walk_files(&glob_root(path), Some(&matcher))?
    } else {
        bail!("Input path does not exist: {}", spec);
    };

    if files.is_empty() {
        bail!("No input files found for: {}", spec);
    }

    // Sort for deterministic ordering
    files.sort();
    Ok(files)
}

fn walk_files(root: &Path, matcher: Option<&GlobMatcher>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(m) = matcher {
            if !m.is_match(entry.path()) {
                continue;
            }
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_glob(spec: &str) -> bool {
    spec.contains(['*', '?', '[', '{'])
}

/// The longest leading run of literal components of a glob pattern.
fn glob_root(pattern: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for comp in pattern.components() {
        if let Component::Normal(part) = comp {
            if is_glob(&part.to_string_lossy()) {
                break;
            }
        }
        root.push(comp);
    }
    if root.as_os_str().is_empty() {
        root.push(".");
    }
    root
}

fn open_lines(path: &Path) -> Result<Lines<Box<dyn BufRead>>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?;
    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader.lines())
}

/// Streams [`RawDocument`]s from a list of files, in file-then-line order.
///
/// Blank lines are skipped. Any other line that is not a JSON object with
/// string `id` and `text` fields yields an error naming the file and line;
/// the reader stops after the first error.
pub struct DocumentReader {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<(PathBuf, Lines<Box<dyn BufRead>>)>,
    line_no: usize,
    failed: bool,
}

impl DocumentReader {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            line_no: 0,
            failed: false,
        }
    }

    fn next_document(&mut self) -> Result<Option<RawDocument>> {
        loop {
            if self.current.is_none() {
                let Some(path) = self.files.next() else {
                    return Ok(None);
                };
                let lines = open_lines(&path)?;
                self.current = Some((path, lines));
                self.line_no = 0;
            }
            let Some((path, lines)) = self.current.as_mut() else {
                continue;
            };

            let Some(line) = lines.next() else {
                self.current = None;
                continue;
            };
            self.line_no += 1;

            let line = line.with_context(|| {
                format!("Failed to read {} line {}", path.display(), self.line_no)
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let doc: RawDocument = serde_json::from_str(&line).with_context(|| {
                format!("Malformed document at {} line {}", path.display(), self.line_no)
            })?;
            return Ok(Some(doc));
        }
    }
}

impl Iterator for DocumentReader {
    type Item = Result<RawDocument>;

    fn next(&mut self) -> Option<Result<RawDocument>> {
        if self.failed {
            return None;
        }
        match self.next_document() {
            Ok(doc) => doc.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
