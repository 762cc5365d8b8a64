//! Run progress reporting.
//!
//! Reports periodic document throughput and the end-of-run passage length
//! distribution. Progress is emitted on **stderr** so stdout remains
//! parseable for scripts.

use std::io::Write;
use std::time::{Duration, Instant};

/// A single progress event.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Periodic throughput line.
    Documents {
        n: u64,
        docs_per_sec: f64,
        paragraphs_per_doc: f64,
        passages_per_doc: f64,
    },
    /// One non-empty bucket of the passage length histogram.
    LengthBucket { lo: u64, hi: u64, count: u64 },
}

/// Reports run progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter {
    /// Emit a progress event. Called from the passage pipeline.
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "documents  1,234  (812.4/s)  paragraphs/doc 9.21  passages/doc 3.02".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Documents {
                n,
                docs_per_sec,
                paragraphs_per_doc,
                passages_per_doc,
            } => format!(
                "documents  {}  ({:.1}/s)  paragraphs/doc {:.2}  passages/doc {:.2}\n",
                format_number(*n),
                docs_per_sec,
                paragraphs_per_doc,
                passages_per_doc
            ),
            ProgressEvent::LengthBucket { lo, hi, count } => format!(
                "Passage length {}-{}: {}\n",
                lo,
                hi,
                format_number(*count)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Documents {
                n,
                docs_per_sec,
                paragraphs_per_doc,
                passages_per_doc,
            } => serde_json::json!({
                "event": "progress",
                "documents": n,
                "docs_per_sec": docs_per_sec,
                "paragraphs_per_doc": paragraphs_per_doc,
                "passages_per_doc": passages_per_doc
            }),
            ProgressEvent::LengthBucket { lo, hi, count } => serde_json::json!({
                "event": "length_bucket",
                "lo": lo,
                "hi": hi,
                "count": count
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

/// Exponential moving average that behaves as a plain mean until `window`
/// samples have been seen.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: u64,
    seen: u64,
    value: f64,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1) as u64,
            seen: 0,
            value: 0.0,
        }
    }

    pub fn add(&mut self, sample: f64) {
        self.seen += 1;
        let weight = 1.0 / self.seen.min(self.window) as f64;
        self.value += (sample - self.value) * weight;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Decides when the next periodic progress line is due.
#[derive(Debug)]
pub struct ReportTimer {
    start: Instant,
    interval: Duration,
    next_due: Instant,
}

impl ReportTimer {
    pub fn new(interval: Duration) -> Self {
        let start = Instant::now();
        Self {
            start,
            interval,
            next_due: start + interval,
        }
    }

    /// True at most once per interval.
    pub fn is_time(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next_due {
            self.next_due = now + self.interval;
            true
        } else {
            false
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1), "1");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn moving_average_is_mean_before_window_fills() {
        let mut avg = MovingAverage::new(10);
        for x in [2.0, 4.0, 6.0] {
            avg.add(x);
        }
        assert!((avg.value() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn moving_average_tracks_recent_values() {
        let mut avg = MovingAverage::new(4);
        for _ in 0..4 {
            avg.add(0.0);
        }
        for _ in 0..100 {
            avg.add(8.0);
        }
        assert!((avg.value() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn zero_interval_timer_always_due() {
        let mut timer = ReportTimer::new(Duration::ZERO);
        assert!(timer.is_time());
        assert!(timer.is_time());
    }

    #[test]
    fn long_interval_timer_not_due() {
        let mut timer = ReportTimer::new(Duration::from_secs(3600));
        assert!(!timer.is_time());
    }
}
