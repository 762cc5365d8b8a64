//! Passage length distribution.
//!
//! Lengths are bucketed by `floor(log2(len))`, so bucket `i` covers
//! `2^i ..= 2^(i+1) - 1` characters. Anything past the last bucket is
//! counted in the last bucket.

/// Fixed-size log2 histogram of emitted passage lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthHistogram {
    counts: Vec<u64>,
}

/// A non-empty histogram bucket, as reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBucket {
    pub lo: u64,
    pub hi: u64,
    pub count: u64,
}

impl LengthHistogram {
    pub fn new(buckets: usize) -> Self {
        Self {
            counts: vec![0; buckets.max(1)],
        }
    }

    /// Index of the bucket that `len` falls into.
    pub fn bucket_index(&self, len: usize) -> usize {
        // Zero-length passages are never emitted; park them with the 1s.
        let idx = if len == 0 { 0 } else { len.ilog2() as usize };
        idx.min(self.counts.len() - 1)
    }

    pub fn record(&mut self, len: usize) {
        let idx = self.bucket_index(len);
        self.counts[idx] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Non-empty buckets in ascending length order.
    pub fn buckets(&self) -> impl Iterator<Item = LengthBucket> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, &count)| LengthBucket {
                lo: 1u64 << i,
                hi: (1u64 << i).saturating_mul(2).saturating_sub(1),
                count,
            })
    }
}
