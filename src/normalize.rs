//! Accent stripping.
//!
//! Text is decomposed with NFKD and every combining mark is dropped, so
//! `"café"` and `"cafe\u{301}"` both become `"cafe"`.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Decompose `text` and remove all characters with a non-zero canonical
/// combining class.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect()
}
