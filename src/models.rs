//! Core data models used throughout the passage pipeline.
//!
//! Documents come in as WikiExtractor JSON lines and leave as passage
//! records, one JSON object per line.

use serde::{Deserialize, Serialize};

/// One article as written by WikiExtractor.
///
/// Only `id` and `text` are required. Other fields (`revid`, `url`,
/// `title`, ...) are accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
}

/// A passage written to an output shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub id: String,
    pub contents: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_document_ignores_extra_fields() {
        let line = r#"{"id": "12", "revid": "99", "url": "https://en.wikipedia.org/wiki?curid=12", "title": "Anarchism", "text": "Body"}"#;
        let doc: RawDocument = serde_json::from_str(line).unwrap();
        assert_eq!(doc.id, "12");
        assert_eq!(doc.text, "Body");
    }

    #[test]
    fn raw_document_requires_text() {
        let err = serde_json::from_str::<RawDocument>(r#"{"id": "12"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn raw_document_rejects_numeric_id() {
        let err = serde_json::from_str::<RawDocument>(r#"{"id": 12, "text": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn passage_record_field_order() {
        let rec = PassageRecord {
            id: "A".to_string(),
            contents: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&rec).unwrap(),
            r#"{"id":"A","contents":"hello"}"#
        );
    }
}
