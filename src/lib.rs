//! # Wiki Passages
//!
//! Turns WikiExtractor JSON-lines output into fixed-size passages for
//! retrieval indexing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Input files │──▶│ Normalize │──▶│ Passage      │──▶│ Gzip shards  │
//! │ (.gz/plain) │   │ (NFKD)    │   │ builder      │   │ N.jsonl.gz   │
//! └─────────────┘   └───────────┘   └──────┬───────┘   └──────────────┘
//!                                          ▼
//!                                   length histogram
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! create-passages --wikiextracted text/ --output passages/
//! create-passages --wikiextracted 'text/**/wiki_*' --output passages/ \
//!     --target_passage_length 0 --progress json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and defaults |
//! | [`models`] | Input documents and output passage records |
//! | [`normalize`] | Accent stripping |
//! | [`chunk`] | Paragraph splitting and passage building |
//! | [`stats`] | Passage length histogram |
//! | [`connector_fs`] | Input discovery and JSON-lines decoding |
//! | [`export`] | Sharded gzip output |
//! | [`progress`] | Progress reporting on stderr |
//! | [`ingest`] | Run orchestration |

pub mod chunk;
pub mod config;
pub mod connector_fs;
pub mod export;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod stats;
