// ============================================================
// REVIEW TABLE DOMAIN LAYER
// ============================================================
// Decoded tabular input: header row plus one row per review
// No I/O, no async

mod ingest_config;
mod review_row;

pub use ingest_config::IngestConfig;
pub use review_row::{CsvField, ReviewRow, ReviewTable};
