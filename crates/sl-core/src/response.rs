//! Response envelope returned by batch runs, the CLI and the HTTP server

use serde::{Deserialize, Serialize};
use sl_sql::LineageRow;

/// `{success, message, total_records, lineage_data}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageResponse {
    pub success: bool,
    pub message: String,
    pub total_records: usize,
    pub lineage_data: Vec<LineageRow>,
}

impl LineageResponse {
    /// Envelope over `rows`; `total_records` always equals the row count
    pub fn new(success: bool, message: impl Into<String>, rows: Vec<LineageRow>) -> Self {
        Self {
            success,
            message: message.into(),
            total_records: rows.len(),
            lineage_data: rows,
        }
    }

    /// Failed envelope with no rows
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(false, message, Vec::new())
    }
}
