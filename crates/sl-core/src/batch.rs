//! Batch lineage over the view queries of a metadata document

use crate::config::MetadataConfig;
use crate::metadata::{find_view_queries, ViewQuery};
use crate::request::LineageRequest;
use crate::response::LineageResponse;
use serde_json::Value;
use sl_sql::{deduplicate, LineageExtractor, LineageRow, LineageTags, QueryKind, Remark};

/// Per-view outcome counts for one batch
#[derive(Debug, Default)]
struct BatchSummary {
    processed: usize,
    failed: Vec<String>,
    skipped: Vec<String>,
}

impl BatchSummary {
    fn message(&self) -> String {
        let mut message = success_message(self.processed - self.failed.len());
        if !self.failed.is_empty() {
            message.push_str(&format!(
                "; {} failed to parse: {}",
                self.failed.len(),
                self.failed.join(", ")
            ));
        }
        if !self.skipped.is_empty() {
            message.push_str(&format!(
                "; skipped {} non-SQL {}: {}",
                self.skipped.len(),
                plural(self.skipped.len(), "view", "views"),
                self.skipped.join(", ")
            ));
        }
        message
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn success_message(count: usize) -> String {
    format!(
        "Successfully extracted lineage for {} SQL {}",
        count,
        plural(count, "query", "queries")
    )
}

fn is_tech_failure(rows: &[LineageRow]) -> bool {
    rows.iter().any(|row| row.has_remark(Remark::TechFailure))
}

/// Run lineage extraction for every SQL view query.
///
/// Mongo and Elastic payloads are skipped. Rows from all views are
/// concatenated and de-duplicated again. The envelope fails when any view
/// could not be parsed.
pub fn run_batch(
    extractor: &LineageExtractor,
    request: &LineageRequest,
    queries: &[ViewQuery],
) -> LineageResponse {
    let mut summary = BatchSummary::default();
    let mut rows = Vec::new();

    for query in queries {
        let kind = QueryKind::detect(&query.sql);
        if !kind.is_sql() {
            log::info!("Skipping {} view '{}'", kind, query.view_name);
            summary.skipped.push(query.view_name.clone());
            continue;
        }

        let view_rows = extractor.extract(&query.sql, &request.tags_for(&query.view_name));
        summary.processed += 1;
        if is_tech_failure(&view_rows) {
            summary.failed.push(query.view_name.clone());
        }
        rows.extend(view_rows);
    }

    let rows = deduplicate(rows);
    log::info!(
        "Batch finished: {} views processed, {} failed, {} skipped, {} rows",
        summary.processed,
        summary.failed.len(),
        summary.skipped.len(),
        rows.len()
    );
    LineageResponse::new(summary.failed.is_empty(), summary.message(), rows)
}

/// Validate `request`, collect the view queries of `document` and run them
pub fn run_metadata(
    extractor: &LineageExtractor,
    request: &LineageRequest,
    document: &Value,
    keys: &MetadataConfig,
) -> LineageResponse {
    if let Err(e) = request.validate() {
        return LineageResponse::error(e.to_string());
    }
    let queries = find_view_queries(document, keys, &request.view_filter());
    run_batch(extractor, request, &queries)
}

/// Envelope for a single SQL text
pub fn respond_single(
    extractor: &LineageExtractor,
    sql: &str,
    tags: &LineageTags,
) -> LineageResponse {
    let rows = extractor.extract(sql, tags);
    if is_tech_failure(&rows) {
        let message = format!("Failed to parse SQL for view '{}'", tags.view_name);
        return LineageResponse::new(false, message, rows);
    }
    LineageResponse::new(true, success_message(1), rows)
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
