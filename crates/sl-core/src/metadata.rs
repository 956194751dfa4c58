//! View queries embedded in metadata documents
//!
//! Metadata arrives as arbitrary JSON. Any object carrying a string SQL field
//! (`sql_query` by default) is treated as one view definition, wherever it
//! sits in the document.

use crate::config::MetadataConfig;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `{view_name, sql}` pair found in a metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub view_name: String,
    pub sql: String,
}

/// Parse metadata text as JSON
pub fn parse_metadata(text: &str) -> CoreResult<Value> {
    serde_json::from_str(text).map_err(CoreError::MetadataParse)
}

/// Collect every view query in `value`, in document order.
///
/// An object holding the SQL key is taken as a whole and not searched
/// further. A non-empty `view_filter` keeps only the listed views.
pub fn find_view_queries(
    value: &Value,
    keys: &MetadataConfig,
    view_filter: &[String],
) -> Vec<ViewQuery> {
    let mut found = Vec::new();
    collect(value, keys, &mut found);
    if !view_filter.is_empty() {
        found.retain(|query| view_filter.iter().any(|v| *v == query.view_name));
    }
    log::debug!("Found {} view queries in metadata", found.len());
    found
}

fn collect(value: &Value, keys: &MetadataConfig, out: &mut Vec<ViewQuery>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(sql)) = map.get(&keys.sql_key) {
                let view_name = map
                    .get(&keys.view_key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                out.push(ViewQuery {
                    view_name,
                    sql: sql.clone(),
                });
                return;
            }
            for child in map.values() {
                collect(child, keys, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, keys, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
