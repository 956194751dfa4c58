//! Column-level lineage extraction from SQL AST
//!
//! `extract_lineage_rows` parses SQL, builds alias-resolution scopes, walks
//! every SELECT and emits one [`LineageRow`] per source column reference,
//! annotated with [`Remark`]s explaining how it was resolved.

mod classify;
mod dedup;
mod emit;
mod remark;
mod row;
mod scope;
mod walk;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::parser::SqlParser;

pub use classify::{classify_expr, ColumnRef, Projection};
pub use dedup::deduplicate;
pub use emit::DERIVED_PLACEHOLDER;
pub use remark::{JoinKind, Remark, UnknownRemark};
pub use row::{LineageRow, LineageTags};
pub use scope::{ScopeEntry, SourceKind};

/// Default bound on how deeply nested queries are walked
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Parser recursion budget matching a query nesting bound.
///
/// A derived table costs the parser two levels (table factor and query),
/// plus a handful for the statement and the innermost expressions.
pub fn parser_recursion_limit(max_depth: usize) -> usize {
    max_depth.saturating_mul(2).saturating_add(6)
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_fallback_dialect() -> Option<DialectKind> {
    Some(DialectKind::Spark)
}

/// Parsing and traversal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageOptions {
    /// Dialect tried first
    #[serde(default)]
    pub dialect: DialectKind,

    /// Dialect retried when the first one fails to parse
    #[serde(default = "default_fallback_dialect")]
    pub fallback_dialect: Option<DialectKind>,

    /// Queries nested deeper than this are not traced
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for LineageOptions {
    fn default() -> Self {
        Self {
            dialect: DialectKind::default(),
            fallback_dialect: default_fallback_dialect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Reusable lineage extractor holding the configured parsers
pub struct LineageExtractor {
    parser: SqlParser,
    fallback: Option<SqlParser>,
    max_depth: usize,
}

impl LineageExtractor {
    /// Create an extractor from options
    pub fn new(options: &LineageOptions) -> Self {
        let recursion_limit = parser_recursion_limit(options.max_depth);
        let fallback = options
            .fallback_dialect
            .filter(|kind| *kind != options.dialect)
            .map(|kind| SqlParser::new(kind).with_recursion_limit(recursion_limit));
        Self {
            parser: SqlParser::new(options.dialect).with_recursion_limit(recursion_limit),
            fallback,
            max_depth: options.max_depth,
        }
    }

    /// Name of the primary dialect
    pub fn dialect_name(&self) -> &'static str {
        self.parser.dialect_name()
    }

    /// Extract de-duplicated lineage rows from SQL text.
    ///
    /// Never fails: SQL that cannot be parsed by either dialect yields a
    /// single `tech_failure` row.
    pub fn extract(&self, sql: &str, tags: &LineageTags) -> Vec<LineageRow> {
        let statements = match self.parser.parse_with_fallback(sql, self.fallback.as_ref()) {
            Ok(statements) => statements,
            Err(e) => {
                log::warn!("Lineage extraction failed for view '{}': {}", tags.view_name, e);
                return vec![LineageRow::tech_failure(tags)];
            }
        };

        let rows = statements
            .iter()
            .flat_map(|statement| walk::statement_rows(statement, tags, self.max_depth))
            .collect();
        let rows = deduplicate(rows);
        log::debug!(
            "Extracted {} lineage rows for view '{}'",
            rows.len(),
            tags.view_name
        );
        rows
    }
}

impl Default for LineageExtractor {
    fn default() -> Self {
        Self::new(&LineageOptions::default())
    }
}

/// Extract lineage rows with default options
pub fn extract_lineage_rows(
    sql: &str,
    regulation: &str,
    metadatakey: &str,
    view_name: &str,
) -> Vec<LineageRow> {
    LineageExtractor::default().extract(sql, &LineageTags::new(regulation, metadatakey, view_name))
}

#[cfg(test)]
#[path = "lineage_test.rs"]
mod tests;
