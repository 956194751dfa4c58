//! sl-sql - SQL layer for sqllineage
//!
//! This crate provides SQL parsing using sqlparser-rs with dialect support
//! and a column-level lineage engine that resolves every column reference
//! of a query to its source database, table and alias.

pub mod dialect;
pub mod error;
pub mod lineage;
pub mod parser;
pub mod query_kind;

pub use dialect::{DialectKind, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use lineage::{
    deduplicate, extract_lineage_rows, JoinKind, LineageExtractor, LineageOptions, LineageRow,
    LineageTags, Remark,
};
pub use parser::SqlParser;
pub use query_kind::QueryKind;
