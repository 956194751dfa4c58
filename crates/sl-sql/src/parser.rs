//! SQL parser wrapper

use crate::dialect::{DialectKind, SqlDialect, DEFAULT_RECURSION_LIMIT};
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;

/// SQL parser that wraps sqlparser-rs with dialect support
pub struct SqlParser {
    dialect: Box<dyn SqlDialect>,
    recursion_limit: usize,
}

impl SqlParser {
    /// Create a parser for the given dialect kind
    pub fn new(kind: DialectKind) -> Self {
        Self {
            dialect: kind.dialect(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Set how deeply the parser may recurse before rejecting the input
    pub fn with_recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    /// Create a new parser with the generic dialect
    pub fn generic() -> Self {
        Self::new(DialectKind::Generic)
    }

    /// Create a new parser with the Spark dialect
    pub fn spark() -> Self {
        Self::new(DialectKind::Spark)
    }

    /// Create a parser from dialect name
    pub fn from_dialect_name(name: &str) -> SqlResult<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        self.dialect.parse_with_limit(sql, self.recursion_limit)
    }

    /// Parse with this parser, retrying with `fallback` when the first attempt
    /// fails to parse. Empty input is not retried.
    pub fn parse_with_fallback(
        &self,
        sql: &str,
        fallback: Option<&SqlParser>,
    ) -> SqlResult<Vec<Statement>> {
        match (self.parse(sql), fallback) {
            (Err(SqlError::ParseError { message, .. }), Some(fallback)) => {
                log::debug!(
                    "{} parser rejected query ({}), retrying with {}",
                    self.dialect_name(),
                    message,
                    fallback.dialect_name()
                );
                fallback.parse(sql)
            }
            (result, _) => result,
        }
    }

    /// Get the dialect name
    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::generic()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
