//! SQL dialect abstraction

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    DatabricksDialect as SqlParserDatabricks, Dialect, DuckDbDialect as SqlParserDuckDb,
    GenericDialect as SqlParserGeneric, HiveDialect as SqlParserHive,
    MySqlDialect as SqlParserMySql, PostgreSqlDialect as SqlParserPostgres,
    SnowflakeDialect as SqlParserSnowflake,
};
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};

/// Parser recursion budget used when no limit is configured.
///
/// Each nested query costs the parser about two levels, so this admits
/// roughly a dozen levels of subqueries. sqlparser's own default of 50 can
/// overflow a 2 MiB thread stack in unoptimized builds first.
pub const DEFAULT_RECURSION_LIMIT: usize = 26;

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        self.parse_with_limit(sql, DEFAULT_RECURSION_LIMIT)
    }

    /// Parse SQL, failing once the parser recurses deeper than
    /// `recursion_limit` instead of exhausting the stack
    fn parse_with_limit(&self, sql: &str, recursion_limit: usize) -> SqlResult<Vec<Statement>> {
        Parser::new(self.parser_dialect())
            .with_recursion_limit(recursion_limit)
            .try_with_sql(sql)
            .and_then(|mut parser| parser.parse_statements())
            .map_err(|e| {
                let message = e.to_string();
                SqlError::ParseError {
                    dialect: self.name(),
                    line: number_after(&message, "Line: ").unwrap_or(0),
                    column: number_after(&message, "Column: ").unwrap_or(0),
                    message,
                }
            })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Integer following `label` in a sqlparser error message.
///
/// `ParserError` carries no structured location; its text ends with
/// "... at Line: X, Column: Y".
fn number_after(message: &str, label: &str) -> Option<usize> {
    let start = message.rfind(label)? + label.len();
    let digits: String = message[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Declares a unit dialect wrapper around a sqlparser dialect.
macro_rules! sql_dialect {
    ($(#[$meta:meta])* $name:ident, $inner:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name {
            dialect: $inner,
        }

        impl $name {
            /// Create a new dialect
            pub fn new() -> Self {
                Self { dialect: $inner {} }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl SqlDialect for $name {
            fn parser_dialect(&self) -> &dyn Dialect {
                &self.dialect
            }

            fn name(&self) -> &'static str {
                $label
            }
        }
    };
}

sql_dialect!(
    /// ANSI-leaning dialect that accepts most common syntax
    GenericDialect,
    SqlParserGeneric,
    "generic"
);
sql_dialect!(
    /// Spark SQL, parsed with the Databricks grammar
    SparkDialect,
    SqlParserDatabricks,
    "spark"
);
sql_dialect!(
    /// Hive QL
    HiveDialect,
    SqlParserHive,
    "hive"
);
sql_dialect!(
    /// DuckDB SQL dialect
    DuckDbDialect,
    SqlParserDuckDb,
    "duckdb"
);
sql_dialect!(
    /// Snowflake SQL dialect
    SnowflakeDialect,
    SqlParserSnowflake,
    "snowflake"
);
sql_dialect!(
    /// MySQL dialect
    MySqlDialect,
    SqlParserMySql,
    "mysql"
);
sql_dialect!(
    /// PostgreSQL dialect
    PostgresDialect,
    SqlParserPostgres,
    "postgres"
);

/// Dialect selector used by configuration and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Generic,
    Spark,
    Hive,
    DuckDb,
    Snowflake,
    MySql,
    Postgres,
}

impl DialectKind {
    /// Every supported dialect, in display order
    pub const ALL: [DialectKind; 7] = [
        DialectKind::Generic,
        DialectKind::Spark,
        DialectKind::Hive,
        DialectKind::DuckDb,
        DialectKind::Snowflake,
        DialectKind::MySql,
        DialectKind::Postgres,
    ];

    /// Build the dialect implementation for this kind
    pub fn dialect(self) -> Box<dyn SqlDialect> {
        match self {
            DialectKind::Generic => Box::new(GenericDialect::new()),
            DialectKind::Spark => Box::new(SparkDialect::new()),
            DialectKind::Hive => Box::new(HiveDialect::new()),
            DialectKind::DuckDb => Box::new(DuckDbDialect::new()),
            DialectKind::Snowflake => Box::new(SnowflakeDialect::new()),
            DialectKind::MySql => Box::new(MySqlDialect::new()),
            DialectKind::Postgres => Box::new(PostgresDialect::new()),
        }
    }

    /// The lowercase name used in config files
    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::Generic => "generic",
            DialectKind::Spark => "spark",
            DialectKind::Hive => "hive",
            DialectKind::DuckDb => "duckdb",
            DialectKind::Snowflake => "snowflake",
            DialectKind::MySql => "mysql",
            DialectKind::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" | "ansi" => Ok(DialectKind::Generic),
            "spark" | "databricks" => Ok(DialectKind::Spark),
            "hive" => Ok(DialectKind::Hive),
            "duckdb" => Ok(DialectKind::DuckDb),
            "snowflake" => Ok(DialectKind::Snowflake),
            "mysql" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            _ => Err(SqlError::UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
