//! Coarse detection of the query language carried by a payload

use serde::{Deserialize, Serialize};

/// Query language of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Sql,
    Mongo,
    Elastic,
}

impl QueryKind {
    /// Classify a raw query string.
    ///
    /// Document-store shell syntax (`{...}` or `db.collection...`) and
    /// search-engine request syntax (`[...]`, `GET ...`, `POST ...`) are
    /// recognised; everything else is treated as SQL. A `db.` prefix only
    /// counts at the very start, since `FROM db.table` is ordinary SQL.
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim();

        if trimmed.starts_with('{') || trimmed.starts_with("db.") {
            QueryKind::Mongo
        } else if trimmed.starts_with('[')
            || trimmed.starts_with("GET ")
            || trimmed.starts_with("POST ")
        {
            QueryKind::Elastic
        } else {
            QueryKind::Sql
        }
    }

    /// Whether the payload should go through the SQL lineage engine
    pub fn is_sql(self) -> bool {
        self == QueryKind::Sql
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::Sql => write!(f, "sql"),
            QueryKind::Mongo => write!(f, "mongo"),
            QueryKind::Elastic => write!(f, "elastic"),
        }
    }
}
