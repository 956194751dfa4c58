//! Closed remark taxonomy attached to lineage rows

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Kind of JOIN a column was seen in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Semi,
    Anti,
}

impl JoinKind {
    /// Uppercase keyword used in the `join_type:<KIND>` remark
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
            JoinKind::Semi => "SEMI",
            JoinKind::Anti => "ANTI",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinKind {
    type Err = UnknownRemark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "RIGHT" => Ok(JoinKind::Right),
            "FULL" => Ok(JoinKind::Full),
            "CROSS" => Ok(JoinKind::Cross),
            "SEMI" => Ok(JoinKind::Semi),
            "ANTI" => Ok(JoinKind::Anti),
            _ => Err(UnknownRemark(format!("join_type:{s}"))),
        }
    }
}

/// A remark describing how a lineage row was resolved.
///
/// Serialized as its exact taxonomy string; `JoinType` renders as
/// `join_type:<KIND>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Remark {
    AllColumnsSelected,
    ColumnSelected,
    ColumnSelectedWithDatabase,
    ColumnSelectedDatabaseNotSpecified,
    TableNameAmbiguous,
    DatabaseNotSpecifiedInQuery,
    InnerQueryAliasLayer,
    SubqueryLayer,
    DerivedExpression,
    CaseExpression,
    WhereClauseColumn,
    GroupByColumn,
    HavingClauseColumn,
    JoinOnClauseColumn,
    JoinEqualityPair,
    JoinType(JoinKind),
    JoinSubqueryWhereColumn,
    FunctionExpression,
    InvalidTableAlias,
    TableNameDerived,
    TechFailure,
}

/// Prefix of the parameterised join remark
const JOIN_TYPE_PREFIX: &str = "join_type:";

impl Remark {
    /// Every fixed remark plus one `join_type` entry per join kind
    pub fn taxonomy() -> Vec<Remark> {
        let mut all = vec![
            Remark::AllColumnsSelected,
            Remark::ColumnSelected,
            Remark::ColumnSelectedWithDatabase,
            Remark::ColumnSelectedDatabaseNotSpecified,
            Remark::TableNameAmbiguous,
            Remark::DatabaseNotSpecifiedInQuery,
            Remark::InnerQueryAliasLayer,
            Remark::SubqueryLayer,
            Remark::DerivedExpression,
            Remark::CaseExpression,
            Remark::WhereClauseColumn,
            Remark::GroupByColumn,
            Remark::HavingClauseColumn,
            Remark::JoinOnClauseColumn,
            Remark::JoinEqualityPair,
        ];
        all.extend(
            [
                JoinKind::Inner,
                JoinKind::Left,
                JoinKind::Right,
                JoinKind::Full,
                JoinKind::Cross,
                JoinKind::Semi,
                JoinKind::Anti,
            ]
            .map(Remark::JoinType),
        );
        all.extend([
            Remark::JoinSubqueryWhereColumn,
            Remark::FunctionExpression,
            Remark::InvalidTableAlias,
            Remark::TableNameDerived,
            Remark::TechFailure,
        ]);
        all
    }

    fn fixed_str(self) -> Option<&'static str> {
        let s = match self {
            Remark::AllColumnsSelected => "all_columns_selected",
            Remark::ColumnSelected => "column_selected",
            Remark::ColumnSelectedWithDatabase => "column_selected_with_database",
            Remark::ColumnSelectedDatabaseNotSpecified => "column_selected_database_not_specified",
            Remark::TableNameAmbiguous => "table_name_ambiguous",
            Remark::DatabaseNotSpecifiedInQuery => "database_not_specified_in_query",
            Remark::InnerQueryAliasLayer => "inner_query_alias_layer",
            Remark::SubqueryLayer => "subquery_layer",
            Remark::DerivedExpression => "derived_expression",
            Remark::CaseExpression => "case_expression",
            Remark::WhereClauseColumn => "where_clause_column",
            Remark::GroupByColumn => "group_by_column",
            Remark::HavingClauseColumn => "having_clause_column",
            Remark::JoinOnClauseColumn => "join_on_clause_column",
            Remark::JoinEqualityPair => "join_equality_pair",
            Remark::JoinType(_) => return None,
            Remark::JoinSubqueryWhereColumn => "join_subquery_where_column",
            Remark::FunctionExpression => "function_expression",
            Remark::InvalidTableAlias => "invalid_table_alias",
            Remark::TableNameDerived => "table_name_derived",
            Remark::TechFailure => "tech_failure",
        };
        Some(s)
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remark::JoinType(kind) => write!(f, "{JOIN_TYPE_PREFIX}{kind}"),
            other => f.write_str(other.fixed_str().unwrap_or_default()),
        }
    }
}

/// A string that is not part of the remark taxonomy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRemark(pub String);

impl fmt::Display for UnknownRemark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown remark '{}'", self.0)
    }
}

impl std::error::Error for UnknownRemark {}

impl FromStr for Remark {
    type Err = UnknownRemark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = s.strip_prefix(JOIN_TYPE_PREFIX) {
            return kind.parse().map(Remark::JoinType);
        }
        Remark::taxonomy()
            .into_iter()
            .find(|remark| remark.fixed_str() == Some(s))
            .ok_or_else(|| UnknownRemark(s.to_string()))
    }
}

impl Serialize for Remark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Remark {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[path = "remark_test.rs"]
mod tests;
