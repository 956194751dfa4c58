//! Lineage output rows

use serde::{Deserialize, Serialize};

use super::remark::Remark;

/// Caller-supplied tags copied onto every row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageTags {
    pub regulation: String,
    pub metadatakey: String,
    pub view_name: String,
}

impl LineageTags {
    /// Create tags from borrowed strings
    pub fn new(regulation: &str, metadatakey: &str, view_name: &str) -> Self {
        Self {
            regulation: regulation.to_string(),
            metadatakey: metadatakey.to_string(),
            view_name: view_name.to_string(),
        }
    }
}

/// Source location a row is attributed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RowSource {
    pub database: String,
    pub table: String,
    pub table_alias: String,
}

/// One column-level lineage record.
///
/// Field order matches the serialized output. String fields are never
/// absent; unresolved parts are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageRow {
    pub database_name: String,
    pub table_name: String,
    pub table_alias_name: String,
    pub column_name: String,
    pub alias_name: String,
    pub regulation: String,
    pub metadatakey: String,
    pub view_name: String,
    pub remarks: Vec<Remark>,
}

impl LineageRow {
    pub(crate) fn new(
        source: RowSource,
        column: &str,
        alias: &str,
        tags: &LineageTags,
        remarks: Vec<Remark>,
    ) -> Self {
        Self {
            database_name: source.database,
            table_name: source.table,
            table_alias_name: source.table_alias,
            column_name: column.to_string(),
            alias_name: alias.to_string(),
            regulation: tags.regulation.clone(),
            metadatakey: tags.metadatakey.clone(),
            view_name: tags.view_name.clone(),
            remarks,
        }
    }

    /// The single row returned when SQL cannot be parsed
    pub fn tech_failure(tags: &LineageTags) -> Self {
        Self::new(
            RowSource::default(),
            "",
            "",
            tags,
            vec![Remark::TechFailure],
        )
    }

    /// Whether this row carries the given remark
    pub fn has_remark(&self, remark: Remark) -> bool {
        self.remarks.contains(&remark)
    }

    /// A `*` row with no source information at all
    pub fn is_placeholder_star(&self) -> bool {
        self.column_name == "*"
            && self.database_name.is_empty()
            && self.table_name.is_empty()
            && self.table_alias_name.is_empty()
            && self.alias_name.is_empty()
    }

    /// Drop repeated remarks, keeping the first occurrence of each
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.remarks.len());
        self.remarks.retain(|remark| {
            if seen.contains(remark) {
                false
            } else {
                seen.push(*remark);
                true
            }
        });
        self
    }
}
