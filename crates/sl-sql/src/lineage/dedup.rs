//! Row de-duplication

use std::collections::HashSet;

use super::row::LineageRow;

/// Normalize remarks, drop placeholder `*` rows, and drop rows equal in
/// every field to an earlier one. First-occurrence order is kept.
pub fn deduplicate(rows: Vec<LineageRow>) -> Vec<LineageRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .map(LineageRow::normalized)
        .filter(|row| !row.is_placeholder_star())
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::remark::Remark;
    use crate::lineage::row::{LineageTags, RowSource};

    fn row(database: &str, table: &str, column: &str, remarks: Vec<Remark>) -> LineageRow {
        let source = RowSource {
            database: database.to_string(),
            table: table.to_string(),
            table_alias: String::new(),
        };
        LineageRow::new(source, column, "", &LineageTags::new("gdpr", "k1", "v1"), remarks)
    }

    #[test]
    fn test_drops_exact_duplicates_keeping_order() {
        let rows = vec![
            row("db", "t", "a", vec![Remark::ColumnSelectedWithDatabase]),
            row("db", "t", "b", vec![Remark::ColumnSelectedWithDatabase]),
            row("db", "t", "a", vec![Remark::ColumnSelectedWithDatabase]),
        ];
        let out = deduplicate(rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].column_name, "a");
        assert_eq!(out[1].column_name, "b");
    }

    #[test]
    fn test_rows_differing_in_remarks_are_kept() {
        let rows = vec![
            row("db", "t", "a", vec![Remark::WhereClauseColumn]),
            row("db", "t", "a", vec![Remark::GroupByColumn]),
        ];
        assert_eq!(deduplicate(rows).len(), 2);
    }

    #[test]
    fn test_drops_placeholder_star() {
        let rows = vec![
            row("", "", "*", vec![Remark::AllColumnsSelected]),
            row("db", "t", "*", vec![Remark::AllColumnsSelected]),
        ];
        let out = deduplicate(rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].table_name, "t");
    }

    #[test]
    fn test_keeps_tech_failure_row() {
        let tags = LineageTags::new("gdpr", "k1", "v1");
        let out = deduplicate(vec![LineageRow::tech_failure(&tags)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].remarks, vec![Remark::TechFailure]);
    }

    #[test]
    fn test_normalizes_repeated_remarks() {
        let rows = vec![row(
            "db",
            "t",
            "a",
            vec![
                Remark::DerivedExpression,
                Remark::TableNameDerived,
                Remark::DerivedExpression,
            ],
        )];
        let out = deduplicate(rows);
        assert_eq!(
            out[0].remarks,
            vec![Remark::DerivedExpression, Remark::TableNameDerived]
        );
    }
}
