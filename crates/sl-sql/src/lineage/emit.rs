//! Row emission for projections, clause columns and joins

use sqlparser::ast::{
    Expr, Join, JoinConstraint, JoinOperator, Query, Select, SetExpr, TableFactor,
};

use super::classify::{column_refs, equality_operands, ClassifiedItem, ColumnRef, Projection};
use super::remark::{JoinKind, Remark};
use super::row::{LineageRow, LineageTags, RowSource};
use super::scope::{object_name_parts, CteCatalog, Resolution, ScopeEntry, Scopes, TableKey};

/// Table name written for a STAR whose enclosing subquery has no single base
pub const DERIVED_PLACEHOLDER: &str = "__DERIVED__";

impl RowSource {
    fn from_entry(entry: &ScopeEntry) -> Self {
        Self {
            database: entry.database.clone(),
            table: entry.table.clone(),
            table_alias: entry.alias.clone(),
        }
    }
}

/// Row source and failure remark for a resolution outcome
fn attribute(resolution: Resolution<'_>, qualifier: Option<&str>) -> (RowSource, Option<Remark>) {
    match resolution {
        Resolution::Found(entry) if !entry.is_derived => (RowSource::from_entry(entry), None),
        Resolution::Found(entry) => (
            RowSource {
                table: entry.alias.clone(),
                ..RowSource::default()
            },
            Some(Remark::TableNameDerived),
        ),
        Resolution::InvalidAlias => (
            RowSource {
                table_alias: qualifier.unwrap_or_default().to_string(),
                ..RowSource::default()
            },
            Some(Remark::InvalidTableAlias),
        ),
        Resolution::Ambiguous => (RowSource::default(), Some(Remark::TableNameAmbiguous)),
        Resolution::Unresolved => (RowSource::default(), Some(Remark::TableNameDerived)),
    }
}

/// Name a joined source is referred to by: its alias, else its table name
pub(crate) fn factor_alias(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, alias, .. } => alias
            .as_ref()
            .map(|a| a.name.value.clone())
            .or_else(|| object_name_parts(name).pop()),
        TableFactor::Derived { alias, .. } => alias.as_ref().map(|a| a.name.value.clone()),
        _ => None,
    }
}

pub(crate) fn join_kind(operator: &JoinOperator) -> (JoinKind, Option<&JoinConstraint>) {
    match operator {
        JoinOperator::Join(c) | JoinOperator::Inner(c) => (JoinKind::Inner, Some(c)),
        JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => (JoinKind::Left, Some(c)),
        JoinOperator::Right(c) | JoinOperator::RightOuter(c) => (JoinKind::Right, Some(c)),
        JoinOperator::FullOuter(c) => (JoinKind::Full, Some(c)),
        JoinOperator::CrossJoin(c) => (JoinKind::Cross, Some(c)),
        JoinOperator::Semi(c) | JoinOperator::LeftSemi(c) | JoinOperator::RightSemi(c) => {
            (JoinKind::Semi, Some(c))
        }
        JoinOperator::Anti(c) | JoinOperator::LeftAnti(c) | JoinOperator::RightAnti(c) => {
            (JoinKind::Anti, Some(c))
        }
        other => {
            log::debug!("Unrecognized join operator {:?}, treating as INNER JOIN", other);
            (JoinKind::Inner, None)
        }
    }
}

/// First SELECT of a query body, descending the left side of set operations
pub(crate) fn first_select(query: &Query) -> Option<&Select> {
    fn of_set_expr(body: &SetExpr) -> Option<&Select> {
        match body {
            SetExpr::Select(select) => Some(select.as_ref()),
            SetExpr::Query(query) => first_select(query),
            SetExpr::SetOperation { left, .. } => of_set_expr(left),
            _ => None,
        }
    }
    of_set_expr(&query.body)
}

/// Accumulates rows for one statement
pub(crate) struct Emitter<'t> {
    tags: &'t LineageTags,
    rows: Vec<LineageRow>,
}

impl<'t> Emitter<'t> {
    pub fn new(tags: &'t LineageTags) -> Self {
        Self {
            tags,
            rows: Vec::new(),
        }
    }

    pub fn into_rows(self) -> Vec<LineageRow> {
        self.rows
    }

    fn push(&mut self, source: RowSource, column: &str, alias: &str, remarks: Vec<Remark>) {
        self.rows
            .push(LineageRow::new(source, column, alias, self.tags, remarks));
    }

    /// Emit the rows for one SELECT-list item
    pub fn emit_projection(
        &mut self,
        item: &ClassifiedItem,
        scopes: Scopes<'_>,
        enclosing_alias: Option<&str>,
    ) {
        let alias = item.alias.as_deref().unwrap_or_default();
        match &item.projection {
            Projection::Star { qualifier } => {
                self.emit_star(qualifier.as_deref(), scopes, enclosing_alias)
            }
            Projection::Column(column) => {
                let resolution = projection_resolution(column, scopes, enclosing_alias);
                let (source, failure) = attribute(resolution, column.qualifier());
                let remark = failure.unwrap_or(if source.database.is_empty() {
                    Remark::DatabaseNotSpecifiedInQuery
                } else {
                    Remark::ColumnSelectedWithDatabase
                });
                self.push(source, &column.column, alias, vec![remark]);
            }
            Projection::Case(columns) => self.emit_derived(
                columns,
                alias,
                &[Remark::DerivedExpression, Remark::CaseExpression],
                scopes,
                enclosing_alias,
            ),
            Projection::Derived(columns) => self.emit_derived(
                columns,
                alias,
                &[Remark::DerivedExpression],
                scopes,
                enclosing_alias,
            ),
            Projection::FunctionOnly(text) => self.push(
                RowSource::default(),
                text,
                alias,
                vec![Remark::DerivedExpression, Remark::FunctionExpression],
            ),
            Projection::Literal => {}
        }
    }

    fn emit_derived(
        &mut self,
        columns: &[ColumnRef],
        alias: &str,
        tags: &[Remark],
        scopes: Scopes<'_>,
        enclosing_alias: Option<&str>,
    ) {
        for column in columns {
            let resolution = projection_resolution(column, scopes, enclosing_alias);
            let (source, failure) = attribute(resolution, column.qualifier());
            let mut remarks = tags.to_vec();
            remarks.extend(failure);
            self.push(source, &column.column, alias, remarks);
        }
    }

    /// Emit the single row for a `*` or `alias.*` projection
    pub fn emit_star(
        &mut self,
        qualifier: Option<&str>,
        scopes: Scopes<'_>,
        enclosing_alias: Option<&str>,
    ) {
        let mut source = RowSource::default();
        let mut derived = false;
        match scopes.resolve(qualifier) {
            Resolution::Found(entry) => {
                source = RowSource::from_entry(entry);
                derived = entry.is_derived;
            }
            Resolution::InvalidAlias => {
                let source = RowSource {
                    table_alias: qualifier.unwrap_or_default().to_string(),
                    ..RowSource::default()
                };
                let remarks = vec![
                    Remark::AllColumnsSelected,
                    Remark::DatabaseNotSpecifiedInQuery,
                    Remark::InvalidTableAlias,
                ];
                self.push(source, "*", "", remarks);
                return;
            }
            Resolution::Ambiguous | Resolution::Unresolved => {}
        }

        if let Some(enclosing) = enclosing_alias {
            if source.table_alias.is_empty() {
                source.table_alias = enclosing.to_string();
            }
            if source.table.is_empty() {
                match scopes.global.get(enclosing) {
                    Some(entry) if !entry.is_derived => {
                        source.table = entry.table.clone();
                        if source.database.is_empty() {
                            source.database = entry.database.clone();
                        }
                    }
                    _ => {
                        source.table = DERIVED_PLACEHOLDER.to_string();
                        derived = true;
                    }
                }
            }
        }

        let mut remarks = vec![Remark::AllColumnsSelected];
        if source.database.is_empty() {
            remarks.push(Remark::DatabaseNotSpecifiedInQuery);
        }
        if derived {
            remarks.push(Remark::TableNameDerived);
        }
        self.push(source, "*", "", remarks);
    }

    /// Emit the dataset-level row for `SELECT * FROM (subquery) alias`
    pub fn emit_dataset_lineage(&mut self, alias: &str, base: Option<TableKey>) {
        let source = match base {
            Some(key) => RowSource {
                database: key.database,
                table: key.table,
                table_alias: alias.to_string(),
            },
            None => RowSource {
                table: alias.to_string(),
                ..RowSource::default()
            },
        };
        self.push(
            source,
            "*",
            "",
            vec![Remark::AllColumnsSelected, Remark::TableNameDerived],
        );
    }

    /// Emit one row for a column seen in a WHERE, GROUP BY, HAVING or JOIN
    /// clause.
    ///
    /// A non-empty explicit table wins outright; otherwise the qualifier is
    /// looked up, then `fallback_alias`, then the sole local and global
    /// sources.
    pub fn emit_clause_column(
        &mut self,
        column: &ColumnRef,
        scopes: Scopes<'_>,
        fallback_alias: Option<&str>,
        tags: &[Remark],
        explicit: Option<&RowSource>,
    ) {
        if let Some(explicit) = explicit.filter(|source| !source.table.is_empty()) {
            self.push(explicit.clone(), &column.column, "", tags.to_vec());
            return;
        }
        let resolution = scopes.resolve_with_fallback(column.qualifier(), fallback_alias);
        let (source, failure) = attribute(resolution, column.qualifier());
        let mut remarks = tags.to_vec();
        remarks.extend(failure);
        self.push(source, &column.column, "", remarks);
    }

    /// Emit rows for every column of a predicate
    pub fn emit_clause(
        &mut self,
        expr: &Expr,
        scopes: Scopes<'_>,
        fallback_alias: Option<&str>,
        remark: Remark,
    ) {
        for column in column_refs(expr) {
            self.emit_clause_column(&column, scopes, fallback_alias, &[remark], None);
        }
    }

    /// Emit rows for one JOIN: its ON or USING columns, plus the WHERE
    /// columns of a joined subquery. `left_alias` names the source the join
    /// attaches to.
    pub fn emit_join(
        &mut self,
        join: &Join,
        left_alias: Option<&str>,
        scopes: Scopes<'_>,
        ctes: &CteCatalog,
    ) {
        let (kind, constraint) = join_kind(&join.join_operator);
        let right_alias = factor_alias(&join.relation);
        let tags = [Remark::JoinOnClauseColumn, Remark::JoinType(kind)];

        match constraint {
            Some(JoinConstraint::On(expr)) => {
                let columns = column_refs(expr).into_iter().chain(equality_operands(expr));
                for column in columns {
                    self.emit_clause_column(&column, scopes, right_alias.as_deref(), &tags, None);
                }
            }
            Some(JoinConstraint::Using(names)) => {
                for name in names {
                    let column =
                        ColumnRef::simple(&object_name_parts(name).pop().unwrap_or_default());
                    for partner in [left_alias, right_alias.as_deref()] {
                        self.emit_clause_column(&column, scopes, partner, &tags, None);
                    }
                }
            }
            _ => {}
        }

        if let TableFactor::Derived {
            subquery,
            alias: Some(alias),
            ..
        } = &join.relation
        {
            let Some(selection) = first_select(subquery).and_then(|s| s.selection.as_ref()) else {
                return;
            };
            let alias = alias.name.value.as_str();
            let explicit = ctes.single_base(subquery).map(|key| RowSource {
                database: key.database,
                table: key.table,
                table_alias: alias.to_string(),
            });
            let tags = [Remark::JoinSubqueryWhereColumn, Remark::JoinType(kind)];
            for column in column_refs(selection) {
                self.emit_clause_column(&column, scopes, Some(alias), &tags, explicit.as_ref());
            }
        }
    }
}

/// Resolve a SELECT-list column, falling back to the enclosing subquery alias
/// when nothing in scope is a candidate
fn projection_resolution<'s>(
    column: &ColumnRef,
    scopes: Scopes<'s>,
    enclosing_alias: Option<&str>,
) -> Resolution<'s> {
    let resolution = scopes.resolve(column.qualifier());
    match (resolution, enclosing_alias) {
        (Resolution::Unresolved, Some(alias)) => scopes
            .lookup(alias)
            .map_or(resolution, Resolution::Found),
        _ => resolution,
    }
}

#[cfg(test)]
#[path = "emit_test.rs"]
mod tests;
