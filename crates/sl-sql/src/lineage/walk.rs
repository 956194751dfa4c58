//! Statement traversal
//!
//! Walks every SELECT of a statement (set-operation branches, CTE bodies,
//! derived tables and expression subqueries), building a local scope for
//! each and handing its projections and clauses to the emitter.

use sqlparser::ast::{
    Expr, GroupByExpr, JoinConstraint, Query, Select, SelectItem, SetExpr, Statement,
    TableFactor, TableWithJoins,
};

use super::classify::{classify_select_item, outermost_queries};
use super::emit::{factor_alias, join_kind, Emitter};
use super::remark::Remark;
use super::row::{LineageRow, LineageTags};
use super::scope::{CteCatalog, ScopeMap, Scopes};

/// Context threaded down the recursion
#[derive(Debug, Clone, Copy)]
struct Frame<'q> {
    /// Alias of the derived table the current query forms, if any
    enclosing_alias: Option<&'q str>,
    /// Set for the body of a joined subquery
    under_join: bool,
    depth: usize,
}

impl<'q> Frame<'q> {
    fn root() -> Self {
        Self {
            enclosing_alias: None,
            under_join: false,
            depth: 0,
        }
    }

    fn child(self, enclosing_alias: Option<&'q str>, under_join: bool) -> Self {
        Self {
            enclosing_alias,
            under_join,
            depth: self.depth + 1,
        }
    }
}

struct Walker<'a, 't> {
    ctes: &'a CteCatalog,
    global: &'a ScopeMap,
    emitter: Emitter<'t>,
    max_depth: usize,
}

/// Raw lineage rows for one parsed statement, before de-duplication
pub(crate) fn statement_rows(
    statement: &Statement,
    tags: &LineageTags,
    max_depth: usize,
) -> Vec<LineageRow> {
    let ctes = CteCatalog::collect(statement);
    let global = ScopeMap::global(statement, &ctes);
    let mut walker = Walker {
        ctes: &ctes,
        global: &global,
        emitter: Emitter::new(tags),
        max_depth,
    };

    match statement {
        Statement::Query(query) => walker.walk_root(query),
        // INSERT ... SELECT, CREATE VIEW ... AS, CREATE TABLE ... AS
        other => {
            for query in outermost_queries(std::iter::once(other)) {
                walker.walk_root(&query);
            }
        }
    }
    walker.emitter.into_rows()
}

/// SELECTs that form the statement's result: the body itself or each
/// branch of a top-level set operation
fn outermost_selects(query: &Query) -> Vec<&Select> {
    fn collect<'a>(body: &'a SetExpr, out: &mut Vec<&'a Select>) {
        match body {
            SetExpr::Select(select) => out.push(select),
            SetExpr::Query(query) => collect(&query.body, out),
            SetExpr::SetOperation { left, right, .. } => {
                collect(left, out);
                collect(right, out);
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    collect(&query.body, &mut out);
    out
}

/// Expressions of a SELECT that may hold subqueries
fn select_expressions(select: &Select) -> Vec<&Expr> {
    fn join_predicates<'a>(table: &'a TableWithJoins, out: &mut Vec<&'a Expr>) {
        if let TableFactor::NestedJoin {
            table_with_joins, ..
        } = &table.relation
        {
            join_predicates(table_with_joins, out);
        }
        for join in &table.joins {
            if let (_, Some(JoinConstraint::On(expr))) = join_kind(&join.join_operator) {
                out.push(expr);
            }
        }
    }

    let mut exprs = Vec::new();
    for item in &select.projection {
        if let SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } = item {
            exprs.push(expr);
        }
    }
    exprs.extend(select.selection.iter());
    if let GroupByExpr::Expressions(group, _) = &select.group_by {
        exprs.extend(group.iter());
    }
    exprs.extend(select.having.iter());
    for table in &select.from {
        join_predicates(table, &mut exprs);
    }
    exprs
}

impl Walker<'_, '_> {
    fn walk_root(&mut self, query: &Query) {
        self.emit_dataset_lineage(query);
        self.walk_query(query, Frame::root());
    }

    /// `SELECT * FROM (subquery) alias` at the outermost level also yields a
    /// dataset-level row
    fn emit_dataset_lineage(&mut self, query: &Query) {
        for select in outermost_selects(query) {
            if !matches!(select.projection.as_slice(), [SelectItem::Wildcard(_)]) {
                continue;
            }
            let [table] = select.from.as_slice() else {
                continue;
            };
            if !table.joins.is_empty() {
                continue;
            }
            if let TableFactor::Derived {
                subquery,
                alias: Some(alias),
                ..
            } = &table.relation
            {
                let base = self.ctes.single_base(subquery);
                self.emitter.emit_dataset_lineage(&alias.name.value, base);
            }
        }
    }

    fn walk_query<'q>(&mut self, query: &'q Query, frame: Frame<'q>) {
        if frame.depth > self.max_depth {
            log::warn!(
                "Query nesting exceeds max depth {}, deeper levels are not traced",
                self.max_depth
            );
            return;
        }

        self.walk_set_expr(&query.body, frame);

        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.walk_query(&cte.query, frame.child(frame.enclosing_alias, false));
            }
        }
    }

    fn walk_set_expr<'q>(&mut self, body: &'q SetExpr, frame: Frame<'q>) {
        match body {
            SetExpr::Select(select) => self.walk_select(select, frame),
            SetExpr::Query(query) => {
                self.walk_query(query, frame.child(frame.enclosing_alias, frame.under_join))
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.walk_set_expr(left, frame);
                self.walk_set_expr(right, frame);
            }
            _ => {}
        }
    }

    fn walk_select<'q>(&mut self, select: &'q Select, frame: Frame<'q>) {
        let local = ScopeMap::local(select, self.ctes);
        let scopes = Scopes {
            local: &local,
            global: self.global,
        };

        for item in &select.projection {
            let item = classify_select_item(item);
            self.emitter
                .emit_projection(&item, scopes, frame.enclosing_alias);
        }

        // A joined subquery's filter columns come out through its JOIN
        if !frame.under_join {
            let fallback = frame.enclosing_alias;
            if let Some(selection) = &select.selection {
                self.emitter
                    .emit_clause(selection, scopes, fallback, Remark::WhereClauseColumn);
            }
            if let GroupByExpr::Expressions(group, _) = &select.group_by {
                for expr in group {
                    self.emitter
                        .emit_clause(expr, scopes, fallback, Remark::GroupByColumn);
                }
            }
            if let Some(having) = &select.having {
                self.emitter
                    .emit_clause(having, scopes, fallback, Remark::HavingClauseColumn);
            }
        }

        for table in &select.from {
            self.emit_joins(table, scopes);
        }

        for table in &select.from {
            self.walk_factor(&table.relation, frame, false);
            for join in &table.joins {
                self.walk_factor(&join.relation, frame, true);
            }
        }

        for query in outermost_queries(select_expressions(select)) {
            self.walk_query(&query, frame.child(None, false));
        }
    }

    fn emit_joins(&mut self, table: &TableWithJoins, scopes: Scopes<'_>) {
        if let TableFactor::NestedJoin {
            table_with_joins, ..
        } = &table.relation
        {
            self.emit_joins(table_with_joins, scopes);
        }
        let mut left_alias = factor_alias(&table.relation);
        for join in &table.joins {
            if let TableFactor::NestedJoin {
                table_with_joins, ..
            } = &join.relation
            {
                self.emit_joins(table_with_joins, scopes);
            }
            self.emitter
                .emit_join(join, left_alias.as_deref(), scopes, self.ctes);
            left_alias = factor_alias(&join.relation);
        }
    }

    fn walk_factor<'q>(&mut self, factor: &'q TableFactor, frame: Frame<'q>, under_join: bool) {
        match factor {
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let alias = alias.as_ref().map(|a| a.name.value.as_str());
                self.walk_query(subquery, frame.child(alias, under_join));
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => {
                self.walk_factor(&table_with_joins.relation, frame, under_join);
                for join in &table_with_joins.joins {
                    self.walk_factor(&join.relation, frame, true);
                }
            }
            _ => {}
        }
    }
}
