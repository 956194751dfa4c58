//! Classification of projections and discovery of column references

use std::ops::ControlFlow;

use sqlparser::ast::{
    BinaryOperator, Expr, Query, SelectItem, SelectItemQualifiedWildcardKind, Visit, Visitor,
};

use super::scope::object_name_parts;

/// A column reference as written, with its optional qualifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name or alias the column was qualified with
    pub qualifier: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// Create from a simple column name
    pub fn simple(column: &str) -> Self {
        Self {
            qualifier: None,
            column: column.to_string(),
        }
    }

    /// Create from qualifier.column
    pub fn qualified(qualifier: &str, column: &str) -> Self {
        Self {
            qualifier: Some(qualifier.to_string()),
            column: column.to_string(),
        }
    }

    /// Build from a bare or compound identifier expression
    fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Identifier(ident) => Some(Self::simple(&ident.value)),
            Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [] => None,
                [only] => Some(Self::simple(&only.value)),
                [.., qualifier, column] => Some(Self::qualified(&qualifier.value, &column.value)),
            },
            _ => None,
        }
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// What a single SELECT-list item is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*` or `alias.*`
    Star { qualifier: Option<String> },
    /// A bare or qualified column
    Column(ColumnRef),
    /// A CASE expression and the columns it reads
    Case(Vec<ColumnRef>),
    /// Any other expression reading at least one column
    Derived(Vec<ColumnRef>),
    /// A function-like call with no column inputs, by its SQL text
    FunctionOnly(String),
    /// A literal or literal arithmetic; produces no lineage
    Literal,
}

/// A classified SELECT-list item with its `AS` alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedItem {
    pub projection: Projection,
    pub alias: Option<String>,
}

/// Classify one SELECT-list item
pub fn classify_select_item(item: &SelectItem) -> ClassifiedItem {
    let (projection, alias) = match item {
        SelectItem::Wildcard(_) => (Projection::Star { qualifier: None }, None),
        SelectItem::QualifiedWildcard(kind, _) => {
            let qualifier = match kind {
                SelectItemQualifiedWildcardKind::ObjectName(name) => {
                    object_name_parts(name).pop().unwrap_or_default()
                }
                SelectItemQualifiedWildcardKind::Expr(expr) => expr.to_string(),
            };
            let qualifier = Some(qualifier).filter(|q| !q.is_empty());
            (Projection::Star { qualifier }, None)
        }
        SelectItem::UnnamedExpr(expr) => (classify_expr(expr), None),
        SelectItem::ExprWithAlias { expr, alias } => {
            (classify_expr(expr), Some(alias.value.clone()))
        }
    };
    ClassifiedItem { projection, alias }
}

/// Classify a projection expression
pub fn classify_expr(expr: &Expr) -> Projection {
    let expr = unwrap_nested(expr);
    if let Some(column) = ColumnRef::from_expr(expr) {
        return Projection::Column(column);
    }

    let columns = column_refs(expr);
    match expr {
        Expr::Case { .. } if !columns.is_empty() => Projection::Case(columns),
        _ if !columns.is_empty() => Projection::Derived(columns),
        _ if is_function_like(expr) => Projection::FunctionOnly(expr.to_string()),
        _ => Projection::Literal,
    }
}

fn unwrap_nested(mut expr: &Expr) -> &Expr {
    while let Expr::Nested(inner) = expr {
        expr = inner.as_ref();
    }
    expr
}

fn is_function_like(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Function(_)
            | Expr::Cast { .. }
            | Expr::Extract { .. }
            | Expr::Substring { .. }
            | Expr::Trim { .. }
            | Expr::Ceil { .. }
            | Expr::Floor { .. }
    )
}

/// Every column reference inside an expression, in visit order.
///
/// Scalar, IN and EXISTS subqueries belong to their own scope and are not
/// searched; the left operand of `x IN (SELECT ...)` is.
pub fn column_refs(expr: &Expr) -> Vec<ColumnRef> {
    let mut collector = OuterColumns::default();
    let _ = expr.visit(&mut collector);
    collector.refs
}

#[derive(Default)]
struct OuterColumns {
    query_depth: usize,
    refs: Vec<ColumnRef>,
}

impl Visitor for OuterColumns {
    type Break = ();

    fn pre_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.query_depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.query_depth = self.query_depth.saturating_sub(1);
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.query_depth == 0 {
            if let Some(column) = ColumnRef::from_expr(expr) {
                self.refs.push(column);
            }
        }
        ControlFlow::Continue(())
    }
}

/// Column operands of equality comparisons reachable through AND, OR and
/// parentheses at the top of a join predicate
pub fn equality_operands(expr: &Expr) -> Vec<ColumnRef> {
    let mut operands = Vec::new();
    let mut pending = vec![expr];
    while let Some(expr) = pending.pop() {
        match expr {
            Expr::Nested(inner) => pending.push(inner),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And | BinaryOperator::Or,
                right,
            } => {
                pending.push(right);
                pending.push(left);
            }
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                for side in [left, right] {
                    if let Some(column) = ColumnRef::from_expr(unwrap_nested(side)) {
                        operands.push(column);
                    }
                }
            }
            _ => {}
        }
    }
    operands
}

/// Collects the outermost queries found while visiting a node, without
/// descending into their own nested queries.
#[derive(Default)]
struct OutermostQueries {
    depth: usize,
    found: Vec<Query>,
}

impl Visitor for OutermostQueries {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            self.found.push(query.clone());
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth = self.depth.saturating_sub(1);
        ControlFlow::Continue(())
    }
}

/// Outermost subqueries inside a set of nodes (scalar, IN and EXISTS
/// subqueries of expressions, or the query of a non-SELECT statement)
pub(crate) fn outermost_queries<'a, V, I>(nodes: I) -> Vec<Query>
where
    V: Visit + 'a,
    I: IntoIterator<Item = &'a V>,
{
    let mut collector = OutermostQueries::default();
    for node in nodes {
        let _ = node.visit(&mut collector);
    }
    collector.found
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
