use super::*;
use crate::parser::SqlParser;
use sqlparser::ast::{Select, SetExpr, Statement};

fn select_of(sql: &str) -> Select {
    let statement = SqlParser::generic().parse(sql).unwrap().remove(0);
    let Statement::Query(query) = statement else {
        panic!("expected a query");
    };
    let SetExpr::Select(select) = query.body.as_ref() else {
        panic!("expected a plain SELECT body");
    };
    select.as_ref().clone()
}

fn classify_first(sql: &str) -> ClassifiedItem {
    classify_select_item(&select_of(sql).projection[0])
}

#[test]
fn test_star() {
    let item = classify_first("SELECT * FROM t");
    assert_eq!(item.projection, Projection::Star { qualifier: None });

    let item = classify_first("SELECT a.* FROM t a");
    assert_eq!(
        item.projection,
        Projection::Star {
            qualifier: Some("a".to_string())
        }
    );
}

#[test]
fn test_direct_columns() {
    let item = classify_first("SELECT x AS y FROM t");
    assert_eq!(item.projection, Projection::Column(ColumnRef::simple("x")));
    assert_eq!(item.alias.as_deref(), Some("y"));

    let item = classify_first("SELECT a.x FROM t a");
    assert_eq!(
        item.projection,
        Projection::Column(ColumnRef::qualified("a", "x"))
    );

    let item = classify_first("SELECT db.t.x FROM db.t");
    assert_eq!(
        item.projection,
        Projection::Column(ColumnRef::qualified("t", "x"))
    );
}

#[test]
fn test_parenthesised_column_is_direct() {
    let item = classify_first("SELECT (x) FROM t");
    assert_eq!(item.projection, Projection::Column(ColumnRef::simple("x")));
}

#[test]
fn test_case_expression() {
    let item = classify_first("SELECT CASE WHEN status = 'A' THEN amount ELSE 0 END AS amt FROM t");
    let Projection::Case(columns) = item.projection else {
        panic!("expected CASE classification");
    };
    assert!(columns.contains(&ColumnRef::simple("status")));
    assert!(columns.contains(&ColumnRef::simple("amount")));
    assert_eq!(item.alias.as_deref(), Some("amt"));
}

#[test]
fn test_derived_expression() {
    let item = classify_first("SELECT a.x + b.y AS total FROM t a JOIN u b ON a.id = b.id");
    assert_eq!(
        item.projection,
        Projection::Derived(vec![
            ColumnRef::qualified("a", "x"),
            ColumnRef::qualified("b", "y"),
        ])
    );
}

#[test]
fn test_function_with_columns_is_derived() {
    let item = classify_first("SELECT UPPER(name) FROM t");
    assert_eq!(
        item.projection,
        Projection::Derived(vec![ColumnRef::simple("name")])
    );
}

#[test]
fn test_function_only() {
    let item = classify_first("SELECT CURRENT_TIMESTAMP AS ts FROM t");
    assert_eq!(
        item.projection,
        Projection::FunctionOnly("CURRENT_TIMESTAMP".to_string())
    );

    let item = classify_first("SELECT COUNT(*) FROM t");
    assert_eq!(
        item.projection,
        Projection::FunctionOnly("COUNT(*)".to_string())
    );
}

#[test]
fn test_literals_produce_nothing() {
    assert_eq!(classify_first("SELECT 1 FROM t").projection, Projection::Literal);
    assert_eq!(
        classify_first("SELECT 1 + 2 AS three FROM t").projection,
        Projection::Literal
    );
}

#[test]
fn test_equality_operands() {
    let select = select_of("SELECT 1 FROM t WHERE (a.id = b.id AND a.k = 1) OR c.x > 2");
    let operands = equality_operands(select.selection.as_ref().unwrap());
    assert_eq!(
        operands,
        vec![
            ColumnRef::qualified("a", "id"),
            ColumnRef::qualified("b", "id"),
            ColumnRef::qualified("a", "k"),
        ]
    );
}

#[test]
fn test_outermost_queries_skip_nested() {
    let select = select_of(
        "SELECT x FROM t WHERE x IN (SELECT y FROM (SELECT y FROM u) z) AND EXISTS (SELECT 1 FROM v)",
    );
    let queries = outermost_queries(select.selection.iter());
    assert_eq!(queries.len(), 2);
}

#[test]
fn test_column_refs_stop_at_subqueries() {
    let select = select_of("SELECT x FROM t WHERE x IN (SELECT y FROM u)");
    let refs = column_refs(select.selection.as_ref().unwrap());
    assert_eq!(refs, vec![ColumnRef::simple("x")]);

    let select =
        select_of("SELECT x FROM t WHERE z > 0 AND EXISTS (SELECT 1 FROM u WHERE u.k = t.k)");
    let refs = column_refs(select.selection.as_ref().unwrap());
    assert_eq!(refs, vec![ColumnRef::simple("z")]);
}

#[test]
fn test_scalar_subquery_projection_has_no_outer_columns() {
    let item = classify_first("SELECT (SELECT max(b) FROM u) AS m FROM t");
    assert_eq!(item.projection, Projection::Literal);

    let item = classify_first("SELECT coalesce(a, (SELECT max(b) FROM u)) AS m FROM t");
    assert_eq!(item.projection, Projection::Derived(vec![ColumnRef::simple("a")]));
}
