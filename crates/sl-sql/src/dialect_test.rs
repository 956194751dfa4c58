use super::*;

#[test]
fn test_generic_parse() {
    let dialect = GenericDialect::new();
    let stmts = dialect.parse("SELECT * FROM users").unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_spark_parse() {
    let dialect = SparkDialect::new();
    let stmts = dialect.parse("SELECT `id` FROM db.users").unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_every_kind_parses_simple_select() {
    for kind in DialectKind::ALL {
        let dialect = kind.dialect();
        assert_eq!(dialect.name(), kind.as_str());
        assert!(
            dialect.parse("SELECT a FROM t").is_ok(),
            "dialect {} failed",
            kind
        );
    }
}

#[test]
fn test_parse_error_location() {
    let dialect = GenericDialect::new();
    let result = dialect.parse("SELECT a\nFROM t WHERE )");
    let Err(crate::error::SqlError::ParseError {
        dialect,
        line,
        column,
        message,
    }) = result
    else {
        panic!("expected a parse error");
    };
    assert_eq!(dialect, "generic");
    assert_eq!(line, 2, "message: {}", message);
    assert!(column > 0, "message: {}", message);
}

#[test]
fn test_number_after() {
    let message = "Expected: something at Line: 5, Column: 10";
    assert_eq!(super::number_after(message, "Line: "), Some(5));
    assert_eq!(super::number_after(message, "Column: "), Some(10));
    assert_eq!(super::number_after("no location here", "Line: "), None);
}

#[test]
fn test_dialect_kind_from_str() {
    assert_eq!("Spark".parse::<DialectKind>().unwrap(), DialectKind::Spark);
    assert_eq!(
        "databricks".parse::<DialectKind>().unwrap(),
        DialectKind::Spark
    );
    assert_eq!(
        "postgresql".parse::<DialectKind>().unwrap(),
        DialectKind::Postgres
    );
    assert!(matches!(
        "oracle".parse::<DialectKind>(),
        Err(SqlError::UnknownDialect(name)) if name == "oracle"
    ));
}

#[test]
fn test_dialect_kind_serde_names() {
    let kind: DialectKind = serde_json::from_str("\"duckdb\"").unwrap();
    assert_eq!(kind, DialectKind::DuckDb);
    assert_eq!(
        serde_json::to_string(&DialectKind::MySql).unwrap(),
        "\"mysql\""
    );
}
