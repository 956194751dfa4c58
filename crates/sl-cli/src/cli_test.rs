use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_extract_defaults() {
    let cli = Cli::try_parse_from(["sl", "extract", "--sql", "SELECT 1"]).unwrap();
    let Commands::Extract(args) = cli.command else {
        panic!("expected extract");
    };
    assert_eq!(args.sql.as_deref(), Some("SELECT 1"));
    assert!(args.files.is_empty());
    assert_eq!(args.output, OutputFormat::Json);
    assert!(args.regulation.is_empty());
    assert!(!cli.global.verbose);
}

#[test]
fn test_extract_sql_conflicts_with_files() {
    assert!(Cli::try_parse_from(["sl", "extract", "a.sql", "--sql", "SELECT 1"]).is_err());
}

#[test]
fn test_metadata_view_names_split() {
    let cli = Cli::try_parse_from([
        "sl",
        "-v",
        "metadata",
        "meta.json",
        "--regulation",
        "gdpr",
        "--view-names",
        "v1,v2",
        "-o",
        "table",
    ])
    .unwrap();
    assert!(cli.global.verbose);
    let Commands::Metadata(args) = cli.command else {
        panic!("expected metadata");
    };
    assert_eq!(args.view_names, vec!["v1", "v2"]);
    assert_eq!(args.output, OutputFormat::Table);
}

#[test]
fn test_metadata_requires_regulation() {
    assert!(Cli::try_parse_from(["sl", "metadata", "meta.json"]).is_err());
}

#[test]
fn test_global_config_after_subcommand() {
    let cli = Cli::try_parse_from(["sl", "remarks", "--config", "custom.yml"]).unwrap();
    assert_eq!(
        cli.global.config.as_deref(),
        Some(std::path::Path::new("custom.yml"))
    );
}
