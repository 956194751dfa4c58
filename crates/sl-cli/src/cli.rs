//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sqllineage - column-level lineage for SQL views
#[derive(Parser, Debug)]
#[command(name = "sl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ./sqllineage.yml when present)
    #[arg(short, long, global = true, env = "SQLLINEAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract lineage rows from SQL files, inline SQL or stdin
    Extract(ExtractArgs),

    /// Extract lineage for every view query in a metadata JSON document
    Metadata(MetadataArgs),

    /// List every remark the engine can attach to a row
    Remarks,

    /// Serve lineage extraction over HTTP
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Aligned text table
    Table,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// SQL files to read (reads stdin when neither files nor --sql are given)
    pub files: Vec<PathBuf>,

    /// Inline SQL text
    #[arg(long, conflicts_with = "files")]
    pub sql: Option<String>,

    /// Regulation tag copied onto every row
    #[arg(long, default_value = "")]
    pub regulation: String,

    /// Metadata key tag copied onto every row
    #[arg(long, default_value = "")]
    pub metadatakey: String,

    /// View name tag (defaults to each file's stem)
    #[arg(long)]
    pub view_name: Option<String>,

    /// Override the configured SQL dialect
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,
}

/// Arguments for the metadata command
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Metadata JSON file
    pub file: PathBuf,

    /// Regulation tag copied onto every row
    #[arg(long)]
    pub regulation: String,

    /// Metadata key tag copied onto every row
    #[arg(long, default_value = "")]
    pub metadatakey: String,

    /// Views to process (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub view_names: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,
}

/// Arguments for the serve command
#[cfg(feature = "serve")]
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
