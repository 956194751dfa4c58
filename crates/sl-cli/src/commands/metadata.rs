//! Metadata command implementation

use anyhow::{Context, Result};
use sl_core::{parse_metadata, run_metadata, LineageRequest};
use sl_sql::LineageExtractor;

use crate::cli::{GlobalArgs, MetadataArgs, OutputFormat};
use crate::commands::common::{load_config, print_json, print_rows, ExitCode};

/// Execute the metadata command
pub async fn execute(args: &MetadataArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let extractor = LineageExtractor::new(&config.lineage);

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let document = parse_metadata(&text)?;

    let request = LineageRequest::new(&args.regulation, &args.metadatakey)
        .with_view_names(args.view_names.clone());
    let response = run_metadata(&extractor, &request, &document, &config.metadata);

    match args.output {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            print_rows(&response.lineage_data, OutputFormat::Table)?;
            println!();
            println!("{} ({} rows)", response.message, response.total_records);
        }
    }

    if !response.success {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
