//! Extract command implementation

use anyhow::{Context, Result};
use sl_sql::{DialectKind, LineageExtractor, LineageTags};
use std::io::Read;
use std::path::Path;

use crate::cli::{ExtractArgs, GlobalArgs};
use crate::commands::common::{has_tech_failure, load_config, print_rows, ExitCode};

/// One SQL text to extract and the view name its rows are tagged with
struct SqlInput {
    view_name: String,
    sql: String,
}

/// Execute the extract command
pub async fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(dialect) = &args.dialect {
        config.lineage.dialect = dialect.parse::<DialectKind>()?;
    }
    let extractor = LineageExtractor::new(&config.lineage);
    log::debug!("Extracting with dialect {}", extractor.dialect_name());

    let inputs = collect_inputs(args)?;
    let mut rows = Vec::new();
    let mut failed = 0;
    for input in &inputs {
        let tags = LineageTags::new(&args.regulation, &args.metadatakey, &input.view_name);
        let input_rows = extractor.extract(&input.sql, &tags);
        if has_tech_failure(&input_rows) {
            failed += 1;
        }
        rows.extend(input_rows);
    }

    print_rows(&rows, args.output)?;

    if failed > 0 {
        eprintln!("{} of {} inputs could not be parsed", failed, inputs.len());
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn collect_inputs(args: &ExtractArgs) -> Result<Vec<SqlInput>> {
    let named = |fallback: &str| args.view_name.clone().unwrap_or_else(|| fallback.to_string());

    if let Some(sql) = &args.sql {
        return Ok(vec![SqlInput {
            view_name: named(""),
            sql: sql.clone(),
        }]);
    }

    if args.files.is_empty() {
        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .context("Failed to read SQL from stdin")?;
        return Ok(vec![SqlInput {
            view_name: named(""),
            sql,
        }]);
    }

    args.files
        .iter()
        .map(|path| {
            let sql = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(SqlInput {
                view_name: named(&file_stem(path)),
                sql,
            })
        })
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
