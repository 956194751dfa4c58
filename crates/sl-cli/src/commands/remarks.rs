//! Remarks command implementation

use anyhow::Result;
use sl_sql::Remark;

/// Execute the remarks command
pub async fn execute() -> Result<()> {
    for remark in Remark::taxonomy() {
        println!("{}", remark);
    }
    Ok(())
}
