//! Batch lineage request

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sl_sql::LineageTags;

/// Parameters for a metadata batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRequest {
    /// Regulation tag copied onto every row
    #[serde(default)]
    pub regulation: String,

    /// Metadata key tag copied onto every row
    #[serde(default)]
    pub metadatakey: String,

    /// Views to process; empty means all
    #[serde(default)]
    pub view_names: Vec<String>,
}

impl LineageRequest {
    pub fn new(regulation: &str, metadatakey: &str) -> Self {
        Self {
            regulation: regulation.to_string(),
            metadatakey: metadatakey.to_string(),
            view_names: Vec::new(),
        }
    }

    /// Restrict the run to the given views
    pub fn with_view_names(mut self, view_names: Vec<String>) -> Self {
        self.view_names = view_names;
        self
    }

    /// Reject a request without a regulation
    pub fn validate(&self) -> CoreResult<()> {
        if self.regulation.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "regulation",
            });
        }
        Ok(())
    }

    /// View filter with blank entries removed
    pub fn view_filter(&self) -> Vec<String> {
        self.view_names
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Row tags for one view of this request
    pub fn tags_for(&self, view_name: &str) -> LineageTags {
        LineageTags::new(&self.regulation, &self.metadatakey, view_name)
    }
}
