//! CLI command implementations

pub(crate) mod common;
pub(crate) mod extract;
pub(crate) mod metadata;
pub(crate) mod remarks;
#[cfg(feature = "serve")]
pub(crate) mod serve;
