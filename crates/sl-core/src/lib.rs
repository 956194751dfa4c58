//! sl-core - Core library for sqllineage
//!
//! This crate provides configuration parsing, metadata traversal, batch
//! request handling and the response envelope shared by the CLI and the
//! HTTP server.

pub mod batch;
pub mod config;
pub mod error;
pub mod metadata;
pub mod request;
pub mod response;

pub use batch::{respond_single, run_batch, run_metadata};
pub use config::{Config, MetadataConfig, ServerConfig};
pub use error::{CoreError, CoreResult};
pub use metadata::{find_view_queries, parse_metadata, ViewQuery};
pub use request::LineageRequest;
pub use response::LineageResponse;
