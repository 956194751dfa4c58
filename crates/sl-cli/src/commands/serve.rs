//! HTTP lineage server using axum

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use sl_core::{respond_single, run_metadata, LineageRequest, LineageResponse, MetadataConfig};
use sl_sql::{LineageExtractor, LineageTags};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::cli::{GlobalArgs, ServeArgs};
use crate::commands::common::load_config;

/// Shared application state built once at startup
struct AppState {
    extractor: LineageExtractor,
    keys: MetadataConfig,
}

/// Body of `POST /lineage`
#[derive(Debug, Deserialize)]
struct SqlBody {
    sql: String,
    #[serde(default)]
    regulation: String,
    #[serde(default)]
    metadatakey: String,
    #[serde(default)]
    view_name: String,
}

/// Body of `POST /lineage/metadata`
#[derive(Debug, Deserialize)]
struct MetadataBody {
    #[serde(flatten)]
    request: LineageRequest,
    metadata: Value,
}

type Reply = (StatusCode, Json<LineageResponse>);

fn bad_request(message: impl Into<String>) -> Reply {
    (
        StatusCode::BAD_REQUEST,
        Json(LineageResponse::error(message)),
    )
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let host = args
        .host
        .clone()
        .unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let state = Arc::new(AppState {
        extractor: LineageExtractor::new(&config.lineage),
        keys: config.metadata.clone(),
    });
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    println!("Serving lineage at http://{}:{}", host, port);
    println!("Press Ctrl+C to stop.\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/lineage", post(lineage_from_sql))
        .route("/lineage/metadata", post(lineage_from_metadata))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn lineage_from_sql(State(state): State<Arc<AppState>>, Json(body): Json<SqlBody>) -> Reply {
    if body.sql.trim().is_empty() {
        return bad_request("sql is required");
    }
    let tags = LineageTags::new(&body.regulation, &body.metadatakey, &body.view_name);
    let response = respond_single(&state.extractor, &body.sql, &tags);
    log::info!(
        "POST /lineage view='{}' rows={}",
        body.view_name,
        response.total_records
    );
    (StatusCode::OK, Json(response))
}

async fn lineage_from_metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MetadataBody>,
) -> Reply {
    if let Err(e) = body.request.validate() {
        return bad_request(e.to_string());
    }
    let response = run_metadata(&state.extractor, &body.request, &body.metadata, &state.keys);
    log::info!(
        "POST /lineage/metadata rows={} success={}",
        response.total_records,
        response.success
    );
    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            extractor: LineageExtractor::default(),
            keys: MetadataConfig::default(),
        })
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "OK");
    }

    #[tokio::test]
    async fn test_lineage_from_sql() {
        let body = SqlBody {
            sql: "SELECT a FROM db.t".to_string(),
            regulation: "gdpr".to_string(),
            metadatakey: "k1".to_string(),
            view_name: "v1".to_string(),
        };
        let (status, Json(response)) = lineage_from_sql(State(state()), Json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.success);
        assert_eq!(response.total_records, 1);
        assert_eq!(response.lineage_data[0].view_name, "v1");
    }

    #[tokio::test]
    async fn test_lineage_from_sql_blank_is_bad_request() {
        let body: SqlBody = serde_json::from_value(json!({"sql": "  "})).unwrap();
        let (status, Json(response)) = lineage_from_sql(State(state()), Json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.success);
    }

    #[tokio::test]
    async fn test_metadata_body_flattens_request() {
        let body: MetadataBody = serde_json::from_value(json!({
            "regulation": "pci",
            "metadatakey": "k1",
            "view_names": ["v2"],
            "metadata": [
                {"view_name": "v1", "sql_query": "SELECT a FROM db.t"},
                {"view_name": "v2", "sql_query": "SELECT b FROM db.u"}
            ]
        }))
        .unwrap();
        let (status, Json(response)) = lineage_from_metadata(State(state()), Json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.total_records, 1);
        assert_eq!(response.lineage_data[0].regulation, "pci");
    }

    #[tokio::test]
    async fn test_metadata_missing_regulation_is_bad_request() {
        let body: MetadataBody =
            serde_json::from_value(json!({"metadata": {"view_name": "v", "sql_query": "SELECT 1"}}))
                .unwrap();
        let (status, Json(response)) = lineage_from_metadata(State(state()), Json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.success);
        assert!(response.message.contains("regulation"));
    }
}
