use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::config::OpenAiConfig;
use crate::infra::runtime::mcp_transport::{
    analyze_factory, make_streamable_http_service, LocalSessionManager,
};

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app(settings: OpenAiConfig) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(analyze_factory(settings), session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
