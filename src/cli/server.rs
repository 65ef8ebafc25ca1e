//! HTTP surface over the Aggregating Store: `GET /objects` (list) and
//! `GET /objects/watch` (watch, newline-delimited JSON events).

use crate::config::AggregatorConfig;
use crate::error::{Error, Result};
use crate::partition::WatchRequest;
use crate::store::AggregatingStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

struct AppState {
    store: AggregatingStore,
    config: AggregatorConfig,
}

/// Response wrapper, in the aggregator's error-reporting style.
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn status_for(error: &Error) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_cancelled() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Start the HTTP server over `store`, bound to `config.listen_addr`.
pub async fn serve(store: AggregatingStore, config: AggregatorConfig) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|e| Error::Other(format!("invalid listen address: {e}")))?;

    let state = Arc::new(AppState { store, config });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/objects", get(list_objects))
        .route("/objects/watch", get(watch_objects))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Other(format!("failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Other(format!("server error: {e}")))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Query parameters for `GET /objects`.
///
/// `limit` is deserialized as a string and parsed by hand rather than as
/// `Option<u64>` directly: a non-numeric value must fall back to the
/// configured default, same as a missing one, not fail axum's extractor with
/// an unrelated 400.
#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    #[serde(rename = "continue")]
    continue_token: Option<String>,
}

async fn list_objects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let limit = state
        .config
        .effective_limit(query.limit.and_then(|s| s.parse::<u64>().ok()));
    let continue_token = query.continue_token.unwrap_or_default();

    match state
        .store
        .list(&continue_token, limit, CancellationToken::new())
        .await
    {
        Ok(page) => (StatusCode::OK, Json(ApiResponse::success(page))).into_response(),
        Err(e) => (
            status_for(&e),
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct WatchQuery {
    #[serde(default)]
    id: String,
}

async fn watch_objects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WatchQuery>,
) -> impl IntoResponse {
    let request = WatchRequest { id: query.id };
    match state.store.watch(request, CancellationToken::new()).await {
        Ok(rx) => {
            let body = ReceiverStream::new(rx).map(|event| match event {
                Ok(event) => Ok::<_, std::convert::Infallible>(format!(
                    "{}\n",
                    serde_json::to_string(&json!({
                        "partition": event.partition,
                        "object": event.object,
                    }))
                    .unwrap_or_default()
                )),
                Err(e) => Ok(format!(
                    "{}\n",
                    serde_json::to_string(&json!({ "error": e.to_string() })).unwrap_or_default()
                )),
            });
            axum::body::Body::from_stream(body).into_response()
        }
        Err(e) => (
            status_for(&e),
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response(),
    }
}
