//! OSB HTTP surface
//!
//! One route under the standard Open Service Broker binding path:
//!
//! - `POST/PUT /v2/service_instances/{iid}/service_bindings/{bid}` - bind
//! - `DELETE   /v2/service_instances/{iid}/service_bindings/{bid}` - unbind
//!
//! Bind answers on both POST and PUT: platforms following the original
//! broker wiring send POST, OSB-conformant ones send PUT.
//!
//! Bind decode or resolution failures answer HTTP 400 with no defined
//! body; unbind always answers `{}` with HTTP 200. No structured error
//! detail crosses the wire beyond the status code.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::error::BrokerError;
use crate::resolver::Resolver;
use crate::types::{BindingRequest, BindingResponse, UnbindResponse};

/// OSB binding route, shared by bind and unbind
const BINDING_PATH: &str = "/v2/service_instances/:instance_id/service_bindings/:binding_id";

#[derive(Clone)]
struct AppState {
    resolver: Resolver,
}

/// Build the broker router around one resolver handle
pub fn router(resolver: Resolver) -> Router {
    Router::new()
        .route(BINDING_PATH, post(bind).put(bind).delete(unbind))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { resolver })
}

async fn bind(
    State(state): State<AppState>,
    Path((instance_id, _binding_id)): Path<(String, String)>,
    body: Result<Json<BindingRequest>, JsonRejection>,
) -> Result<Json<BindingResponse>, BrokerError> {
    let Json(request) = body.map_err(|e| BrokerError::Decode(e.to_string()))?;
    let response = state.resolver.resolve(&instance_id, &request).await?;
    Ok(Json(response))
}

async fn unbind() -> Json<UnbindResponse> {
    Json(UnbindResponse {})
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "bind request failed");
        StatusCode::BAD_REQUEST.into_response()
    }
}
