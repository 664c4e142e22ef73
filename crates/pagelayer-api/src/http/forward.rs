//! Catch-all forwarding handler.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error};

use pagelayer_proxy::{failure_page, ForwardRequest, ProxiedBody, ProxiedResponse, ProxyError};

use crate::state::AppState;

/// Every request not matched by a named route: forward it to the session
/// target, or answer `204` when there is no usable session.
pub async fn forward(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let cookies = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok());
    let Some(session) = state.binder.current_target(cookies) else {
        debug!("No session for {}", request.uri());
        return StatusCode::NO_CONTENT.into_response();
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, state.config.proxy.max_request_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            debug!("Request body rejected: {}", e);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let forward = ForwardRequest {
        method: parts.method,
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
        user_agent: header_string(&parts.headers, USER_AGENT.as_str()),
        content_type: header_string(&parts.headers, CONTENT_TYPE.as_str()),
        body,
    };
    let path = forward.path_and_query.clone();

    match state.forwarder.forward(&session, forward).await {
        Ok(proxied) => into_response(proxied),
        Err(ProxyError::EscapeRejected(reason)) => {
            debug!("Escape from {} refused: {}", path, reason);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(ProxyError::Target(e)) => {
            debug!("Session target unusable: {}", e);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!("Proxying {}{} failed: {}", session.target.origin().ascii_serialization(), path, e);
            Html(failure_page(&e.to_string())).into_response()
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn into_response(proxied: ProxiedResponse) -> Response {
    let body = match proxied.body {
        ProxiedBody::Full(bytes) => Body::from(bytes),
        ProxiedBody::Stream(upstream) => Body::from_stream(upstream.bytes_stream()),
    };

    let mut response = Response::new(body);
    *response.status_mut() = proxied.status;
    *response.headers_mut() = proxied.headers;
    response
}
