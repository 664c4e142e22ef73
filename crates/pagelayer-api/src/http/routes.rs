//! HTTP route definitions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use pagelayer_config::CorsConfig;

use crate::http::handlers::{self, PAGE_DIMENSIONS_HEADER};
use crate::http::{forward, monitoring};
use crate::state::AppState;

/// Build the router.
///
/// ## Route Structure
///
/// ```text
/// GET /proxy?url=               - Validate a URL and bind the session to it
/// GET /download?url=&format=    - PNG or PDF snapshot
/// GET /text-data?url=           - Server-side text layer
/// GET /link-preview?url=        - Hover-card metadata
/// GET /health                   - Health check
/// *   (fallback)                - Forward to the session target
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/proxy", get(handlers::proxy))
        .route("/download", get(handlers::download))
        .route("/text-data", get(handlers::text_data))
        .route("/link-preview", get(handlers::link_preview))
        .route("/health", get(monitoring::health))
        .fallback(forward::forward)
        .layer(middleware::from_fn_with_state(state.clone(), count_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn count_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.increment_requests();
    next.run(request).await
}

/// Credentialed CORS for the listed origins, or for any origin (mirrored)
/// when the list is empty.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
        .expose_headers([HeaderName::from_static(PAGE_DIMENSIONS_HEADER)])
}

#[cfg(test)]
#[path = "routes_tests.rs"]
pub(crate) mod tests;
