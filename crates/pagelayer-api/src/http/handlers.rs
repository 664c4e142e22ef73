//! Navigation, snapshot, text-layer and link-preview endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use pagelayer_core::extract;
use pagelayer_protocols::{LinkPreview, PageDimensions, PageMessage, SnapshotFormat};

use crate::error::ApiError;
use crate::state::AppState;

pub const PAGE_DIMENSIONS_HEADER: &str = "x-page-dimensions";

const SNAPSHOT_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Query of every URL-taking endpoint.
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
    pub format: Option<String>,
}

/// Body of a successful `/proxy`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub valid_url: String,
    pub page_dimensions: PageDimensions,
}

impl AppState {
    fn validate(&self, raw: Option<&str>) -> Result<Url, ApiError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        self.guard.check(raw).map_err(|rejection| {
            debug!("Rejected {:?}: {}", raw, rejection);
            ApiError::InvalidUrl(rejection.to_string())
        })
    }
}

/// `GET /proxy?url=`: load the page, re-check where it ended up, and bind
/// the session to that URL.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Response, ApiError> {
    let requested = state.validate(query.url.as_deref())?;
    let page = state
        .navigator
        .navigate(requested.as_str())
        .await
        .map_err(ApiError::Navigation)?;

    let valid_url = state.validate(Some(&page.final_url))?;
    let binding = state.binder.bind_session(&valid_url);
    info!("Proxying {} until {}", valid_url, binding.expires_at);

    let cookie = HeaderValue::from_str(&binding.set_cookie)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let body = ProxyResponse {
        valid_url: valid_url.to_string(),
        page_dimensions: page.dimensions,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `GET /download?url=&format=png|pdf`: full-page snapshot.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Response, ApiError> {
    let format = match query.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("png") => SnapshotFormat::Png,
        Some("pdf") => SnapshotFormat::Pdf,
        Some(other) => return Err(ApiError::InvalidFormat(other.to_string())),
    };
    let url = state.validate(query.url.as_deref())?;
    info!("Snapshot of {} as {}", url, format.extension());

    let snapshot = state
        .navigator
        .snapshot(url.as_str(), format)
        .await
        .map_err(ApiError::Snapshot)?;

    let dimensions = serde_json::to_string(&snapshot.dimensions)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let dimensions =
        HeaderValue::from_str(&dimensions).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (CACHE_CONTROL, HeaderValue::from_static(SNAPSHOT_CACHE_CONTROL)),
        ],
        [(PAGE_DIMENSIONS_HEADER, dimensions)],
        snapshot.bytes,
    )
        .into_response())
}

/// `GET /text-data?url=`: text layer computed from a server-side render.
pub async fn text_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<PageMessage>, ApiError> {
    let url = state.validate(query.url.as_deref())?;
    let capture = state
        .navigator
        .capture_layout(url.as_str())
        .await
        .map_err(ApiError::TextData)?;

    let extraction = extract(&capture.root);
    debug!(
        "Extracted {} characters and {} links from {}",
        extraction.layer.offsets.len(),
        extraction.links.len(),
        url
    );
    Ok(Json(extraction.into_message(capture.iframe_height)))
}

/// `GET /link-preview?url=`: title, favicon and description of a link target.
pub async fn link_preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<LinkPreview>, ApiError> {
    let url = state.validate(query.url.as_deref())?;
    let preview = state
        .previewer
        .preview(url.as_str())
        .await
        .map_err(ApiError::Preview)?;
    Ok(Json(preview))
}
