//! Translation service: read-only HTTP API over the translation store.
//!
//! Routes (nested under `/api/translations`):
//! - `GET /health`
//! - `GET /manifest`
//! - `GET /:language`
//! - `GET /:language/:namespace`

use crate::config::Config;
use crate::i18n::{FlatTranslations, LanguageRegistry, Manifest, NamespaceTable};
use crate::store::TranslationStore;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Base path every route is nested under.
pub const API_BASE_PATH: &str = "/api/translations";

/// Shared, read-only state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub store: TranslationStore,
    pub languages: LanguageRegistry,
    pub namespaces: NamespaceTable,
    pub cache_max_age_secs: u64,

    /// Stamped into the manifest when the store has no `manifest.json`
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: TranslationStore, languages: LanguageRegistry, namespaces: NamespaceTable) -> Self {
        Self {
            store,
            languages,
            namespaces,
            cache_max_age_secs: 300,
            started_at: Utc::now(),
        }
    }

    pub fn with_cache_max_age(mut self, secs: u64) -> Self {
        self.cache_max_age_secs = secs;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            TranslationStore::new(&config.translations_dir),
            config.language_registry()?,
            NamespaceTable::default(),
        )
        .with_cache_max_age(config.cache_max_age_secs))
    }

    fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }
}

/// Error response: a status and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn language_not_supported() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Language not supported")
    }

    pub fn namespace_not_supported() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Namespace not supported")
    }

    pub fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unhealthy(detail: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: json!({ "status": "unhealthy", "error": detail.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    languages: Vec<String>,
    namespaces: Vec<String>,
}

/// Build the router with tracing attached.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/manifest", get(manifest))
        .route("/:language", get(language_bundle))
        .route("/:language/:namespace", get(namespace_bundle));

    Router::new()
        .nest(API_BASE_PATH, api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "Serving {} from {} on {}",
        API_BASE_PATH,
        state.store.root().display(),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    match state.store.check_accessible().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "healthy",
            languages: state.languages.enabled_codes(),
            namespaces: state.namespaces.names(),
        })),
        Err(e) => {
            error!("Health check failed: {}", e);
            Err(ApiError::unhealthy(e))
        }
    }
}

async fn manifest(State(state): State<Arc<AppState>>) -> Result<Json<Manifest>, ApiError> {
    match state.store.read_manifest().await {
        Ok(Some(manifest)) => Ok(Json(manifest)),
        Ok(None) => Ok(Json(Manifest::at(
            state.languages.enabled_codes(),
            state.namespaces.names(),
            state.started_at,
        ))),
        Err(e) => {
            error!("Failed to load manifest: {}", e);
            Err(ApiError::internal("Failed to load manifest"))
        }
    }
}

async fn language_bundle(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !state.languages.is_enabled(&language) {
        return Err(ApiError::language_not_supported());
    }

    let bundle = state
        .store
        .load_language(&language, &state.namespaces.names())
        .await;

    cached_json(&bundle, &headers, &state.cache_control())
}

async fn namespace_bundle(
    State(state): State<Arc<AppState>>,
    Path((language, namespace)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !state.languages.is_enabled(&language) {
        return Err(ApiError::language_not_supported());
    }
    if !state.namespaces.contains(&namespace) {
        return Err(ApiError::namespace_not_supported());
    }

    let translations: FlatTranslations = match state.store.read_namespace(&language, &namespace).await {
        Ok(found) => found.unwrap_or_default(),
        Err(e) => {
            error!("Failed to load {}/{}: {}", language, namespace, e);
            return Err(ApiError::internal("Failed to load translations"));
        }
    };

    cached_json(&translations, &headers, &state.cache_control())
}

/// Strong ETag over the serialized body, so identical content always gets the
/// same tag.
pub fn content_etag(body: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(body))
}

/// Whether an `If-None-Match` header value matches `etag`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// Serialize `body` as JSON with `Cache-Control` and `ETag`, answering a
/// matching `If-None-Match` with 304.
fn cached_json<T: Serialize>(
    body: &T,
    request_headers: &HeaderMap,
    cache_control: &str,
) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(body).map_err(|e| {
        error!("Failed to serialize translations: {}", e);
        ApiError::internal("Failed to load translations")
    })?;
    let etag = content_etag(&bytes);

    let mut response_headers = HeaderMap::new();
    match HeaderValue::from_str(cache_control) {
        Ok(value) => {
            response_headers.insert(header::CACHE_CONTROL, value);
        }
        Err(e) => warn!("Invalid Cache-Control value {:?}: {}", cache_control, e),
    }
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(header::ETAG, value);
    }

    let not_modified = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| etag_matches(value, &etag));
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
    }

    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok((StatusCode::OK, response_headers, bytes).into_response())
}
