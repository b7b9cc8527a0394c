use axum::{
    http::{HeaderValue, Method, Uri},
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::{Config, CorsConfig};
use crate::tracker::VisitorTracker;

use super::handlers::{get_visits, health_check, record_visit, visit_settings, AppState};
use super::static_files::serve_static;

/// Prefix the server mounts [`create_api_router`] under
pub const API_PREFIX: &str = "/api";

pub fn create_api_router(tracker: Arc<VisitorTracker>, config: &Config) -> Router {
    let state = Arc::new(AppState {
        tracker,
        visit: config.visit.clone(),
        visit_endpoint: format!("{API_PREFIX}/visit"),
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/config", get(visit_settings))
        .route("/visit", get(get_visits).post(record_visit))
        .with_state(state)
}

/// Full application: the API under [`API_PREFIX`], CORS, and the frontend
/// as a fallback when a static directory is configured
pub fn create_app(tracker: Arc<VisitorTracker>, config: &Config) -> Router {
    let mut app = Router::new()
        .nest(API_PREFIX, create_api_router(tracker, config))
        .layer(cors_layer(&config.cors));

    if let Some(ref static_dir) = config.frontend.static_dir {
        let static_dir = PathBuf::from(static_dir);
        app = app.fallback(move |uri: Uri| serve_static(uri, static_dir.clone()));
    }

    app
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
