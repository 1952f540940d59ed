//! HTTP API for showreel
//!
//! JSON endpoints over the content source, the media resolver and the
//! contact form. Every body has the shape `{success, data?, error?}`.

mod error;
mod handlers;

use crate::content::ContentSource;
use crate::media::MediaResolver;
use crate::utils::error::Result;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentSource>,
    pub media: MediaResolver,
}

impl AppState {
    pub fn new(content: Arc<dyn ContentSource>, media: MediaResolver) -> Self {
        Self { content, media }
    }
}

/// Build the API router
///
/// # Arguments
///
/// * `state` - Content source and resolver shared by all handlers
/// * `cors_allow_any` - Accept cross-origin requests from any origin
pub fn router(state: AppState, cors_allow_any: bool) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/projects", get(handlers::list_projects))
        .route("/api/projects/:id", get(handlers::get_project))
        .route("/api/playlist", get(handlers::playlist))
        .route("/api/blog", get(handlers::list_posts))
        .route("/api/blog/:slug", get(handlers::get_post))
        .route("/api/assets", get(handlers::asset))
        .route("/api/contact", post(handlers::submit_contact))
        .with_state(state);

    if cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    }
}

/// Serve `app` on `addr` until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    info!("Server stopped");
    Ok(())
}
