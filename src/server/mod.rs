//! # HTTP Server for Sticker Previews and Printing
//!
//! Serves template listings, SVG previews and print payloads.
//!
//! ## Usage
//!
//! ```bash
//! etiqueta serve --listen 0.0.0.0:8080 --templates ./templates --fonts ./fonts
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/api/fonts` | `{system, project, web_only}` |
//! | GET | `/api/templates` | template summaries |
//! | GET | `/api/templates/:id` | template, placeholders, dpi, fonts |
//! | GET | `/api/templates/:id/preview?unresolved=` | preview JSON |
//! | POST | `/api/templates/:id/preview` | preview JSON for `{entity}` |
//! | POST | `/api/templates/:id/print` | PDF (or SVG fallback) |
//! | POST | `/api/templates/:id/batch` | multi-page PDF (or SVG sheet) |
//! | POST | `/api/templates/:id/preview-element` | `{svg, success}` |

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::EtiquetaError;

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fonts", get(handlers::fonts::list))
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/templates/:id", get(handlers::templates::detail))
        .route(
            "/api/templates/:id/preview",
            get(handlers::templates::preview).post(handlers::templates::preview_entity),
        )
        .route(
            "/api/templates/:id/preview-element",
            post(handlers::templates::preview_element),
        )
        .route("/api/templates/:id/print", post(handlers::print::single))
        .route("/api/templates/:id/batch", post(handlers::print::batch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use etiqueta::config::ServerConfig;
/// use etiqueta::server::serve;
///
/// # async fn example() -> Result<(), etiqueta::EtiquetaError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), EtiquetaError> {
    let state = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || AppState::from_config(&config))
            .await
            .map_err(|e| EtiquetaError::Server(format!("Startup task failed: {}", e)))??
    };
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            EtiquetaError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        templates = %config.template_dir.display(),
        fonts = %config.font_dir.display(),
        "etiqueta HTTP server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| EtiquetaError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
