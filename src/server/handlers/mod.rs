//! HTTP handlers for the server.

pub mod fonts;
pub mod print;
pub mod templates;

use axum::http::StatusCode;
use std::sync::Arc;

use crate::error::EtiquetaError;
use crate::template::StickerTemplate;

use super::state::AppState;

type HandlerError = (StatusCode, String);

/// Map a library error to the response tuple handlers return.
fn error_response(e: EtiquetaError) -> HandlerError {
    let status = match &e {
        EtiquetaError::InvalidTemplate(_)
        | EtiquetaError::TemplateTypeMismatch { .. }
        | EtiquetaError::EmptyBatch
        | EtiquetaError::Json(_) => StatusCode::BAD_REQUEST,
        EtiquetaError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

fn task_error(e: tokio::task::JoinError) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Task error: {}", e),
    )
}

fn template(state: &AppState, id: i64) -> Result<Arc<StickerTemplate>, HandlerError> {
    state.store.require(id).map_err(error_response)
}
