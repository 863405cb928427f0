//! Print handlers: single sticker and batch.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::compose::PrintPayload;
use crate::error::EtiquetaError;
use crate::placeholder::EntityPayload;

use super::super::state::AppState;
use super::{HandlerError, error_response, task_error, template};

fn attachment(payload: PrintPayload) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", payload.filename);
    (
        [
            (header::CONTENT_TYPE, payload.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload.bytes,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub entity: EntityPayload,
}

/// POST /api/templates/:id/print - One sticker as PDF (SVG on fallback).
pub async fn single(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<PrintRequest>,
) -> Result<Response, HandlerError> {
    let template = template(&state, id)?;
    let (context, identifier) = request
        .entity
        .bind(template.template_type(), &state.currency)
        .map_err(error_response)?;

    let payload = tokio::task::spawn_blocking(move || {
        state
            .compositor
            .compose_single(&template, &context, &identifier)
    })
    .await
    .map_err(task_error)?;
    Ok(attachment(payload))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub entities: Vec<EntityPayload>,
}

/// POST /api/templates/:id/batch - One page per entity.
pub async fn batch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<BatchRequest>,
) -> Result<Response, HandlerError> {
    let template = template(&state, id)?;
    if request.entities.is_empty() {
        return Err(error_response(EtiquetaError::EmptyBatch));
    }
    let contexts = request
        .entities
        .into_iter()
        .map(|entity| entity.bind(template.template_type(), &state.currency).map(|(ctx, _)| ctx))
        .collect::<Result<Vec<_>, _>>()
        .map_err(error_response)?;

    let payload = tokio::task::spawn_blocking(move || {
        state.compositor.compose_batch(&template, &contexts)
    })
    .await
    .map_err(task_error)?
    .map_err(error_response)?;
    Ok(attachment(payload))
}
