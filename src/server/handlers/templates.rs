//! Template listing and preview handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::fonts::FontList;
use crate::placeholder::{EntityPayload, PlaceholderContext, placeholders};
use crate::render::{self, ElementPreview, Preview};
use crate::template::{StickerTemplate, TemplateSummary};
use crate::units::RENDER_DPI;

use super::super::state::AppState;
use super::{HandlerError, error_response, task_error, template};

/// GET /api/templates - List template summaries.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<TemplateSummary>> {
    Json(state.store.list().iter().map(|t| t.summary()).collect())
}

/// Everything the editor needs to work on a template.
#[derive(Serialize)]
pub struct TemplateDetail {
    pub template: StickerTemplate,
    pub placeholders: Vec<String>,
    pub dpi: f64,
    pub fonts: FontList,
}

/// GET /api/templates/:id - Template with its placeholder vocabulary.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TemplateDetail>, HandlerError> {
    let template = template(&state, id)?;
    Ok(Json(TemplateDetail {
        placeholders: placeholders(template.template_type()),
        dpi: RENDER_DPI,
        fonts: state.fonts().list_fonts(),
        template: StickerTemplate::clone(&template),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Show raw `{Token}` text instead of sample values
    #[serde(default)]
    pub unresolved: bool,
}

async fn render_preview(
    state: Arc<AppState>,
    template: Arc<StickerTemplate>,
    context: PlaceholderContext,
) -> Result<Json<Preview>, HandlerError> {
    let preview = tokio::task::spawn_blocking(move || {
        render::preview(&template, &context, state.fonts())
    })
    .await
    .map_err(task_error)?;
    Ok(Json(preview))
}

/// GET /api/templates/:id/preview - Preview with sample or raw tokens.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<Preview>, HandlerError> {
    let template = template(&state, id)?;
    let context = if query.unresolved {
        PlaceholderContext::unresolved(template.template_type())
    } else {
        PlaceholderContext::sample(template.template_type())
    };
    render_preview(state, template, context).await
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub entity: Option<EntityPayload>,
}

/// POST /api/templates/:id/preview - Preview bound to an entity.
pub async fn preview_entity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<Preview>, HandlerError> {
    let template = template(&state, id)?;
    let context = match request.entity {
        Some(entity) => {
            entity
                .bind(template.template_type(), &state.currency)
                .map_err(error_response)?
                .0
        }
        None => PlaceholderContext::sample(template.template_type()),
    };
    render_preview(state, template, context).await
}

#[derive(Debug, Serialize)]
pub struct ElementPreviewResponse {
    pub svg: String,
    pub success: bool,
}

/// POST /api/templates/:id/preview-element - Single unsaved code element.
pub async fn preview_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(element): Json<ElementPreview>,
) -> Result<Json<ElementPreviewResponse>, HandlerError> {
    template(&state, id)?;
    let fragment = render::preview_element(&element);
    Ok(Json(ElementPreviewResponse {
        success: !fragment.is_error(),
        svg: fragment.to_svg(),
    }))
}
