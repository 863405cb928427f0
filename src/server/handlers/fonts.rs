//! Font listing handler.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::fonts::FontList;

use super::super::state::AppState;

/// GET /api/fonts - System and project font names, flagging web-only ones.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<FontList> {
    Json(state.fonts().list_fonts())
}
