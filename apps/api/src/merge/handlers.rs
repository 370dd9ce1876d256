//! Axum route handlers for the Merge API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::merge::merge_document;
use crate::models::variable::Variable;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub template_content: String,
    pub placement_id: Uuid,
    /// Falls back to every stored variable when omitted.
    #[serde(default)]
    pub variables: Option<Vec<Variable>>,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateMergeRequest {
    pub placement_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TemplateMergeResponse {
    pub template_id: Uuid,
    pub kode: String,
    pub nama: String,
    pub content: String,
}

/// POST /api/v1/merge
///
/// Merges arbitrary template content for a placement. Used by the template editor preview.
pub async fn handle_merge(
    State(state): State<AppState>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AppError> {
    let variables = match request.variables {
        Some(variables) => variables,
        None => state.stores.variables.list().await?,
    };

    let content = merge_document(
        state.stores.placements.as_ref(),
        &state.schema,
        &request.template_content,
        &variables,
        request.placement_id,
    )
    .await;

    Ok(Json(MergeResponse { content }))
}

/// POST /api/v1/templates/:id/merge
///
/// Merges a stored template with all stored variables, for printing.
pub async fn handle_merge_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(request): Json<TemplateMergeRequest>,
) -> Result<Json<TemplateMergeResponse>, AppError> {
    let template = state
        .stores
        .templates
        .get(template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))?;
    let variables = state.stores.variables.list().await?;

    let content = merge_document(
        state.stores.placements.as_ref(),
        &state.schema,
        &template.template_content,
        &variables,
        request.placement_id,
    )
    .await;

    Ok(Json(TemplateMergeResponse {
        template_id,
        kode: template.kode,
        nama: template.nama,
        content,
    }))
}
