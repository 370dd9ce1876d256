//! Axum route handlers for the document tracking API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{DocumentInstance, DocumentStatus, UnknownStatus};
use crate::state::AppState;
use crate::tracking::tracker::{self, PlacementCompletion, PlacementProgress};

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub created: usize,
    pub required: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub catatan: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: DocumentInstance,
}

/// POST /api/v1/placements/:id/documents/initialize
///
/// Safe to call repeatedly; only missing required documents are created.
pub async fn handle_initialize_documents(
    State(state): State<AppState>,
    Path(placement_id): Path<Uuid>,
) -> Result<Json<InitializeResponse>, AppError> {
    let outcome = tracker::initialize_documents_for_placement(&state.stores, placement_id).await?;
    Ok(Json(InitializeResponse {
        success: true,
        created: outcome.created,
        required: outcome.required,
    }))
}

/// GET /api/v1/placements/:id/documents
pub async fn handle_placement_documents(
    State(state): State<AppState>,
    Path(placement_id): Path<Uuid>,
) -> Result<Json<PlacementProgress>, AppError> {
    Ok(Json(
        tracker::placement_progress(&state.stores, placement_id).await?,
    ))
}

/// GET /api/v1/documents/overview
pub async fn handle_completion_overview(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlacementCompletion>>, AppError> {
    Ok(Json(tracker::completion_overview(&state.stores).await?))
}

/// PATCH /api/v1/documents/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(instance_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let status: DocumentStatus = request
        .status
        .parse()
        .map_err(|e: UnknownStatus| AppError::Validation(e.to_string()))?;

    let document = tracker::update_document_status(
        &state.stores,
        instance_id,
        status,
        request.catatan,
    )
    .await?;
    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}

/// DELETE /api/v1/documents/:id/verification
pub async fn handle_clear_verification(
    State(state): State<AppState>,
    Path(instance_id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = tracker::clear_verification(&state.stores, instance_id).await?;
    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}
