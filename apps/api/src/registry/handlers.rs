use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::variable::Variable;
use crate::registry::placeholders::{extract_placeholders, unknown_placeholders};
use crate::registry::validation::{validate_definition, ValidationReport};
use crate::registry::authoring_variables;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlaceholderReport {
    pub template_id: Uuid,
    pub placeholders: Vec<String>,
    pub unknown: Vec<String>,
}

/// GET /api/v1/variables
///
/// Active variables only; inactive ones are hidden from authoring but still merge.
pub async fn handle_list_variables(
    State(state): State<AppState>,
) -> Result<Json<Vec<Variable>>, AppError> {
    let variables = state.stores.variables.list().await?;
    Ok(Json(authoring_variables(variables)))
}

/// POST /api/v1/variables/validate
pub async fn handle_validate_variable(
    State(state): State<AppState>,
    Json(candidate): Json<Variable>,
) -> Result<Json<ValidationReport>, AppError> {
    let existing = state.stores.variables.list().await?;
    Ok(Json(validate_definition(
        &candidate,
        &existing,
        &state.schema,
    )))
}

/// GET /api/v1/templates/:id/placeholders
pub async fn handle_template_placeholders(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<PlaceholderReport>, AppError> {
    let template = state
        .stores
        .templates
        .get(template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))?;
    let variables = state.stores.variables.list().await?;

    let placeholders = extract_placeholders(&template.template_content);
    let unknown = unknown_placeholders(
        &template.template_content,
        variables.iter().map(|v| v.name.as_str()),
    );

    Ok(Json(PlaceholderReport {
        template_id,
        placeholders,
        unknown,
    }))
}
