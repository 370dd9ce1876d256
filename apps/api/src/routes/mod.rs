pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::merge::handlers as merge;
use crate::registry::handlers as registry;
use crate::state::AppState;
use crate::tracking::handlers as tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Variable registry
        .route("/api/v1/variables", get(registry::handle_list_variables))
        .route(
            "/api/v1/variables/validate",
            post(registry::handle_validate_variable),
        )
        .route(
            "/api/v1/templates/:id/placeholders",
            get(registry::handle_template_placeholders),
        )
        // Merge
        .route("/api/v1/merge", post(merge::handle_merge))
        .route(
            "/api/v1/templates/:id/merge",
            post(merge::handle_merge_template),
        )
        // Document tracking
        .route(
            "/api/v1/placements/:id/documents/initialize",
            post(tracking::handle_initialize_documents),
        )
        .route(
            "/api/v1/placements/:id/documents",
            get(tracking::handle_placement_documents),
        )
        .route(
            "/api/v1/documents/overview",
            get(tracking::handle_completion_overview),
        )
        .route(
            "/api/v1/documents/:id/status",
            patch(tracking::handle_update_status),
        )
        .route(
            "/api/v1/documents/:id/verification",
            delete(tracking::handle_clear_verification),
        )
        .with_state(state)
}
