use std::sync::Arc;

use crate::registry::schema::ContextSchema;
use crate::store::Stores;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    /// Which tables and fields variables may bind to; fixed for the process lifetime.
    pub schema: Arc<ContextSchema>,
}
