//! Persistence interfaces consumed by the merge engine and the completion tracker.
//!
//! The core never touches SQL directly: everything goes through these four traits so the
//! engine can run against PostgreSQL in production and an in-memory store in tests.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::{
    DocumentInstance, DocumentPatch, NewDocumentInstance, UnknownStatus,
};
use crate::models::placement::{Entity, PlacementRecord};
use crate::models::template::{DocumentTemplate, TemplateFilter};
use crate::models::variable::Variable;
use crate::registry::schema::{ContextSchema, EntitySource};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<UnknownStatus> for StoreError {
    fn from(value: UnknownStatus) -> Self {
        StoreError::InvalidRow(value.to_string())
    }
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list(&self, filter: TemplateFilter) -> Result<Vec<DocumentTemplate>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<DocumentTemplate>, StoreError>;
}

#[async_trait]
pub trait VariableStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Variable>, StoreError>;
}

#[async_trait]
pub trait DocumentInstanceStore: Send + Sync {
    /// All instances, or only those of one placement.
    async fn list(&self, placement_id: Option<Uuid>)
        -> Result<Vec<DocumentInstance>, StoreError>;

    /// Creates the batch atomically: either every new row lands or none does.
    /// Rows colliding with an existing `(placement, template)` pair are skipped.
    async fn create_many(
        &self,
        instances: Vec<NewDocumentInstance>,
    ) -> Result<Vec<DocumentInstance>, StoreError>;

    /// Returns `None` when no instance has this id.
    async fn update(
        &self,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<Option<DocumentInstance>, StoreError>;
}

#[async_trait]
pub trait PlacementEntityStore: Send + Sync {
    async fn get_placement(&self, id: Uuid) -> Result<Option<PlacementRecord>, StoreError>;

    /// Fetches one row of `table` by primary key. `table` comes from the validated
    /// context schema, never from request input.
    async fn get_entity(&self, table: &str, id: Uuid) -> Result<Option<Entity>, StoreError>;
}

/// The store handles shared by every request.
#[derive(Clone)]
pub struct Stores {
    pub templates: Arc<dyn TemplateStore>,
    pub variables: Arc<dyn VariableStore>,
    pub documents: Arc<dyn DocumentInstanceStore>,
    pub placements: Arc<dyn PlacementEntityStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool, schema: &ContextSchema) -> Self {
        let store = Arc::new(
            postgres::PgStore::new(pool)
                .with_placement_table(&schema.spec(EntitySource::Placement).table),
        );
        Self {
            templates: store.clone(),
            variables: store.clone(),
            documents: store.clone(),
            placements: store,
        }
    }

    #[cfg(test)]
    pub fn in_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            templates: store.clone(),
            variables: store.clone(),
            documents: store.clone(),
            placements: store,
        }
    }
}
