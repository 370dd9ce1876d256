use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::models::placement::Entity;
use crate::registry::schema::{ContextSchema, EntitySource};
use crate::store::{PlacementEntityStore, StoreError};

/// Entities reachable from one placement, keyed by source. Every source is present;
/// unreachable ones map to an empty entity.
#[derive(Debug, Clone)]
pub struct DataContext {
    entities: HashMap<EntitySource, Entity>,
}

impl DataContext {
    pub fn empty() -> Self {
        Self {
            entities: EntitySource::ALL
                .into_iter()
                .map(|source| (source, Entity::new()))
                .collect(),
        }
    }

    pub fn insert(&mut self, source: EntitySource, entity: Entity) {
        self.entities.insert(source, entity);
    }

    pub fn entity(&self, source: EntitySource) -> Option<&Entity> {
        self.entities.get(&source)
    }

    /// A field value; `None` when missing or null.
    pub fn lookup(&self, source: EntitySource, field: &str) -> Option<&Value> {
        self.entity(source)?.get(field).filter(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.entities.values().all(|e| e.is_empty())
    }
}

/// Assembles the data context of a placement.
///
/// A missing placement is not an error: every source stays empty so merges degrade to
/// default values. Only store failures propagate.
pub async fn resolve_context(
    placements: &dyn PlacementEntityStore,
    schema: &ContextSchema,
    placement_id: Uuid,
) -> Result<DataContext, StoreError> {
    let mut context = DataContext::empty();

    let Some(placement) = placements.get_placement(placement_id).await? else {
        debug!("Placement {placement_id} not found, using empty merge context");
        return Ok(context);
    };

    for source in EntitySource::ALL {
        let spec = schema.spec(source);
        let Some(fk_column) = spec.foreign_key.as_deref() else {
            continue;
        };
        let Some(entity_id) = placement.foreign_key(fk_column) else {
            debug!("Placement {placement_id} has no {fk_column}");
            continue;
        };
        match placements.get_entity(&spec.table, entity_id).await? {
            Some(entity) => context.insert(source, entity),
            None => debug!("{} {entity_id} not found", spec.table),
        }
    }

    context.insert(EntitySource::Placement, placement.data);
    Ok(context)
}
