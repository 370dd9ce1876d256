//! In-memory store used by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::document::{DocumentInstance, DocumentPatch, NewDocumentInstance};
use crate::models::placement::{Entity, PlacementRecord};
use crate::models::template::{DocumentTemplate, TemplateFilter};
use crate::models::variable::Variable;
use crate::store::{
    DocumentInstanceStore, PlacementEntityStore, StoreError, TemplateStore, VariableStore,
};

#[derive(Default)]
pub struct MemoryStore {
    templates: Mutex<Vec<DocumentTemplate>>,
    variables: Mutex<Vec<Variable>>,
    documents: Mutex<Vec<DocumentInstance>>,
    placements: Mutex<HashMap<Uuid, Entity>>,
    entities: Mutex<HashMap<(String, Uuid), Entity>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&self, template: DocumentTemplate) {
        self.templates.lock().unwrap().push(template);
    }

    pub fn add_variable(&self, variable: Variable) {
        self.variables.lock().unwrap().push(variable);
    }

    pub fn add_placement(&self, id: Uuid, data: Entity) {
        self.placements.lock().unwrap().insert(id, data);
    }

    pub fn add_entity(&self, table: &str, id: Uuid, data: Entity) {
        self.entities
            .lock()
            .unwrap()
            .insert((table.to_string(), id), data);
    }

    /// Seeds an instance directly, bypassing the write-failure switch.
    pub fn insert_document(&self, instance: NewDocumentInstance) -> DocumentInstance {
        let created = Self::build(instance);
        self.documents.lock().unwrap().push(created.clone());
        created
    }

    pub fn documents(&self) -> Vec<DocumentInstance> {
        self.documents.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn build(instance: NewDocumentInstance) -> DocumentInstance {
        let now = Utc::now();
        DocumentInstance {
            id: Uuid::new_v4(),
            siswa_magang_id: instance.siswa_magang_id,
            document_template_id: instance.document_template_id,
            status: instance.status,
            catatan: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn list(&self, filter: TemplateFilter) -> Result<Vec<DocumentTemplate>, StoreError> {
        self.check_read()?;
        let mut templates: Vec<_> = self
            .templates
            .lock()
            .unwrap()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.urutan.cmp(&b.urutan).then_with(|| a.kode.cmp(&b.kode)));
        Ok(templates)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentTemplate>, StoreError> {
        self.check_read()?;
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }
}

#[async_trait]
impl VariableStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Variable>, StoreError> {
        self.check_read()?;
        Ok(self.variables.lock().unwrap().clone())
    }
}

#[async_trait]
impl DocumentInstanceStore for MemoryStore {
    async fn list(
        &self,
        placement_id: Option<Uuid>,
    ) -> Result<Vec<DocumentInstance>, StoreError> {
        self.check_read()?;
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| placement_id.map_or(true, |p| d.siswa_magang_id == p))
            .cloned()
            .collect())
    }

    async fn create_many(
        &self,
        instances: Vec<NewDocumentInstance>,
    ) -> Result<Vec<DocumentInstance>, StoreError> {
        self.check_write()?;
        let mut documents = self.documents.lock().unwrap();
        let mut created = Vec::new();
        for instance in instances {
            let exists = documents.iter().any(|d| {
                d.siswa_magang_id == instance.siswa_magang_id
                    && d.document_template_id == instance.document_template_id
            });
            if exists {
                continue;
            }
            let doc = Self::build(instance);
            documents.push(doc.clone());
            created.push(doc);
        }
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<Option<DocumentInstance>, StoreError> {
        self.check_write()?;
        let mut documents = self.documents.lock().unwrap();
        let Some(doc) = documents.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            doc.status = status;
        }
        if let Some(catatan) = patch.catatan {
            doc.catatan = Some(catatan);
        }
        if let Some(verified_at) = patch.verified_at {
            doc.verified_at = verified_at;
        }
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }
}

#[async_trait]
impl PlacementEntityStore for MemoryStore {
    async fn get_placement(&self, id: Uuid) -> Result<Option<PlacementRecord>, StoreError> {
        self.check_read()?;
        Ok(self
            .placements
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .map(|data| PlacementRecord { id, data }))
    }

    async fn get_entity(&self, table: &str, id: Uuid) -> Result<Option<Entity>, StoreError> {
        self.check_read()?;
        Ok(self
            .entities
            .lock()
            .unwrap()
            .get(&(table.to_string(), id))
            .cloned())
    }
}
