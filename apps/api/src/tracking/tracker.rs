use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::document::{DocumentInstance, DocumentPatch, DocumentStatus, NewDocumentInstance};
use crate::models::template::{DocumentTemplate, TemplateFilter};
use crate::store::{StoreError, Stores};
use crate::tracking::stats::{compute_stats, DocumentStats};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("placement {0} not found")]
    PlacementNotFound(Uuid),

    #[error("document {0} not found")]
    InstanceNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct InitializeOutcome {
    pub created: usize,
    pub required: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub kode: String,
    pub nama: String,
    pub kategori: String,
    pub is_required: bool,
    pub urutan: i32,
}

impl From<&DocumentTemplate> for TemplateSummary {
    fn from(template: &DocumentTemplate) -> Self {
        Self {
            kode: template.kode.clone(),
            nama: template.nama.clone(),
            kategori: template.kategori.clone(),
            is_required: template.is_required,
            urutan: template.urutan,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    #[serde(flatten)]
    pub document: DocumentInstance,
    pub template: Option<TemplateSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementProgress {
    pub placement_id: Uuid,
    pub stats: DocumentStats,
    pub no_documents_required: bool,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementCompletion {
    pub placement_id: Uuid,
    pub stats: DocumentStats,
}

/// Creates a `pending` instance for every active required template the placement lacks.
///
/// Idempotent: templates that already have an instance are skipped, and the batch is
/// written atomically so a failure leaves nothing behind. Zero required templates is a
/// successful no-op.
pub async fn initialize_documents_for_placement(
    stores: &Stores,
    placement_id: Uuid,
) -> Result<InitializeOutcome, TrackerError> {
    if stores.placements.get_placement(placement_id).await?.is_none() {
        return Err(TrackerError::PlacementNotFound(placement_id));
    }

    let required = stores
        .templates
        .list(TemplateFilter::required_active())
        .await?;
    let existing: HashSet<Uuid> = stores
        .documents
        .list(Some(placement_id))
        .await?
        .into_iter()
        .map(|d| d.document_template_id)
        .collect();

    let missing: Vec<NewDocumentInstance> = required
        .iter()
        .filter(|t| !existing.contains(&t.id))
        .map(|t| NewDocumentInstance {
            siswa_magang_id: placement_id,
            document_template_id: t.id,
            status: DocumentStatus::Pending,
        })
        .collect();

    if missing.is_empty() {
        return Ok(InitializeOutcome {
            created: 0,
            required: required.len(),
        });
    }

    let created = stores.documents.create_many(missing).await?;
    info!(
        "Initialized {} document(s) for placement {placement_id}",
        created.len()
    );

    Ok(InitializeOutcome {
        created: created.len(),
        required: required.len(),
    })
}

/// Sets the status (and the note, when given).
///
/// Moving to `verified` stamps `verified_at`; any other status leaves it as it was.
/// Transitions are not restricted.
pub async fn update_document_status(
    stores: &Stores,
    instance_id: Uuid,
    status: DocumentStatus,
    note: Option<String>,
) -> Result<DocumentInstance, TrackerError> {
    update_document_status_at(stores, instance_id, status, note, Utc::now()).await
}

pub async fn update_document_status_at(
    stores: &Stores,
    instance_id: Uuid,
    status: DocumentStatus,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<DocumentInstance, TrackerError> {
    let patch = DocumentPatch {
        status: Some(status),
        catatan: note,
        verified_at: (status == DocumentStatus::Verified).then_some(Some(now)),
    };

    let updated = stores
        .documents
        .update(instance_id, patch)
        .await?
        .ok_or(TrackerError::InstanceNotFound(instance_id))?;

    info!("Document {instance_id} set to {status}");
    Ok(updated)
}

/// Explicitly clears `verified_at`; status updates never do.
pub async fn clear_verification(
    stores: &Stores,
    instance_id: Uuid,
) -> Result<DocumentInstance, TrackerError> {
    let patch = DocumentPatch {
        verified_at: Some(None),
        ..Default::default()
    };

    let updated = stores
        .documents
        .update(instance_id, patch)
        .await?
        .ok_or(TrackerError::InstanceNotFound(instance_id))?;

    info!("Cleared verification of document {instance_id}");
    Ok(updated)
}

/// Stats plus every instance of the placement with its template metadata, in template order.
pub async fn placement_progress(
    stores: &Stores,
    placement_id: Uuid,
) -> Result<PlacementProgress, TrackerError> {
    let templates = stores.templates.list(TemplateFilter::default()).await?;
    let documents = stores.documents.list(Some(placement_id)).await?;

    let required_count = templates.iter().filter(|t| t.is_tracked()).count();
    let stats = compute_stats(documents.iter().map(|d| d.status), required_count);

    let by_id: HashMap<Uuid, &DocumentTemplate> = templates.iter().map(|t| (t.id, t)).collect();
    let mut entries: Vec<DocumentEntry> = documents
        .into_iter()
        .map(|document| DocumentEntry {
            template: by_id
                .get(&document.document_template_id)
                .map(|t| TemplateSummary::from(*t)),
            document,
        })
        .collect();

    entries.sort_by(|a, b| match (&a.template, &b.template) {
        (Some(x), Some(y)) => x.urutan.cmp(&y.urutan).then_with(|| x.kode.cmp(&y.kode)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.document.created_at.cmp(&b.document.created_at),
    });

    Ok(PlacementProgress {
        placement_id,
        stats,
        no_documents_required: required_count == 0,
        documents: entries,
    })
}

/// Completion stats of every placement that has at least one instance.
pub async fn completion_overview(
    stores: &Stores,
) -> Result<Vec<PlacementCompletion>, TrackerError> {
    let required_count = stores
        .templates
        .list(TemplateFilter::required_active())
        .await?
        .len();
    let documents = stores.documents.list(None).await?;

    let mut grouped: BTreeMap<Uuid, Vec<DocumentStatus>> = BTreeMap::new();
    for document in documents {
        grouped
            .entry(document.siswa_magang_id)
            .or_default()
            .push(document.status);
    }

    Ok(grouped
        .into_iter()
        .map(|(placement_id, statuses)| PlacementCompletion {
            placement_id,
            stats: compute_stats(statuses, required_count),
        })
        .collect())
}
