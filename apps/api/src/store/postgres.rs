use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::document::{
    DocumentInstance, DocumentInstanceRow, DocumentPatch, NewDocumentInstance,
};
use crate::models::placement::{Entity, PlacementRecord};
use crate::models::template::{DocumentTemplate, TemplateFilter};
use crate::models::variable::Variable;
use crate::registry::schema::is_sql_identifier;
use crate::store::{
    DocumentInstanceStore, PlacementEntityStore, StoreError, TemplateStore, VariableStore,
};

const PLACEMENT_TABLE: &str = "siswa_magang";

/// PostgreSQL-backed implementation of every store trait.
pub struct PgStore {
    pool: PgPool,
    placement_table: String,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            placement_table: PLACEMENT_TABLE.to_string(),
        }
    }

    pub fn with_placement_table(mut self, table: &str) -> Self {
        self.placement_table = table.to_string();
        self
    }

    async fn fetch_row_json(&self, table: &str, id: Uuid) -> Result<Option<Entity>, StoreError> {
        if !is_sql_identifier(table) {
            return Err(StoreError::InvalidRow(format!(
                "refusing to query table '{table}'"
            )));
        }
        let data: Option<Value> = sqlx::query_scalar(&format!(
            "SELECT to_jsonb(t) FROM {table} t WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match data {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(StoreError::InvalidRow(format!(
                "{table} row {id} is not an object: {other}"
            ))),
        }
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn list(&self, filter: TemplateFilter) -> Result<Vec<DocumentTemplate>, StoreError> {
        Ok(sqlx::query_as::<_, DocumentTemplate>(
            r#"
            SELECT id, kode, nama, kategori, template_content, is_required, is_active, urutan
            FROM document_templates
            WHERE ($1::bool IS NULL OR is_active = $1)
              AND ($2::bool IS NULL OR is_required = $2)
            ORDER BY urutan, kode
            "#,
        )
        .bind(filter.active)
        .bind(filter.required)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentTemplate>, StoreError> {
        Ok(sqlx::query_as::<_, DocumentTemplate>(
            r#"
            SELECT id, kode, nama, kategori, template_content, is_required, is_active, urutan
            FROM document_templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl VariableStore for PgStore {
    async fn list(&self) -> Result<Vec<Variable>, StoreError> {
        Ok(sqlx::query_as::<_, Variable>(
            r#"
            SELECT id, name, display_name, category, source_table, source_field,
                   format_type, default_value, is_active
            FROM document_variables
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

fn into_instances(rows: Vec<DocumentInstanceRow>) -> Result<Vec<DocumentInstance>, StoreError> {
    rows.into_iter()
        .map(|row| DocumentInstance::try_from(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl DocumentInstanceStore for PgStore {
    async fn list(
        &self,
        placement_id: Option<Uuid>,
    ) -> Result<Vec<DocumentInstance>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentInstanceRow>(
            r#"
            SELECT * FROM siswa_magang_documents
            WHERE ($1::uuid IS NULL OR siswa_magang_id = $1)
            ORDER BY siswa_magang_id, created_at
            "#,
        )
        .bind(placement_id)
        .fetch_all(&self.pool)
        .await?;
        into_instances(rows)
    }

    async fn create_many(
        &self,
        instances: Vec<NewDocumentInstance>,
    ) -> Result<Vec<DocumentInstance>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(instances.len());

        for instance in instances {
            // Conflicting pairs return no row and are skipped.
            let row = sqlx::query_as::<_, DocumentInstanceRow>(
                r#"
                INSERT INTO siswa_magang_documents
                    (id, siswa_magang_id, document_template_id, status)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (siswa_magang_id, document_template_id) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(instance.siswa_magang_id)
            .bind(instance.document_template_id)
            .bind(instance.status.as_str())
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = row {
                created.push(DocumentInstance::try_from(row)?);
            }
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<Option<DocumentInstance>, StoreError> {
        let (set_verified_at, verified_at): (bool, Option<DateTime<Utc>>) = match patch.verified_at
        {
            Some(value) => (true, value),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, DocumentInstanceRow>(
            r#"
            UPDATE siswa_magang_documents
            SET status = COALESCE($2, status),
                catatan = COALESCE($3, catatan),
                verified_at = CASE WHEN $4 THEN $5 ELSE verified_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.catatan)
        .bind(set_verified_at)
        .bind(verified_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DocumentInstance::try_from).transpose()?)
    }
}

#[async_trait]
impl PlacementEntityStore for PgStore {
    async fn get_placement(&self, id: Uuid) -> Result<Option<PlacementRecord>, StoreError> {
        let data = self.fetch_row_json(&self.placement_table, id).await?;
        Ok(data.map(|data| PlacementRecord { id, data }))
    }

    async fn get_entity(&self, table: &str, id: Uuid) -> Result<Option<Entity>, StoreError> {
        self.fetch_row_json(table, id).await
    }
}
