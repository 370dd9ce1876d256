use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A reusable document shape with embedded `{{variable_name}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentTemplate {
    pub id: Uuid,
    pub kode: String,
    pub nama: String,
    /// visa / contract / admin / health / education / finance / other
    pub kategori: String,
    pub template_content: String,
    pub is_required: bool,
    pub is_active: bool,
    pub urutan: i32,
}

impl DocumentTemplate {
    /// Only active, required templates get tracked instances.
    pub fn is_tracked(&self) -> bool {
        self.is_active && self.is_required
    }
}

/// Filter accepted by `TemplateStore::list`; `None` means "either".
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFilter {
    pub active: Option<bool>,
    pub required: Option<bool>,
}

impl TemplateFilter {
    pub fn required_active() -> Self {
        Self {
            active: Some(true),
            required: Some(true),
        }
    }

    #[cfg(test)]
    pub fn matches(&self, template: &DocumentTemplate) -> bool {
        self.active.map_or(true, |a| template.is_active == a)
            && self.required.map_or(true, |r| template.is_required == r)
    }
}
