use serde_json::{Map, Value};
use uuid::Uuid;

/// A backend row viewed as a field map (whole-row JSON).
pub type Entity = Map<String, Value>;

/// The student-internship placement record ("siswa magang").
#[derive(Debug, Clone)]
pub struct PlacementRecord {
    pub id: Uuid,
    pub data: Entity,
}

impl PlacementRecord {
    /// Reads a foreign-key column as a UUID. Null, missing and malformed values yield `None`.
    pub fn foreign_key(&self, column: &str) -> Option<Uuid> {
        match self.data.get(column)? {
            Value::String(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }
}
