//! Context schema — which backend table and field set each variable category can address.
//!
//! Passed explicitly into the resolver and the binding parser so tests (and deployments
//! with different table names) can swap it without touching engine internals.

use serde::Serialize;
use thiserror::Error;

use crate::models::variable::VariableCategory;

/// Sentinel `source_table` of synthetic system variables.
pub const SYSTEM_TABLE: &str = "_system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Student,
    Placement,
    HostCompany,
    IntermediaryOrg,
    Program,
    AgencyProfile,
    JobOrder,
}

impl EntitySource {
    pub const ALL: [EntitySource; 7] = [
        EntitySource::Student,
        EntitySource::Placement,
        EntitySource::HostCompany,
        EntitySource::IntermediaryOrg,
        EntitySource::Program,
        EntitySource::AgencyProfile,
        EntitySource::JobOrder,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntitySource::Student => "student",
            EntitySource::Placement => "placement",
            EntitySource::HostCompany => "host_company",
            EntitySource::IntermediaryOrg => "intermediary_org",
            EntitySource::Program => "program",
            EntitySource::AgencyProfile => "agency_profile",
            EntitySource::JobOrder => "job_order",
        }
    }

    /// Suffix of the `MERGE_TABLE_*` override variable.
    pub fn env_suffix(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

/// Sources a category may bind to. The placement record is addressed through `student`.
pub fn sources_for(category: VariableCategory) -> &'static [EntitySource] {
    match category {
        VariableCategory::Student => &[EntitySource::Student, EntitySource::Placement],
        VariableCategory::HostCompany => &[EntitySource::HostCompany],
        VariableCategory::IntermediaryOrg => &[EntitySource::IntermediaryOrg],
        VariableCategory::Program => &[EntitySource::Program],
        VariableCategory::AgencyProfile => &[EntitySource::AgencyProfile],
        VariableCategory::JobOrder => &[EntitySource::JobOrder],
        VariableCategory::System => &[],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSpec {
    pub table: String,
    /// Column on the placement record pointing at this source; `None` for the placement itself.
    pub foreign_key: Option<String>,
    pub fields: Vec<String>,
}

impl SourceSpec {
    fn new(table: &str, foreign_key: Option<&str>, fields: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            foreign_key: foreign_key.map(str::to_string),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),

    #[error("table '{0}' is assigned to more than one source")]
    DuplicateTable(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSchema {
    sources: [SourceSpec; 7],
}

impl Default for ContextSchema {
    fn default() -> Self {
        Self {
            sources: [
                SourceSpec::new(
                    "siswa",
                    Some("siswa_id"),
                    &[
                        "nama",
                        "nama_katakana",
                        "nis",
                        "nik",
                        "jenis_kelamin",
                        "tempat_lahir",
                        "tanggal_lahir",
                        "agama",
                        "alamat",
                        "telepon",
                        "email",
                        "pendidikan_terakhir",
                        "no_paspor",
                        "tanggal_paspor_berakhir",
                        "nama_ayah",
                        "nama_ibu",
                        "tinggi_badan",
                        "berat_badan",
                    ],
                ),
                SourceSpec::new(
                    "siswa_magang",
                    None,
                    &[
                        "tanggal_mulai",
                        "tanggal_selesai",
                        "tanggal_keberangkatan",
                        "posisi",
                        "gaji",
                        "no_kontrak",
                        "status",
                        "catatan",
                    ],
                ),
                SourceSpec::new(
                    "perusahaan",
                    Some("perusahaan_id"),
                    &[
                        "nama",
                        "nama_jepang",
                        "alamat",
                        "kota",
                        "prefektur",
                        "kode_pos",
                        "telepon",
                        "email",
                        "bidang_usaha",
                        "penanggung_jawab",
                    ],
                ),
                SourceSpec::new(
                    "lpk_mitra",
                    Some("lpk_mitra_id"),
                    &[
                        "nama",
                        "nama_jepang",
                        "alamat",
                        "telepon",
                        "email",
                        "penanggung_jawab",
                        "no_izin",
                    ],
                ),
                SourceSpec::new(
                    "program",
                    Some("program_id"),
                    &["nama", "kode", "durasi_bulan", "biaya", "deskripsi"],
                ),
                SourceSpec::new(
                    "profil_lpk",
                    Some("profil_lpk_id"),
                    &[
                        "nama",
                        "alamat",
                        "kota",
                        "telepon",
                        "email",
                        "website",
                        "no_izin",
                        "nama_direktur",
                    ],
                ),
                SourceSpec::new(
                    "job_order",
                    Some("job_order_id"),
                    &["judul", "posisi", "bidang", "lokasi", "jumlah_kebutuhan", "gaji"],
                ),
            ],
        }
    }
}

impl ContextSchema {
    pub fn spec(&self, source: EntitySource) -> &SourceSpec {
        &self.sources[source.index()]
    }

    /// Replaces one source's table and field set.
    pub fn with_source(
        mut self,
        source: EntitySource,
        table: &str,
        fields: &[&str],
    ) -> Result<Self, SchemaError> {
        let spec = &mut self.sources[source.index()];
        spec.table = table.to_string();
        spec.fields = fields.iter().map(|f| f.to_string()).collect();
        self.validate()?;
        Ok(self)
    }

    pub fn with_table(mut self, source: EntitySource, table: &str) -> Result<Self, SchemaError> {
        self.sources[source.index()].table = table.to_string();
        self.validate()?;
        Ok(self)
    }

    /// Default schema with `MERGE_TABLE_<SOURCE>` and `MERGE_FIELDS_<SOURCE>` overrides applied.
    pub fn from_env() -> Result<Self, SchemaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `MERGE_FIELDS_*` is a comma-separated field list replacing the source's field set.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SchemaError> {
        let mut schema = Self::default();
        for source in EntitySource::ALL {
            let suffix = source.env_suffix();
            if let Some(table) = lookup(&format!("MERGE_TABLE_{suffix}")) {
                schema = schema.with_table(source, table.trim())?;
            }
            if let Some(fields) = lookup(&format!("MERGE_FIELDS_{suffix}")) {
                let fields: Vec<&str> = fields
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .collect();
                let table = schema.spec(source).table.clone();
                schema = schema.with_source(source, &table, &fields)?;
            }
        }
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, spec) in self.sources.iter().enumerate() {
            let idents = std::iter::once(&spec.table)
                .chain(spec.foreign_key.iter())
                .chain(spec.fields.iter());
            for ident in idents {
                if !is_sql_identifier(ident) {
                    return Err(SchemaError::InvalidIdentifier(ident.clone()));
                }
            }
            if self.sources[..i].iter().any(|other| other.table == spec.table) {
                return Err(SchemaError::DuplicateTable(spec.table.clone()));
            }
        }
        Ok(())
    }

    /// Finds the source addressed by `table` among those the category may bind to.
    pub fn source_for_table(
        &self,
        category: VariableCategory,
        table: &str,
    ) -> Option<EntitySource> {
        sources_for(category)
            .iter()
            .copied()
            .find(|source| self.spec(*source).table == table)
    }
}

pub fn is_sql_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_schema_is_valid() {
        assert_eq!(ContextSchema::default().validate(), Ok(()));
    }

    #[test]
    fn test_placement_is_addressable_through_student_category() {
        let schema = ContextSchema::default();
        assert_eq!(
            schema.source_for_table(VariableCategory::Student, "siswa_magang"),
            Some(EntitySource::Placement)
        );
        assert_eq!(
            schema.source_for_table(VariableCategory::HostCompany, "siswa"),
            None
        );
    }

    #[test]
    fn test_with_table_rejects_injection() {
        let err = ContextSchema::default()
            .with_table(EntitySource::Program, "program; DROP TABLE siswa")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_with_table_rejects_shared_table() {
        let err = ContextSchema::default()
            .with_table(EntitySource::Program, "siswa")
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTable("siswa".to_string()));
    }

    #[test]
    fn test_with_source_swaps_field_set() {
        let schema = ContextSchema::default()
            .with_source(EntitySource::HostCompany, "companies", &["name", "city"])
            .unwrap();
        let spec = schema.spec(EntitySource::HostCompany);
        assert_eq!(spec.table, "companies");
        assert!(spec.has_field("name"));
        assert!(!spec.has_field("nama"));
        assert_eq!(spec.foreign_key.as_deref(), Some("perusahaan_id"));
    }

    #[test]
    fn test_env_overrides_table_and_fields() {
        let env: HashMap<&str, &str> = [
            ("MERGE_TABLE_HOST_COMPANY", "companies"),
            ("MERGE_FIELDS_HOST_COMPANY", "name, city,,"),
            ("MERGE_FIELDS_PROGRAM", "nama"),
        ]
        .into_iter()
        .collect();
        let schema =
            ContextSchema::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();

        let company = schema.spec(EntitySource::HostCompany);
        assert_eq!(company.table, "companies");
        assert_eq!(company.fields, vec!["name", "city"]);
        let program = schema.spec(EntitySource::Program);
        assert_eq!(program.table, "program");
        assert_eq!(program.fields, vec!["nama"]);
        assert_eq!(
            schema.spec(EntitySource::Student).fields,
            ContextSchema::default().spec(EntitySource::Student).fields
        );
    }

    #[test]
    fn test_env_field_override_rejects_bad_identifier() {
        let err = ContextSchema::from_lookup(|key| {
            (key == "MERGE_FIELDS_STUDENT").then(|| "nama, \"nik\"".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_sql_identifier_rules() {
        assert!(is_sql_identifier("siswa_magang"));
        assert!(is_sql_identifier("_tmp1"));
        assert!(!is_sql_identifier("1abc"));
        assert!(!is_sql_identifier("Siswa"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("a-b"));
    }
}
