use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named binding from a `{{name}}` placeholder to a backend field plus a formatting rule.
///
/// Category, table, field and format are kept as stored strings; the registry compiles
/// them into a typed binding before any merge touches them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Variable {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub category: String,
    pub source_table: String,
    pub source_field: String,
    #[serde(default = "default_format_type")]
    pub format_type: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_format_type() -> String {
    FormatType::Text.as_str().to_string()
}

fn default_active() -> bool {
    true
}

impl Variable {
    pub fn format(&self) -> FormatType {
        FormatType::parse_lenient(&self.format_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariableCategory {
    Student,
    HostCompany,
    IntermediaryOrg,
    Program,
    AgencyProfile,
    JobOrder,
    System,
}

impl VariableCategory {
    pub const ALL: [VariableCategory; 7] = [
        VariableCategory::Student,
        VariableCategory::HostCompany,
        VariableCategory::IntermediaryOrg,
        VariableCategory::Program,
        VariableCategory::AgencyProfile,
        VariableCategory::JobOrder,
        VariableCategory::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableCategory::Student => "student",
            VariableCategory::HostCompany => "host_company",
            VariableCategory::IntermediaryOrg => "intermediary_org",
            VariableCategory::Program => "program",
            VariableCategory::AgencyProfile => "agency_profile",
            VariableCategory::JobOrder => "job_order",
            VariableCategory::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value.trim())
    }
}

/// Rendering rule applied to a resolved raw value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    #[default]
    Text,
    Date,
    DateJp,
    Currency,
    CurrencyJp,
    Uppercase,
    Lowercase,
    Number,
    Phone,
}

impl FormatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::Text => "text",
            FormatType::Date => "date",
            FormatType::DateJp => "date_jp",
            FormatType::Currency => "currency",
            FormatType::CurrencyJp => "currency_jp",
            FormatType::Uppercase => "uppercase",
            FormatType::Lowercase => "lowercase",
            FormatType::Number => "number",
            FormatType::Phone => "phone",
        }
    }

    /// Unknown format names fall back to plain text.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim() {
            "date" => FormatType::Date,
            "date_jp" => FormatType::DateJp,
            "currency" => FormatType::Currency,
            "currency_jp" => FormatType::CurrencyJp,
            "uppercase" => FormatType::Uppercase,
            "lowercase" => FormatType::Lowercase,
            "number" => FormatType::Number,
            "phone" => FormatType::Phone,
            _ => FormatType::Text,
        }
    }
}
