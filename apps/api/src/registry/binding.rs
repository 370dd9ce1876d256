use serde::Serialize;
use thiserror::Error;

use crate::models::variable::VariableCategory;
use crate::registry::schema::{ContextSchema, EntitySource, SYSTEM_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemField {
    CurrentDate,
    CurrentYear,
}

impl SystemField {
    pub fn parse(field: &str) -> Option<Self> {
        match field.trim() {
            "current_date" => Some(SystemField::CurrentDate),
            "current_year" => Some(SystemField::CurrentYear),
            _ => None,
        }
    }
}

/// Where a variable's raw value comes from, checked against the context schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    Entity { source: EntitySource, field: String },
    System { field: SystemField },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindingError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("system variables must use source table '_system', got '{0}'")]
    SystemTable(String),

    #[error("unknown system field '{0}'")]
    UnknownSystemField(String),

    #[error("table '{table}' is not addressable by category '{category}'")]
    TableNotInCategory { category: String, table: String },

    #[error("table '{table}' has no field '{field}'")]
    UnknownField { table: String, field: String },
}

impl Binding {
    pub fn parse(
        category: &str,
        source_table: &str,
        source_field: &str,
        schema: &ContextSchema,
    ) -> Result<Self, BindingError> {
        let category = VariableCategory::parse(category)
            .ok_or_else(|| BindingError::UnknownCategory(category.to_string()))?;
        let table = source_table.trim();
        let field = source_field.trim();

        if category == VariableCategory::System {
            if table != SYSTEM_TABLE {
                return Err(BindingError::SystemTable(table.to_string()));
            }
            let field = SystemField::parse(field)
                .ok_or_else(|| BindingError::UnknownSystemField(field.to_string()))?;
            return Ok(Binding::System { field });
        }

        let source = schema.source_for_table(category, table).ok_or_else(|| {
            BindingError::TableNotInCategory {
                category: category.as_str().to_string(),
                table: table.to_string(),
            }
        })?;

        if !schema.spec(source).has_field(field) {
            return Err(BindingError::UnknownField {
                table: table.to_string(),
                field: field.to_string(),
            });
        }

        Ok(Binding::Entity {
            source,
            field: field.to_string(),
        })
    }
}
