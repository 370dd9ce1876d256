use serde::Serialize;
use uuid::Uuid;

use crate::models::variable::Variable;
use crate::registry::binding::Binding;
use crate::registry::placeholders::is_valid_variable_name;
use crate::registry::schema::ContextSchema;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

/// Checks a variable definition before it is saved.
///
/// Rejects:
/// - names outside `[a-z0-9_]+`
/// - names already used by another variable (the candidate's own id is ignored)
/// - empty display names
/// - category/table/field combinations the schema cannot address
pub fn validate_definition(
    candidate: &Variable,
    existing: &[Variable],
    schema: &ContextSchema,
) -> ValidationReport {
    let mut issues = Vec::new();
    let name = candidate.name.trim();

    if !is_valid_variable_name(name) {
        issues.push(ValidationIssue {
            field: "name",
            message: format!("'{name}' must be lowercase snake_case ([a-z0-9_]+)"),
        });
    }

    let taken = existing
        .iter()
        .any(|v| v.name == name && (candidate.id == Uuid::nil() || v.id != candidate.id));
    if taken {
        issues.push(ValidationIssue {
            field: "name",
            message: format!("variable '{name}' already exists"),
        });
    }

    if candidate.display_name.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "display_name",
            message: "display name cannot be empty".to_string(),
        });
    }

    let binding = match Binding::parse(
        &candidate.category,
        &candidate.source_table,
        &candidate.source_field,
        schema,
    ) {
        Ok(binding) => Some(binding),
        Err(err) => {
            issues.push(ValidationIssue {
                field: "source",
                message: err.to_string(),
            });
            None
        }
    };

    ValidationReport {
        passed: issues.is_empty(),
        issues,
        binding,
    }
}
