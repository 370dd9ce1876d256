//! Mail-merge engine: replaces every `{{variable_name}}` with its resolved, formatted value.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::merge::context::{resolve_context, DataContext};
use crate::merge::format::format_value;
use crate::models::variable::{Variable, VariableCategory};
use crate::registry::binding::{Binding, SystemField};
use crate::registry::schema::ContextSchema;
use crate::registry::{CompiledVariable, VariableRegistry};
use crate::store::PlacementEntityStore;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("could not build placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Merges `template_content` for a placement. Never fails: if anything goes wrong the
/// original content is returned unmodified so previews and printing keep working.
pub async fn merge_document(
    placements: &dyn PlacementEntityStore,
    schema: &ContextSchema,
    template_content: &str,
    variables: &[Variable],
    placement_id: Uuid,
) -> String {
    merge_document_at(
        placements,
        schema,
        template_content,
        variables,
        placement_id,
        Utc::now(),
    )
    .await
}

pub async fn merge_document_at(
    placements: &dyn PlacementEntityStore,
    schema: &ContextSchema,
    template_content: &str,
    variables: &[Variable],
    placement_id: Uuid,
    now: DateTime<Utc>,
) -> String {
    let context = match resolve_context(placements, schema, placement_id).await {
        Ok(context) => context,
        Err(e) => {
            error!("Merge context for placement {placement_id} failed, returning template unmerged: {e}");
            return template_content.to_string();
        }
    };

    let registry = VariableRegistry::compile(variables, schema);
    match render(template_content, &registry, &context, now) {
        Ok(merged) => merged,
        Err(e) => {
            error!("Merge for placement {placement_id} failed, returning template unmerged: {e}");
            template_content.to_string()
        }
    }
}

/// Single substitution pass over the original content.
///
/// One pattern is built from every escaped variable name, so replacement text is never
/// scanned again and names containing regex metacharacters match only literally.
/// Placeholders without a definition are left as they are.
pub fn render(
    content: &str,
    registry: &VariableRegistry,
    context: &DataContext,
    now: DateTime<Utc>,
) -> Result<String, MergeError> {
    if registry.is_empty() {
        return Ok(content.to_string());
    }

    let values: HashMap<&str, String> = registry
        .iter()
        .map(|var| (var.name.as_str(), resolve_value(var, context, now)))
        .collect();

    let alternation = registry
        .names()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&format!(
        "{}({}){}",
        regex::escape("{{"),
        alternation,
        regex::escape("}}")
    ))?;

    let merged = pattern.replace_all(content, |caps: &Captures| match values.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    });

    Ok(merged.into_owned())
}

/// Raw value lookup followed by formatting.
///
/// Entity fields fall back to the variable's default, then to empty. System fields are
/// computed; an unknown system field is empty regardless of the default.
pub fn resolve_value(var: &CompiledVariable, context: &DataContext, now: DateTime<Utc>) -> String {
    let default = || var.default_value.clone().map(Value::String);

    let raw = match &var.binding {
        Some(Binding::System { field }) => Value::String(system_value(*field, now)),
        Some(Binding::Entity { source, field }) => context
            .lookup(*source, field)
            .cloned()
            .or_else(default)
            .unwrap_or(Value::Null),
        None if var.category == Some(VariableCategory::System) => {
            warn!("Unknown system field for variable '{}'", var.name);
            Value::String(String::new())
        }
        None => default().unwrap_or(Value::Null),
    };

    format_value(&raw, var.format)
}

fn system_value(field: SystemField, now: DateTime<Utc>) -> String {
    match field {
        SystemField::CurrentDate => now.to_rfc3339_opts(SecondsFormat::Millis, true),
        SystemField::CurrentYear => now.year().to_string(),
    }
}
