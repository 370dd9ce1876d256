//! Variable registry: typed bindings from placeholder names to backend fields.

pub mod binding;
pub mod handlers;
pub mod placeholders;
pub mod schema;
pub mod validation;

use std::collections::HashMap;

use tracing::warn;

use crate::models::variable::{FormatType, Variable, VariableCategory};
use binding::Binding;
use schema::ContextSchema;

/// A variable whose binding has been checked against the schema.
#[derive(Debug, Clone)]
pub struct CompiledVariable {
    pub name: String,
    pub category: Option<VariableCategory>,
    /// `None` when the stored binding no longer fits the schema; resolves as a miss.
    pub binding: Option<Binding>,
    pub format: FormatType,
    pub default_value: Option<String>,
}

/// Compiled view over a variable list. The first definition of a name wins.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: Vec<CompiledVariable>,
    by_name: HashMap<String, usize>,
}

impl VariableRegistry {
    pub fn compile(variables: &[Variable], schema: &ContextSchema) -> Self {
        let mut registry = Self::default();

        for variable in variables {
            if registry.by_name.contains_key(&variable.name) {
                warn!("Duplicate variable '{}' ignored", variable.name);
                continue;
            }

            let binding = match Binding::parse(
                &variable.category,
                &variable.source_table,
                &variable.source_field,
                schema,
            ) {
                Ok(binding) => Some(binding),
                Err(e) => {
                    warn!("Variable '{}' has an invalid binding: {e}", variable.name);
                    None
                }
            };

            registry
                .by_name
                .insert(variable.name.clone(), registry.variables.len());
            registry.variables.push(CompiledVariable {
                name: variable.name.clone(),
                category: VariableCategory::parse(&variable.category),
                binding,
                format: variable.format(),
                default_value: variable.default_value.clone(),
            });
        }

        registry
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledVariable> {
        self.variables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
impl VariableRegistry {
    pub fn get(&self, name: &str) -> Option<&CompiledVariable> {
        self.by_name.get(name).map(|&i| &self.variables[i])
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }
}

/// Variables offered when authoring new templates. Inactive ones still resolve in merges.
pub fn authoring_variables(variables: Vec<Variable>) -> Vec<Variable> {
    variables.into_iter().filter(|v| v.is_active).collect()
}
