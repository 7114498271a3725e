// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON-schema flattening for Gemini's `responseSchema` dialect
//!
//! Schemas derived from Rust types carry a definition table, `$ref` links into
//! it, presentation metadata and lower-case type names. Gemini accepts none of
//! that, so schemas are rewritten into a single inlined tree before use.
//!
//! The transform is pure: input trees are borrowed and a new tree is built.

use serde_json::{Map, Value};
use thiserror::Error;

/// Keys carrying presentation metadata only; dropped from every schema node
const PRESENTATION_KEYS: &[&str] = &["title", "description", "$schema"];

/// Keys under which a root schema may carry its definition table
const DEFINITION_KEYS: &[&str] = &["$defs", "definitions"];

/// Errors raised while flattening a schema
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A definition (transitively) references itself
    #[error("Reference cycle detected through definition '{name}'")]
    CycleDetected {
        /// Definition that was re-entered
        name: String,
    },

    /// A `$ref` points at a definition that does not exist
    #[error("Unresolved schema reference: {reference}")]
    UnresolvedReference {
        /// The raw reference string
        reference: String,
    },
}

/// Flatten `schema`, resolving references against `definitions`
///
/// Every `$ref` node is replaced by the flattened referenced definition,
/// presentation keys are dropped and `type` values are upper-cased.
/// Recursion follows `properties` values, `items`, `additionalProperties`,
/// `not` and the members of `anyOf`/`allOf`/`oneOf`/`prefixItems`. A
/// single-member `allOf` is merged into its parent node.
pub fn flatten(schema: &Value, definitions: &Map<String, Value>) -> Result<Value, SchemaError> {
    let mut expanding = Vec::new();
    flatten_node(schema, definitions, &mut expanding)
}

/// Flatten a root schema that carries its own `$defs`/`definitions` table
pub fn flatten_root(schema: &Value) -> Result<Value, SchemaError> {
    let empty = Map::new();
    let definitions = schema
        .as_object()
        .and_then(|root| DEFINITION_KEYS.iter().find_map(|key| root.get(*key)))
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    flatten(schema, definitions)
}

fn flatten_node(
    node: &Value,
    definitions: &Map<String, Value>,
    expanding: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    let map = match node {
        Value::Object(map) => map,
        // Boolean schemas and stray literals carry nothing to rewrite
        other => return Ok(other.clone()),
    };

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        return resolve_reference(reference, definitions, expanding);
    }

    let mut flattened = Map::with_capacity(map.len());
    for (key, value) in map {
        let key_str = key.as_str();
        if PRESENTATION_KEYS.contains(&key_str) || DEFINITION_KEYS.contains(&key_str) {
            continue;
        }

        let rewritten = match key_str {
            "type" => upper_case_type(value),
            "properties" => flatten_properties(value, definitions, expanding)?,
            "items" => flatten_items(value, definitions, expanding)?,
            "anyOf" | "allOf" | "oneOf" | "prefixItems" => {
                flatten_each(value, definitions, expanding)?
            }
            "additionalProperties" | "not" => flatten_node(value, definitions, expanding)?,
            _ => value.clone(),
        };
        flattened.insert(key.clone(), rewritten);
    }

    collapse_single_all_of(&mut flattened);
    Ok(Value::Object(flattened))
}

/// Gemini has no `allOf`; `{"allOf": [X]}` becomes X merged with its siblings
fn collapse_single_all_of(node: &mut Map<String, Value>) {
    let single = matches!(
        node.get("allOf"),
        Some(Value::Array(members)) if members.len() == 1 && members[0].is_object()
    );
    if !single {
        return;
    }

    if let Some(Value::Array(mut members)) = node.remove("allOf") {
        if let Some(Value::Object(member)) = members.pop() {
            for (key, value) in member {
                node.entry(key).or_insert(value);
            }
        }
    }
}

fn resolve_reference(
    reference: &str,
    definitions: &Map<String, Value>,
    expanding: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    let name = definition_name(reference);

    if expanding.iter().any(|entered| entered == name) {
        return Err(SchemaError::CycleDetected {
            name: name.to_string(),
        });
    }

    let target = definitions
        .get(name)
        .ok_or_else(|| SchemaError::UnresolvedReference {
            reference: reference.to_string(),
        })?;

    expanding.push(name.to_string());
    let resolved = flatten_node(target, definitions, expanding);
    expanding.pop();

    resolved
}

/// `#/$defs/BoundingBox` and `#/definitions/BoundingBox` both name `BoundingBox`
fn definition_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Property names are data, not schema keywords: only the values are flattened
fn flatten_properties(
    value: &Value,
    definitions: &Map<String, Value>,
    expanding: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    match value {
        Value::Object(properties) => {
            let mut flattened = Map::with_capacity(properties.len());
            for (name, property) in properties {
                flattened.insert(name.clone(), flatten_node(property, definitions, expanding)?);
            }
            Ok(Value::Object(flattened))
        }
        other => Ok(other.clone()),
    }
}

fn flatten_items(
    value: &Value,
    definitions: &Map<String, Value>,
    expanding: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    match value {
        // Tuple-style `items: [..]`
        Value::Array(_) => flatten_each(value, definitions, expanding),
        other => flatten_node(other, definitions, expanding),
    }
}

fn flatten_each(
    value: &Value,
    definitions: &Map<String, Value>,
    expanding: &mut Vec<String>,
) -> Result<Value, SchemaError> {
    match value {
        Value::Array(members) => members
            .iter()
            .map(|member| flatten_node(member, definitions, expanding))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => flatten_node(other, definitions, expanding),
    }
}

fn upper_case_type(value: &Value) -> Value {
    match value {
        Value::String(name) => Value::String(name.to_uppercase()),
        Value::Array(names) => Value::Array(
            names
                .iter()
                .map(|name| match name {
                    Value::String(s) => Value::String(s.to_uppercase()),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
