// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Properties of the responseSchema flattener

use serde_json::{json, Map, Value};
use vision_relay::gemini::{flatten, flatten_root, SchemaError};

fn collect_types(node: &Value, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "type" {
                    if let Some(t) = value.as_str() {
                        out.push(t.to_string());
                    }
                }
                collect_types(value, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_types(v, out)),
        _ => {}
    }
}

#[test]
fn test_flatten_is_idempotent_without_refs() {
    let schema = json!({
        "title": "Thing",
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "display name"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "size": {"anyOf": [{"type": "integer"}, {"type": "null"}]}
        },
        "required": ["name"]
    });

    let once = flatten(&schema, &Map::new()).unwrap();
    let twice = flatten(&once, &Map::new()).unwrap();
    assert_eq!(once, twice);
    assert!(once.get("title").is_none());
    assert_eq!(once["required"], json!(["name"]));
}

#[test]
fn test_ref_equals_flattened_definition() {
    let definitions = json!({
        "Point": {
            "title": "Point",
            "type": "object",
            "properties": {"x": {"type": "number"}, "y": {"type": "number"}}
        }
    });
    let definitions = definitions.as_object().unwrap();

    let via_ref = flatten(&json!({"$ref": "#/$defs/Point"}), definitions).unwrap();
    let direct = flatten(&definitions["Point"], definitions).unwrap();
    assert_eq!(via_ref, direct);
}

#[test]
fn test_all_types_uppercase() {
    let root = json!({
        "type": "object",
        "properties": {
            "items": {"type": "array", "items": {"$ref": "#/definitions/Item"}}
        },
        "definitions": {
            "Item": {
                "type": "object",
                "properties": {
                    "label": {"type": "string"},
                    "box": {"type": "array", "items": {"type": "integer"}}
                }
            }
        }
    });

    let flat = flatten_root(&root).unwrap();
    let mut types = Vec::new();
    collect_types(&flat, &mut types);

    assert_eq!(types.len(), 6);
    assert!(types.iter().all(|t| *t == t.to_uppercase()));
    assert!(!flat.to_string().contains("$ref"));
    assert!(flat.get("definitions").is_none());
}

#[test]
fn test_self_reference_is_cycle() {
    let root = json!({
        "$ref": "#/$defs/Node",
        "$defs": {
            "Node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/$defs/Node"}}}
            }
        }
    });

    assert!(matches!(
        flatten_root(&root),
        Err(SchemaError::CycleDetected { .. })
    ));
}

#[test]
fn test_unknown_ref_is_error() {
    let result = flatten(&json!({"$ref": "#/$defs/Missing"}), &Map::new());
    assert!(matches!(result, Err(SchemaError::UnresolvedReference { .. })));
}

/// Inner payload
#[allow(dead_code)]
#[derive(schemars::JsonSchema)]
struct Inner {
    label: String,
}

#[allow(dead_code)]
#[derive(schemars::JsonSchema)]
struct Outer {
    /// Documented nested field
    inner: Inner,
    items: Vec<Inner>,
}

#[test]
fn test_documented_nested_struct_field_inlined() {
    let root = serde_json::to_value(schemars::schema_for!(Outer)).unwrap();

    let flat = flatten_root(&root).unwrap();
    let text = flat.to_string();

    assert!(!text.contains("$ref"));
    assert!(!text.contains("allOf"));
    assert_eq!(flat["properties"]["inner"]["type"], "OBJECT");
    assert_eq!(flat["properties"]["inner"]["properties"]["label"]["type"], "STRING");
    assert_eq!(flat["properties"]["items"]["items"]["type"], "OBJECT");

    let mut types = Vec::new();
    collect_types(&flat, &mut types);
    assert!(types.iter().all(|t| *t == t.to_uppercase()));
}
