// Macrokeys Schema Migration
// Upgrades legacy persisted documents to the current versioned shape

use serde_json::{json, Map, Value};

use super::model::SCHEMA_VERSION;

const LAYER_FIELDS: [&str; 4] = ["hotkeys", "shift_hotkeys", "ctrl_hotkeys", "alt_hotkeys"];

/// Upgrade a raw JSON document to the current schema.
///
/// Two document shapes exist in the wild:
/// - version 1: a bare top-level map of program key -> program, with
///   bindings in any of the legacy shapes handled by
///   [`upgrade_binding`];
/// - version 2: `{"version": 2, "programs": {...}}` with every
///   binding in `{down, up}` shape.
///
/// The pass is idempotent: binding normalization passes upgraded
/// bindings through untouched, so running it on a current document is
/// a no-op.
pub fn upgrade(value: Value) -> Value {
    let (version, programs) = match value {
        Value::Object(mut root) if root.contains_key("version") => {
            let version = root
                .get("version")
                .and_then(Value::as_u64)
                .unwrap_or(SCHEMA_VERSION as u64);
            let programs = root.remove("programs").unwrap_or_else(|| json!({}));
            (version, programs)
        }
        other => (1, other),
    };

    if version > SCHEMA_VERSION as u64 {
        log::warn!("configuration has schema version {version}, newer than supported");
    }

    let programs = upgrade_programs(programs);
    json!({ "version": SCHEMA_VERSION, "programs": programs })
}

fn upgrade_programs(programs: Value) -> Value {
    let Value::Object(programs) = programs else {
        return json!({});
    };
    let upgraded: Map<String, Value> = programs
        .into_iter()
        .map(|(key, program)| (key, upgrade_program(program)))
        .collect();
    Value::Object(upgraded)
}

fn upgrade_program(mut program: Value) -> Value {
    let Some(profiles) = program.get_mut("profiles").and_then(Value::as_object_mut) else {
        return program;
    };
    for profile in profiles.values_mut() {
        let Some(profile) = profile.as_object_mut() else {
            continue;
        };
        for field in LAYER_FIELDS {
            if let Some(layer) = profile.get_mut(field).and_then(Value::as_object_mut) {
                for binding in layer.values_mut() {
                    *binding = upgrade_binding(binding.take());
                }
            }
        }
    }
    program
}

/// Normalize one binding into `{down, up}` shape.
///
/// Legacy shapes: a bare string is a down-only script; an object with
/// `triggerOn` carries its script on the named edge. Anything else
/// degrades to an empty pair (which load-time normalization drops).
fn upgrade_binding(value: Value) -> Value {
    match value {
        Value::Object(obj) if obj.contains_key("down") => {
            let down = obj.get("down").and_then(Value::as_str).unwrap_or("");
            let up = obj.get("up").and_then(Value::as_str).unwrap_or("");
            json!({ "down": down, "up": up })
        }
        Value::Object(obj) => {
            let script = obj.get("script").and_then(Value::as_str).unwrap_or("");
            match obj.get("triggerOn").and_then(Value::as_str) {
                Some("up") => json!({ "down": "", "up": script }),
                Some("down") => json!({ "down": script, "up": "" }),
                _ => json!({ "down": "", "up": "" }),
            }
        }
        Value::String(script) => json!({ "down": script, "up": "" }),
        _ => json!({ "down": "", "up": "" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_doc() -> Value {
        json!({
            "Global": {
                "displayName": "Global",
                "activeProfile": "Default",
                "profiles": {
                    "Default": {
                        "hotkeys": {
                            "A": "Send \"a\"",
                            "B": { "triggerOn": "up", "script": "Send \"b\"" },
                            "C": { "triggerOn": "down", "script": "Send \"c\"" },
                            "D": { "triggerOn": "sideways", "script": "Send \"d\"" },
                            "E": { "down": "Send \"e\"", "up": "Send \"E\"" }
                        },
                        "shift_hotkeys": {
                            "F": "Send \"f\""
                        }
                    }
                }
            }
        })
    }

    fn binding<'a>(doc: &'a Value, layer: &str, key: &str) -> &'a Value {
        &doc["programs"]["Global"]["profiles"]["Default"][layer][key]
    }

    #[test]
    fn test_bare_string_becomes_down_only() {
        let doc = upgrade(legacy_doc());
        assert_eq!(
            binding(&doc, "hotkeys", "A"),
            &json!({ "down": "Send \"a\"", "up": "" })
        );
        assert_eq!(
            binding(&doc, "shift_hotkeys", "F"),
            &json!({ "down": "Send \"f\"", "up": "" })
        );
    }

    #[test]
    fn test_trigger_on_shapes() {
        let doc = upgrade(legacy_doc());
        assert_eq!(
            binding(&doc, "hotkeys", "B"),
            &json!({ "down": "", "up": "Send \"b\"" })
        );
        assert_eq!(
            binding(&doc, "hotkeys", "C"),
            &json!({ "down": "Send \"c\"", "up": "" })
        );
        // Unknown trigger degrades to an empty pair
        assert_eq!(
            binding(&doc, "hotkeys", "D"),
            &json!({ "down": "", "up": "" })
        );
    }

    #[test]
    fn test_current_shape_passes_through() {
        let doc = upgrade(legacy_doc());
        assert_eq!(
            binding(&doc, "hotkeys", "E"),
            &json!({ "down": "Send \"e\"", "up": "Send \"E\"" })
        );
    }

    #[test]
    fn test_upgrade_adds_version_envelope() {
        let doc = upgrade(legacy_doc());
        assert_eq!(doc["version"], json!(SCHEMA_VERSION));
        assert!(doc["programs"].is_object());
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let once = upgrade(legacy_doc());
        let twice = upgrade(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_object_document_degrades_to_empty() {
        let doc = upgrade(json!([1, 2, 3]));
        assert_eq!(doc["programs"], json!({}));
    }
}
