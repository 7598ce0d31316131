//! `$geoweb::` schema directives.
//!
//! Schemas carry human-readable validation messages inline, next to the
//! keywords they explain:
//!
//! ```json
//! "direction": {
//!     "type": "integer",
//!     "minimum": 0,
//!     "$geoweb::messages": {
//!         "minimum": "Wind direction must be between 0 and 359 degrees"
//!     }
//! }
//! ```
//!
//! Directive fields are not JSON Schema vocabulary, so they must be
//! extracted and stripped before the schema is handed to the engine. The
//! extracted map is keyed by the pointer of the subschema that held the
//! directive, which is exactly the pointer the engine reports errors
//! against.

use std::collections::HashMap;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Prefix identifying schema fields that carry directives.
pub const GEOWEB_DIRECTIVES_PREFIX: &str = "$geoweb::";

/// The directive holding keyword → message pairs.
pub const GEOWEB_MESSAGES_DIRECTIVE: &str = "$geoweb::messages";

/// Schema pointer → keyword → human-readable message.
pub type MessageMap = HashMap<String, HashMap<String, String>>;

/// Errors raised while preprocessing or meta-validating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("meta-schema failed to compile: {0}")]
    MetaCompile(String),
}

/// Extract every message directive and strip all directive fields.
///
/// Each directive's keyword/message pairs are recorded at the pointer of
/// the subschema holding it. Non-object directive values are dropped.
/// Afterwards no field anywhere in the schema starts with
/// [`GEOWEB_DIRECTIVES_PREFIX`].
pub fn extract_messages(schema: &mut Value) -> MessageMap {
    let harvested = taf_json::harvest_fields(
        &*schema,
        |name| name == GEOWEB_MESSAGES_DIRECTIVE,
        true,
    );

    let mut messages = MessageMap::new();
    for field in harvested.values() {
        let Value::Object(pairs) = &field.value else {
            continue;
        };
        let per_keyword: HashMap<String, String> = pairs
            .iter()
            .filter_map(|(keyword, text)| {
                text.as_str().map(|s| (keyword.clone(), s.to_owned()))
            })
            .collect();
        messages.insert(field.parent_pointer.clone(), per_keyword);
    }

    strip_directives(schema);
    messages
}

/// Remove every field starting with [`GEOWEB_DIRECTIVES_PREFIX`].
pub fn strip_directives(schema: &mut Value) {
    match schema {
        Value::Object(fields) => {
            fields.retain(|name, _| !name.starts_with(GEOWEB_DIRECTIVES_PREFIX));
            for value in fields.values_mut() {
                strip_directives(value);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_directives(item);
            }
        }
        _ => {}
    }
}

/// Check a schema against the given meta-schema, ignoring directives.
///
/// The schema is deep-copied and cleansed first, so directive fields never
/// reach the engine.
///
/// # Errors
/// Returns [`SchemaError`] when the meta-schema text is not valid JSON or
/// does not compile.
pub fn validate_against_meta(meta_schema: &str, schema: &Value) -> Result<bool, SchemaError> {
    let meta: Value = serde_json::from_str(meta_schema)?;
    let validator =
        Validator::new(&meta).map_err(|err| SchemaError::MetaCompile(err.to_string()))?;

    let mut cleansed = schema.clone();
    strip_directives(&mut cleansed);
    Ok(validator.validate(&cleansed).is_ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_messages_at_the_holding_subschema() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "speed": {
                    "type": "integer",
                    "minimum": 0,
                    "$geoweb::messages": {
                        "minimum": "Speed must not be negative",
                        "type": "Speed must be a whole number"
                    }
                }
            }
        });
        let messages = extract_messages(&mut schema);
        let speed = messages
            .get("/properties/speed")
            .expect("messages recorded at the subschema pointer");
        assert_eq!(
            speed.get("minimum").map(String::as_str),
            Some("Speed must not be negative")
        );
        assert_eq!(speed.len(), 2);
    }

    #[test]
    fn stripping_removes_every_prefixed_field() {
        let mut schema = json!({
            "$geoweb::messages": {"type": "top"},
            "$geoweb::future": true,
            "properties": {
                "a": {"$geoweb::messages": {"enum": "nested"}},
                "b": {"items": [{"$geoweb::messages": {}}]}
            }
        });
        extract_messages(&mut schema);
        let leftovers = taf_json::harvest_fields(
            &schema,
            |name| name.starts_with(GEOWEB_DIRECTIVES_PREFIX),
            true,
        );
        assert!(leftovers.is_empty());
        assert!(schema.get("properties").is_some());
    }

    #[test]
    fn non_object_directives_are_stripped_but_not_recorded() {
        let mut schema = json!({"a": {"$geoweb::messages": "not a map"}});
        let messages = extract_messages(&mut schema);
        assert!(messages.is_empty());
        assert_eq!(schema, json!({"a": {}}));
    }
}
