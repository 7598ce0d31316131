//! Depth-first field lookup.
//!
//! A named field anywhere below a node counts; the first match wins, with
//! object fields visited in key order. Matched values are not searched
//! again, so a `wind` inside a `wind` is invisible.

use serde_json::Value;

use crate::pointer::{append_index, append_token, ROOT_POINTER};

/// First value of the named field anywhere below `node`, document order.
#[must_use]
pub fn find_value<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key == name {
                    return Some(value);
                }
                if let Some(found) = find_value(value, name) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_value(item, name)),
        _ => None,
    }
}

/// Every value of the named field below `node`, document order.
#[must_use]
pub fn find_values<'a>(node: &'a Value, name: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect_values(node, name, &mut found);
    found
}

fn collect_values<'a>(node: &'a Value, name: &str, found: &mut Vec<&'a Value>) {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key == name {
                    found.push(value);
                } else {
                    collect_values(value, name, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_values(item, name, found);
            }
        }
        _ => {}
    }
}

/// Pointers to every value of the named field below `node`.
///
/// The pointer form exists so callers can re-navigate mutably with
/// [`Value::pointer_mut`] after a read-only search.
#[must_use]
pub fn find_value_paths(node: &Value, name: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_value_paths(node, name, ROOT_POINTER, &mut found);
    found
}

fn collect_value_paths(node: &Value, name: &str, here: &str, found: &mut Vec<String>) {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key == name {
                    found.push(append_token(here, key));
                } else {
                    collect_value_paths(value, name, &append_token(here, key), found);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_value_paths(item, name, &append_index(here, index), found);
            }
        }
        _ => {}
    }
}

/// Pointers to every object that directly holds the named field.
#[must_use]
pub fn find_parent_paths(node: &Value, name: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_parent_paths(node, name, ROOT_POINTER, &mut found);
    found
}

fn collect_parent_paths(node: &Value, name: &str, here: &str, found: &mut Vec<String>) {
    match node {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key == name {
                    found.push(here.to_owned());
                } else {
                    collect_parent_paths(value, name, &append_token(here, key), found);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_parent_paths(item, name, &append_index(here, index), found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn find_value_descends_into_earlier_fields_first() {
        let doc = json!({"a": {"target": 1}, "target": 2});
        assert_eq!(find_value(&doc, "target"), Some(&json!(1)));
    }

    #[test]
    fn find_value_misses_fields_inside_matches() {
        let doc = json!({"target": {"target": "inner"}});
        assert_eq!(find_value(&doc, "target"), Some(&json!({"target": "inner"})));
    }

    #[test]
    fn find_values_collects_across_arrays() {
        let doc = json!({
            "forecast": {"wind": {"speed": 10}},
            "changegroups": [
                {"forecast": {"wind": {"speed": 20}}},
                {"forecast": {}}
            ]
        });
        let winds = find_values(&doc, "wind");
        assert_eq!(winds.len(), 2);
        // Object fields are visited in key order: changegroups < forecast.
        let paths = find_value_paths(&doc, "wind");
        assert_eq!(
            paths,
            vec!["/changegroups/0/forecast/wind", "/forecast/wind"]
        );
    }

    #[test]
    fn parent_paths_point_at_the_owning_object() {
        let doc = json!({
            "forecast": {"clouds": "NSC"},
            "changegroups": [{"forecast": {"clouds": []}}]
        });
        assert_eq!(
            find_parent_paths(&doc, "clouds"),
            vec!["/changegroups/0/forecast", "/forecast"]
        );
    }
}
