//! Trailing empty change-group removal.
//!
//! Forecast editors append a blank change group for the next entry; when
//! the document is submitted unchanged that blank group would fail every
//! structural check. It is discarded before validation.

use serde_json::Value;

/// True when the node is a container with at least one entry.
fn has_content(node: &Value) -> bool {
    match node {
        Value::Object(fields) => !fields.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn is_empty_container(node: Option<&Value>) -> bool {
    node.is_none_or(|n| !has_content(n))
}

/// True for the shape the editor serializes for an untouched group:
/// no change type or times, empty wind and visibility, NSW/NSC sentinels.
fn is_blank_editor_group(group: &Value, forecast: &Value) -> bool {
    let change_type_empty = group
        .get("changeType")
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    change_type_empty
        && group.get("changeStart").is_none()
        && group.get("changeEnd").is_none()
        && is_empty_container(forecast.get("wind"))
        && is_empty_container(forecast.get("visibility"))
        && forecast.get("weather").and_then(Value::as_str) == Some("NSW")
        && forecast.get("clouds").and_then(Value::as_str) == Some("NSC")
}

/// Drop a trailing change group that carries no forecast content.
///
/// Only runs when more than one group is present: first removes elements
/// that are null or empty, then removes the last group when it is empty,
/// when its `forecast` is empty, or when it matches the blank shape the
/// editor emits. The only remaining group is never touched.
pub fn remove_trailing_empty_changegroup(taf: &mut Value) {
    let Some(Value::Array(changegroups)) = taf.pointer_mut("/changegroups") else {
        return;
    };
    if changegroups.len() <= 1 {
        return;
    }

    changegroups.retain(has_content);
    if changegroups.len() <= 1 {
        return;
    }

    let last = &changegroups[changegroups.len() - 1];
    let Some(forecast) = last.get("forecast") else {
        changegroups.pop();
        return;
    };
    if !has_content(forecast) {
        changegroups.pop();
        return;
    }
    if is_blank_editor_group(last, forecast) {
        changegroups.pop();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn removes_a_trailing_empty_object() {
        let mut taf = json!({
            "changegroups": [
                {"changeType": "BECMG", "forecast": {"wind": {"direction": 100, "speed": 10}}},
                {}
            ]
        });
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf["changegroups"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn removes_a_group_with_an_empty_forecast() {
        let mut taf = json!({
            "changegroups": [
                {"changeType": "BECMG", "forecast": {"visibility": {"value": 200}}},
                {"changeType": "TEMPO", "forecast": {}}
            ]
        });
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf["changegroups"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn removes_the_blank_editor_shape() {
        let mut taf = json!({
            "changegroups": [
                {"changeType": "BECMG", "forecast": {"visibility": {"value": 200}}},
                {
                    "changeType": "",
                    "forecast": {
                        "wind": {},
                        "visibility": {},
                        "weather": "NSW",
                        "clouds": "NSC"
                    }
                }
            ]
        });
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf["changegroups"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn keeps_a_trailing_group_with_content() {
        let mut taf = json!({
            "changegroups": [
                {"changeType": "BECMG", "forecast": {"visibility": {"value": 200}}},
                {"changeType": "TEMPO", "forecast": {"visibility": {"value": 400}}}
            ]
        });
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf["changegroups"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn never_touches_the_only_group() {
        let mut taf = json!({"changegroups": [{}]});
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf["changegroups"].as_array().unwrap().len(), 1);

        let mut emptied = json!({"changegroups": [{}, {}]});
        remove_trailing_empty_changegroup(&mut emptied);
        // Both are empty; the filter pass leaves nothing to inspect.
        assert!(emptied["changegroups"].as_array().unwrap().is_empty());
    }

    #[test]
    fn tolerates_documents_without_changegroups() {
        let mut taf = json!({"forecast": {}});
        remove_trailing_empty_changegroup(&mut taf);
        assert_eq!(taf, json!({"forecast": {}}));
        let mut scalar = json!("not an object");
        remove_trailing_empty_changegroup(&mut scalar);
    }
}
