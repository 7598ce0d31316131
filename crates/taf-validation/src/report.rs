//! Validation reports and their translation to human-readable errors.
//!
//! The engine adapter renders findings as a JSON report tree whose error
//! nodes carry the subschema pointer, the instance pointer and the failing
//! keyword. The translator then resolves `(schema pointer, keyword)` pairs
//! through the message map extracted from the schema, attaches each
//! message to every instance path the pointer was reported against, and
//! suppresses near-duplicate paths.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use jsonschema::Validator;
use serde_json::{json, Value};

use taf_schema::MessageMap;

/// Errors grouped per instance pointer.
pub type ErrorsByPath = BTreeMap<String, BTreeSet<String>>;

/// Run a compiled schema against a document and render the report tree.
///
/// Every finding becomes one node; an empty array means the document
/// passed. The subschema pointer is the engine's keyword location minus
/// its final token, which is reported separately as `keyword` — the same
/// split the `$geoweb::messages` directives are keyed by.
#[must_use]
pub fn evaluate(validator: &Validator, instance: &Value) -> Value {
    let findings: Vec<Value> = validator
        .iter_errors(instance)
        .map(|error| {
            let keyword_location = error.schema_path.to_string();
            let (pointer, keyword) = split_keyword_location(&keyword_location);
            json!({
                "level": "error",
                "schema": {"pointer": pointer},
                "instance": {"pointer": error.instance_path.to_string()},
                "keyword": keyword,
                "message": error.to_string(),
            })
        })
        .collect();
    Value::Array(findings)
}

fn split_keyword_location(location: &str) -> (&str, &str) {
    location
        .rfind('/')
        .map_or(("", location), |idx| (&location[..idx], &location[idx + 1..]))
}

/// Whether a report tree contains no findings.
#[must_use]
pub fn report_is_success(report: &Value) -> bool {
    match report {
        Value::Array(findings) => findings.is_empty(),
        _ => false,
    }
}

/// Collect every `(schema pointer, keyword)` pair in a report tree.
///
/// Nodes carrying both `schema.pointer` and `keyword` contribute a pair;
/// named sub-reports under `reports` and array elements are searched
/// recursively, with keywords unioned per pointer.
fn pointers_of_schema_errors(report: &Value) -> HashMap<String, HashSet<String>> {
    let mut pointers: HashMap<String, HashSet<String>> = HashMap::new();
    collect_pointers(report, &mut pointers);
    pointers
}

fn collect_pointers(report: &Value, pointers: &mut HashMap<String, HashSet<String>>) {
    match report {
        Value::Object(fields) => {
            if let (Some(schema), Some(keyword)) = (fields.get("schema"), fields.get("keyword"))
            {
                if let (Some(pointer), Some(keyword)) =
                    (schema.get("pointer").and_then(Value::as_str), keyword.as_str())
                {
                    pointers
                        .entry(pointer.to_owned())
                        .or_default()
                        .insert(keyword.to_owned());
                }
            }
            if let Some(Value::Object(sub_reports)) = fields.get("reports") {
                for sub_report in sub_reports.values() {
                    collect_pointers(sub_report, pointers);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_pointers(item, pointers);
            }
        }
        _ => {}
    }
}

/// Instance pointers reported against the given schema pointer.
fn find_instance_paths(report: &Value, schema_pointer: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_instance_paths(report, schema_pointer, &mut paths);
    paths
}

fn collect_instance_paths(report: &Value, schema_pointer: &str, paths: &mut BTreeSet<String>) {
    match report {
        Value::Object(fields) => {
            let matches = fields
                .get("schema")
                .and_then(|schema| schema.get("pointer"))
                .and_then(Value::as_str)
                == Some(schema_pointer);
            if matches {
                if let Some(path) = fields
                    .get("instance")
                    .and_then(|instance| instance.get("pointer"))
                    .and_then(Value::as_str)
                {
                    paths.insert(path.to_owned());
                }
            }
            if let Some(Value::Object(sub_reports)) = fields.get("reports") {
                for sub_report in sub_reports.values() {
                    collect_instance_paths(sub_report, schema_pointer, paths);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_instance_paths(item, schema_pointer, paths);
            }
        }
        _ => {}
    }
}

/// Translate a report tree into human-readable errors keyed by instance
/// pointer, using the messages extracted from the schema.
#[must_use]
pub fn translate_report(report: &Value, messages: &MessageMap) -> ErrorsByPath {
    let mut errors: ErrorsByPath = BTreeMap::new();
    for (pointer, keywords) in pointers_of_schema_errors(report) {
        let Some(per_keyword) = messages.get(&pointer) else {
            continue;
        };
        for keyword in keywords {
            let Some(message) = per_keyword.get(&keyword) else {
                continue;
            };
            for path in find_instance_paths(report, &pointer) {
                errors.entry(path).or_default().insert(message.clone());
            }
        }
    }
    dedupe_error_paths(&errors)
}

/// Suppress paths that are subsequences of every later path.
///
/// Paths are compared in sorted order. A path is kept as soon as some
/// later path does not contain it as a subsequence (the scan stops
/// there); the last path is always kept. Schema errors tend to surface at
/// several related pointers, and this keeps the most specific of each
/// family.
fn dedupe_error_paths(errors: &ErrorsByPath) -> ErrorsByPath {
    let keys: Vec<&String> = errors.keys().collect();
    let mut kept: ErrorsByPath = BTreeMap::new();
    let Some(last) = keys.last() else {
        return kept;
    };
    for i in 0..keys.len() {
        for j in (i + 1)..keys.len() {
            if !is_subsequence(keys[i], keys[j]) {
                kept.insert(keys[i].clone(), errors[keys[i]].clone());
                break;
            }
        }
    }
    kept.insert((*last).clone(), errors[*last].clone());
    kept
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut haystack_bytes = haystack.bytes();
    needle
        .bytes()
        .all(|b| haystack_bytes.by_ref().any(|h| h == b))
}
