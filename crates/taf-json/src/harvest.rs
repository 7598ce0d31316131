//! Recursive field harvesting.
//!
//! Walks a JSON tree collecting every object field whose name satisfies a
//! predicate, together with the RFC 6901 pointer of the object holding it.
//! Used by the schema preprocessor to locate `$geoweb::` directives.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::pointer::{append_index, append_token, ROOT_POINTER};

/// A field collected by [`harvest_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedField {
    /// The matched field name.
    pub name: String,
    /// Pointer of the object that holds the field.
    pub parent_pointer: String,
    /// The field's value subtree.
    pub value: Value,
}

/// Collect every object field whose name satisfies `predicate`.
///
/// Matched subtrees are recorded and not descended into; non-matching
/// fields are descended into only when `visit_sub_nodes` is set. Array
/// elements are visited when they are objects or arrays. The result is
/// keyed by the matched field's own pointer, which makes the set
/// deterministic regardless of traversal order.
pub fn harvest_fields<P>(
    node: &Value,
    predicate: P,
    visit_sub_nodes: bool,
) -> BTreeMap<String, HarvestedField>
where
    P: Fn(&str) -> bool,
{
    let mut found = BTreeMap::new();
    walk(node, &predicate, ROOT_POINTER, visit_sub_nodes, &mut found);
    found
}

fn walk<P>(
    node: &Value,
    predicate: &P,
    parent: &str,
    visit_sub_nodes: bool,
    found: &mut BTreeMap<String, HarvestedField>,
) where
    P: Fn(&str) -> bool,
{
    match node {
        Value::Object(fields) => {
            for (name, value) in fields {
                let child = append_token(parent, name);
                if predicate(name) {
                    found.insert(
                        child,
                        HarvestedField {
                            name: name.clone(),
                            parent_pointer: parent.to_owned(),
                            value: value.clone(),
                        },
                    );
                } else if visit_sub_nodes {
                    walk(value, predicate, &child, visit_sub_nodes, found);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    walk(
                        item,
                        predicate,
                        &append_index(parent, index),
                        visit_sub_nodes,
                        found,
                    );
                }
            }
        }
        _ => {}
    }
}
