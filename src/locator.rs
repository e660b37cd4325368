// src/locator.rs
//! Recursive Token Discovery
//!
//! The portal buries its anti-forgery token inside a widget tree of
//! arbitrary depth, so extraction is a pre-order depth-first walk over the
//! response JSON. First match wins.

use serde_json::Value;

/// Field name the portal uses for its anti-forgery token.
pub const CSRF_FIELD: &str = "csrf_token";

/// Search `node` for a named-value field called `field_name` and return its
/// value.
///
/// An object node matches when its `data.name` member equals `field_name`;
/// the match returns `data.value` without descending further. A non-matching
/// object is searched through its `children` elements in order, an array
/// element by element, and anything else is a leaf. `None` means the tree
/// holds no such field, which callers treat as a normal outcome.
pub fn locate<'a>(node: &'a Value, field_name: &str) -> Option<&'a str> {
    match node {
        Value::Object(map) => {
            if let Some(data) = map.get("data") {
                if data.get("name").and_then(Value::as_str) == Some(field_name) {
                    return data.get("value").and_then(Value::as_str);
                }
            }

            if let Some(Value::Array(children)) = map.get("children") {
                for child in children {
                    if let Some(found) = locate(child, field_name) {
                        return Some(found);
                    }
                }
            }

            None
        }
        Value::Array(items) => items.iter().find_map(|item| locate(item, field_name)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}
