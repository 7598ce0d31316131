//! RFC 6901 JSON Pointer construction.
//!
//! Pointers are plain strings: the root document is `""`, every reference
//! token is prefixed with `/` and escaped (`~` → `~0`, `/` → `~1`). The
//! string form is used directly as a map key throughout the validation
//! pipeline, so construction must match what `serde_json::Value::pointer`
//! resolves.

/// Pointer to the root of a document.
pub const ROOT_POINTER: &str = "";

/// Escape a single reference token per RFC 6901 §3.
#[must_use]
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Append an object member name to a pointer.
#[must_use]
pub fn append_token(parent: &str, token: &str) -> String {
    format!("{parent}/{}", escape_token(token))
}

/// Append an array index to a pointer.
#[must_use]
pub fn append_index(parent: &str, index: usize) -> String {
    format!("{parent}/{index}")
}
