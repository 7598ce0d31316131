//! Two-pass validation of Terminal Aerodrome Forecasts (TAFs).
//!
//! A TAF arrives as a JSON document. Validation runs in two passes:
//!
//! 1. **Structural** — the document is checked against the TAF schema;
//!    human-readable messages embedded in the schema (`$geoweb::messages`
//!    directives) are resolved to the offending paths in the document.
//! 2. **Semantic** — the document is enriched in place with derived facts
//!    (change-group ordering, wind change significance, cloud ordering,
//!    visibility/weather consistency, …) and re-checked against a second
//!    schema that constrains those facts.
//!
//! Errors from both passes are merged into a single map keyed by JSON
//! Pointer into the submitted document. The validator is pure and
//! synchronous: with a fixed schema set, the same input always produces
//! the same result.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod cleanup;
mod enrich;
mod modular;
mod report;
mod result;
mod validator;

pub use cleanup::*;
pub use enrich::*;
pub use modular::*;
pub use report::*;
pub use result::*;
pub use validator::*;

// Re-export the schema layer so the common path needs one dependency.
pub use taf_schema::{
    BundledSchemaStore, DirSchemaStore, MessageMap, SchemaError, SchemaStore, SchemaStoreError,
};
