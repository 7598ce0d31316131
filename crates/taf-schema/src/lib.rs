//! TAF schema assets and preprocessing.
//!
//! This crate owns the two production schemas (structural and enriched),
//! the Draft-04 meta-schema, the [`SchemaStore`] abstraction that supplies
//! schema text to the validator, and the `$geoweb::` directive layer:
//! custom validation messages embedded in a schema are extracted into a
//! [`MessageMap`] and stripped so the schema itself stays valid.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod directive;
mod store;

pub use directive::*;
pub use store::*;
