//! JSON tree utilities shared by the TAF validation crates.
//!
//! Provides RFC 6901 pointer construction, a recursive field harvester, and
//! the tolerant lookup/coercion helpers the enrichment rules lean on. All
//! functions operate on `serde_json::Value` trees and never panic on
//! malformed input.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod find;
mod harvest;
mod num;
mod pointer;

pub use find::*;
pub use harvest::*;
pub use num::*;
pub use pointer::*;
