//! Schema storage.
//!
//! The validator fetches schema text by name on every validation, so the
//! store seam stays small: three getters, each returning the latest text.
//! [`BundledSchemaStore`] serves the schemas compiled into this crate;
//! [`DirSchemaStore`] serves a directory that operators can edit without
//! redeploying.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// The production structural TAF schema.
pub const TAF_SCHEMA: &str = include_str!("schemas/taf_schema.json");

/// The production enriched TAF schema (validates derived facts).
pub const TAF_ENRICHED_SCHEMA: &str = include_str!("schemas/taf_enriched_schema.json");

/// JSON Schema Draft-04 meta-schema.
pub const JSON_SCHEMA_DRAFT4: &str = include_str!("schemas/json_schema_draft4.json");

/// File names used by [`DirSchemaStore`].
pub const TAF_SCHEMA_FILE: &str = "taf_schema.json";
pub const TAF_ENRICHED_SCHEMA_FILE: &str = "taf_enriched_schema.json";
pub const META_SCHEMA_FILE: &str = "json_schema_draft4.json";

/// Errors raised by schema stores.
#[derive(Debug, Error)]
pub enum SchemaStoreError {
    #[error("failed to read schema `{name}` from `{path}`: {source}")]
    Io {
        name: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies schema text by name.
pub trait SchemaStore: Send + Sync {
    /// Latest structural TAF schema text.
    ///
    /// # Errors
    /// Returns [`SchemaStoreError`] when the schema cannot be read.
    fn latest_taf_schema(&self) -> Result<String, SchemaStoreError>;

    /// Latest enriched TAF schema text.
    ///
    /// # Errors
    /// Returns [`SchemaStoreError`] when the schema cannot be read.
    fn latest_enriched_schema(&self) -> Result<String, SchemaStoreError>;

    /// Meta-schema used to check schemas themselves.
    ///
    /// # Errors
    /// Returns [`SchemaStoreError`] when the schema cannot be read.
    fn meta_schema(&self) -> Result<String, SchemaStoreError>;
}

/// Store backed by the schemas embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSchemaStore;

impl SchemaStore for BundledSchemaStore {
    fn latest_taf_schema(&self) -> Result<String, SchemaStoreError> {
        Ok(TAF_SCHEMA.to_owned())
    }

    fn latest_enriched_schema(&self) -> Result<String, SchemaStoreError> {
        Ok(TAF_ENRICHED_SCHEMA.to_owned())
    }

    fn meta_schema(&self) -> Result<String, SchemaStoreError> {
        Ok(JSON_SCHEMA_DRAFT4.to_owned())
    }
}

/// Store backed by a directory of schema files with fixed names.
#[derive(Debug, Clone)]
pub struct DirSchemaStore {
    root: PathBuf,
}

impl DirSchemaStore {
    /// Create a store serving schemas from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, name: &'static str) -> Result<String, SchemaStoreError> {
        let path = self.root.join(name);
        debug!(schema = name, path = %path.display(), "reading schema");
        std::fs::read_to_string(&path).map_err(|source| SchemaStoreError::Io {
            name,
            path: path.display().to_string(),
            source,
        })
    }
}

impl SchemaStore for DirSchemaStore {
    fn latest_taf_schema(&self) -> Result<String, SchemaStoreError> {
        self.read(TAF_SCHEMA_FILE)
    }

    fn latest_enriched_schema(&self) -> Result<String, SchemaStoreError> {
        self.read(TAF_ENRICHED_SCHEMA_FILE)
    }

    fn meta_schema(&self) -> Result<String, SchemaStoreError> {
        self.read(META_SCHEMA_FILE)
    }
}
