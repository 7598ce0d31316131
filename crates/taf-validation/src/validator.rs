//! The two-pass validation pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use taf_schema::{
    extract_messages, validate_against_meta, MessageMap, SchemaError, SchemaStore,
    SchemaStoreError,
};

use crate::cleanup::remove_trailing_empty_changegroup;
use crate::enrich::enrich;
use crate::report::{evaluate, report_is_success, translate_report};
use crate::result::TafValidationResult;

const NULL_REPORT_MESSAGE: &str = "Validation report was null";

const STRUCTURAL: &str = "taf";
const ENRICHED: &str = "taf-enriched";

/// Errors that abort a validation before a result can be produced.
///
/// Domain-rule violations are never errors; they surface inside the
/// result's error map.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Store(#[from] SchemaStoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

struct CompiledSchema {
    source: String,
    validator: Arc<Validator>,
    messages: Arc<MessageMap>,
}

/// Validates TAF documents against the schemas supplied by a store.
///
/// Compiled schemas are cached per name and recompiled when the store
/// starts serving different text. Validation itself is pure: a fixed
/// schema set maps equal inputs to equal results, and a shared validator
/// is safe to use from multiple threads.
pub struct TafValidator<S> {
    store: S,
    cache: Mutex<HashMap<&'static str, CompiledSchema>>,
}

impl<S: SchemaStore> TafValidator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The schema store backing this validator.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate a TAF document given as JSON text.
    ///
    /// Malformed JSON yields a failure result with a synthetic message
    /// rather than an error.
    ///
    /// # Errors
    /// Returns [`ValidateError`] when a schema cannot be fetched or is
    /// itself broken JSON.
    pub fn validate(&self, taf: &str) -> Result<TafValidationResult, ValidateError> {
        match serde_json::from_str::<Value>(taf) {
            Ok(document) => self.validate_value(document),
            Err(err) => {
                warn!(error = %err, "TAF document is not valid JSON");
                Ok(TafValidationResult::synthetic(
                    &format!("Could not parse TAF document: {err}"),
                    None,
                    None,
                ))
            }
        }
    }

    /// Validate an already-parsed TAF document.
    ///
    /// This is the entry point for domain objects that render themselves
    /// to JSON. The document is cleaned up, checked structurally,
    /// enriched, checked semantically, and the errors of both passes are
    /// merged per instance pointer.
    ///
    /// # Errors
    /// Returns [`ValidateError`] when a schema cannot be fetched or is
    /// itself broken JSON.
    pub fn validate_value(
        &self,
        mut document: Value,
    ) -> Result<TafValidationResult, ValidateError> {
        remove_trailing_empty_changegroup(&mut document);

        let structural_schema = self.store.latest_taf_schema()?;
        let Some((validator, messages)) = self.compiled(STRUCTURAL, &structural_schema)?
        else {
            return Ok(TafValidationResult::synthetic(NULL_REPORT_MESSAGE, None, None));
        };
        let structural_report = evaluate(&validator, &document);
        debug!(
            findings = structural_report.as_array().map_or(0, Vec::len),
            "structural pass complete"
        );
        let mut errors = translate_report(&structural_report, &messages);

        enrich(&mut document);

        let enriched_schema = self.store.latest_enriched_schema()?;
        let Some((validator, messages)) = self.compiled(ENRICHED, &enriched_schema)? else {
            return Ok(TafValidationResult::synthetic(
                NULL_REPORT_MESSAGE,
                Some(structural_report),
                None,
            ));
        };
        let enriched_report = evaluate(&validator, &document);
        debug!(
            findings = enriched_report.as_array().map_or(0, Vec::len),
            "enriched pass complete"
        );
        for (path, path_messages) in translate_report(&enriched_report, &messages) {
            errors.entry(path).or_default().extend(path_messages);
        }

        if report_is_success(&structural_report) && report_is_success(&enriched_report) {
            return Ok(TafValidationResult::success());
        }
        Ok(TafValidationResult::failure(
            &errors,
            Some(structural_report),
            Some(enriched_report),
        ))
    }

    /// Check a schema against the store's meta-schema.
    ///
    /// `$geoweb::` directives are stripped from a copy first, so schemas
    /// carrying messages validate the same as plain ones.
    ///
    /// # Errors
    /// Returns [`ValidateError`] when the meta-schema cannot be fetched
    /// or compiled.
    pub fn validate_schema(&self, schema: &Value) -> Result<bool, ValidateError> {
        let meta = self.store.meta_schema()?;
        Ok(validate_against_meta(&meta, schema)?)
    }

    /// Compile (or fetch from cache) a named schema and its message map.
    ///
    /// Returns `None` when the engine rejects the schema; the pipeline
    /// maps that to the null-report failure.
    fn compiled(
        &self,
        name: &'static str,
        source: &str,
    ) -> Result<Option<(Arc<Validator>, Arc<MessageMap>)>, ValidateError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cache.get(name) {
            if entry.source == source {
                return Ok(Some((
                    Arc::clone(&entry.validator),
                    Arc::clone(&entry.messages),
                )));
            }
        }

        let mut schema: Value = serde_json::from_str(source).map_err(SchemaError::Parse)?;
        let messages = Arc::new(extract_messages(&mut schema));
        let validator = match Validator::new(&schema) {
            Ok(compiled) => Arc::new(compiled),
            Err(err) => {
                warn!(schema = name, error = %err, "schema failed to compile");
                return Ok(None);
            }
        };
        cache.insert(
            name,
            CompiledSchema {
                source: source.to_owned(),
                validator: Arc::clone(&validator),
                messages: Arc::clone(&messages),
            },
        );
        Ok(Some((validator, messages)))
    }
}
