//! OpenAPI document loading.
//!
//! Only `components.schemas` is read. Paths, operations and everything else
//! in the document are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SpecError;

/// Root of an OpenAPI document, reduced to what generation needs.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApiDocument {
    /// The `components` object, if present.
    pub components: Option<Components>,
}

/// The `components` object; only `schemas` is read.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Schema definitions by name.
    pub schemas: Option<BTreeMap<String, Value>>,
}

impl OpenApiDocument {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a document from disk. `.json` files are parsed as JSON, anything
    /// else as YAML (which also accepts JSON).
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let document = if is_json {
            Self::from_json(&contents).map_err(|source| SpecError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::from_yaml(&contents).map_err(|source| SpecError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        debug!(
            path = %path.display(),
            schemas = document.schemas().len(),
            "Loaded OpenAPI document."
        );
        Ok(document)
    }

    /// The `components.schemas` mapping; empty when absent.
    pub fn schemas(&self) -> &BTreeMap<String, Value> {
        static EMPTY: BTreeMap<String, Value> = BTreeMap::new();
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .unwrap_or(&EMPTY)
    }
}
