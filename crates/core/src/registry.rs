//! Custom type registry.
//!
//! Maps OpenAPI `format` strings to dialect validator expressions and holds
//! the output and generation policy of one run. The dialect's built-in
//! mappings are static data; overrides are collected in a `RegistryBuilder`
//! and merged once in `build()`. A built registry is immutable.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{
    ConfigDocument, CustomTypeMapping, DialectSection, GenerationConfig, OutputConfig, OutputMode,
};
use crate::dialect::Dialect;
use crate::error::ConfigError;

/// Format mappings and output policy for one run of one dialect.
#[derive(Debug, Clone)]
pub struct CustomTypeRegistry {
    dialect: &'static Dialect,
    mappings: BTreeMap<String, CustomTypeMapping>,
    output: OutputConfig,
    generation: GenerationConfig,
}

impl CustomTypeRegistry {
    /// Registry holding only the dialect's built-in mappings and default policy.
    pub fn defaults(dialect: &'static Dialect) -> Self {
        Self::builder(dialect).build()
    }

    /// Start a registry from the dialect's defaults.
    pub fn builder(dialect: &'static Dialect) -> RegistryBuilder {
        RegistryBuilder {
            dialect,
            overrides: BTreeMap::new(),
            output: OutputConfig::default(),
            generation: GenerationConfig::default(),
        }
    }

    /// Dialect the mappings belong to.
    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    /// Mapping for `format`. `None` means the bare string validator.
    pub fn get(&self, format: &str) -> Option<&CustomTypeMapping> {
        self.mappings.get(format)
    }

    /// Output layout.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Optional artifacts.
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Import block for a set of used formats: the dialect's base import
    /// first, then each distinct non-empty import statement in sorted order.
    /// Statements are compared by exact text.
    pub fn resolve_imports<'a, I>(&self, formats: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let extra: BTreeSet<&str> = formats
            .into_iter()
            .filter_map(|format| self.get(format))
            .map(|mapping| mapping.import_statement.as_str())
            .filter(|statement| !statement.is_empty() && *statement != self.dialect.base_import)
            .collect();

        std::iter::once(self.dialect.base_import)
            .chain(extra)
            .map(str::to_string)
            .collect()
    }
}

/// Load phase of a registry. Later registrations for a format win.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    dialect: &'static Dialect,
    overrides: BTreeMap<String, CustomTypeMapping>,
    output: OutputConfig,
    generation: GenerationConfig,
}

impl RegistryBuilder {
    /// Map `format` to `mapping`, replacing any earlier entry.
    pub fn register(mut self, format: impl Into<String>, mapping: CustomTypeMapping) -> Self {
        self.overrides.insert(format.into(), mapping);
        self
    }

    /// Apply the dialect's section of a config document. Only fields that are
    /// present replace the current values. An invalid `mode` is an error.
    pub fn load_from_config(mut self, document: &ConfigDocument) -> Result<Self, ConfigError> {
        let DialectSection {
            output,
            generation,
            custom_types,
        } = document.section(self.dialect)?;

        if let Some(output) = output {
            if let Some(mode) = output.mode {
                self.output.mode = mode.parse::<OutputMode>()?;
            }
            if let Some(folder) = output.folder.filter(|f| !f.is_empty()) {
                self.output.folder = PathBuf::from(folder);
            }
            if let Some(name) = output.single_file_name.filter(|n| !n.is_empty()) {
                self.output.single_file_name = name;
            }
        }

        if let Some(generation) = generation {
            if let Some(value) = generation.generate_package_json {
                self.generation.generate_package_json = value;
            }
            if let Some(value) = generation.generate_helpers {
                self.generation.generate_helpers = value;
            }
            if let Some(value) = generation.generate_partial_codecs {
                self.generation.generate_partial_codecs = value;
            }
        }

        let custom_types = custom_types.unwrap_or_default();
        let count = custom_types.len();
        for (format, mapping) in custom_types {
            self = self.register(format, mapping);
        }

        info!(
            path = %document.origin().display(),
            dialect = self.dialect.language,
            custom_types = count,
            mode = %self.output.mode,
            "Loaded config."
        );
        Ok(self)
    }

    /// Read and apply a config file. A missing file leaves the defaults in place.
    pub fn load_from_path(self, path: &Path) -> Result<Self, ConfigError> {
        match ConfigDocument::read(path)? {
            Some(document) => self.load_from_config(&document),
            None => {
                debug!(path = %path.display(), "Config file not found, using defaults.");
                Ok(self)
            }
        }
    }

    /// Merge the built-in mappings with the registered overrides.
    pub fn build(self) -> CustomTypeRegistry {
        let mut mappings: BTreeMap<String, CustomTypeMapping> = self
            .dialect
            .default_mappings
            .iter()
            .map(|&(format, validator, scalar, import)| {
                (
                    format.to_string(),
                    CustomTypeMapping::new(validator, scalar, import),
                )
            })
            .collect();
        mappings.extend(self.overrides);

        CustomTypeRegistry {
            dialect: self.dialect,
            mappings,
            output: self.output,
            generation: self.generation,
        }
    }
}
