//! Configuration document and resolved generation settings.
//!
//! The YAML document may configure several dialects at once: the io-ts dialect
//! reads the document root and the Zod dialect reads its `typescript-zod:`
//! section. Every field is optional so an explicitly present value can be told
//! apart from an absent one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::dialect::{DefaultMapping, Dialect};
use crate::error::ConfigError;

/// File layout of the generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One file per DTO plus an index file.
    #[default]
    Multiple,
    /// All DTOs in one file.
    Single,
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple" => Ok(OutputMode::Multiple),
            "single" => Ok(OutputMode::Single),
            other => Err(ConfigError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Multiple => f.write_str("multiple"),
            OutputMode::Single => f.write_str("single"),
        }
    }
}

/// Where and how generated files are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output directory, created when missing.
    pub folder: PathBuf,
    /// One file per DTO or a single file.
    pub mode: OutputMode,
    /// File name used in single mode.
    pub single_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./generated"),
            mode: OutputMode::Multiple,
            single_file_name: "schemas.ts".to_string(),
        }
    }
}

/// Optional artifacts emitted next to the validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Write `package.json` when none exists.
    pub generate_package_json: bool,
    /// Emit `validateData` / `safeValidateData`.
    pub generate_helpers: bool,
    /// Emit a partial variant of each object DTO.
    pub generate_partial_codecs: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generate_package_json: true,
            generate_helpers: true,
            generate_partial_codecs: false,
        }
    }
}

/// One `customTypes` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomTypeMapping {
    /// Validator expression used verbatim in generated code.
    #[serde(alias = "ioTsType", alias = "zodType", alias = "validatorExpr")]
    pub validator: String,
    /// Static type the validator decodes to.
    #[serde(default, rename = "typeScriptType", alias = "scalarType")]
    pub scalar_type: String,
    /// Import statement the validator needs; empty for none.
    #[serde(default, rename = "import", alias = "importStatement")]
    pub import_statement: String,
}

impl CustomTypeMapping {
    /// Mapping from its three parts. Pass `""` for no import.
    pub fn new(
        validator: impl Into<String>,
        scalar_type: impl Into<String>,
        import_statement: impl Into<String>,
    ) -> Self {
        Self {
            validator: validator.into(),
            scalar_type: scalar_type.into(),
            import_statement: import_statement.into(),
        }
    }
}

/// `output:` as written; absent keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
    /// `output.folder`
    pub folder: Option<String>,
    /// `output.mode`, validated when applied.
    pub mode: Option<String>,
    /// `output.singleFileName`
    pub single_file_name: Option<String>,
}

/// `generation:` as written; absent keys keep their defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSection {
    /// `generation.generatePackageJson`
    pub generate_package_json: Option<bool>,
    /// `generation.generateHelpers`
    pub generate_helpers: Option<bool>,
    /// `generation.generatePartialCodecs`
    pub generate_partial_codecs: Option<bool>,
}

/// The settings a single dialect reads from a config document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectSection {
    /// `output:`
    pub output: Option<OutputSection>,
    /// `generation:`
    pub generation: Option<GenerationSection>,
    /// `customTypes:`, keyed by format.
    pub custom_types: Option<BTreeMap<String, CustomTypeMapping>>,
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    origin: PathBuf,
    root: serde_yaml::Value,
}

impl ConfigDocument {
    /// Parse YAML text. `origin` is only used in error messages.
    pub fn from_yaml(yaml: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let origin = origin.into();
        let root = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.clone(),
            source,
        })?;
        Ok(Self { origin, root })
    }

    /// Read a config file. A missing file is not an error and yields `None`.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_yaml(&contents, path).map(Some)
    }

    /// Path the document was read from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Extract the section read by `dialect`. Absent or empty sections yield defaults.
    pub fn section(&self, dialect: &Dialect) -> Result<DialectSection, ConfigError> {
        let node = match dialect.config_section {
            Some(key) => self.root.get(key),
            None => Some(&self.root),
        };
        match node {
            None | Some(serde_yaml::Value::Null) => Ok(DialectSection::default()),
            Some(node) => {
                serde_yaml::from_value(node.clone()).map_err(|source| ConfigError::Parse {
                    path: self.origin.clone(),
                    source,
                })
            }
        }
    }
}

/// Commented config template for `dialect`.
pub fn example_config(dialect: &Dialect) -> String {
    let (indent, header) = match dialect.config_section {
        Some(key) => ("  ", format!("{key}:\n")),
        None => ("", String::new()),
    };
    let key = dialect.validator_key;

    let body = [
        "# Output layout".to_string(),
        "output:".to_string(),
        "  # Directory the generated files are written to".to_string(),
        "  folder: ./generated".to_string(),
        "  # 'multiple': one file per schema plus index.ts; 'single': one file".to_string(),
        "  mode: multiple".to_string(),
        "  # File name used in 'single' mode".to_string(),
        "  singleFileName: schemas.ts".to_string(),
        String::new(),
        "# Optional artifacts".to_string(),
        "generation:".to_string(),
        "  # Write package.json when none exists yet".to_string(),
        "  generatePackageJson: true".to_string(),
        "  # Emit validateData / safeValidateData helpers".to_string(),
        "  generateHelpers: true".to_string(),
        "  # Emit a partial variant of every object schema".to_string(),
        "  generatePartialCodecs: false".to_string(),
        String::new(),
        "# Map OpenAPI string formats to your own validators".to_string(),
        "customTypes:".to_string(),
    ];
    let entries = dialect
        .example_mappings
        .iter()
        .map(|mapping| mapping_entry(key, *mapping));

    let mut out = format!(
        "# dtoforge configuration for the {} dialect\n{header}",
        dialect.language
    );
    for block in body.into_iter().chain(entries) {
        if block.is_empty() {
            out.push('\n');
            continue;
        }
        for line in block.lines() {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn mapping_entry(key: &str, (format, validator, scalar, import): DefaultMapping) -> String {
    format!(
        "  {format}:\n    {key}: \"{validator}\"\n    typeScriptType: \"{scalar}\"\n    import: \"{import}\""
    )
}

/// Write the commented template for `dialect` to `path`.
pub fn save_example_config(dialect: &Dialect, path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, example_config(dialect)).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), dialect = dialect.language, "Wrote example config.");
    Ok(())
}
