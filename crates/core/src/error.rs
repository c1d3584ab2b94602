//! Error types for the generation pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors. Raised before any file is written.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML or has the wrong shape.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// `output.mode` is neither `multiple` nor `single`.
    #[error("invalid output mode '{value}', must be 'multiple' or 'single'")]
    InvalidMode {
        /// The rejected value.
        value: String,
    },

    /// The example config could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Failures loading an OpenAPI document.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The document could not be read.
    #[error("failed to read OpenAPI document {}: {source}", path.display())]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A `.json` document failed to parse.
    #[error("failed to parse OpenAPI document {} as JSON: {source}", path.display())]
    Json {
        /// Document path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A YAML document failed to parse.
    #[error("failed to parse OpenAPI document {} as YAML: {source}", path.display())]
    Yaml {
        /// Document path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },
}

/// Hard failures of the schema walker.
#[derive(Error, Debug)]
pub enum WalkError {
    /// Inline schemas nest deeper than `WalkOptions::max_depth`.
    #[error("schema nesting at {path} exceeds depth limit of {limit} (self-referential inline object?)")]
    DepthExceeded {
        /// Dotted path of the node that crossed the limit.
        path: String,
        /// The configured limit.
        limit: usize,
    },
}

/// Failures while rendering a single DTO.
#[derive(Error, Debug)]
pub enum RenderError {
    /// An enum with no literal values.
    #[error("enum has no values")]
    EmptyEnum,

    /// A DTO or reference name that cannot be a TypeScript symbol.
    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier {
        /// The offending name.
        name: String,
    },

    /// A property failed to render.
    #[error("property '{property}': {source}")]
    Property {
        /// Property name.
        property: String,
        /// What went wrong.
        #[source]
        source: Box<RenderError>,
    },
}

/// Top-level generation errors.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Config could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A DTO could not be rendered.
    #[error("failed to render DTO {dto}: {source}")]
    Render {
        /// DTO name.
        dto: String,
        /// What went wrong.
        #[source]
        source: RenderError,
    },

    /// Two DTOs share a name.
    #[error("duplicate DTO name: {name}")]
    DuplicateDto {
        /// The shared name.
        name: String,
    },

    /// Two DTOs, or a DTO and the index, map to the same output file.
    #[error("DTOs {first} and {second} both map to output file {file}")]
    FileNameCollision {
        /// Output file name.
        file: String,
        /// First claimant.
        first: String,
        /// Second claimant.
        second: String,
    },

    /// Creating the output folder or writing a file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that could not be created or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result alias defaulting to `GenerateError`.
pub type Result<T, E = GenerateError> = std::result::Result<T, E>;
