//! Diagnostics
//!
//! Collects schema-shape problems found while walking and generating.
//! Nodes that cannot be interpreted are reported here instead of being dropped silently.

use std::fmt;

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `properties` present but not a mapping
    InvalidProperties,
    /// A property entry is not a schema object
    InvalidPropertyNode,
    /// `required` present but not a list of strings
    InvalidRequired,
    /// An enum value that is not a string
    InvalidEnumValue,
    /// Array schema without an `items` schema
    MissingItems,
    /// `$ref` present but not a string
    InvalidRef,
    /// Top-level schema that is neither an object nor an enum
    UnsupportedTopLevel,
    /// Reference to a DTO that is not part of the batch
    DanglingReference,
}

impl DiagnosticCode {
    /// Stable short code, e.g. `E001`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidProperties => "E001",
            Self::InvalidPropertyNode => "E002",
            Self::InvalidRequired => "E003",
            Self::InvalidEnumValue => "E004",
            Self::MissingItems => "W003",
            Self::InvalidRef => "E005",
            Self::UnsupportedTopLevel => "W001",
            Self::DanglingReference => "W002",
        }
    }

    /// Error codes mark schema content that was not translated.
    pub fn severity(self) -> Severity {
        match self {
            Self::InvalidProperties
            | Self::InvalidPropertyNode
            | Self::InvalidRequired
            | Self::InvalidEnumValue
            | Self::InvalidRef => Severity::Error,

            Self::MissingItems | Self::UnsupportedTopLevel | Self::DanglingReference => {
                Severity::Warning
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Output is complete but may not be what the author intended.
    Warning,
    /// Part of the schema was dropped.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What kind of problem.
    pub code: DiagnosticCode,
    /// Dotted location of the offending node, e.g. `User.properties.address`
    pub path: String,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Diagnostic at `path`.
    pub fn new(code: DiagnosticCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Severity implied by the code.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity(),
            self.code,
            self.path,
            self.message
        )
    }
}
