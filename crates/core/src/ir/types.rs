//! Backend-agnostic IR types.
//!
//! This module defines the resolved schema shapes consumed by every dialect:
//! - IrType: closed set of type variants (primitive, object, array, reference, enum)
//! - Property: a named, typed field of an object DTO
//! - Dto: one generated unit (object shape or enum)

use std::collections::BTreeSet;
use std::fmt;

/// Scalar kinds understood by the type mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`; rendered like `number`.
    Integer,
    /// `boolean`
    Boolean,
    /// Unrecognized or missing `type`; carries the raw type string (or "unknown").
    Other(String),
}

impl Scalar {
    /// Parse an OpenAPI `type` string. Non-scalar and unknown strings become `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "string" => Scalar::String,
            "number" => Scalar::Number,
            "integer" => Scalar::Integer,
            "boolean" => Scalar::Boolean,
            other => Scalar::Other(other.to_string()),
        }
    }

    /// The OpenAPI spelling of the scalar.
    pub fn as_str(&self) -> &str {
        match self {
            Scalar::String => "string",
            Scalar::Number => "number",
            Scalar::Integer => "integer",
            Scalar::Boolean => "boolean",
            Scalar::Other(raw) => raw,
        }
    }
}

/// Scalar with an optional `format` refinement tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    /// Base scalar kind.
    pub scalar: Scalar,
    /// OpenAPI `format`, e.g. `uuid`. Never empty.
    pub format: Option<String>,
}

/// Object-typed value: a named reference or an inline shape that is not expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectType {
    /// An object known by DTO name.
    Named(String),
    /// An anonymous object declared in place.
    Inline(Box<Dto>),
}

/// Enumerated literal set. Values keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Derived name, `<Property>Enum`.
    pub name: String,
    /// Declared `type` of the enum node, `string` when absent.
    pub underlying_type: String,
    /// Literal values in declaration order.
    pub values: Vec<String>,
}

/// Resolved type of a property or array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    /// Scalar with optional format.
    Primitive(Primitive),
    /// Object shape, named or inline.
    Object(ObjectType),
    /// Homogeneous array of the element type.
    Array(Box<IrType>),
    /// Reference to a DTO of the same batch (not checked for existence here).
    Reference(String),
    /// Closed literal set declared in place.
    Enum(EnumType),
}

impl IrType {
    /// Bare primitive without a format.
    pub fn primitive(scalar: Scalar) -> Self {
        IrType::Primitive(Primitive {
            scalar,
            format: None,
        })
    }

    /// Primitive with a format tag. An empty format is stored as `None`.
    pub fn formatted(scalar: Scalar, format: impl Into<String>) -> Self {
        let format = format.into();
        IrType::Primitive(Primitive {
            scalar,
            format: (!format.is_empty()).then_some(format),
        })
    }

    /// Array of `element`.
    pub fn array(element: IrType) -> Self {
        IrType::Array(Box::new(element))
    }

    /// Reference to the DTO called `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        IrType::Reference(name.into())
    }

    /// Canonical display name, used for diagnostics and derived names.
    pub fn type_name(&self) -> String {
        match self {
            IrType::Primitive(p) => p.scalar.as_str().to_string(),
            IrType::Object(ObjectType::Named(name)) | IrType::Reference(name) => name.clone(),
            IrType::Object(ObjectType::Inline(dto)) => dto.name.clone(),
            IrType::Array(element) => format!("Array<{}>", element.type_name()),
            IrType::Enum(e) => e.name.clone(),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A field within an object DTO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Key as written in the schema.
    pub name: String,
    /// Resolved value type.
    pub ty: IrType,
    /// Non-blank `description`.
    pub description: Option<String>,
    /// Accepts `null` in addition to `ty`.
    pub nullable: bool,
    /// Derived from the owning DTO's `required` set.
    pub required: bool,
}

impl Property {
    /// Optional, non-nullable property without description.
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            nullable: false,
            required: false,
        }
    }

    /// Set the nullable flag.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Attach a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a DTO generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtoKind {
    /// Object validator over `properties`.
    Object,
    /// Literal-set validator over `enum_values`.
    Enum,
}

/// One generated unit corresponding to a schema definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dto {
    /// Schema name; also the exported type name.
    pub name: String,
    /// Non-blank `description`.
    pub description: Option<String>,
    /// Object or enum.
    pub kind: DtoKind,
    /// Always sorted lexicographically by property name.
    pub properties: Vec<Property>,
    /// Names listed in the schema's `required`.
    pub required: BTreeSet<String>,
    /// Enum literals in declaration order; empty for objects.
    pub enum_values: Vec<String>,
}

impl Dto {
    /// Build an object DTO. Properties are sorted by name and their `required`
    /// flag is derived from membership in `required`.
    pub fn object<I, S>(name: impl Into<String>, mut properties: Vec<Property>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required: BTreeSet<String> = required.into_iter().map(Into::into).collect();
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        for prop in &mut properties {
            prop.required = required.contains(&prop.name);
        }
        Self {
            name: name.into(),
            description: None,
            kind: DtoKind::Object,
            properties,
            required,
            enum_values: Vec::new(),
        }
    }

    /// Build an enum DTO; values keep the given order.
    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: DtoKind::Enum,
            properties: Vec::new(),
            required: BTreeSet::new(),
            enum_values: values,
        }
    }

    /// Attach a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `property` is listed in `required`.
    pub fn is_required(&self, property: &str) -> bool {
        self.required.contains(property)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name() {
        assert_eq!(IrType::primitive(Scalar::String).type_name(), "string");
        assert_eq!(IrType::reference("User").type_name(), "User");
        assert_eq!(
            IrType::array(IrType::array(IrType::reference("Tag"))).type_name(),
            "Array<Array<Tag>>"
        );
        assert_eq!(
            IrType::primitive(Scalar::Other("file".into())).type_name(),
            "file"
        );
    }

    #[test]
    fn test_formatted_empty_format_is_none() {
        let ty = IrType::formatted(Scalar::String, "");
        assert_eq!(ty, IrType::primitive(Scalar::String));
    }

    #[test]
    fn test_object_sorts_and_derives_required() {
        let dto = Dto::object(
            "User",
            vec![
                Property::new("name", IrType::primitive(Scalar::String)),
                Property::new("age", IrType::primitive(Scalar::Integer)),
                Property::new("id", IrType::primitive(Scalar::String)),
            ],
            ["id", "name"],
        );
        let names: Vec<_> = dto.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["age", "id", "name"]);
        let required: Vec<_> = dto.properties.iter().map(|p| p.required).collect();
        assert_eq!(required, vec![false, true, true]);
    }

    #[test]
    fn test_enum_keeps_declared_order() {
        let dto = Dto::enumeration("Status", vec!["pending".into(), "active".into()]);
        assert_eq!(dto.kind, DtoKind::Enum);
        assert_eq!(dto.enum_values, vec!["pending", "active"]);
    }
}
