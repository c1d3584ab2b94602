//! Schema walker: raw schema nodes -> IR.
//!
//! Every node is classified into a `NodeShape` exactly once per recursion
//! step, and the walker matches on that shape exhaustively. Parts of a node
//! that do not have the expected shape are reported as diagnostics instead of
//! being skipped silently.
//!
//! Precedence per node: `enum`, `$ref`, object, array, scalar, fallback.
//! `$ref` targets are never followed, so reference cycles cannot recurse.
//! Inline nesting is bounded by `WalkOptions::max_depth`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::debug;

use super::types::{Dto, EnumType, IrType, ObjectType, Primitive, Property, Scalar};
use super::utils::{capitalize_first, ref_to_type_name};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::error::WalkError;

/// Default limit for inline object/array nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied while walking.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Maximum nesting of inline schemas below a top-level definition.
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Property-level context: the property name and the owning object's `required` set.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Property name.
    pub name: &'a str,
    /// `required` set of the object that owns the property.
    pub required: &'a BTreeSet<String>,
}

/// Result of walking a batch of schemas.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// DTOs in schema-name order.
    pub dtos: Vec<Dto>,
    /// Problems found in the input, in walk order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Shape of a single raw node.
#[derive(Debug)]
enum NodeShape<'a> {
    Enum {
        underlying_type: String,
        values: Vec<String>,
    },
    Reference(&'a str),
    Object {
        properties: Option<&'a Map<String, Value>>,
        required: BTreeSet<String>,
    },
    Array {
        items: Option<&'a Map<String, Value>>,
    },
    Scalar {
        scalar: Scalar,
        format: Option<&'a str>,
    },
    Unknown(String),
}

/// Walks raw schema nodes and collects diagnostics along the way.
#[derive(Debug, Default)]
pub struct Walker {
    options: WalkOptions,
    diagnostics: Vec<Diagnostic>,
}

impl Walker {
    /// Walker with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walker with explicit limits.
    pub fn with_options(options: WalkOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Walk a `components.schemas` mapping into DTOs.
    pub fn walk(mut self, schemas: &BTreeMap<String, Value>) -> Result<WalkOutput, WalkError> {
        let mut dtos = Vec::with_capacity(schemas.len());

        for (name, node) in schemas {
            let Some(node) = node.as_object() else {
                self.report(
                    DiagnosticCode::UnsupportedTopLevel,
                    name,
                    "schema definition is not an object",
                );
                continue;
            };

            let description = description_of(node);
            match self.classify(node, name) {
                NodeShape::Enum { values, .. } => {
                    let mut dto = Dto::enumeration(name.clone(), values);
                    dto.description = description;
                    dtos.push(dto);
                }
                NodeShape::Object {
                    properties,
                    required,
                } => {
                    let mut dto = self.build_object(name, properties, &required, name, 0)?;
                    dto.description = description;
                    dtos.push(dto);
                }
                NodeShape::Reference(_)
                | NodeShape::Array { .. }
                | NodeShape::Scalar { .. }
                | NodeShape::Unknown(_) => {
                    self.report(
                        DiagnosticCode::UnsupportedTopLevel,
                        name,
                        "only object and enum schemas produce DTOs",
                    );
                }
            }
        }

        debug!(
            dtos = dtos.len(),
            diagnostics = self.diagnostics.len(),
            "Walked component schemas."
        );

        Ok(WalkOutput {
            dtos,
            diagnostics: self.diagnostics,
        })
    }

    /// Resolve a single node to an IR type. `name` seeds derived names
    /// (`<Name>Enum`, `<Name>Item`, inline DTO names).
    pub fn resolve(&mut self, node: &Map<String, Value>, name: &str) -> Result<IrType, WalkError> {
        self.resolve_at(node, name, name, 0)
    }

    /// Resolve a property node; `required` is derived from the context's set.
    pub fn resolve_property(
        &mut self,
        node: &Map<String, Value>,
        ctx: &Context<'_>,
    ) -> Result<Property, WalkError> {
        self.property_at(node, ctx, ctx.name, 0)
    }

    fn property_at(
        &mut self,
        node: &Map<String, Value>,
        ctx: &Context<'_>,
        path: &str,
        depth: usize,
    ) -> Result<Property, WalkError> {
        let ty = self.resolve_at(node, ctx.name, path, depth)?;
        Ok(Property {
            name: ctx.name.to_string(),
            ty,
            description: description_of(node),
            nullable: is_nullable(node),
            required: ctx.required.contains(ctx.name),
        })
    }

    fn resolve_at(
        &mut self,
        node: &Map<String, Value>,
        name: &str,
        path: &str,
        depth: usize,
    ) -> Result<IrType, WalkError> {
        if depth > self.options.max_depth {
            return Err(WalkError::DepthExceeded {
                path: path.to_string(),
                limit: self.options.max_depth,
            });
        }

        let ty = match self.classify(node, path) {
            NodeShape::Enum {
                underlying_type,
                values,
            } => IrType::Enum(EnumType {
                name: format!("{}Enum", capitalize_first(name)),
                underlying_type,
                values,
            }),
            NodeShape::Reference(ref_path) => IrType::Reference(ref_to_type_name(ref_path)),
            NodeShape::Object {
                properties,
                required,
            } => {
                let mut dto = self.build_object(name, properties, &required, path, depth)?;
                dto.description = description_of(node);
                IrType::Object(ObjectType::Inline(Box::new(dto)))
            }
            NodeShape::Array { items: Some(items) } => {
                let element = self.resolve_at(
                    items,
                    &format!("{name}Item"),
                    &format!("{path}.items"),
                    depth + 1,
                )?;
                IrType::array(element)
            }
            NodeShape::Array { items: None } => {
                IrType::array(IrType::primitive(Scalar::Other("unknown".into())))
            }
            NodeShape::Scalar { scalar, format } => IrType::Primitive(Primitive {
                scalar,
                format: format.filter(|f| !f.is_empty()).map(str::to_string),
            }),
            NodeShape::Unknown(raw) => IrType::primitive(Scalar::Other(raw)),
        };

        Ok(ty)
    }

    fn build_object(
        &mut self,
        name: &str,
        properties: Option<&Map<String, Value>>,
        required: &BTreeSet<String>,
        path: &str,
        depth: usize,
    ) -> Result<Dto, WalkError> {
        let mut props = Vec::new();

        for (prop_name, prop_node) in properties.into_iter().flatten() {
            let prop_path = format!("{path}.properties.{prop_name}");
            let Some(prop_node) = prop_node.as_object() else {
                self.report(
                    DiagnosticCode::InvalidPropertyNode,
                    &prop_path,
                    "property is not a schema object; dropped",
                );
                continue;
            };
            let ctx = Context {
                name: prop_name,
                required,
            };
            props.push(self.property_at(prop_node, &ctx, &prop_path, depth + 1)?);
        }

        Ok(Dto::object(name, props, required.iter().cloned()))
    }

    /// Decide the shape of a node. Malformed keys are reported and ignored.
    fn classify<'a>(&mut self, node: &'a Map<String, Value>, path: &str) -> NodeShape<'a> {
        let type_name = declared_type(node);

        if let Some(raw) = node.get("enum") {
            let values = self.enum_values(raw, path);
            if !values.is_empty() {
                return NodeShape::Enum {
                    underlying_type: type_name.unwrap_or_else(|| "string".to_string()),
                    values,
                };
            }
        }

        match node.get("$ref") {
            Some(Value::String(ref_path)) => return NodeShape::Reference(ref_path),
            Some(_) => self.report(DiagnosticCode::InvalidRef, path, "$ref is not a string"),
            None => {}
        }

        let is_object = match type_name.as_deref() {
            Some(t) => t == "object",
            None => node.contains_key("properties"),
        };
        if is_object {
            return self.object_shape(node, path);
        }

        match type_name.as_deref() {
            Some("array") => NodeShape::Array {
                items: self.items_of(node, path),
            },
            Some(raw @ ("string" | "number" | "integer" | "boolean")) => NodeShape::Scalar {
                scalar: Scalar::parse(raw),
                format: node.get("format").and_then(Value::as_str),
            },
            Some(other) => NodeShape::Unknown(other.to_string()),
            None => NodeShape::Unknown("unknown".to_string()),
        }
    }

    fn object_shape<'a>(&mut self, node: &'a Map<String, Value>, path: &str) -> NodeShape<'a> {
        let properties = match node.get("properties") {
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.report(
                    DiagnosticCode::InvalidProperties,
                    path,
                    "properties is not a mapping; all properties dropped",
                );
                None
            }
            None => None,
        };
        NodeShape::Object {
            properties,
            required: self.required_set(node, path),
        }
    }

    fn items_of<'a>(
        &mut self,
        node: &'a Map<String, Value>,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        match node.get("items") {
            Some(Value::Object(items)) => Some(items),
            Some(_) => {
                self.report(
                    DiagnosticCode::MissingItems,
                    path,
                    "items is not a schema object; element type is unknown",
                );
                None
            }
            None => {
                self.report(
                    DiagnosticCode::MissingItems,
                    path,
                    "array schema has no items; element type is unknown",
                );
                None
            }
        }
    }

    fn required_set(&mut self, node: &Map<String, Value>, path: &str) -> BTreeSet<String> {
        let mut required = BTreeSet::new();
        match node.get("required") {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    if let Some(name) = entry.as_str() {
                        required.insert(name.to_string());
                    } else {
                        self.report(
                            DiagnosticCode::InvalidRequired,
                            path,
                            format!("required entry {entry} is not a string; ignored"),
                        );
                    }
                }
            }
            Some(_) => self.report(
                DiagnosticCode::InvalidRequired,
                path,
                "required is not a list; all properties treated as optional",
            ),
            None => {}
        }
        required
    }

    fn enum_values(&mut self, raw: &Value, path: &str) -> Vec<String> {
        let Some(entries) = raw.as_array() else {
            self.report(DiagnosticCode::InvalidEnumValue, path, "enum is not a list");
            return Vec::new();
        };
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::String(s) => values.push(s.clone()),
                // Nullable enums list `null` as a member; nullability is read by `is_nullable`.
                Value::Null => {}
                other => self.report(
                    DiagnosticCode::InvalidEnumValue,
                    path,
                    format!("enum value {other} is not a string; dropped"),
                ),
            }
        }
        values
    }

    fn report(&mut self, code: DiagnosticCode, path: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(code, path, message);
        debug!(%diagnostic, "Schema diagnostic.");
        self.diagnostics.push(diagnostic);
    }
}

/// Walk a `components.schemas` mapping with default options.
pub fn walk_schemas(schemas: &BTreeMap<String, Value>) -> Result<WalkOutput, WalkError> {
    Walker::new().walk(schemas)
}

/// `type` as a single string. OpenAPI 3.1 type arrays are reduced to their
/// single non-null member; `null` itself is handled by `is_nullable`.
fn declared_type(node: &Map<String, Value>) -> Option<String> {
    match node.get("type")? {
        Value::String(t) => Some(t.clone()),
        Value::Array(types) => {
            let non_null: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            match non_null.as_slice() {
                [] => None,
                [single] => Some((*single).to_string()),
                many => Some(many.join(" | ")),
            }
        }
        _ => None,
    }
}

fn description_of(node: &Map<String, Value>) -> Option<String> {
    node.get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
}

/// OpenAPI 3.0 `nullable: true`, a 3.1 type array containing `"null"`, or an
/// enum listing `null` among its members.
fn is_nullable(node: &Map<String, Value>) -> bool {
    if node.get("nullable").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    let in_type = matches!(
        node.get("type"),
        Some(Value::Array(types)) if types.iter().any(|t| t.as_str() == Some("null"))
    );
    let in_enum = matches!(
        node.get("enum"),
        Some(Value::Array(values)) if values.iter().any(Value::is_null)
    );
    in_type || in_enum
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::DtoKind;
    use serde_json::json;

    fn schemas(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn node(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_walk_user_object() {
        let out = walk_schemas(&schemas(json!({
            "User": {
                "type": "object",
                "description": "A user",
                "required": ["id", "name"],
                "properties": {
                    "name": { "type": "string" },
                    "id": { "type": "string" },
                    "email": { "type": "string", "format": "email" },
                    "age": { "type": "integer" }
                }
            }
        })))
        .unwrap();

        assert!(out.diagnostics.is_empty());
        assert_eq!(out.dtos.len(), 1);
        let user = &out.dtos[0];
        assert_eq!(user.kind, DtoKind::Object);
        assert_eq!(user.description.as_deref(), Some("A user"));

        let names: Vec<_> = user.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["age", "email", "id", "name"]);

        let email = &user.properties[1];
        assert!(!email.required);
        assert_eq!(email.ty, IrType::formatted(Scalar::String, "email"));
        assert!(user.properties[2].required);
    }

    #[test]
    fn test_enum_takes_precedence_and_keeps_order() {
        let mut walker = Walker::new();
        let ty = walker
            .resolve(
                &node(json!({ "type": "string", "enum": ["zeta", "alpha", "mid"] })),
                "status",
            )
            .unwrap();
        assert_eq!(
            ty,
            IrType::Enum(EnumType {
                name: "StatusEnum".into(),
                underlying_type: "string".into(),
                values: vec!["zeta".into(), "alpha".into(), "mid".into()],
            })
        );
    }

    #[test]
    fn test_ref_is_not_followed() {
        let mut walker = Walker::new();
        let ty = walker
            .resolve(
                &node(json!({ "$ref": "#/components/schemas/Node", "type": "object" })),
                "next",
            )
            .unwrap();
        assert_eq!(ty, IrType::reference("Node"));
    }

    #[test]
    fn test_array_of_refs() {
        let mut walker = Walker::new();
        let ty = walker
            .resolve(
                &node(json!({ "type": "array", "items": { "$ref": "#/components/schemas/Tag" } })),
                "tags",
            )
            .unwrap();
        assert_eq!(ty, IrType::array(IrType::reference("Tag")));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let mut walker = Walker::new();
        let ty = walker.resolve(&node(json!({ "type": "file" })), "blob").unwrap();
        assert_eq!(ty, IrType::primitive(Scalar::Other("file".into())));

        let ty = walker.resolve(&node(json!({})), "anything").unwrap();
        assert_eq!(ty, IrType::primitive(Scalar::Other("unknown".into())));
    }

    #[test]
    fn test_inline_object_becomes_nested_dto() {
        let mut walker = Walker::new();
        let ty = walker
            .resolve(
                &node(json!({
                    "type": "object",
                    "required": ["city"],
                    "properties": { "city": { "type": "string" } }
                })),
                "address",
            )
            .unwrap();
        let expected = Dto::object(
            "address",
            vec![Property::new("city", IrType::primitive(Scalar::String))],
            ["city"],
        );
        assert_eq!(ty, IrType::Object(ObjectType::Inline(Box::new(expected))));
    }

    #[test]
    fn test_resolve_property_uses_context_required() {
        let mut walker = Walker::new();
        let required: BTreeSet<String> = ["id".to_string()].into_iter().collect();
        let prop = walker
            .resolve_property(
                &node(json!({ "type": "string", "nullable": true })),
                &Context {
                    name: "id",
                    required: &required,
                },
            )
            .unwrap();
        assert!(prop.required);
        assert!(prop.nullable);
    }

    #[test]
    fn test_openapi_31_nullable_type_array() {
        let out = walk_schemas(&schemas(json!({
            "Pet": {
                "type": "object",
                "properties": { "nickname": { "type": ["string", "null"] } }
            }
        })))
        .unwrap();
        let prop = &out.dtos[0].properties[0];
        assert!(prop.nullable);
        assert_eq!(prop.ty, IrType::primitive(Scalar::String));
    }

    #[test]
    fn test_malformed_nodes_are_reported() {
        let out = walk_schemas(&schemas(json!({
            "Broken": {
                "type": "object",
                "required": ["a", 3],
                "properties": {
                    "a": "not a schema",
                    "b": { "type": "array" },
                    "c": { "type": "object", "properties": ["x"] }
                }
            }
        })))
        .unwrap();

        let codes: Vec<_> = out.diagnostics.iter().map(|d| d.code).collect();
        assert!(codes.contains(&DiagnosticCode::InvalidRequired));
        assert!(codes.contains(&DiagnosticCode::InvalidPropertyNode));
        assert!(codes.contains(&DiagnosticCode::MissingItems));
        assert!(codes.contains(&DiagnosticCode::InvalidProperties));

        let dropped = out
            .diagnostics
            .iter()
            .find(|d| d.code == DiagnosticCode::InvalidPropertyNode)
            .unwrap();
        assert_eq!(dropped.path, "Broken.properties.a");

        let names: Vec<_> = out.dtos[0].properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_non_string_enum_values_fall_back_to_scalar() {
        let out = walk_schemas(&schemas(json!({
            "Level": { "type": "integer", "enum": [1, 2, 3] }
        })))
        .unwrap();
        assert!(out.dtos.is_empty());
        let codes: Vec<_> = out.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::InvalidEnumValue,
                DiagnosticCode::InvalidEnumValue,
                DiagnosticCode::InvalidEnumValue,
                DiagnosticCode::UnsupportedTopLevel,
            ]
        );
    }

    #[test]
    fn test_null_enum_member_marks_nullable() {
        let out = walk_schemas(&schemas(json!({
            "Pet": {
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "nullable": true, "enum": ["cat", "dog", null] },
                    "mood": { "type": ["string", "null"], "enum": ["calm", null] },
                    "size": { "type": "string", "enum": ["s", "m", null] }
                }
            }
        })))
        .unwrap();

        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let pet = &out.dtos[0];
        let (kind, mood, size) = (&pet.properties[0], &pet.properties[1], &pet.properties[2]);
        assert!(kind.nullable && mood.nullable && size.nullable);
        assert_eq!(
            kind.ty,
            IrType::Enum(EnumType {
                name: "KindEnum".into(),
                underlying_type: "string".into(),
                values: vec!["cat".into(), "dog".into()],
            })
        );
        assert_eq!(
            mood.ty,
            IrType::Enum(EnumType {
                name: "MoodEnum".into(),
                underlying_type: "string".into(),
                values: vec!["calm".into()],
            })
        );
    }

    #[test]
    fn test_non_string_enum_members_are_still_reported() {
        let out = walk_schemas(&schemas(json!({
            "Flag": { "type": "string", "enum": ["on", true, null, { "x": 1 }] }
        })))
        .unwrap();
        let codes: Vec<_> = out.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::InvalidEnumValue, DiagnosticCode::InvalidEnumValue]
        );
        assert_eq!(out.dtos[0].enum_values, vec!["on"]);
    }

    #[test]
    fn test_top_level_enum_dto() {
        let out = walk_schemas(&schemas(json!({
            "Status": { "type": "string", "enum": ["active", "inactive"], "description": "State" }
        })))
        .unwrap();
        let dto = &out.dtos[0];
        assert_eq!(dto.kind, DtoKind::Enum);
        assert_eq!(dto.enum_values, vec!["active", "inactive"]);
        assert_eq!(dto.description.as_deref(), Some("State"));
    }

    #[test]
    fn test_depth_guard() {
        let mut deep = json!({ "type": "string" });
        for _ in 0..10 {
            deep = json!({ "type": "object", "properties": { "child": deep } });
        }
        let walker = Walker::with_options(WalkOptions { max_depth: 4 });
        let err = walker
            .walk(&schemas(json!({ "Deep": deep })))
            .unwrap_err();
        let WalkError::DepthExceeded { path, limit } = err;
        assert_eq!(limit, 4);
        assert!(path.starts_with("Deep.properties.child"));
    }
}
