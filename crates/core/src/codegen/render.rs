//! IR -> validator source for a single DTO.

use std::collections::BTreeSet;

use crate::dialect::{Dialect, EnumStyle, Lexicon};
use crate::error::RenderError;
use crate::ir::utils::{is_valid_identifier, quote_key_if_needed, sanitize_doc_comment, single_quoted};
use crate::ir::{Dto, DtoKind, EnumType, IrType, ObjectType, Primitive, Property, Scalar};
use crate::registry::CustomTypeRegistry;

/// Source of one DTO plus what it needs from its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDto {
    /// DTO name.
    pub name: String,
    /// Declarations without imports.
    pub source: String,
    /// String formats used anywhere in the DTO, including array elements.
    pub formats: BTreeSet<String>,
    /// DTO names referenced by the DTO, excluding itself.
    pub references: BTreeSet<String>,
}

/// Renders DTOs with one registry. Holds no mutable state and can be shared
/// across threads.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a CustomTypeRegistry,
}

impl<'a> Renderer<'a> {
    /// Renderer over `registry`.
    pub fn new(registry: &'a CustomTypeRegistry) -> Self {
        Self { registry }
    }

    fn dialect(self) -> &'static Dialect {
        self.registry.dialect()
    }

    fn lexicon(self) -> &'static Lexicon {
        &self.registry.dialect().lexicon
    }

    /// Declarations for one DTO, plus the formats and references it uses.
    pub fn render_dto(self, dto: &Dto) -> Result<RenderedDto, RenderError> {
        if !is_valid_identifier(&dto.name) {
            return Err(RenderError::InvalidIdentifier {
                name: dto.name.clone(),
            });
        }

        let mut source = doc_comment(dto.description.as_deref(), "");
        match dto.kind {
            DtoKind::Object => self.render_object(dto, &mut source)?,
            DtoKind::Enum => self.render_enum(dto, &mut source)?,
        }

        let mut formats = BTreeSet::new();
        let mut references = BTreeSet::new();
        for prop in &dto.properties {
            collect_formats(&prop.ty, &mut formats);
            collect_references(&prop.ty, &mut references);
        }
        references.remove(&dto.name);

        Ok(RenderedDto {
            name: dto.name.clone(),
            source,
            formats,
            references,
        })
    }

    fn render_object(self, dto: &Dto, out: &mut String) -> Result<(), RenderError> {
        let lexicon = self.lexicon();
        let symbol = self.dialect().symbol(&dto.name);

        out.push_str(&format!("export const {symbol} = {}", lexicon.object.prefix));
        if !dto.properties.is_empty() {
            out.push('\n');
            for prop in &dto.properties {
                let expr = self
                    .property_expr(prop)
                    .map_err(|source| RenderError::Property {
                        property: prop.name.clone(),
                        source: Box::new(source),
                    })?;
                out.push_str(&doc_comment(prop.description.as_deref(), "  "));
                out.push_str(&format!("  {}: {expr},\n", quote_key_if_needed(&prop.name)));
            }
        }
        out.push_str(&format!("{};\n", lexicon.object.suffix));
        out.push_str(&format!(
            "export type {} = {};\n",
            dto.name,
            lexicon.static_type.wrap(&symbol)
        ));

        if self.registry.generation().generate_partial_codecs {
            let partial = self.dialect().partial_symbol(&dto.name);
            out.push_str(&format!(
                "\nexport const {partial} = {};\n",
                lexicon.partial.wrap(&symbol)
            ));
            out.push_str(&format!(
                "export type {}Partial = {};\n",
                dto.name,
                lexicon.static_type.wrap(&partial)
            ));
        }
        Ok(())
    }

    fn render_enum(self, dto: &Dto, out: &mut String) -> Result<(), RenderError> {
        if dto.enum_values.is_empty() {
            return Err(RenderError::EmptyEnum);
        }
        let lexicon = self.lexicon();
        let symbol = self.dialect().symbol(&dto.name);

        let validator = match lexicon.enum_style {
            EnumStyle::KeyOf => {
                let values_name = format!("{}Values", dto.name);
                out.push_str(&format!("export const {values_name} = {{\n"));
                for value in &dto.enum_values {
                    out.push_str(&format!("  {}: null,\n", single_quoted(value)));
                }
                out.push_str("} as const;\n\n");
                lexicon.enumeration.wrap(&values_name)
            }
            EnumStyle::Tuple => {
                let mut list = String::from("[\n");
                for value in &dto.enum_values {
                    list.push_str(&format!("  {},\n", single_quoted(value)));
                }
                list.push(']');
                lexicon.enumeration.wrap(&list)
            }
        };

        out.push_str(&format!("export const {symbol} = {validator};\n"));
        out.push_str(&format!(
            "export type {} = {};\n",
            dto.name,
            lexicon.static_type.wrap(&symbol)
        ));
        Ok(())
    }

    /// Field expression with modifiers: nullable first, then optional.
    pub fn property_expr(self, prop: &Property) -> Result<String, RenderError> {
        let lexicon = self.lexicon();
        let mut expr = self.type_expr(&prop.ty)?;
        if prop.nullable {
            expr = lexicon.nullable.wrap(&expr);
        }
        if !prop.required {
            expr = lexicon.optional.wrap(&expr);
        }
        Ok(expr)
    }

    /// Validator expression for a bare IR type.
    pub fn type_expr(self, ty: &IrType) -> Result<String, RenderError> {
        let lexicon = self.lexicon();
        match ty {
            IrType::Primitive(primitive) => Ok(self.primitive_expr(primitive)),
            IrType::Array(element) => Ok(lexicon.array.wrap(&self.type_expr(element)?)),
            IrType::Reference(name) | IrType::Object(ObjectType::Named(name)) => {
                if !is_valid_identifier(name) {
                    return Err(RenderError::InvalidIdentifier { name: name.clone() });
                }
                Ok(self.dialect().symbol(name))
            }
            // Inline shapes are not expanded.
            IrType::Object(ObjectType::Inline(_)) => Ok(lexicon.record.to_string()),
            IrType::Enum(enum_type) => self.enum_expr(enum_type),
        }
    }

    fn primitive_expr(self, primitive: &Primitive) -> String {
        let lexicon = self.lexicon();
        match (&primitive.scalar, primitive.format.as_deref()) {
            (Scalar::String, None) => lexicon.string.to_string(),
            (Scalar::String, Some(format)) => match self.registry.get(format) {
                Some(mapping) => mapping.validator.clone(),
                None => format!(
                    "{} /* format: {} */",
                    lexicon.string,
                    sanitize_doc_comment(format)
                ),
            },
            (Scalar::Number | Scalar::Integer, _) => lexicon.number.to_string(),
            (Scalar::Boolean, _) => lexicon.boolean.to_string(),
            (Scalar::Other(_), _) => lexicon.unknown.to_string(),
        }
    }

    fn enum_expr(self, enum_type: &EnumType) -> Result<String, RenderError> {
        if enum_type.values.is_empty() {
            return Err(RenderError::EmptyEnum);
        }
        let lexicon = self.lexicon();
        let literals = enum_type.values.iter().map(String::as_str).map(single_quoted);
        let inner = match lexicon.enum_style {
            EnumStyle::KeyOf => format!(
                "{{{}}}",
                literals
                    .map(|v| format!("{v}: null"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            EnumStyle::Tuple => format!("[{}]", literals.collect::<Vec<_>>().join(", ")),
        };
        Ok(lexicon.enumeration.wrap(&inner))
    }
}

/// String formats used by a type, looking through array elements.
pub fn collect_formats(ty: &IrType, formats: &mut BTreeSet<String>) {
    match ty {
        IrType::Primitive(Primitive {
            scalar: Scalar::String,
            format: Some(format),
        }) => {
            formats.insert(format.clone());
        }
        IrType::Array(element) => collect_formats(element, formats),
        IrType::Primitive(_) | IrType::Object(_) | IrType::Reference(_) | IrType::Enum(_) => {}
    }
}

/// DTO names a type refers to, looking through array elements.
pub fn collect_references(ty: &IrType, references: &mut BTreeSet<String>) {
    match ty {
        IrType::Reference(name) | IrType::Object(ObjectType::Named(name)) => {
            references.insert(name.clone());
        }
        IrType::Array(element) => collect_references(element, references),
        IrType::Primitive(_) | IrType::Object(ObjectType::Inline(_)) | IrType::Enum(_) => {}
    }
}

fn doc_comment(text: Option<&str>, indent: &str) -> String {
    let Some(text) = text.map(sanitize_doc_comment).filter(|t| !t.is_empty()) else {
        return String::new();
    };
    if !text.contains('\n') {
        return format!("{indent}/** {text} */\n");
    }
    let mut out = format!("{indent}/**\n");
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
    out
}
