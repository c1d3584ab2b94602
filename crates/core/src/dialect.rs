//! Dialect descriptions.
//!
//! A dialect is a table of code fragments for one validation library. The
//! generator has a single control flow and reads every library-specific piece
//! of syntax from a `Dialect` record.

/// Text placed around an inner expression: `prefix + inner + suffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affix {
    /// Text before the inner expression.
    pub prefix: &'static str,
    /// Text after the inner expression.
    pub suffix: &'static str,
}

impl Affix {
    /// Affix from its two halves.
    pub const fn new(prefix: &'static str, suffix: &'static str) -> Self {
        Self { prefix, suffix }
    }

    /// Surround `inner`.
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}{inner}{}", self.prefix, self.suffix)
    }
}

/// How closed literal sets are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStyle {
    /// `t.keyof({'a': null, 'b': null})`; enum DTOs also export a `<Name>Values` object.
    KeyOf,
    /// `z.enum(['a', 'b'])`
    Tuple,
}

/// Validator expressions for the IR's leaf types and modifiers.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    /// Bare string validator.
    pub string: &'static str,
    /// Numeric validator, also used for integers.
    pub number: &'static str,
    /// Boolean validator.
    pub boolean: &'static str,
    /// Accept-anything validator for unrecognized types.
    pub unknown: &'static str,
    /// Untyped record, used for inline object shapes.
    pub record: &'static str,
    /// Array of an element validator.
    pub array: Affix,
    /// Also accept `null`.
    pub nullable: Affix,
    /// Also accept a missing value.
    pub optional: Affix,
    /// Opening and closing of an object validator around its field list.
    pub object: Affix,
    /// Derived static type of a validator symbol.
    pub static_type: Affix,
    /// Partial variant of an object validator symbol.
    pub partial: Affix,
    /// Closed literal-set validator around the literal list.
    pub enumeration: Affix,
    /// Literal list syntax inside `enumeration`.
    pub enum_style: EnumStyle,
}

/// Built-in format mapping: `(format, validator, scalar type, import)`.
pub type DefaultMapping = (&'static str, &'static str, &'static str, &'static str);

/// Everything the generator needs to know about one validation library.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    /// Language name used on the command line.
    pub language: &'static str,
    /// Key of this dialect's section in a shared config file. `None` reads the root.
    pub config_section: Option<&'static str>,
    /// Config key naming the validator expression of a custom type.
    pub validator_key: &'static str,
    /// Extension of generated source files, with the dot.
    pub file_extension: &'static str,
    /// Appended to a DTO name to form its exported validator symbol.
    pub symbol_suffix: &'static str,
    /// Import of the validation library, first in every import block.
    pub base_import: &'static str,
    /// Leaf validators and wrappers.
    pub lexicon: Lexicon,
    /// Built-in format mappings, overridable through `customTypes`.
    pub default_mappings: &'static [DefaultMapping],
    /// Entries shown in the example config template.
    pub example_mappings: &'static [DefaultMapping],
    /// Runtime helper functions, emitted once per output.
    pub helpers: &'static str,
    /// Manifest `name` when none is given.
    pub default_package_name: &'static str,
    /// Manifest `description`.
    pub package_description: &'static str,
    /// Runtime dependencies written into the package manifest.
    pub dependencies: &'static [(&'static str, &'static str)],
}

/// io-ts codecs.
pub static IO_TS: Dialect = Dialect {
    language: "typescript",
    config_section: None,
    validator_key: "ioTsType",
    file_extension: ".ts",
    symbol_suffix: "Codec",
    base_import: "import * as t from 'io-ts';",
    lexicon: Lexicon {
        string: "t.string",
        number: "t.number",
        boolean: "t.boolean",
        unknown: "t.unknown",
        record: "t.record(t.string, t.unknown)",
        array: Affix::new("t.array(", ")"),
        nullable: Affix::new("t.union([", ", t.null])"),
        optional: Affix::new("t.union([", ", t.undefined])"),
        object: Affix::new("t.type({", "})"),
        static_type: Affix::new("t.TypeOf<typeof ", ">"),
        partial: Affix::new("t.partial(", ".props)"),
        enumeration: Affix::new("t.keyof(", ")"),
        enum_style: EnumStyle::KeyOf,
    },
    default_mappings: &[
        (
            "date-time",
            "DateFromISOString",
            "Date",
            "import { DateFromISOString } from 'io-ts-types';",
        ),
        ("uuid", "t.string", "string", ""),
        ("email", "t.string", "string", ""),
        ("uri", "t.string", "string", ""),
        ("date", "t.string", "string", ""),
    ],
    example_mappings: &[
        (
            "date-time",
            "DateTimeString",
            "DateTimeString",
            "import { DateTimeString } from './branded-types';",
        ),
        (
            "uuid",
            "UUID.codec",
            "UUID",
            "import { UUID } from './branded-types';",
        ),
        (
            "email",
            "EmailString.codec",
            "EmailString",
            "import { EmailString } from './branded-types';",
        ),
    ],
    helpers: IO_TS_HELPERS,
    default_package_name: "generated-schemas",
    package_description: "Generated io-ts codecs",
    dependencies: &[
        ("fp-ts", "^2.16.0"),
        ("io-ts", "^2.2.20"),
        ("io-ts-types", "^0.5.19"),
    ],
};

/// Zod schemas.
pub static ZOD: Dialect = Dialect {
    language: "typescript-zod",
    config_section: Some("typescript-zod"),
    validator_key: "zodType",
    file_extension: ".ts",
    symbol_suffix: "Schema",
    base_import: "import { z } from 'zod';",
    lexicon: Lexicon {
        string: "z.string()",
        number: "z.number()",
        boolean: "z.boolean()",
        unknown: "z.unknown()",
        record: "z.record(z.unknown())",
        array: Affix::new("z.array(", ")"),
        nullable: Affix::new("", ".nullable()"),
        optional: Affix::new("", ".optional()"),
        object: Affix::new("z.object({", "})"),
        static_type: Affix::new("z.infer<typeof ", ">"),
        partial: Affix::new("", ".partial()"),
        enumeration: Affix::new("z.enum(", ")"),
        enum_style: EnumStyle::Tuple,
    },
    default_mappings: &[
        ("date-time", "z.string().datetime()", "string", ""),
        ("uuid", "z.string().uuid()", "string", ""),
        ("email", "z.string().email()", "string", ""),
        ("uri", "z.string().url()", "string", ""),
        ("url", "z.string().url()", "string", ""),
        ("date", "z.string().date()", "string", ""),
    ],
    example_mappings: &[
        (
            "date-time",
            "DateTimeSchema",
            "DateTime",
            "import { DateTimeSchema } from './datetime-utils';",
        ),
        ("uuid", "z.string().uuid().brand('UUID')", "UUID", ""),
        (
            "email",
            "EmailSchema",
            "Email",
            "import { EmailSchema } from './branded-types';",
        ),
    ],
    helpers: ZOD_HELPERS,
    default_package_name: "generated-zod-schemas",
    package_description: "Generated Zod schemas",
    dependencies: &[("zod", "^3.22.4")],
};

const IO_TS_HELPERS: &str = r#"export const validateData = <A, O, I>(codec: t.Type<A, O, I>, data: I): A => {
  const result = codec.decode(data);
  if (result._tag === 'Left') {
    const paths = result.left.map((error) =>
      error.context
        .map((entry) => entry.key)
        .filter((key) => key.length > 0)
        .join('.'),
    );
    throw new Error(`Validation failed: ${paths.join(', ')}`);
  }
  return result.right;
};

export const safeValidateData = <A, O, I>(codec: t.Type<A, O, I>, data: I): A | undefined => {
  const result = codec.decode(data);
  return result._tag === 'Right' ? result.right : undefined;
};
"#;

const ZOD_HELPERS: &str = r#"export const validateData = <T extends z.ZodTypeAny>(schema: T, data: unknown): z.infer<T> =>
  schema.parse(data);

export const safeValidateData = <T extends z.ZodTypeAny>(schema: T, data: unknown) =>
  schema.safeParse(data);
"#;

static DIALECTS: [&Dialect; 2] = [&IO_TS, &ZOD];

impl Dialect {
    /// Look up a dialect by its language name.
    pub fn from_language(language: &str) -> Option<&'static Dialect> {
        DIALECTS.iter().copied().find(|d| d.language == language)
    }

    /// Language names of all registered dialects.
    pub fn available() -> Vec<&'static str> {
        DIALECTS.iter().map(|d| d.language).collect()
    }

    /// Exported validator symbol for a DTO name.
    pub fn symbol(&self, dto_name: &str) -> String {
        format!("{dto_name}{}", self.symbol_suffix)
    }

    /// Exported symbol of a DTO's partial variant.
    pub fn partial_symbol(&self, dto_name: &str) -> String {
        format!("{dto_name}Partial{}", self.symbol_suffix)
    }
}
