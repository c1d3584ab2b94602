//! Intermediate representation for schema-to-validator generation.
//!
//! - `types`: resolved shapes (IrType, Property, Dto)
//! - `walker`: raw schema nodes -> IR, with diagnostics
//! - `utils`: naming and quoting helpers shared with the generator

mod types;
pub mod utils;
mod walker;

pub use types::{Dto, DtoKind, EnumType, IrType, ObjectType, Primitive, Property, Scalar};
pub use walker::{Context, DEFAULT_MAX_DEPTH, WalkOptions, WalkOutput, Walker, walk_schemas};
