//! dtoforge core
//!
//! Turns OpenAPI `components.schemas` into runtime-validated TypeScript
//! modules for interchangeable validation libraries (io-ts, Zod).
//!
//! The pipeline is:
//! 1. Load: `OpenApiDocument` -> name -> schema mapping
//! 2. Walk: schemas -> `Dto` list plus diagnostics (`walk_schemas`)
//! 3. Generate: DTOs -> files via the dialect's `Generator`

pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod ir;
pub mod registry;
pub mod spec;

pub use codegen::{
    GenerateConfig, GenerationReport, Generator, OutputPlan, PlannedFile, Planned, RenderedDto,
    WritePolicy, write_plan,
};
pub use config::{
    ConfigDocument, CustomTypeMapping, GenerationConfig, OutputConfig, OutputMode,
    example_config, save_example_config,
};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use dialect::{Dialect, IO_TS, ZOD};
pub use error::{ConfigError, GenerateError, RenderError, SpecError, WalkError};
pub use ir::{Dto, DtoKind, IrType, Property, WalkOptions, WalkOutput, Walker, walk_schemas};
pub use registry::{CustomTypeRegistry, RegistryBuilder};
pub use spec::OpenApiDocument;
