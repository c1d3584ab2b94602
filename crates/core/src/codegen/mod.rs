//! Code generation.
//!
//! The pipeline is:
//! 1. Registry: dialect defaults merged with the optional config file
//! 2. Render: Dto -> validator source, in parallel, collected in name order
//! 3. Plan: rendered DTOs -> files (layout, imports, index, manifest)
//! 4. Write: the plan is written sequentially into the output folder

mod planner;
mod render;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

pub use planner::{OutputPlan, PlannedFile, WritePolicy, dependency_order};
pub use render::{RenderedDto, Renderer, collect_formats, collect_references};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::dialect::Dialect;
use crate::error::{ConfigError, GenerateError, Result};
use crate::ir::Dto;
use crate::registry::CustomTypeRegistry;

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Config file to load. A path that does not exist leaves defaults in place.
    pub config_file: Option<PathBuf>,
    /// Overrides `output.folder` from the config file.
    pub output_folder: Option<PathBuf>,
    /// Package manifest name. Defaults to the dialect's package name.
    pub package_name: Option<String>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
    /// Files left untouched because they already existed.
    pub skipped: Vec<PathBuf>,
    /// Warnings found while planning, such as dangling references.
    pub diagnostics: Vec<Diagnostic>,
}

/// A planned run: the files to write and what was noticed while planning.
#[derive(Debug, Clone)]
pub struct Planned {
    /// Resolved output folder.
    pub folder: PathBuf,
    /// Files relative to `folder`.
    pub plan: OutputPlan,
    /// Warnings found while planning.
    pub diagnostics: Vec<Diagnostic>,
}

/// Generates validator modules for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    dialect: &'static Dialect,
}

impl Generator {
    /// Generator for `dialect`.
    pub fn new(dialect: &'static Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect this generator emits.
    pub fn dialect(self) -> &'static Dialect {
        self.dialect
    }

    /// Build the run's registry from defaults and `config.config_file`.
    pub fn registry(self, config: &GenerateConfig) -> Result<CustomTypeRegistry, ConfigError> {
        let builder = CustomTypeRegistry::builder(self.dialect);
        let builder = match &config.config_file {
            Some(path) => builder.load_from_path(path)?,
            None => builder,
        };
        Ok(builder.build())
    }

    /// Render and lay out `dtos` without touching the filesystem.
    pub fn plan(
        self,
        dtos: &[Dto],
        registry: &CustomTypeRegistry,
        config: &GenerateConfig,
    ) -> Result<Planned> {
        let mut sorted: Vec<&Dto> = dtos.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        let duplicate = sorted.windows(2).find_map(|pair| match pair {
            [a, b] if a.name == b.name => Some(a.name.clone()),
            _ => None,
        });
        if let Some(name) = duplicate {
            return Err(GenerateError::DuplicateDto { name });
        }

        let renderer = Renderer::new(registry);
        let results: Vec<_> = sorted
            .par_iter()
            .map(|dto| {
                renderer
                    .render_dto(dto)
                    .map_err(|source| GenerateError::Render {
                        dto: dto.name.clone(),
                        source,
                    })
            })
            .collect();
        // First failure in name order, independent of thread scheduling.
        let rendered = results.into_iter().collect::<Result<Vec<_>>>()?;

        let diagnostics = dangling_references(&rendered);
        let package_name = config
            .package_name
            .as_deref()
            .unwrap_or(self.dialect.default_package_name);
        let plan = planner::plan_output(registry, &rendered, package_name)?;

        let folder = config
            .output_folder
            .clone()
            .unwrap_or_else(|| registry.output().folder.clone());

        debug!(
            dtos = rendered.len(),
            files = plan.files.len(),
            mode = %registry.output().mode,
            "Planned output."
        );

        Ok(Planned {
            folder,
            plan,
            diagnostics,
        })
    }

    /// Load config, render, and write all files. Config errors surface before
    /// any file is written. A failed write leaves earlier files in place.
    pub fn generate(self, dtos: &[Dto], config: &GenerateConfig) -> Result<GenerationReport> {
        let registry = self.registry(config)?;
        let Planned {
            folder,
            plan,
            diagnostics,
        } = self.plan(dtos, &registry, config)?;

        let mut report = write_plan(&folder, &plan)?;
        report.diagnostics = diagnostics;

        info!(
            dialect = self.dialect.language,
            folder = %folder.display(),
            written = report.written.len(),
            skipped = report.skipped.len(),
            "Generated schemas."
        );
        Ok(report)
    }
}

/// Write every planned file below `folder`, creating it first.
pub fn write_plan(folder: &Path, plan: &OutputPlan) -> Result<GenerationReport> {
    std::fs::create_dir_all(folder).map_err(|source| GenerateError::Io {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut report = GenerationReport::default();
    for file in &plan.files {
        let path = folder.join(&file.path);
        if file.policy == WritePolicy::CreateIfAbsent && path.exists() {
            info!(path = %path.display(), "File exists, leaving it untouched.");
            report.skipped.push(path);
            continue;
        }
        std::fs::write(&path, &file.contents).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = file.contents.len(), "Wrote file.");
        report.written.push(path);
    }
    Ok(report)
}

fn dangling_references(rendered: &[RenderedDto]) -> Vec<Diagnostic> {
    let names: BTreeSet<&str> = rendered.iter().map(|r| r.name.as_str()).collect();
    let mut diagnostics = Vec::new();
    for dto in rendered {
        for reference in dto.references.iter().filter(|r| !names.contains(r.as_str())) {
            warn!(dto = %dto.name, reference = %reference, "Reference to an undefined schema.");
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::DanglingReference,
                &dto.name,
                format!("reference to undefined schema '{reference}'"),
            ));
        }
    }
    diagnostics
}
