//! Output planning: file layout, import blocks, ordering, index and manifest.
//!
//! Planning is pure. It turns rendered DTOs into a list of files with their
//! full contents; nothing touches the filesystem until the plan is written.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde_json::json;

use super::render::RenderedDto;
use crate::config::OutputMode;
use crate::error::GenerateError;
use crate::ir::utils::to_kebab_case;
use crate::registry::CustomTypeRegistry;

const HEADER: &str = "// Generated by dtoforge. Do not edit by hand.\n";
const INDEX_STEM: &str = "index";
const MANIFEST: &str = "package.json";

/// What to do when a planned file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Replace any existing file.
    Overwrite,
    /// Leave an existing file untouched.
    CreateIfAbsent,
}

/// One file of an output plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Path relative to the output folder.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
    /// Behaviour when the file exists.
    pub policy: WritePolicy,
}

/// Every file a run produces, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPlan {
    /// Planned files.
    pub files: Vec<PlannedFile>,
}

impl OutputPlan {
    /// Planned file at `path`, relative to the output folder.
    pub fn file(&self, path: &str) -> Option<&PlannedFile> {
        self.files.iter().find(|f| f.path == PathBuf::from(path))
    }
}

/// Lay out rendered DTOs. `rendered` must be sorted by name with unique names.
pub fn plan_output(
    registry: &CustomTypeRegistry,
    rendered: &[RenderedDto],
    package_name: &str,
) -> Result<OutputPlan, GenerateError> {
    let mut files = match registry.output().mode {
        OutputMode::Multiple => plan_multiple(registry, rendered)?,
        OutputMode::Single => vec![plan_single(registry, rendered)],
    };

    if registry.generation().generate_package_json {
        files.push(PlannedFile {
            path: PathBuf::from(MANIFEST),
            contents: manifest(registry, package_name),
            policy: WritePolicy::CreateIfAbsent,
        });
    }

    Ok(OutputPlan { files })
}

fn plan_multiple(
    registry: &CustomTypeRegistry,
    rendered: &[RenderedDto],
) -> Result<Vec<PlannedFile>, GenerateError> {
    let dialect = registry.dialect();
    let names: BTreeSet<&str> = rendered.iter().map(|r| r.name.as_str()).collect();

    let mut stems: BTreeMap<String, &str> = BTreeMap::new();
    for dto in rendered {
        let stem = to_kebab_case(&dto.name);
        if stem == INDEX_STEM {
            return Err(GenerateError::FileNameCollision {
                file: format!("{stem}{}", dialect.file_extension),
                first: dto.name.clone(),
                second: "the index file".to_string(),
            });
        }
        if let Some(first) = stems.insert(stem.clone(), &dto.name) {
            return Err(GenerateError::FileNameCollision {
                file: format!("{stem}{}", dialect.file_extension),
                first: first.to_string(),
                second: dto.name.clone(),
            });
        }
    }

    let mut files = Vec::with_capacity(rendered.len() + 1);
    for dto in rendered {
        let mut contents = String::from(HEADER);
        for import in registry.resolve_imports(dto.formats.iter().map(String::as_str)) {
            contents.push_str(&import);
            contents.push('\n');
        }
        for reference in dto.references.iter().filter(|r| names.contains(r.as_str())) {
            contents.push_str(&format!(
                "import {{ {} }} from './{}';\n",
                dialect.symbol(reference),
                to_kebab_case(reference)
            ));
        }
        contents.push('\n');
        contents.push_str(&dto.source);

        files.push(PlannedFile {
            path: PathBuf::from(format!("{}{}", to_kebab_case(&dto.name), dialect.file_extension)),
            contents,
            policy: WritePolicy::Overwrite,
        });
    }

    files.push(PlannedFile {
        path: PathBuf::from(format!("{INDEX_STEM}{}", dialect.file_extension)),
        contents: index(registry, rendered),
        policy: WritePolicy::Overwrite,
    });

    Ok(files)
}

fn index(registry: &CustomTypeRegistry, rendered: &[RenderedDto]) -> String {
    let dialect = registry.dialect();
    let helpers = registry.generation().generate_helpers;

    let mut contents = String::from(HEADER);
    if helpers {
        contents.push_str(dialect.base_import);
        contents.push_str("\n\n");
    }
    for dto in rendered {
        contents.push_str(&format!("export * from './{}';\n", to_kebab_case(&dto.name)));
    }
    if helpers {
        contents.push('\n');
        contents.push_str(dialect.helpers);
    }
    contents
}

fn plan_single(registry: &CustomTypeRegistry, rendered: &[RenderedDto]) -> PlannedFile {
    let formats: BTreeSet<&str> = rendered
        .iter()
        .flat_map(|dto| dto.formats.iter().map(String::as_str))
        .collect();

    let mut contents = String::from(HEADER);
    for import in registry.resolve_imports(formats) {
        contents.push_str(&import);
        contents.push('\n');
    }
    for dto in dependency_order(rendered) {
        contents.push('\n');
        contents.push_str(&dto.source);
    }
    if registry.generation().generate_helpers {
        contents.push('\n');
        contents.push_str(registry.dialect().helpers);
    }

    PlannedFile {
        path: PathBuf::from(&registry.output().single_file_name),
        contents,
        policy: WritePolicy::Overwrite,
    }
}

/// Referenced DTOs before the DTOs that use them, ties broken by name.
/// DTOs on a reference cycle keep name order after everything else.
pub fn dependency_order(rendered: &[RenderedDto]) -> Vec<&RenderedDto> {
    let by_name: BTreeMap<&str, &RenderedDto> =
        rendered.iter().map(|dto| (dto.name.as_str(), dto)).collect();

    let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for dto in rendered {
        let deps: Vec<&str> = dto
            .references
            .iter()
            .map(String::as_str)
            .filter(|r| by_name.contains_key(r))
            .collect();
        pending.insert(&dto.name, deps.len());
        for dep in deps {
            dependents.entry(dep).or_default().push(&dto.name);
        }
    }

    let mut ready: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut ordered = Vec::with_capacity(rendered.len());

    while let Some(name) = ready.pop_first() {
        pending.remove(name);
        if let Some(dto) = by_name.get(name) {
            ordered.push(*dto);
        }
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    ordered.extend(pending.keys().filter_map(|name| by_name.get(name).copied()));
    ordered
}

fn manifest(registry: &CustomTypeRegistry, package_name: &str) -> String {
    let dialect = registry.dialect();
    let entry = match registry.output().mode {
        OutputMode::Multiple => format!("{INDEX_STEM}{}", dialect.file_extension),
        OutputMode::Single => registry.output().single_file_name.clone(),
    };
    let dependencies: serde_json::Map<String, serde_json::Value> = dialect
        .dependencies
        .iter()
        .map(|(name, version)| ((*name).to_string(), json!(version)))
        .collect();

    let manifest = json!({
        "name": package_name,
        "version": "1.0.0",
        "description": dialect.package_description,
        "main": entry,
        "types": entry,
        "dependencies": dependencies,
    });
    // A `Value` built from `json!` always serializes.
    let mut text = serde_json::to_string_pretty(&manifest).unwrap_or_default();
    text.push('\n');
    text
}
