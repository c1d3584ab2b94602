use std::path::{Path, PathBuf};

use clap::Args;
use clap::builder::PossibleValuesParser;
use tracing::{debug, info};

use dtoforge_core::{
    Dialect, GenerateConfig, Generator, IO_TS, OpenApiDocument, Severity, save_example_config,
    walk_schemas,
};

const CONFIG_FILE_NAME: &str = "dtoforge.config.yaml";

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present = "example_config",
        help = "OpenAPI document (YAML or JSON)"
    )]
    pub openapi: Option<PathBuf>,
    #[arg(
        long,
        value_name = "DIR",
        help = "Output directory. Overrides output.folder from the config file"
    )]
    pub out: Option<PathBuf>,
    #[arg(
        long,
        default_value = IO_TS.language,
        value_parser = PossibleValuesParser::new(Dialect::available()),
        help = "Target dialect"
    )]
    pub lang: String,
    #[arg(long, value_name = "NAME", help = "Name written into package.json")]
    pub package: Option<String>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Config file. Defaults to dtoforge.config.yaml next to the working directory, the OpenAPI file or the executable"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = CONFIG_FILE_NAME,
        help = "Write a commented example config for the selected dialect and exit"
    )]
    pub example_config: Option<PathBuf>,
    #[arg(long, help = "Fail when the schema walk reports errors")]
    pub strict: bool,
}

pub fn run(args: GenerateArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_cli<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let dialect = Dialect::from_language(&args.lang)
        .ok_or_else(|| format!("unknown language '{}'", args.lang))?;

    if let Some(path) = &args.example_config {
        save_example_config(dialect, path).map_err(|e| e.to_string())?;
        println!("Wrote example config to {}", path.display());
        return Ok(());
    }

    let openapi = args
        .openapi
        .as_deref()
        .ok_or_else(|| "--openapi is required".to_string())?;
    let document = OpenApiDocument::load(openapi).map_err(|e| e.to_string())?;
    let walked = walk_schemas(document.schemas()).map_err(|e| e.to_string())?;

    for diagnostic in &walked.diagnostics {
        eprintln!("{diagnostic}");
    }
    let errors = walked
        .diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count();
    if args.strict && errors > 0 {
        return Err(format!(
            "{errors} schema error(s) in {}, nothing generated",
            openapi.display()
        ));
    }
    if walked.dtos.is_empty() {
        return Err(format!("No schemas found in {}", openapi.display()));
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config_file = discover_config(
        args.config.as_deref(),
        &cwd,
        openapi.parent(),
        exe_dir.as_deref(),
    );
    match &config_file {
        Some(path) => info!(path = %path.display(), "Using config file."),
        None => debug!("No config file found, using defaults."),
    }

    let config = GenerateConfig {
        config_file,
        output_folder: args.out.clone(),
        package_name: args.package.clone(),
    };
    let report = Generator::new(dialect)
        .generate(&walked.dtos, &config)
        .map_err(|e| e.to_string())?;

    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }
    for path in &report.skipped {
        println!("Kept existing {}", path.display());
    }
    println!(
        "Generated {} schema(s) into {} file(s) ({})",
        walked.dtos.len(),
        report.written.len(),
        dialect.language
    );
    Ok(())
}

/// Config lookup order: explicit path, then `dtoforge.config.yaml` in the
/// working directory, next to the OpenAPI file, and next to the executable.
/// An explicit path is returned even when it does not exist.
fn discover_config(
    explicit: Option<&Path>,
    cwd: &Path,
    openapi_dir: Option<&Path>,
    exe_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    [Some(cwd), openapi_dir, exe_dir]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}
