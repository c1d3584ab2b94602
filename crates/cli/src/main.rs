//! dtoforge: generate runtime-validated TypeScript from OpenAPI schemas.

mod generate;
mod logging;

use clap::Parser;

use crate::generate::GenerateArgs;

#[derive(Parser, Debug)]
#[command(
    name = "dtoforge",
    version,
    about = "Generate io-ts or Zod validators from OpenAPI component schemas"
)]
struct Cli {
    #[command(flatten)]
    generate: GenerateArgs,
}

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();
    std::process::exit(generate::run(cli.generate));
}
