//! APIView CLI
//!
//! Usage: apiview-cli <INPUT_LIBRARY> <OUTPUT_DOCUMENT>

use std::path::PathBuf;

use apiview_core::errors::{ApiViewError, ExError, Result};
use apiview_core::logging_facility::init_with_filter;
use apiview_core::Config;
use apiview_core_types::RequestId;
use clap::error::ErrorKind;
use clap::Parser;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "apiview-cli")]
#[command(about = "Generate the canonical API surface document of a library", long_about = None)]
struct Cli {
    /// Input library metadata, then output document path
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,
}

fn parse_args() -> Result<commands::generate::GenerateArgs> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            return Err(ApiViewError::Argument {
                reason: e.kind().as_str().unwrap_or("invalid arguments").to_string(),
            })
        }
    };

    let count = cli.paths.len();
    let mut paths = cli.paths.into_iter();
    match (paths.next(), paths.next(), count) {
        (Some(input), Some(output), 2) => Ok(commands::generate::GenerateArgs { input, output }),
        _ => Err(ApiViewError::Argument {
            reason: format!(
                "expected <input-library-path> <output-document-path>, got {} argument(s)",
                count
            ),
        }),
    }
}

fn run(request_id: &RequestId) -> Result<()> {
    let args = parse_args()?;

    let config = Config::load()?;
    init_with_filter(config.logging.profile, &config.logging.filter);

    let span = tracing::info_span!("apiview", request_id = %request_id);
    let _guard = span.enter();
    commands::generate::execute(args)
}

fn main() {
    let request_id = RequestId::new();

    if let Err(e) = run(&request_id) {
        let report = ExError::from(e).with_request_id(request_id);
        eprintln!("Error: {}", report);
        std::process::exit(1);
    }
}
