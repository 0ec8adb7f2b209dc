//! Generate command
//!
//! Builds the surface document of one library and writes it atomically.
//! Nothing is written unless every step succeeds.

use std::path::PathBuf;

use apiview_core::errors::{ApiViewError, Result};
use apiview_core::{log_op_end, log_op_error, log_op_start, SurfaceBuilder};
use apiview_store::atomic::parent_dir;
use apiview_store::{write_document, LibraryLoader};

#[derive(Debug)]
pub struct GenerateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Check both paths before doing any work
fn validate(args: &GenerateArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ApiViewError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }
    if !parent_dir(&args.output).is_dir() {
        return Err(ApiViewError::DirectoryNotFound {
            path: args.output.display().to_string(),
        });
    }
    Ok(())
}

/// Execute generate command
///
/// # Errors
///
/// Returns the first boundary, analysis or write failure.
pub fn execute(args: GenerateArgs) -> Result<()> {
    let input = args.input.display().to_string();
    log_op_start!("generate", path = %input);
    let start = std::time::Instant::now();

    let digest = execute_impl(&args).map_err(|e| {
        log_op_error!(
            "generate",
            e,
            duration_ms = start.elapsed().as_millis() as u64,
            path = %input
        );
        e
    })?;

    log_op_end!(
        "generate",
        duration_ms = start.elapsed().as_millis() as u64,
        path = %input,
        digest = %digest
    );
    println!("✓ Wrote {}", args.output.display());
    Ok(())
}

fn execute_impl(args: &GenerateArgs) -> Result<String> {
    validate(args)?;

    let loader = LibraryLoader::new();
    let library = loader.load(&args.input)?;
    let file = SurfaceBuilder::new().build(library.as_ref())?;
    write_document(&args.output, &file)
}
