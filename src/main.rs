//! squashfs-extract CLI - extract a squashfs filesystem image
//!
//! Mounts the image, mirrors the tree into the destination directory, and
//! reports progress to a file or stdout. Exit code 0 only when mount,
//! copy, and unmount all succeeded.

use clap::error::ErrorKind;
use clap::Parser;
use squashfs_extract::config::{CliArgs, ExtractConfig};
use squashfs_extract::core::ExtractEngine;
use squashfs_extract::error::Result;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help/--version are not failures; bad arguments are.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr; stdout stays clean for the progress sink.
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &CliArgs) -> Result<()> {
    let config = ExtractConfig::from_cli(args);

    // Reject bad images before any filesystem mutation.
    config.validate()?;

    let mut engine = ExtractEngine::new(config);
    let report = engine.execute()?;

    if args.verbose > 0 {
        report.print_summary();
    }

    Ok(())
}
