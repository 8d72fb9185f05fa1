//! provkit CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Verification failure
//! - 4: Content or section error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use provkit_files::FilesError;

mod commands;

use commands::{Cli, Commands, VerificationFailed};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VERIFICATION_FAILURE: u8 = 3;
    pub const CONTENT_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let confirm = commands::confirm_handle(cli.yes);
    let result = match cli.command {
        Commands::Verify(args) => commands::verify::execute(args, confirm),
        Commands::Create(args) => commands::create::execute(args, confirm),
        Commands::Remove(args) => commands::remove::execute(args, confirm),
        Commands::Fill(args) => commands::fill::execute(args, confirm),
        Commands::ApplySection(args) => commands::section::execute(args),
        Commands::Render(args) => commands::render::execute(args, confirm),
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Password(args) => commands::password::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_directives = if cli.verbose {
        "provkit=debug,warn"
    } else if cli.quiet {
        "error"
    } else {
        "provkit=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(filter);
    let log_result = if cli.log_json {
        registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<VerificationFailed>().is_some() {
        return ExitCodes::VERIFICATION_FAILURE;
    }

    match e.chain().find_map(|cause| cause.downcast_ref::<FilesError>()) {
        Some(
            FilesError::MalformedSection(_)
            | FilesError::AlteredSection(_)
            | FilesError::DuplicateAttribute(_)
            | FilesError::UnknownAttribute(_)
            | FilesError::InvalidPattern { .. }
            | FilesError::NoData(_),
        ) => ExitCodes::CONTENT_ERROR,
        Some(
            FilesError::InvalidPath { .. }
            | FilesError::InvalidPermission(_)
            | FilesError::UnknownPrincipal { .. }
            | FilesError::PathNotFound(_)
            | FilesError::SourceNotFound(_)
            | FilesError::Yaml(_),
        ) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
