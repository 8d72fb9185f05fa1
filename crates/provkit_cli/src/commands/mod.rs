//! CLI command definitions.
//!
//! Each subcommand wraps one provkit_files or provkit_input operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use provkit_files::{AssumeYes, ConfirmHandle, NodeAttrs};
use provkit_input::Terminal;

pub mod create;
pub mod fill;
pub mod parse;
pub mod password;
pub mod remove;
pub mod render;
pub mod section;
pub mod verify;

/// provkit - provisioning helpers for files, directories and config text
#[derive(Parser)]
#[command(name = "provkit")]
#[command(version, about = "provkit - provisioning helpers for files, directories and config text")]
#[command(long_about = r#"
provkit reconciles files and directories against a YAML manifest and edits
configuration text in place.

COMMANDS:
  verify        → Check (and optionally repair) nodes listed in a manifest
  create        → Create every node in a manifest
  remove        → Remove every node in a manifest
  fill          → Merge-copy one directory into another
  apply-section → Insert a delimited section into a config file
  render        → Substitute placeholders in a template
  parse         → Read or rewrite regex-defined fields in a file
  password      → Generate a random password

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Verification failure
  4 - Content or section error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify nodes in a manifest
    Verify(verify::VerifyArgs),

    /// Create nodes in a manifest
    Create(create::CreateArgs),

    /// Remove nodes in a manifest
    Remove(remove::RemoveArgs),

    /// Merge-copy a directory into another
    Fill(fill::FillArgs),

    /// Apply a section file to a target file
    #[command(name = "apply-section")]
    ApplySection(section::ApplySectionArgs),

    /// Render a template
    Render(render::RenderArgs),

    /// Read or rewrite fields in a file
    Parse(parse::ParseArgs),

    /// Generate a password
    Password(password::PasswordArgs),
}

/// Raised when nodes fail verification.
#[derive(Debug, thiserror::Error)]
#[error("{failed} node(s) failed verification")]
pub struct VerificationFailed {
    pub failed: usize,
}

/// Confirmation strategy for destructive actions.
pub fn confirm_handle(yes: bool) -> ConfirmHandle {
    if yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(Terminal::new())
    }
}

/// Node attributes for a command-line path, resolved against the working
/// directory.
pub fn path_attrs(path: &Path) -> Result<NodeAttrs> {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let text = absolute
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {:?}", absolute))?;
    Ok(NodeAttrs::new(text))
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", raw)),
    }
}
