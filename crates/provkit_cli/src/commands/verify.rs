//! Verify command - Check manifest nodes against the filesystem.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use provkit_files::{ConfirmHandle, FsNode, Manifest};

use super::VerificationFailed;

#[derive(Args)]
pub struct VerifyArgs {
    /// Manifest describing the desired nodes
    pub manifest: PathBuf,

    /// Repair mismatches instead of only reporting them
    #[arg(long)]
    pub repair: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome for a single node.
#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub path: String,
    pub kind: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<String>,
}

pub fn execute(args: VerifyArgs, confirm: ConfirmHandle) -> Result<()> {
    info!("Verifying manifest: {:?}", args.manifest);

    let reports = run(&args, confirm)?;
    let failed = reports.iter().filter(|r| !r.ok).count();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            match &report.mismatch {
                None if report.ok => println!("✅ {} {}", report.kind, report.path),
                Some(mismatch) => println!("❌ {} {} ({})", report.kind, report.path, mismatch),
                None => println!("❌ {} {}", report.kind, report.path),
            }
        }
        println!();
    }

    if failed > 0 {
        return Err(VerificationFailed { failed }.into());
    }
    if !args.json {
        println!("✅ All {} nodes verified", reports.len());
    }
    Ok(())
}

pub fn run(args: &VerifyArgs, confirm: ConfirmHandle) -> Result<Vec<NodeReport>> {
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {:?}", args.manifest))?;
    let mut nodes = manifest
        .build(confirm)
        .context("Manifest contains an invalid node")?;

    let mut reports = Vec::with_capacity(nodes.len());
    for dir in &mut nodes.dirs {
        reports.push(check(dir, "dir", args.repair)?);
    }
    for file in &mut nodes.files {
        reports.push(check(file, "file", args.repair)?);
    }
    Ok(reports)
}

fn check(node: &mut dyn FsNode, kind: &'static str, repair: bool) -> Result<NodeReport> {
    let ok = node
        .verify(repair)
        .with_context(|| format!("Failed to verify {}", node))?;
    Ok(NodeReport {
        path: node.to_string(),
        kind,
        ok,
        mismatch: node.node().inspect().map(|m| m.to_string()),
    })
}
