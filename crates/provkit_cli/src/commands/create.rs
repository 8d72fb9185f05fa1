//! Create command - Create every node in a manifest.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{ConfirmHandle, Manifest};

#[derive(Args)]
pub struct CreateArgs {
    /// Manifest describing the nodes to create
    pub manifest: PathBuf,
}

pub fn execute(args: CreateArgs, confirm: ConfirmHandle) -> Result<()> {
    info!("Creating nodes from manifest: {:?}", args.manifest);

    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {:?}", args.manifest))?;
    let mut nodes = manifest
        .build(confirm)
        .context("Manifest contains an invalid node")?;

    let mut failed = 0;
    for node in nodes.iter_mut() {
        if node
            .create()
            .with_context(|| format!("Failed to create {}", node))?
        {
            println!("✅ {}", node);
        } else {
            println!("❌ {}", node);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} nodes could not be created", failed, nodes.len());
    }
    Ok(())
}
