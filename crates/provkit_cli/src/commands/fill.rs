//! Fill command - Merge-copy one directory into another.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{ConfirmHandle, Dir};

use super::path_attrs;

#[derive(Args)]
pub struct FillArgs {
    /// Directory to fill
    pub dest: PathBuf,

    /// Directory whose contents are copied
    pub source: PathBuf,
}

pub fn execute(args: FillArgs, confirm: ConfirmHandle) -> Result<()> {
    info!("Filling {:?} from {:?}", args.dest, args.source);

    let dest = Dir::new(path_attrs(&args.dest)?)
        .context("Invalid destination directory")?
        .with_confirm(confirm);
    let source = Dir::new(path_attrs(&args.source)?).context("Invalid source directory")?;

    if !dest.fill(&source)? {
        bail!("Some entries of {} could not be copied into {}", source, dest);
    }
    println!("✅ Filled {} from {}", dest, source);
    Ok(())
}
