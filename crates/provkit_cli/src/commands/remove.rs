//! Remove command - Remove every node in a manifest.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{ConfirmHandle, FsNode, Manifest};

#[derive(Args)]
pub struct RemoveArgs {
    /// Manifest describing the nodes to remove
    pub manifest: PathBuf,
}

pub fn execute(args: RemoveArgs, confirm: ConfirmHandle) -> Result<()> {
    info!("Removing nodes from manifest: {:?}", args.manifest);

    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {:?}", args.manifest))?;
    let mut nodes = manifest
        .build(confirm)
        .context("Manifest contains an invalid node")?;

    // Files go before the directories that may contain them.
    let mut kept = 0;
    let files = nodes.files.iter_mut().rev().map(|f| f as &mut dyn FsNode);
    let dirs = nodes.dirs.iter_mut().rev().map(|d| d as &mut dyn FsNode);
    for node in files.chain(dirs) {
        if node
            .remove(true)
            .with_context(|| format!("Failed to remove {}", node))?
        {
            println!("🗑️  {}", node);
        } else {
            println!("⏭️  {} kept", node);
            kept += 1;
        }
    }

    if kept > 0 {
        bail!("{} node(s) were not removed", kept);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use provkit_files::{AssumeNo, AssumeYes};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn populated_manifest(root: &std::path::Path) -> PathBuf {
        fs::create_dir_all(root.join("site")).unwrap();
        fs::write(root.join("site/index.html"), "hello").unwrap();
        let manifest = root.join("hosts.yaml");
        let yaml = format!(
            "dirs:\n  - path: {0}/site\nfiles:\n  - path: {0}/site/index.html\n",
            root.to_str().unwrap()
        );
        fs::write(&manifest, yaml).unwrap();
        manifest
    }

    #[test]
    fn test_remove_deletes_files_then_dirs() {
        let temp = tempdir().unwrap();
        let manifest = populated_manifest(temp.path());

        execute(RemoveArgs { manifest }, Arc::new(AssumeYes)).unwrap();
        assert!(!temp.path().join("site").exists());
    }

    #[test]
    fn test_remove_declined_keeps_nodes() {
        let temp = tempdir().unwrap();
        let manifest = populated_manifest(temp.path());

        let err = execute(RemoveArgs { manifest }, Arc::new(AssumeNo)).unwrap_err();
        assert_eq!(err.to_string(), "2 node(s) were not removed");
        assert_eq!(
            fs::read_to_string(temp.path().join("site/index.html")).unwrap(),
            "hello"
        );
    }
}
