//! Apply-section command - Insert a delimited section into a file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{File, Section};

use super::path_attrs;

#[derive(Args)]
pub struct ApplySectionArgs {
    /// File holding the section, first and last lines are its markers
    pub section: PathBuf,

    /// File the section is applied to
    pub target: PathBuf,

    /// Replace a section whose content was changed in the target
    #[arg(long)]
    pub overwrite: bool,
}

pub fn execute(args: ApplySectionArgs) -> Result<()> {
    info!("Applying section {:?} to {:?}", args.section, args.target);

    let mut section = Section::new(
        File::new(path_attrs(&args.section)?).context("Invalid section file")?,
    );
    let mut target = File::new(path_attrs(&args.target)?).context("Invalid target file")?;

    let current = target.read(false)?;
    let updated = section
        .apply_to(&current, args.overwrite)
        .with_context(|| format!("Cannot apply section to {}", target))?;

    if updated == current {
        println!("✅ Section already applied to {}", target);
        return Ok(());
    }
    if !target.overwrite(Some(&updated), None)? {
        bail!("Failed to write {}", target);
    }
    println!("✅ Section applied to {}", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use provkit_files::FilesError;
    use std::fs;
    use tempfile::tempdir;

    const SECTION: &str = "# BEGIN Rewrite\nRewriteEngine On\n# END Rewrite\n";

    #[test]
    fn test_apply_section_is_idempotent() {
        let temp = tempdir().unwrap();
        let section = temp.path().join("rewrite.section");
        let target = temp.path().join("htaccess");
        fs::write(&section, SECTION).unwrap();
        fs::write(&target, "Options -Indexes").unwrap();

        for _ in 0..2 {
            let args = ApplySectionArgs {
                section: section.clone(),
                target: target.clone(),
                overwrite: false,
            };
            execute(args).unwrap();
        }
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            format!("Options -Indexes\n{}", SECTION)
        );
    }

    #[test]
    fn test_altered_section_needs_overwrite() {
        let temp = tempdir().unwrap();
        let section = temp.path().join("rewrite.section");
        let target = temp.path().join("htaccess");
        fs::write(&section, SECTION).unwrap();
        fs::write(&target, "# BEGIN Rewrite\nRewriteEngine Off\n# END Rewrite\n").unwrap();

        let args = |overwrite| ApplySectionArgs {
            section: section.clone(),
            target: target.clone(),
            overwrite,
        };
        let err = execute(args(false)).unwrap_err();
        assert!(matches!(
            err.chain().find_map(|cause| cause.downcast_ref::<FilesError>()),
            Some(FilesError::AlteredSection(_))
        ));

        execute(args(true)).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), SECTION);
    }
}
