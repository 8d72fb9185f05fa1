//! Directory nodes.

use std::fmt;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::confirm::{default_handle, ConfirmHandle};
use crate::error::{FilesError, FilesResult};
use crate::node::{FsNode, Node, NodeAttrs};
use crate::path::{NodePath, PathKind};
use crate::principal::{system_handle, PrincipalsHandle};

/// A directory whose path always ends in '/'.
#[derive(Clone)]
pub struct Dir {
    node: Node,
    confirm: ConfirmHandle,
}

impl Dir {
    pub fn new(attrs: NodeAttrs) -> FilesResult<Self> {
        Self::with_principals(attrs, system_handle())
    }

    pub fn with_principals(attrs: NodeAttrs, principals: PrincipalsHandle) -> FilesResult<Self> {
        Ok(Self {
            node: Node::build(&attrs, PathKind::Dir, principals)?,
            confirm: default_handle(),
        })
    }

    /// A directory without a path.
    pub fn stub() -> Self {
        Self {
            node: Node::empty(PathKind::Dir, system_handle()),
            confirm: default_handle(),
        }
    }

    /// Use `confirm` before removing or overwriting anything.
    pub fn with_confirm(mut self, confirm: ConfirmHandle) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.node.path()
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    /// Merge-copy the contents of `source` into this directory.
    ///
    /// Subdirectories that already exist are merged into rather than replaced.
    /// Files that already exist are only overwritten when confirmed; a declined
    /// file is skipped without failing the fill.
    pub fn fill(&self, source: &Dir) -> FilesResult<bool> {
        let Some(dest) = self.path() else {
            return Ok(true);
        };
        if !self.exists() {
            error!("Copy failed, {} does not exist", dest);
            return Err(FilesError::SourceNotFound(dest.as_path().to_path_buf()));
        }
        let Some(src) = source.path().filter(|_| source.exists()) else {
            error!("Copy failed, {} does not exist", source);
            return Err(FilesError::SourceNotFound(PathBuf::from(source.to_string())));
        };

        info!("Filling {} with contents of {}", dest, src);
        let mut complete = true;

        for entry in WalkDir::new(src.as_path()).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Failed to read from {}: {}", src, e);
                    complete = false;
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(src.as_path()) else {
                continue;
            };
            let target = dest.as_path().join(relative);

            let result = if entry.file_type().is_dir() {
                if target.is_dir() {
                    debug!("Merging into existing {}", target.display());
                    continue;
                }
                fs::create_dir(&target)
            } else {
                if target.symlink_metadata().is_ok()
                    && !self.confirm_replace(&target, entry.path())
                {
                    info!("Skipping {}", target.display());
                    continue;
                }
                replace_entry(entry.path(), &target, entry.path_is_symlink())
            };

            if let Err(e) = result {
                error!(
                    "Failed to copy {} to {}: {}",
                    entry.path().display(),
                    target.display(),
                    e
                );
                complete = false;
            }
        }

        if complete {
            info!("Copy complete");
        } else {
            error!("Copy of {} into {} was incomplete", src, dest);
        }
        Ok(complete)
    }

    fn confirm_replace(&self, target: &Path, source: &Path) -> bool {
        let question = format!(
            "{} already exists. Replace with {}?",
            target.display(),
            source.display()
        );
        self.confirm.confirm(&question, true)
    }

    pub(crate) fn from_node(node: Node, confirm: ConfirmHandle) -> Self {
        Self { node, confirm }
    }
}

fn replace_entry(source: &Path, target: &Path, is_symlink: bool) -> std::io::Result<()> {
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target)?;
    }
    if is_symlink {
        symlink(fs::read_link(source)?, target)
    } else {
        fs::copy(source, target).map(|_| ())
    }
}

impl FsNode for Dir {
    fn node(&self) -> &Node {
        &self.node
    }

    /// Create the directory and any missing parents, then apply perms and
    /// ownership. An existing directory is left untouched.
    fn create(&mut self) -> FilesResult<bool> {
        let Some(path) = self.node.path() else {
            return Ok(true);
        };
        if path.as_path().exists() {
            info!("{} already exists", path);
            return Ok(true);
        }

        info!("Creating directories {}", path);
        if let Err(e) = fs::create_dir_all(path.as_path()) {
            error!("Failed to create directories {}: {}", path, e);
            return Ok(false);
        }
        let mode_applied = self.chmod(None)?;
        let owner_applied = self.chown(None, None)?;
        Ok(mode_applied && owner_applied)
    }

    /// Recursively remove the directory and everything in it.
    fn remove(&mut self, ask: bool) -> FilesResult<bool> {
        let Some(path) = self.node.path() else {
            return Ok(true);
        };
        if !path.as_path().exists() {
            info!("{} doesn't exist", path);
            return Ok(true);
        }
        let question = format!(
            "Completely remove {} and all containing files and folders?",
            path
        );
        if ask && !self.confirm.confirm(&question, true) {
            info!("Keeping {}", path);
            return Ok(false);
        }

        info!("Removing {}", path);
        match fs::remove_dir_all(path.as_path()) {
            Ok(()) => Ok(true),
            Err(e) => {
                error!("Failed to remove {}: {}", path, e);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path),
            None => f.write_str("<dir:stub>"),
        }
    }
}

impl fmt::Debug for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dir").field("node", &self.node).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Arc;

    use mockall::predicate::{always, eq};
    use tempfile::tempdir;

    use super::*;
    use crate::confirm::{AssumeNo, AssumeYes, MockConfirm};

    fn dir_at(path: &Path) -> Dir {
        Dir::new(NodeAttrs::new(path.to_str().unwrap())).unwrap()
    }

    #[test]
    fn test_dir_initialization() {
        assert_eq!(Dir::new(NodeAttrs::default()).unwrap().to_string(), "<dir:stub>");
        assert_eq!(
            Dir::new(NodeAttrs::new("/this/path")).unwrap().to_string(),
            "/this/path/"
        );
        assert_eq!(
            Dir::new(NodeAttrs::new("/this//path//")).unwrap().to_string(),
            "/this/path/"
        );
    }

    #[test]
    fn test_stub_dir_is_noop() {
        let mut dir = Dir::stub();
        assert!(!dir.exists());
        assert!(dir.create().unwrap());
        assert!(dir.remove(false).unwrap());
        assert!(dir.verify(true).unwrap());
        assert!(dir.fill(&Dir::stub()).unwrap());
    }

    #[test]
    fn test_create_nested_with_perms() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("a/b/c");
        let mut dir =
            Dir::new(NodeAttrs::new(target.to_str().unwrap()).perms(0o750)).unwrap();

        assert!(dir.create().unwrap());
        assert!(target.is_dir());
        assert_eq!(
            fs::metadata(&target).unwrap().permissions().mode() & 0o777,
            0o750
        );
        assert!(dir.verify(false).unwrap());
        // Existing directories are a no-op success
        assert!(dir.create().unwrap());
    }

    #[test]
    fn test_repair_creates_missing_dir() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("site");
        let mut dir =
            Dir::new(NodeAttrs::new(target.to_str().unwrap()).perms(0o711)).unwrap();

        assert!(!dir.verify(false).unwrap());
        assert!(dir.repair().unwrap());
        assert!(dir.exists());
        assert_eq!(dir.node().actual_perms(), Some(0o711));
    }

    #[test]
    fn test_remove_asks_before_deleting() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doomed");
        fs::create_dir_all(target.join("inner")).unwrap();

        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .with(always(), eq(true))
            .times(1)
            .returning(|_, _| false);
        let mut dir = dir_at(&target).with_confirm(Arc::new(confirm));

        assert!(!dir.remove(true).unwrap());
        assert!(target.exists());

        assert!(dir.remove(false).unwrap());
        assert!(!target.exists());
        // Already absent
        assert!(dir.remove(true).unwrap());
    }

    #[test]
    fn test_fill_merges_into_existing_tree() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        fs::create_dir_all(source.join("conf/extra")).unwrap();
        fs::write(source.join("conf/site.conf"), "new").unwrap();
        fs::write(source.join("conf/extra/mime.types"), "types").unwrap();
        fs::write(source.join("index.html"), "<html/>").unwrap();
        fs::create_dir_all(dest.join("conf")).unwrap();
        fs::write(dest.join("conf/keep.conf"), "keep").unwrap();

        let dir = dir_at(&dest).with_confirm(Arc::new(AssumeYes));
        assert!(dir.fill(&dir_at(&source)).unwrap());

        assert_eq!(fs::read_to_string(dest.join("conf/site.conf")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest.join("conf/keep.conf")).unwrap(), "keep");
        assert_eq!(
            fs::read_to_string(dest.join("conf/extra/mime.types")).unwrap(),
            "types"
        );
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "<html/>");
    }

    #[test]
    fn test_fill_skips_declined_overwrites() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(source.join("a.txt"), "from source").unwrap();
        fs::write(source.join("b.txt"), "fresh").unwrap();
        fs::write(dest.join("a.txt"), "original").unwrap();

        let dir = dir_at(&dest).with_confirm(Arc::new(AssumeNo));
        assert!(dir.fill(&dir_at(&source)).unwrap());

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "original");
        assert_eq!(fs::read_to_string(dest.join("b.txt")).unwrap(), "fresh");
    }

    #[test]
    fn test_fill_asks_once_per_existing_file() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(source.join("a.txt"), "new").unwrap();
        fs::write(dest.join("a.txt"), "old").unwrap();

        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().times(1).returning(|_, _| true);
        let dir = dir_at(&dest).with_confirm(Arc::new(confirm));

        assert!(dir.fill(&dir_at(&source)).unwrap());
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_fill_requires_both_sides() {
        let temp = tempdir().unwrap();
        let existing = dir_at(temp.path());
        let missing = dir_at(&temp.path().join("missing"));

        assert!(matches!(
            existing.fill(&missing),
            Err(FilesError::SourceNotFound(_))
        ));
        assert!(matches!(
            missing.fill(&existing),
            Err(FilesError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_create_under_regular_file_reports_failure() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut dir = dir_at(&blocker.join("site"));
        assert!(!dir.create().unwrap());
        assert!(!dir.exists());
    }
}
