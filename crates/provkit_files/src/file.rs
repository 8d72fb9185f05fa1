//! File nodes with an in-memory content cache.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use tracing::{debug, error, info};

use crate::confirm::{default_handle, ConfirmHandle};
use crate::dir::Dir;
use crate::error::{FilesError, FilesResult};
use crate::node::{FsNode, Node, NodeAttrs};
use crate::path::{NodePath, PathKind};
use crate::principal::{system_handle, PrincipalsHandle};

/// A file whose path never ends in '/'.
///
/// `data` caches content in memory. It stays empty until the first `read` or
/// an explicit assignment, and is only persisted by `write`, `append`,
/// `overwrite` or `create`.
#[derive(Clone)]
pub struct File {
    node: Node,
    data: Option<String>,
    confirm: ConfirmHandle,
}

impl File {
    pub fn new(attrs: NodeAttrs) -> FilesResult<Self> {
        Self::with_principals(attrs, system_handle())
    }

    pub fn with_principals(attrs: NodeAttrs, principals: PrincipalsHandle) -> FilesResult<Self> {
        Ok(Self {
            node: Node::build(&attrs, PathKind::File, principals)?,
            data: None,
            confirm: default_handle(),
        })
    }

    /// A file without a path.
    pub fn stub() -> Self {
        Self {
            node: Node::empty(PathKind::File, system_handle()),
            data: None,
            confirm: default_handle(),
        }
    }

    /// Use `confirm` before removing or replacing anything.
    pub fn with_confirm(mut self, confirm: ConfirmHandle) -> Self {
        self.confirm = confirm;
        self
    }

    /// Seed the in-memory cache without touching the disk.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.node.path()
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    /// The cached content, if any.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = Some(data.into());
    }

    /// A directory view of this file's parent, carrying the same perms and
    /// ownership requirements.
    pub fn parent_dir(&self) -> FilesResult<Dir> {
        let mut attrs = self.node.attrs();
        attrs.path = self.node.parent_dirs();
        let node = Node::build(&attrs, PathKind::Dir, self.node.principals().clone())?;
        Ok(Dir::from_node(node, self.confirm.clone()))
    }

    /// Return the content, loading it from disk when nothing is cached or
    /// `force_reload` is set. A missing file reads as empty.
    pub fn read(&mut self, force_reload: bool) -> FilesResult<String> {
        if let Some(data) = &self.data {
            if !force_reload {
                return Ok(data.clone());
            }
        }
        let Some(path) = self.node.path() else {
            return Ok(self.data.clone().unwrap_or_default());
        };

        let content = match fs::read_to_string(path.as_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist, reading as empty", path);
                String::new()
            }
            Err(e) => return Err(e.into()),
        };
        self.data = Some(content.clone());
        Ok(content)
    }

    /// The content split into lines.
    pub fn readlines(&mut self) -> FilesResult<Vec<String>> {
        Ok(self.read(false)?.lines().map(str::to_string).collect())
    }

    /// Write `data`, or the cached content when `data` is `None`.
    ///
    /// With a caller-supplied `handle` the content goes to that handle and
    /// its errors are returned to the caller; the cached-content fallback is
    /// not available in that mode. Without a handle the file is opened in
    /// append or truncate mode and OS failures are reported as `Ok(false)`.
    /// The cache always holds the written value afterwards.
    pub fn write(
        &mut self,
        data: Option<&str>,
        append: bool,
        handle: Option<&mut dyn Write>,
    ) -> FilesResult<bool> {
        if let Some(handle) = handle {
            let data = data.ok_or_else(|| FilesError::NoData(self.to_string()))?;
            self.data = Some(data.to_string());
            handle.write_all(data.as_bytes())?;
            return Ok(true);
        }

        let data = match data {
            Some(data) => data.to_string(),
            None => self
                .data
                .clone()
                .ok_or_else(|| FilesError::NoData(self.to_string()))?,
        };
        self.data = Some(data.clone());

        let Some(path) = self.node.path() else {
            return Ok(true);
        };
        let opened = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path.as_path());

        match opened.and_then(|mut file| file.write_all(data.as_bytes())) {
            Ok(()) => {
                debug!("Wrote {} bytes to {}", data.len(), path);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to write {}: {}", path, e);
                Ok(false)
            }
        }
    }

    pub fn append(
        &mut self,
        data: Option<&str>,
        handle: Option<&mut dyn Write>,
    ) -> FilesResult<bool> {
        self.write(data, true, handle)
    }

    pub fn overwrite(
        &mut self,
        data: Option<&str>,
        handle: Option<&mut dyn Write>,
    ) -> FilesResult<bool> {
        self.write(data, false, handle)
    }

    /// Create the file with `data` (or the cached content, or nothing),
    /// creating its parent directory first, then apply perms and ownership.
    ///
    /// An existing file is only replaced when confirmed; declining returns
    /// `Ok(false)`.
    pub fn create_with(&mut self, data: Option<&str>) -> FilesResult<bool> {
        let Some(path) = self.node.path().cloned() else {
            return Ok(true);
        };
        if path.as_path().exists() {
            info!("{} already exists", path);
            if !self.confirm.confirm(&format!("Replace {}?", path), false) {
                return Ok(false);
            }
        }

        info!("Creating {}", path);
        let parent = path.parent_dirs();
        if !fs::metadata(&parent).is_ok_and(|m| m.is_dir()) {
            if let Err(e) = fs::create_dir_all(&parent) {
                error!("Failed to create parent directories {}: {}", parent, e);
                return Ok(false);
            }
        }

        let content = data
            .map(str::to_string)
            .or_else(|| self.data.clone())
            .unwrap_or_default();
        if !self.write(Some(&content), false, None)? {
            return Ok(false);
        }

        let mode_applied = self.chmod(None)?;
        let owner_applied = self.chown(None, None)?;
        Ok(mode_applied && owner_applied)
    }
}

impl FsNode for File {
    fn node(&self) -> &Node {
        &self.node
    }

    fn create(&mut self) -> FilesResult<bool> {
        self.create_with(None)
    }

    fn remove(&mut self, ask: bool) -> FilesResult<bool> {
        let Some(path) = self.node.path() else {
            return Ok(true);
        };
        if fs::symlink_metadata(path.as_path()).is_err() {
            info!("{} doesn't exist", path);
            return Ok(true);
        }
        if ask && !self.confirm.confirm(&format!("Remove {}?", path), true) {
            info!("Keeping {}", path);
            return Ok(false);
        }

        info!("Removing {}", path);
        match fs::remove_file(path.as_path()) {
            Ok(()) => Ok(true),
            Err(e) => {
                error!("Failed to remove {}: {}", path, e);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path),
            None => f.write_str("<file:stub>"),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("node", &self.node)
            .field("cached", &self.data.is_some())
            .finish_non_exhaustive()
    }
}
