//! YAML manifests describing the directories and files a host should have.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::confirm::ConfirmHandle;
use crate::dir::Dir;
use crate::error::FilesResult;
use crate::file::File;
use crate::node::{FsNode, NodeAttrs};

/// A file entry: node attributes plus optional initial content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(flatten)]
    pub attrs: NodeAttrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Desired nodes, directories first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub dirs: Vec<NodeAttrs>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Nodes built from a manifest.
#[derive(Debug, Default)]
pub struct ManifestNodes {
    pub dirs: Vec<Dir>,
    pub files: Vec<File>,
}

impl ManifestNodes {
    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every node, directories before files.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn FsNode> {
        self.dirs
            .iter_mut()
            .map(|d| d as &mut dyn FsNode)
            .chain(self.files.iter_mut().map(|f| f as &mut dyn FsNode))
    }
}

impl Manifest {
    /// Load a manifest from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> FilesResult<Self> {
        let path = path.as_ref();
        debug!("Loading manifest from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a manifest from YAML text.
    pub fn from_yaml(content: &str) -> FilesResult<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        Ok(manifest)
    }

    /// Validate every entry and build the corresponding nodes.
    ///
    /// Paths, permissions and principals are checked here, so the first bad
    /// entry fails the whole manifest.
    pub fn build(&self, confirm: ConfirmHandle) -> FilesResult<ManifestNodes> {
        let mut nodes = ManifestNodes::default();

        for attrs in &self.dirs {
            nodes
                .dirs
                .push(Dir::new(attrs.clone())?.with_confirm(confirm.clone()));
        }

        for entry in &self.files {
            let mut file = File::new(entry.attrs.clone())?.with_confirm(confirm.clone());
            if let Some(data) = &entry.data {
                file = file.with_data(data.as_str());
            }
            nodes.files.push(file);
        }

        info!(
            "Built {} directories and {} files from manifest",
            nodes.dirs.len(),
            nodes.files.len()
        );
        Ok(nodes)
    }
}
