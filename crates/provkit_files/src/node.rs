//! Filesystem nodes: desired path, permission and ownership state, and the
//! verify/repair reconciliation shared by directories and files.
//!
//! A node without a path is a *stub*. Stubs never touch the filesystem: they
//! report `exists() == false` and every mutating operation succeeds trivially,
//! which lets configuration-driven scripts carry optional entries.

use std::fmt;
use std::fs;
use std::mem::{self, Discriminant};
use std::os::unix::fs::{MetadataExt, PermissionsExt};

use nix::unistd::{self, Gid, Uid};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{FilesError, FilesResult, PrincipalKind};
use crate::path::{NodePath, PathKind};
use crate::principal::{system_handle, PrincipalsHandle};

/// Highest permission value a node may carry.
pub const MAX_PERMS: u32 = 0o777;

/// Identity used when an owner or group is explicitly cleared.
pub const UNPRIVILEGED: &str = "nobody";

/// A permission value as written in configuration.
///
/// Both forms are octal. A bare integer is read digit by digit the way
/// `chmod` reads it, so `440` means `0o440`. YAML decodes `0o644` before it
/// gets here, so that spelling must be quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermsValue {
    /// Integer whose decimal digits spell the octal mode, such as `755`.
    Digits(i64),
    /// Octal text such as `"0755"` or `"0o644"`.
    Text(String),
}

impl PermsValue {
    /// Parse into a mode within `0..=0o777`.
    pub fn to_mode(&self) -> FilesResult<u32> {
        let text = match self {
            Self::Digits(digits) if *digits < 0 => {
                return Err(FilesError::InvalidPermission(format!(
                    "{} is negative",
                    digits
                )))
            }
            Self::Digits(digits) => digits.to_string(),
            Self::Text(text) => text.trim().to_string(),
        };
        let digits = text.strip_prefix("0o").unwrap_or(&text);
        let value = i64::from_str_radix(digits, 8).map_err(|_| {
            FilesError::InvalidPermission(format!("{:?} is not an octal integer", text))
        })?;
        checked_mode(value)
    }
}

impl From<u32> for PermsValue {
    fn from(mode: u32) -> Self {
        Self::Text(format!("{:o}", mode))
    }
}

impl From<&str> for PermsValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

fn checked_mode(value: i64) -> FilesResult<u32> {
    if !(0..=i64::from(MAX_PERMS)).contains(&value) {
        return Err(FilesError::InvalidPermission(format!(
            "{:o} is outside 0..=777",
            value
        )));
    }
    Ok(value as u32)
}

/// The attribute mapping a node is constructed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub perms: Option<PermsValue>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl NodeAttrs {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn perms(mut self, mode: u32) -> Self {
        self.perms = Some(PermsValue::from(mode));
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A difference between the desired and actual state of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Missing,
    Perms { expected: u32, actual: u32 },
    Owner { expected: String, actual: Option<String> },
    Group { expected: String, actual: Option<String> },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "does not exist"),
            Self::Perms { expected, actual } => {
                write!(f, "perms are {:o}, expected {:o}", actual, expected)
            }
            Self::Owner { expected, actual } => write!(
                f,
                "owner is {}, expected {}",
                actual.as_deref().unwrap_or("<unknown>"),
                expected
            ),
            Self::Group { expected, actual } => write!(
                f,
                "group is {}, expected {}",
                actual.as_deref().unwrap_or("<unknown>"),
                expected
            ),
        }
    }
}

/// A filesystem path with optional permission and ownership requirements.
#[derive(Clone)]
pub struct Node {
    kind: PathKind,
    path: Option<NodePath>,
    perms: Option<u32>,
    owner: Option<String>,
    group: Option<String>,
    principals: PrincipalsHandle,
}

impl Node {
    /// Create a node from attributes, validating owner and group against the
    /// system user database.
    pub fn new(attrs: NodeAttrs) -> FilesResult<Self> {
        Self::build(&attrs, PathKind::Any, system_handle())
    }

    /// Create a node that resolves owners and groups through `principals`.
    pub fn with_principals(attrs: NodeAttrs, principals: PrincipalsHandle) -> FilesResult<Self> {
        Self::build(&attrs, PathKind::Any, principals)
    }

    /// A node without a path.
    pub fn stub() -> Self {
        Self::empty(PathKind::Any, system_handle())
    }

    pub(crate) fn empty(kind: PathKind, principals: PrincipalsHandle) -> Self {
        Self {
            kind,
            path: None,
            perms: None,
            owner: None,
            group: None,
            principals,
        }
    }

    pub(crate) fn build(
        attrs: &NodeAttrs,
        kind: PathKind,
        principals: PrincipalsHandle,
    ) -> FilesResult<Self> {
        let mut node = Self::empty(kind, principals);
        node.set_path(attrs.path.as_deref())?;
        if let Some(perms) = &attrs.perms {
            node.perms = Some(perms.to_mode()?);
        }
        if let Some(owner) = attrs.owner.as_deref() {
            node.set_owner(Some(owner))?;
        }
        if let Some(group) = attrs.group.as_deref() {
            node.set_group(Some(group))?;
        }
        Ok(node)
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.path.as_ref()
    }

    pub fn is_stub(&self) -> bool {
        self.path.is_none()
    }

    pub fn perms(&self) -> Option<u32> {
        self.perms
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn principals(&self) -> &PrincipalsHandle {
        &self.principals
    }

    /// Set or clear the path. `None` turns the node into a stub.
    pub fn set_path(&mut self, path: Option<&str>) -> FilesResult<()> {
        match path {
            None => {
                debug!("Node initialized without a path, continuing as a stub");
                self.path = None;
            }
            Some(raw) => self.path = Some(NodePath::parse(raw, self.kind)?),
        }
        Ok(())
    }

    pub fn set_perms(&mut self, mode: u32) -> FilesResult<()> {
        self.perms = Some(checked_mode(i64::from(mode))?);
        Ok(())
    }

    pub fn clear_perms(&mut self) {
        self.perms = None;
    }

    /// Set the owner. `None` selects the unprivileged `nobody` user.
    pub fn set_owner(&mut self, owner: Option<&str>) -> FilesResult<()> {
        let name = owner.unwrap_or(UNPRIVILEGED);
        self.resolve(PrincipalKind::User, name)?;
        self.owner = Some(name.to_string());
        Ok(())
    }

    /// Set the group. `None` selects the unprivileged group.
    pub fn set_group(&mut self, group: Option<&str>) -> FilesResult<()> {
        let name = match group {
            Some(name) => {
                self.resolve(PrincipalKind::Group, name)?;
                name.to_string()
            }
            None => self.unprivileged_group()?,
        };
        self.group = Some(name);
        Ok(())
    }

    /// The `nobody` group, or the primary group of the `nobody` user where it
    /// is named differently (`nogroup` on Debian).
    fn unprivileged_group(&self) -> FilesResult<String> {
        if self.principals.gid_of(UNPRIVILEGED).is_some() {
            return Ok(UNPRIVILEGED.to_string());
        }
        self.principals
            .primary_gid(UNPRIVILEGED)
            .and_then(|gid| self.principals.group_name(gid))
            .ok_or_else(|| FilesError::UnknownPrincipal {
                kind: PrincipalKind::Group,
                name: UNPRIVILEGED.to_string(),
            })
    }

    /// The attributes this node was built from, with its normalized path.
    pub fn attrs(&self) -> NodeAttrs {
        NodeAttrs {
            path: self.path.as_ref().map(|p| p.as_str().to_string()),
            perms: self.perms.map(PermsValue::from),
            owner: self.owner.clone(),
            group: self.group.clone(),
        }
    }

    /// Parent directory path with a trailing separator, `None` for stubs.
    pub fn parent_dirs(&self) -> Option<String> {
        self.path.as_ref().map(NodePath::parent_dirs)
    }

    pub fn exists(&self) -> bool {
        self.path.as_ref().is_some_and(|p| p.as_path().exists())
    }

    pub fn actual_perms(&self) -> Option<u32> {
        let path = self.path.as_ref()?;
        fs::metadata(path.as_path())
            .ok()
            .map(|m| m.permissions().mode() & MAX_PERMS)
    }

    pub fn actual_owner(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        let uid = fs::metadata(path.as_path()).ok()?.uid();
        self.principals.user_name(uid)
    }

    pub fn actual_group(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        let gid = fs::metadata(path.as_path()).ok()?.gid();
        self.principals.group_name(gid)
    }

    /// Apply `perms`, or the stored perms when `None` is given.
    ///
    /// OS failures are logged and reported as `Ok(false)`.
    pub fn chmod(&self, perms: Option<u32>) -> FilesResult<bool> {
        let Some(path) = &self.path else {
            return Ok(true);
        };
        if !path.as_path().exists() {
            return Err(FilesError::PathNotFound(path.as_path().to_path_buf()));
        }
        let mode = match perms {
            Some(mode) => checked_mode(i64::from(mode))?,
            None => match self.perms {
                Some(mode) => mode,
                None => return Ok(true),
            },
        };

        match fs::set_permissions(path.as_path(), fs::Permissions::from_mode(mode)) {
            Ok(()) => {
                debug!("Set perms of {} to {:o}", path, mode);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to set perms of {} to {:o}: {}", path, mode, e);
                Ok(false)
            }
        }
    }

    /// Apply `owner`/`group`, falling back to the stored values for `None`.
    ///
    /// OS failures are logged and reported as `Ok(false)`.
    pub fn chown(&self, owner: Option<&str>, group: Option<&str>) -> FilesResult<bool> {
        let Some(path) = &self.path else {
            return Ok(true);
        };
        if !path.as_path().exists() {
            return Err(FilesError::PathNotFound(path.as_path().to_path_buf()));
        }
        let owner = owner.or(self.owner.as_deref());
        let group = group.or(self.group.as_deref());
        if owner.is_none() && group.is_none() {
            return Ok(true);
        }

        let uid = owner
            .map(|name| self.resolve(PrincipalKind::User, name))
            .transpose()?;
        let gid = group
            .map(|name| self.resolve(PrincipalKind::Group, name))
            .transpose()?;

        match unistd::chown(path.as_path(), uid.map(Uid::from_raw), gid.map(Gid::from_raw)) {
            Ok(()) => {
                debug!(
                    "Set ownership of {} to {}:{}",
                    path,
                    owner.unwrap_or("-"),
                    group.unwrap_or("-")
                );
                Ok(true)
            }
            Err(errno) => {
                error!("Failed to set ownership of {}: {}", path, errno);
                Ok(false)
            }
        }
    }

    /// The first difference between desired and actual state, if any.
    ///
    /// Existence is checked first, then perms, owner and group. Attributes
    /// that were never set are not compared.
    pub fn inspect(&self) -> Option<Mismatch> {
        let path = self.path.as_ref()?;
        let Ok(meta) = fs::metadata(path.as_path()) else {
            return Some(Mismatch::Missing);
        };

        if let Some(expected) = self.perms {
            let actual = meta.permissions().mode() & MAX_PERMS;
            if actual != expected {
                return Some(Mismatch::Perms { expected, actual });
            }
        }
        if let Some(expected) = &self.owner {
            let actual = self.principals.user_name(meta.uid());
            if actual.as_deref() != Some(expected.as_str()) {
                return Some(Mismatch::Owner {
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        if let Some(expected) = &self.group {
            let actual = self.principals.group_name(meta.gid());
            if actual.as_deref() != Some(expected.as_str()) {
                return Some(Mismatch::Group {
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        None
    }

    fn resolve(&self, kind: PrincipalKind, name: &str) -> FilesResult<u32> {
        let id = match kind {
            PrincipalKind::User => self.principals.uid_of(name),
            PrincipalKind::Group => self.principals.gid_of(name),
        };
        id.ok_or_else(|| FilesError::UnknownPrincipal {
            kind,
            name: name.to_string(),
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path)
            .field("perms", &self.perms.map(|p| format!("{:o}", p)))
            .field("owner", &self.owner)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path),
            None => f.write_str("<node:stub>"),
        }
    }
}

/// Shared behaviour of directories and files.
///
/// Implementors provide `create` and `remove`; reconciliation is built on top.
pub trait FsNode: fmt::Display {
    fn node(&self) -> &Node;

    /// Bring the node into existence with its perms and ownership applied.
    fn create(&mut self) -> FilesResult<bool>;

    /// Remove the node, asking first when `ask` is set.
    fn remove(&mut self, ask: bool) -> FilesResult<bool>;

    fn exists(&self) -> bool {
        self.node().exists()
    }

    fn chmod(&self, perms: Option<u32>) -> FilesResult<bool> {
        self.node().chmod(perms)
    }

    fn chown(&self, owner: Option<&str>, group: Option<&str>) -> FilesResult<bool> {
        self.node().chown(owner, group)
    }

    /// Compare desired and actual state, optionally repairing differences.
    ///
    /// Each kind of mismatch is repaired at most once per call; a mismatch
    /// that survives its repair is reported as `Ok(false)`.
    fn verify(&mut self, repair: bool) -> FilesResult<bool> {
        let mut repaired: Vec<Discriminant<Mismatch>> = Vec::new();
        loop {
            let Some(mismatch) = self.node().inspect() else {
                return Ok(true);
            };
            if !repair {
                warn!("{} {}", self, mismatch);
                return Ok(false);
            }
            let kind = mem::discriminant(&mismatch);
            if repaired.contains(&kind) {
                warn!("{} still {} after repair", self, mismatch);
                return Ok(false);
            }
            repaired.push(kind);

            info!("Repairing {}: {}", self, mismatch);
            let fixed = match mismatch {
                Mismatch::Missing => self.create()?,
                Mismatch::Perms { .. } => self.chmod(None)?,
                Mismatch::Owner { .. } | Mismatch::Group { .. } => self.chown(None, None)?,
            };
            if !fixed {
                return Ok(false);
            }
        }
    }

    fn repair(&mut self) -> FilesResult<bool> {
        self.verify(true)
    }
}

impl FsNode for Node {
    fn node(&self) -> &Node {
        self
    }

    fn create(&mut self) -> FilesResult<bool> {
        Err(FilesError::NotImplemented("create"))
    }

    fn remove(&mut self, _ask: bool) -> FilesResult<bool> {
        Err(FilesError::NotImplemented("remove"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;
    use crate::principal::{MockPrincipals, SystemPrincipals};

    #[test]
    fn test_node_initialize() {
        let node = Node::new(NodeAttrs::new("/this//path//")).unwrap();
        assert_eq!(node.to_string(), "/this/path/");
        assert_eq!(node.perms(), None);
        assert_eq!(node.owner(), None);
        assert_eq!(node.group(), None);

        let node = Node::new(
            NodeAttrs::new("/etc/path/file")
                .perms(0o655)
                .owner("root")
                .group("root"),
        )
        .unwrap();
        assert_eq!(node.to_string(), "/etc/path/file");
        assert_eq!(node.perms(), Some(0o655));
        assert_eq!(node.owner(), Some("root"));
        assert_eq!(node.group(), Some("root"));
    }

    #[test]
    fn test_stub_node() {
        let node = Node::new(NodeAttrs::default()).unwrap();
        assert!(node.is_stub());
        assert_eq!(node.to_string(), "<node:stub>");
        assert!(!node.exists());
        assert_eq!(node.parent_dirs(), None);
        assert!(node.chmod(Some(0o600)).unwrap());
        assert!(node.chown(Some("root"), None).unwrap());
        assert_eq!(node.inspect(), None);
    }

    #[test]
    fn test_bare_node_create_and_remove_are_abstract() {
        let mut node = Node::new(NodeAttrs::new("/the/path")).unwrap();
        assert!(matches!(node.create(), Err(FilesError::NotImplemented("create"))));
        assert!(matches!(node.remove(true), Err(FilesError::NotImplemented("remove"))));
    }

    #[test]
    fn test_set_path_empty_fails() {
        let mut node = Node::stub();
        assert!(matches!(node.set_path(Some("")), Err(FilesError::InvalidPath { .. })));
        assert!(Node::new(NodeAttrs::new("")).is_err());
    }

    #[test]
    fn test_perms_validation() {
        assert_eq!(PermsValue::from("0755").to_mode().unwrap(), 0o755);
        assert_eq!(PermsValue::from("0o644").to_mode().unwrap(), 0o644);
        assert_eq!(PermsValue::Digits(600).to_mode().unwrap(), 0o600);
        assert_eq!(PermsValue::from(0o640).to_mode().unwrap(), 0o640);

        assert!(matches!(
            PermsValue::from("rwx").to_mode(),
            Err(FilesError::InvalidPermission(_))
        ));
        assert!(matches!(
            PermsValue::Digits(1000).to_mode(),
            Err(FilesError::InvalidPermission(_))
        ));
        assert!(PermsValue::Digits(-1).to_mode().is_err());
        assert!(matches!(
            PermsValue::Digits(789).to_mode(),
            Err(FilesError::InvalidPermission(_))
        ));

        let mut node = Node::stub();
        assert!(node.set_perms(0o777).is_ok());
        assert!(node.set_perms(0o1777).is_err());
        assert_eq!(node.perms(), Some(0o777));
    }

    #[test]
    fn test_unknown_owner_and_group_fail_fast() {
        let mut db = MockPrincipals::new();
        db.expect_uid_of().returning(|name| (name == "deploy").then_some(1001));
        db.expect_gid_of().returning(|name| (name == "deploy").then_some(1001));
        let db: PrincipalsHandle = Arc::new(db);

        assert!(Node::with_principals(NodeAttrs::new("/srv").owner("deploy"), db.clone()).is_ok());

        let err = Node::with_principals(NodeAttrs::new("/srv").owner("ghost"), db.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            FilesError::UnknownPrincipal { kind: PrincipalKind::User, .. }
        ));

        let err =
            Node::with_principals(NodeAttrs::new("/srv").group("ghost"), db).unwrap_err();
        assert!(matches!(
            err,
            FilesError::UnknownPrincipal { kind: PrincipalKind::Group, .. }
        ));
    }

    fn nobody_db(nobody_group: bool) -> PrincipalsHandle {
        let mut db = MockPrincipals::new();
        db.expect_uid_of()
            .returning(|name| (name == UNPRIVILEGED).then_some(65534));
        db.expect_gid_of()
            .returning(move |name| (nobody_group && name == UNPRIVILEGED).then_some(65534));
        db.expect_primary_gid()
            .returning(|name| (name == UNPRIVILEGED).then_some(65534));
        db.expect_group_name()
            .returning(|gid| (gid == 65534).then(|| "nogroup".to_string()));
        Arc::new(db)
    }

    #[test]
    fn test_clearing_owner_selects_nobody() {
        let mut node = Node::with_principals(NodeAttrs::default(), nobody_db(true)).unwrap();
        node.set_owner(None).unwrap();
        node.set_group(None).unwrap();
        assert_eq!(node.owner(), Some(UNPRIVILEGED));
        assert_eq!(node.group(), Some(UNPRIVILEGED));
    }

    #[test]
    fn test_clearing_group_falls_back_to_primary_group_of_nobody() {
        let mut node = Node::with_principals(NodeAttrs::default(), nobody_db(false)).unwrap();
        node.set_group(None).unwrap();
        assert_eq!(node.group(), Some("nogroup"));
    }

    #[test]
    fn test_clearing_fails_fast_without_nobody() {
        let mut db = MockPrincipals::new();
        db.expect_uid_of().returning(|_| None);
        db.expect_gid_of().returning(|_| None);
        db.expect_primary_gid().returning(|_| None);
        let mut node = Node::with_principals(NodeAttrs::default(), Arc::new(db)).unwrap();

        assert!(matches!(
            node.set_owner(None),
            Err(FilesError::UnknownPrincipal { kind: PrincipalKind::User, .. })
        ));
        assert!(matches!(
            node.set_group(None),
            Err(FilesError::UnknownPrincipal { kind: PrincipalKind::Group, .. })
        ));
        assert_eq!(node.owner(), None);
        assert_eq!(node.group(), None);
    }

    #[test]
    fn test_chmod_missing_path_fails() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing");
        let node = Node::new(NodeAttrs::new(missing.to_str().unwrap()).perms(0o600)).unwrap();
        assert!(matches!(node.chmod(None), Err(FilesError::PathNotFound(_))));
        assert!(matches!(node.chown(None, None), Err(FilesError::PathNotFound(_))));
    }

    #[test]
    fn test_chmod_applies_stored_perms() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("target");
        fs::write(&target, "x").unwrap();

        let node = Node::new(NodeAttrs::new(target.to_str().unwrap()).perms(0o640)).unwrap();
        assert!(node.chmod(None).unwrap());
        assert_eq!(node.actual_perms(), Some(0o640));

        assert!(node.chmod(Some(0o600)).unwrap());
        assert_eq!(node.actual_perms(), Some(0o600));
    }

    #[test]
    fn test_chown_to_current_user() {
        let db = SystemPrincipals;
        let (Some(user), Some(group)) = (db.current_user(), db.current_group()) else {
            return;
        };
        let temp = tempdir().unwrap();
        let target = temp.path().join("owned");
        fs::write(&target, "x").unwrap();

        let node = Node::new(
            NodeAttrs::new(target.to_str().unwrap())
                .owner(user.as_str())
                .group(group.as_str()),
        )
        .unwrap();
        assert!(node.chown(None, None).unwrap());
        assert_eq!(node.actual_owner(), Some(user));
        assert_eq!(node.inspect(), None);
    }

    #[test]
    fn test_inspect_reports_perms_mismatch() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("target");
        fs::write(&target, "x").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o600)).unwrap();

        let mut node =
            Node::new(NodeAttrs::new(target.to_str().unwrap()).perms(0o644)).unwrap();
        assert_eq!(
            node.inspect(),
            Some(Mismatch::Perms {
                expected: 0o644,
                actual: 0o600
            })
        );
        assert!(!node.verify(false).unwrap());
        assert!(node.repair().unwrap());
        assert_eq!(node.actual_perms(), Some(0o644));
    }

    #[test]
    fn test_verify_missing_bare_node() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing");
        let mut node = Node::new(NodeAttrs::new(missing.to_str().unwrap())).unwrap();

        assert_eq!(node.inspect(), Some(Mismatch::Missing));
        assert!(!node.verify(false).unwrap());
        assert!(matches!(node.verify(true), Err(FilesError::NotImplemented(_))));
    }

    #[test]
    fn test_persistent_owner_mismatch_is_repaired_once() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("target");
        fs::write(&target, "x").unwrap();
        let own_uid = fs::metadata(&target).unwrap().uid();

        let mut db = MockPrincipals::new();
        db.expect_uid_of().returning(move |_| Some(own_uid));
        db.expect_user_name().returning(|_| Some("alice".to_string()));

        let attrs = NodeAttrs::new(target.to_str().unwrap()).owner("bob");
        let mut node = Node::with_principals(attrs, Arc::new(db)).unwrap();
        assert_eq!(
            node.inspect(),
            Some(Mismatch::Owner {
                expected: "bob".to_string(),
                actual: Some("alice".to_string())
            })
        );
        assert!(!node.repair().unwrap());
    }
}
