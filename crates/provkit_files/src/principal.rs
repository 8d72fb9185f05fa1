//! User and group database lookups.

use std::sync::Arc;

use nix::unistd::{getegid, geteuid, Gid, Group, Uid, User};

/// Name and id lookups against a user/group database.
#[cfg_attr(test, mockall::automock)]
pub trait Principals {
    /// Numeric uid for a user name.
    fn uid_of(&self, user: &str) -> Option<u32>;

    /// Numeric gid for a group name.
    fn gid_of(&self, group: &str) -> Option<u32>;

    /// User name for a numeric uid.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Group name for a numeric gid.
    fn group_name(&self, gid: u32) -> Option<String>;

    /// Primary gid of a user.
    fn primary_gid(&self, user: &str) -> Option<u32>;
}

/// Shared handle to a user/group database.
pub type PrincipalsHandle = Arc<dyn Principals + Send + Sync>;

/// The operating system's passwd and group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPrincipals;

impl SystemPrincipals {
    /// Name of the effective user running this process.
    pub fn current_user(&self) -> Option<String> {
        self.user_name(geteuid().as_raw())
    }

    /// Name of the effective group running this process.
    pub fn current_group(&self) -> Option<String> {
        self.group_name(getegid().as_raw())
    }
}

impl Principals for SystemPrincipals {
    fn uid_of(&self, user: &str) -> Option<u32> {
        User::from_name(user).ok().flatten().map(|u| u.uid.as_raw())
    }

    fn gid_of(&self, group: &str) -> Option<u32> {
        Group::from_name(group).ok().flatten().map(|g| g.gid.as_raw())
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        Group::from_gid(Gid::from_raw(gid)).ok().flatten().map(|g| g.name)
    }

    fn primary_gid(&self, user: &str) -> Option<u32> {
        User::from_name(user).ok().flatten().map(|u| u.gid.as_raw())
    }
}

pub(crate) fn system_handle() -> PrincipalsHandle {
    Arc::new(SystemPrincipals)
}
