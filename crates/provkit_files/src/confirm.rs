//! Confirmation strategies for destructive or overwriting operations.

use std::sync::Arc;

/// Asked before a node removes or replaces something on disk.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Return `true` to proceed. `default` is the answer suggested to the user.
    fn confirm(&self, message: &str, default: bool) -> bool;
}

/// Shared handle to a confirmation strategy.
pub type ConfirmHandle = Arc<dyn Confirm + Send + Sync>;

impl<F> Confirm for F
where
    F: Fn(&str, bool) -> bool,
{
    fn confirm(&self, message: &str, default: bool) -> bool {
        self(message, default)
    }
}

/// Answers every question with its suggested default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefault;

impl Confirm for AcceptDefault {
    fn confirm(&self, _message: &str, default: bool) -> bool {
        default
    }
}

/// Answers every question with yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str, _default: bool) -> bool {
        true
    }
}

/// Answers every question with no.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _message: &str, _default: bool) -> bool {
        false
    }
}

pub(crate) fn default_handle() -> ConfirmHandle {
    Arc::new(AcceptDefault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies() {
        assert!(AcceptDefault.confirm("Replace?", true));
        assert!(!AcceptDefault.confirm("Replace?", false));
        assert!(AssumeYes.confirm("Replace?", false));
        assert!(!AssumeNo.confirm("Replace?", true));
    }

    #[test]
    fn test_closures_confirm() {
        let only_tmp = |message: &str, _default: bool| message.contains("/tmp/");
        assert!(only_tmp.confirm("Remove /tmp/x?", false));
        assert!(!only_tmp.confirm("Remove /etc/x?", true));
    }
}
