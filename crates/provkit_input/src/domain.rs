//! Validated domain names.

use std::fmt;
use std::str::FromStr;

use crate::error::{InputError, InputResult};

/// Longest accepted name, trailing dot excluded.
pub const MAX_NAME_LENGTH: usize = 255;

/// Longest accepted label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// A domain name such as `example.com`.
///
/// Labels are 1-63 ASCII letters, digits or hyphens and never start or end
/// with a hyphen. A single trailing dot is dropped, so `example.com.` and
/// `example.com` are the same domain. Case is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    name: String,
}

impl Domain {
    pub fn parse(name: &str) -> InputResult<Self> {
        let invalid = |reason| InputError::InvalidDomain {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(invalid("name is longer than 255 characters"));
        }
        if !trimmed.split('.').all(valid_label) {
            return Err(invalid("labels must be 1-63 letters, digits or inner hyphens"));
        }

        Ok(Self {
            name: trimmed.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }
}

fn valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LENGTH).contains(&label.len())
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl FromStr for Domain {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Domain {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
