//! Validated absolute paths for filesystem nodes.

use std::fmt;
use std::path::Path;

use crate::error::{FilesError, FilesResult};

/// Characters allowed in a node path besides ASCII alphanumerics.
const ALLOWED_PUNCTUATION: &str = "-_.() /";

/// How a path's trailing separator is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Any absolute path, trailing separator kept as given.
    Any,
    /// Directory path; a trailing separator is appended when missing.
    Dir,
    /// File path; a trailing separator is rejected.
    File,
}

/// An absolute, normalized path with no repeated separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(String);

impl NodePath {
    /// Validate and normalize a raw path string.
    pub fn parse(raw: &str, kind: PathKind) -> FilesResult<Self> {
        if raw.is_empty() {
            return Err(invalid(raw, "path cannot be empty"));
        }

        if let Some(bad) = raw
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !ALLOWED_PUNCTUATION.contains(*c))
        {
            return Err(invalid(raw, &format!("character {:?} is not allowed", bad)));
        }

        if !raw.starts_with('/') {
            return Err(invalid(raw, "relative paths are not allowed"));
        }

        let mut path = collapse_separators(raw);

        match kind {
            PathKind::Any => {}
            PathKind::Dir => {
                if !path.ends_with('/') {
                    path.push('/');
                }
            }
            PathKind::File => {
                if path.ends_with('/') {
                    return Err(invalid(raw, "a file path cannot end in '/'"));
                }
            }
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// The containing directory, always ending in '/'.
    ///
    /// `/this/path/` gives `/this/`, `/etc/path/file` gives `/etc/path/`.
    pub fn parent_dirs(&self) -> String {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) => trimmed[..=idx].to_string(),
            None => "/".to_string(),
        }
    }

    /// The last path component without any trailing separator.
    pub fn leaf(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for NodePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

fn collapse_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_was_separator = false;
    for c in raw.chars() {
        if c == '/' {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        out.push(c);
    }
    out
}

fn invalid(path: &str, reason: &str) -> FilesError {
    FilesError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
