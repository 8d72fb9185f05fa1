//! Error types for filesystem nodes and content processing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for file operations.
pub type FilesResult<T> = Result<T, FilesError>;

/// Errors raised by node validation and content processing.
///
/// Operating system failures during chmod, chown, create, remove and write are
/// not represented here: those are logged and reported as `Ok(false)`.
#[derive(Error, Debug)]
pub enum FilesError {
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid permission value: {0}")]
    InvalidPermission(String),

    #[error("Unknown {kind}: {name}")]
    UnknownPrincipal { kind: PrincipalKind, name: String },

    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Operation not implemented for a bare node: {0}")]
    NotImplemented(&'static str),

    #[error("Source or destination does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("No data to write to {0}")]
    NoData(String),

    #[error("Malformed section: {0}")]
    MalformedSection(String),

    #[error("Section was altered in target: {0}")]
    AlteredSection(String),

    #[error("Attribute already exists: {0}")]
    DuplicateAttribute(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Invalid pattern for {name}: {message}")]
    InvalidPattern { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which user database an unknown name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Group,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
        }
    }
}
