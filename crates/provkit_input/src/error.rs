//! Error types for prompts and password generation.

use thiserror::Error;

/// Result type alias for input operations.
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur while prompting, generating passwords or reading
/// domain names.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Character set has no characters to draw from")]
    EmptyCharSet,

    #[error("Domain name {name:?} is not valid: {reason}")]
    InvalidDomain { name: String, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
