//! # provkit_input
//!
//! Terminal interaction for provisioning scripts:
//!
//! - [`Prompter`] asks yes/no questions, free-text questions and guarded
//!   warnings over any reader/writer pair
//! - [`Terminal`] binds a prompter to stdin/stdout and plugs into
//!   [`provkit_files::Confirm`]
//! - [`generate_pw`] builds random passwords that alternate character classes
//! - [`Domain`] holds a validated domain name

pub mod domain;
pub mod error;
pub mod password;
pub mod prompt;

pub use domain::Domain;
pub use error::{InputError, InputResult};
pub use password::{generate_pw, CharSet, DEFAULT_LENGTH};
pub use prompt::{AskString, Prompter, Terminal};
