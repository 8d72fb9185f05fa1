//! # provkit_files
//!
//! Filesystem reconciliation and text helpers for provisioning scripts.
//!
//! Nodes describe a desired path together with optional permissions and
//! ownership. `verify` compares that against the disk and `repair` fixes what
//! it can in a single bounded pass:
//!
//! - [`Dir`] creates, removes and merge-fills directories
//! - [`File`] creates, removes, reads and writes files with an in-memory cache
//! - [`Section`], [`Template`] and [`Parsable`] work on any [`ContentProvider`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use provkit_files::{File, FsNode, NodeAttrs};
//!
//! let mut file = File::new(NodeAttrs::new("/tmp/provkit/hello.txt").perms(0o644)).unwrap();
//! file.create().unwrap();
//! file.overwrite(Some("hello"), None).unwrap();
//! assert_eq!(file.read(false).unwrap(), "hello");
//! assert!(file.repair().unwrap());
//! ```

pub mod confirm;
pub mod content;
pub mod dir;
pub mod error;
pub mod file;
pub mod manifest;
pub mod node;
pub mod parsable;
pub mod path;
pub mod principal;
pub mod section;
pub mod template;

pub use confirm::{AcceptDefault, AssumeNo, AssumeYes, Confirm, ConfirmHandle};
pub use content::ContentProvider;
pub use dir::Dir;
pub use error::{FilesError, FilesResult, PrincipalKind};
pub use file::File;
pub use manifest::{FileEntry, Manifest, ManifestNodes};
pub use node::{FsNode, Mismatch, Node, NodeAttrs, PermsValue, MAX_PERMS, UNPRIVILEGED};
pub use parsable::{FieldPattern, Parsable, ParsedValue};
pub use path::{NodePath, PathKind};
pub use principal::{Principals, PrincipalsHandle, SystemPrincipals};
pub use section::Section;
pub use template::Template;
