//! framepack - flat length-prefixed tree archive
//!
//! serializes a file/directory tree into a single stream of text-framed
//! records and reconstructs the tree from it.
//!
//! # Format
//!
//! - **directory**: `<len(name)+1>:<name>/`, then its children, then `0:`
//! - **file**: `<len(name)>:<name><len(content)>:<content>`
//!
//! lengths are decimal ascii. content is copied verbatim, so any byte value
//! is allowed inside it. only directories and regular files are archived;
//! permissions, timestamps and links are not.
//!
//! # Example usage
//!
//! ```no_run
//! use framepack::{ops, Config};
//! use std::path::{Path, PathBuf};
//!
//! let config = Config::default();
//!
//! // pack a directory
//! let inputs = vec![PathBuf::from("/source")];
//! ops::pack_paths(&inputs, Path::new("/tmp/source.fp"), config.limits, &mut ops::Silent).unwrap();
//!
//! // unpack it elsewhere
//! ops::unpack_file(Path::new("/tmp/source.fp"), Path::new("/destination"), &config, &mut ops::Silent).unwrap();
//! ```

mod config;
mod error;

pub mod format;
pub mod fs;
pub mod ops;
pub mod types;

pub use config::{Config, Limits, DEFAULT_DIR_MODE};
pub use error::{Error, IoResultExt, Result};
pub use types::{ArchiveEntry, EntryKind};
