//! high-level operations: pack, unpack and list archives

mod list;
mod listener;
mod pack;
mod stats;
mod unpack;

pub use list::{list, list_file};
pub use listener::{Listener, Silent, Visit};
pub use pack::{pack_paths, Packer};
pub use stats::{count_tree, Stats};
pub use unpack::{unpack, unpack_file};
