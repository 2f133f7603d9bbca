pub mod materialize;
pub mod read;

pub use materialize::materialize;
pub use read::FileType;
