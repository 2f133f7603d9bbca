mod entry;

pub use entry::{validate_name, ArchiveEntry, EntryKind};
