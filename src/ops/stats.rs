//! entry and byte counts

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::fs::FileType;

/// counts gathered by pack, unpack and list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub files: u64,
    pub directories: u64,
    /// total file content bytes
    pub bytes: u64,
    /// entries left out of the archive because of their type
    pub skipped: Vec<PathBuf>,
}

impl Stats {
    pub fn merge(&mut self, other: Stats) {
        self.files += other.files;
        self.directories += other.directories;
        self.bytes += other.bytes;
        self.skipped.extend(other.skipped);
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} directories, {} bytes",
            self.files, self.directories, self.bytes
        )?;
        if !self.skipped.is_empty() {
            write!(f, ", {} skipped", self.skipped.len())?;
        }
        Ok(())
    }
}

/// count what packing `path` would emit, without reading any content
///
/// unreadable entries are ignored here; pack itself reports them.
pub fn count_tree(path: &Path) -> Stats {
    let mut stats = Stats::default();

    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        match FileType::from_metadata(&meta) {
            FileType::Directory => stats.directories += 1,
            FileType::Regular => {
                stats.files += 1;
                stats.bytes += meta.len();
            }
            _ => stats.skipped.push(entry.into_path()),
        }
    }

    stats
}
