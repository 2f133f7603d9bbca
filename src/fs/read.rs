use std::fs::{self, Metadata};
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// file type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
    Unknown,
}

impl FileType {
    /// detect file type from metadata
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::FileTypeExt;
        let ft = meta.file_type();
        if ft.is_file() {
            FileType::Regular
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_block_device() {
            FileType::BlockDevice
        } else if ft.is_char_device() {
            FileType::CharDevice
        } else if ft.is_fifo() {
            FileType::Fifo
        } else if ft.is_socket() {
            FileType::Socket
        } else {
            FileType::Unknown
        }
    }

    /// classify a path without following symlinks
    pub fn of(path: &Path) -> Result<(Self, Metadata)> {
        let meta = fs::symlink_metadata(path).with_path(path)?;
        Ok((Self::from_metadata(&meta), meta))
    }

    /// whether the archive format can carry this kind of entry
    pub fn is_archivable(&self) -> bool {
        matches!(self, FileType::Regular | FileType::Directory)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FileType::Regular => "regular",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
            FileType::BlockDevice => "block_device",
            FileType::CharDevice => "char_device",
            FileType::Fifo => "fifo",
            FileType::Socket => "socket",
            FileType::Unknown => "unknown",
        }
    }
}
