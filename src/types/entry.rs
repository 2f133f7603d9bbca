use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::format::{walk, FrameReader, FrameSink, FrameWriter};
use crate::ops::{Listener, Stats};

/// kind of archived entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    /// get the type name for listings and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// an in-memory archive tree
///
/// children keep traversal order; nothing is sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveEntry {
    Directory {
        name: String,
        children: Vec<ArchiveEntry>,
    },
    File {
        name: String,
        content: Vec<u8>,
    },
}

impl ArchiveEntry {
    pub fn directory(name: impl Into<String>, children: Vec<ArchiveEntry>) -> Self {
        Self::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Directory { .. } => EntryKind::Directory,
            Self::File { .. } => EntryKind::File,
        }
    }

    /// frame this entry and everything below it
    pub fn write_to<W: Write>(&self, out: &mut FrameWriter<W>) -> Result<()> {
        enum Step<'a> {
            Emit(&'a ArchiveEntry, usize),
            Close,
        }

        let max_depth = out.limits().max_depth;
        let mut stack = vec![Step::Emit(self, 0)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Close => out.write_end_of_directory()?,
                Step::Emit(Self::File { name, content }, _) => {
                    out.write_file_header(name, content.len() as u64)?;
                    out.write_content(&mut content.as_slice(), content.len() as u64, Path::new(name))?;
                }
                Step::Emit(Self::Directory { name, children }, depth) => {
                    if depth >= max_depth {
                        return Err(Error::DepthExceeded { max: max_depth });
                    }
                    out.write_directory(name)?;
                    stack.push(Step::Close);
                    stack.extend(children.iter().rev().map(|c| Step::Emit(c, depth + 1)));
                }
            }
        }

        Ok(())
    }

    /// parse a whole archive stream into memory
    pub fn read_all<R: BufRead>(
        reader: &mut FrameReader<R>,
        listener: &mut dyn Listener,
    ) -> Result<(Vec<ArchiveEntry>, Stats)> {
        let mut sink = TreeBuilder::default();
        let stats = walk(reader, &mut sink, listener)?;
        Ok((sink.roots, stats))
    }
}

/// builds [`ArchiveEntry`] values from decoded frames
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<ArchiveEntry>,
    /// open directories, innermost last
    open: Vec<(String, Vec<ArchiveEntry>)>,
}

impl TreeBuilder {
    fn attach(&mut self, entry: ArchiveEntry) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(entry),
            None => self.roots.push(entry),
        }
    }
}

impl FrameSink for TreeBuilder {
    fn enter_dir(&mut self, name: &str, _depth: usize) -> Result<()> {
        self.open.push((name.to_string(), Vec::new()));
        Ok(())
    }

    fn leave_dir(&mut self, _depth: usize) -> Result<()> {
        // the walker never closes more than it opened
        if let Some((name, children)) = self.open.pop() {
            self.attach(ArchiveEntry::Directory { name, children });
        }
        Ok(())
    }

    fn file<R: BufRead>(
        &mut self,
        name: &str,
        size: u64,
        _depth: usize,
        content: &mut FrameReader<R>,
    ) -> Result<()> {
        let mut data = Vec::new();
        content.copy_content(size, &mut data, Path::new(name))?;
        self.attach(ArchiveEntry::file(name, data));
        Ok(())
    }
}

/// validate an entry name
///
/// a name is a single path component; `/` only appears on the wire as the
/// directory marker.
pub fn validate_name(name: &str, limits: &Limits) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    if name.len() > limits.max_name_len {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            max: limits.max_name_len,
        });
    }
    Ok(())
}
