use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{IoResultExt, Result};
use crate::format::{walk, FrameReader, FrameSink};
use crate::fs::materialize;
use crate::ops::{Listener, Stats};

/// writes decoded frames under a base directory
///
/// `cursor` is the directory the next frame lands in. it is pushed on every
/// directory frame and popped on every sentinel; the process cwd is never
/// touched.
struct DiskWriter {
    cursor: PathBuf,
    dir_mode: u32,
}

impl FrameSink for DiskWriter {
    fn enter_dir(&mut self, name: &str, _depth: usize) -> Result<()> {
        self.cursor.push(name);
        materialize(&self.cursor, self.dir_mode)
    }

    fn leave_dir(&mut self, _depth: usize) -> Result<()> {
        self.cursor.pop();
        Ok(())
    }

    fn file<R: BufRead>(
        &mut self,
        name: &str,
        size: u64,
        _depth: usize,
        content: &mut FrameReader<R>,
    ) -> Result<()> {
        let path = self.cursor.join(name);
        // File::create truncates an existing file
        let file = File::create(&path).with_path(&path)?;
        let mut out = BufWriter::new(file);
        content.copy_content(size, &mut out, &path)?;
        out.flush().with_path(&path)?;
        tracing::debug!(path = %path.display(), size, "wrote file");
        Ok(())
    }
}

/// reconstruct the tree in an archive stream under `target`
///
/// `target` is created if missing. entries are written as they are parsed;
/// a failure midway leaves whatever was already written.
pub fn unpack<R: BufRead>(
    reader: &mut FrameReader<R>,
    target: &Path,
    dir_mode: u32,
    listener: &mut dyn Listener,
) -> Result<Stats> {
    materialize(target, dir_mode)?;

    let mut sink = DiskWriter {
        cursor: target.to_path_buf(),
        dir_mode,
    };
    let stats = walk(reader, &mut sink, listener)?;

    tracing::info!(target = %target.display(), stats = %stats, "unpack complete");
    Ok(stats)
}

/// open `archive` and unpack it under `target`
pub fn unpack_file(
    archive: &Path,
    target: &Path,
    config: &Config,
    listener: &mut dyn Listener,
) -> Result<Stats> {
    let file = File::open(archive).with_path(archive)?;
    let mut reader = FrameReader::new(BufReader::new(file), archive, config.limits);
    unpack(&mut reader, target, config.dir_mode, listener)
}
