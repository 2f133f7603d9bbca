use std::io::BufRead;

use crate::error::{Error, Result};
use crate::format::{Frame, FrameReader};
use crate::ops::{Listener, Stats, Visit};
use crate::types::EntryKind;

/// receives decoded frames from [`walk`]
pub trait FrameSink {
    /// a directory was opened at `depth` (its own level, top-level is 0)
    fn enter_dir(&mut self, name: &str, depth: usize) -> Result<()>;

    /// the directory opened at `depth` was closed
    fn leave_dir(&mut self, depth: usize) -> Result<()>;

    /// a file frame; the sink may consume up to `size` bytes of content
    /// from `content`, any remainder is skipped by the walker
    fn file<R: BufRead>(
        &mut self,
        name: &str,
        size: u64,
        depth: usize,
        content: &mut FrameReader<R>,
    ) -> Result<()>;
}

/// decode an entire archive stream, feeding each frame to `sink`
///
/// stops at end of stream. a sentinel with no open directory, an end of
/// stream with directories still open, or nesting beyond the configured
/// depth are all fatal.
pub fn walk<R: BufRead, S: FrameSink>(
    reader: &mut FrameReader<R>,
    sink: &mut S,
    listener: &mut dyn Listener,
) -> Result<Stats> {
    let max_depth = reader.limits().max_depth;
    let mut stats = Stats::default();
    let mut depth = 0usize;

    while !reader.is_eof()? {
        match reader.read_frame()? {
            Frame::EndOfDirectory => {
                if depth == 0 {
                    return Err(Error::UnbalancedSentinel);
                }
                depth -= 1;
                sink.leave_dir(depth)?;
            }

            Frame::Directory { name } => {
                if depth >= max_depth {
                    return Err(Error::DepthExceeded { max: max_depth });
                }
                listener.visit(&Visit {
                    depth,
                    name: &name,
                    kind: EntryKind::Directory,
                    size: None,
                });
                sink.enter_dir(&name, depth)?;
                stats.directories += 1;
                depth += 1;
            }

            Frame::File { name, size } => {
                listener.visit(&Visit {
                    depth,
                    name: &name,
                    kind: EntryKind::File,
                    size: Some(size),
                });

                let start = reader.offset();
                sink.file(&name, size, depth, reader)?;
                let consumed = reader.offset() - start;
                if consumed < size {
                    reader.skip_content(size - consumed)?;
                }

                stats.files += 1;
                stats.bytes += size;
            }
        }
    }

    if depth != 0 {
        return Err(Error::UnterminatedDirectory { depth });
    }

    Ok(stats)
}
