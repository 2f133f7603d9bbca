use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::Limits;
use crate::error::{IoResultExt, Result};
use crate::format::SENTINEL;
use crate::types::validate_name;

/// emits frames to an archive sink
pub struct FrameWriter<W> {
    inner: W,
    path: PathBuf,
    limits: Limits,
    written: u64,
}

impl<W: Write> FrameWriter<W> {
    /// `path` labels io errors; it is never opened
    pub fn new(inner: W, path: impl Into<PathBuf>, limits: Limits) -> Self {
        Self {
            inner,
            path: path.into(),
            limits,
            written: 0,
        }
    }

    /// bytes emitted so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// `<len+1>:<name>/`
    pub fn write_directory(&mut self, name: &str) -> Result<()> {
        validate_name(name, &self.limits)?;
        let header = format!("{}:{}/", name.len() + 1, name);
        tracing::debug!(offset = self.written, %name, "write directory frame");
        self.put(header.as_bytes())
    }

    /// `<len>:<name><size>:`, to be followed by exactly `size` content bytes
    pub fn write_file_header(&mut self, name: &str, size: u64) -> Result<()> {
        validate_name(name, &self.limits)?;
        let header = format!("{}:{}{}:", name.len(), name, size);
        tracing::debug!(offset = self.written, %name, size, "write file frame");
        self.put(header.as_bytes())
    }

    /// copy exactly `size` bytes from `src`
    ///
    /// a source that yields fewer bytes than announced fails rather than
    /// leaving a short frame behind.
    pub fn write_content<R: Read>(&mut self, src: &mut R, size: u64, src_path: &Path) -> Result<()> {
        let mut buf = [0u8; 64 * 1024];
        let mut remaining = size;
        while remaining > 0 {
            let want = (buf.len() as u64).min(remaining) as usize;
            let n = match src.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("file shrank while packing, {} bytes missing", remaining),
                    ))
                    .with_path(src_path);
                }
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).with_path(src_path),
            };
            self.put(&buf[..n])?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// `0:`
    pub fn write_end_of_directory(&mut self) -> Result<()> {
        tracing::debug!(offset = self.written, "write end-of-directory frame");
        self.put(SENTINEL)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().with_path(&self.path)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).with_path(&self.path)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn writer() -> FrameWriter<Vec<u8>> {
        FrameWriter::new(Vec::new(), "test.fp", Limits::default())
    }

    #[test]
    fn test_directory_frame_counts_marker() {
        let mut w = writer();
        w.write_directory("d").unwrap();
        w.write_end_of_directory().unwrap();
        assert_eq!(w.into_inner(), b"2:d/0:");
    }

    #[test]
    fn test_file_frame() {
        let mut w = writer();
        w.write_file_header("a.txt", 2).unwrap();
        w.write_content(&mut &b"hi"[..], 2, Path::new("a.txt")).unwrap();
        assert_eq!(w.written(), 11);
        assert_eq!(w.into_inner(), b"5:a.txt2:hi");
    }

    #[test]
    fn test_content_is_not_escaped() {
        let mut w = writer();
        w.write_file_header("x", 3).unwrap();
        w.write_content(&mut &b":/:"[..], 3, Path::new("x")).unwrap();
        assert_eq!(w.into_inner(), b"1:x3::/:");
    }

    #[test]
    fn test_content_short_source_fails() {
        let mut w = writer();
        w.write_file_header("x", 10).unwrap();
        let err = w
            .write_content(&mut &b"abc"[..], 10, Path::new("x"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_content_longer_source_is_cut_at_size() {
        let mut w = writer();
        w.write_file_header("x", 2).unwrap();
        w.write_content(&mut &b"abcdef"[..], 2, Path::new("x")).unwrap();
        assert_eq!(w.into_inner(), b"1:x2:ab");
    }

    #[test]
    fn test_rejects_long_name() {
        let mut w = FrameWriter::new(
            Vec::new(),
            "test.fp",
            Limits {
                max_name_len: 3,
                ..Limits::default()
            },
        );
        w.write_directory("abc").unwrap();
        let err = w.write_file_header("abcd", 0).unwrap_err();
        assert!(matches!(err, Error::NameTooLong { max: 3, .. }));
    }
}
