use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::Limits;
use crate::error::{Error, IoResultExt, Result};
use crate::format::{DELIM, DIR_MARKER};
use crate::types::validate_name;

/// one delimited field pulled from the stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub bytes: Vec<u8>,
    /// false if the stream ended before the delimiter
    pub delimited: bool,
}

/// a decoded frame header
///
/// file content is left in the stream; the caller consumes it with
/// [`FrameReader::copy_content`] or [`FrameReader::skip_content`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    EndOfDirectory,
    Directory { name: String },
    File { name: String, size: u64 },
}

/// reads frames from an archive stream
pub struct FrameReader<R> {
    inner: R,
    path: PathBuf,
    limits: Limits,
    offset: u64,
}

impl<R: BufRead> FrameReader<R> {
    /// `path` labels io errors; it is never opened
    pub fn new(inner: R, path: impl Into<PathBuf>, limits: Limits) -> Self {
        Self {
            inner,
            path: path.into(),
            limits,
            offset: 0,
        }
    }

    /// bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// peek for end of stream without consuming anything
    pub fn is_eof(&mut self) -> Result<bool> {
        let buf = self.inner.fill_buf().with_path(&self.path)?;
        Ok(buf.is_empty())
    }

    /// read up to the next `delim`, which is consumed but not returned
    ///
    /// more than `max` bytes before the delimiter is an error. end of stream
    /// ends the field early with whatever was read.
    pub fn next_field(&mut self, delim: u8, max: usize) -> Result<Field> {
        let mut bytes = Vec::new();

        loop {
            let (found, used) = {
                let available = self.inner.fill_buf().with_path(&self.path)?;
                if available.is_empty() {
                    return Ok(Field {
                        bytes,
                        delimited: false,
                    });
                }

                match available.iter().position(|&b| b == delim) {
                    Some(i) => {
                        if bytes.len() + i > max {
                            return Err(Error::FieldTooLong { max });
                        }
                        bytes.extend_from_slice(&available[..i]);
                        (true, i + 1)
                    }
                    None => {
                        if bytes.len() + available.len() > max {
                            return Err(Error::FieldTooLong { max });
                        }
                        bytes.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };

            self.consume(used);
            if found {
                return Ok(Field {
                    bytes,
                    delimited: true,
                });
            }
        }
    }

    /// read a decimal length terminated by `:`
    pub fn read_len(&mut self, context: &'static str) -> Result<u64> {
        let field = self.next_field(DELIM, self.limits.max_len_digits)?;
        if !field.delimited {
            return Err(Error::UnexpectedEof { context });
        }
        parse_len(&field.bytes)
    }

    /// read exactly `len` bytes of entry name
    pub fn read_name(&mut self, len: u64) -> Result<Vec<u8>> {
        // directory names carry one extra byte for the marker
        let max = self.limits.max_name_len + 1;
        if len > max as u64 {
            return Err(Error::FieldTooLong { max });
        }

        let mut name = vec![0u8; len as usize];
        let mut filled = 0;
        while filled < name.len() {
            let n = {
                let available = self.inner.fill_buf().with_path(&self.path)?;
                if available.is_empty() {
                    return Err(Error::UnexpectedEof {
                        context: "entry name",
                    });
                }
                let n = available.len().min(name.len() - filled);
                name[filled..filled + n].copy_from_slice(&available[..n]);
                n
            };
            self.consume(n);
            filled += n;
        }

        Ok(name)
    }

    /// read the next frame header
    pub fn read_frame(&mut self) -> Result<Frame> {
        let start = self.offset;
        let len = self.read_len("name length")?;
        if len == 0 {
            tracing::debug!(offset = start, "read end-of-directory frame");
            return Ok(Frame::EndOfDirectory);
        }

        let raw = self.read_name(len)?;
        let frame = match raw.split_last() {
            Some((&DIR_MARKER, stem)) => Frame::Directory {
                name: self.decode_name(stem)?,
            },
            _ => {
                let name = self.decode_name(&raw)?;
                let size = self.read_len("file length")?;
                Frame::File { name, size }
            }
        };

        tracing::debug!(offset = start, frame = ?frame, "read frame");
        Ok(frame)
    }

    /// copy exactly `len` content bytes into `dest`
    pub fn copy_content<W: Write>(&mut self, len: u64, dest: &mut W, dest_path: &Path) -> Result<()> {
        let mut remaining = len;
        while remaining > 0 {
            let n = {
                let available = self.inner.fill_buf().with_path(&self.path)?;
                if available.is_empty() {
                    return Err(Error::UnexpectedEof {
                        context: "file content",
                    });
                }
                let n = (available.len() as u64).min(remaining) as usize;
                dest.write_all(&available[..n]).with_path(dest_path)?;
                n
            };
            self.consume(n);
            remaining -= n as u64;
        }
        Ok(())
    }

    /// discard exactly `len` content bytes
    pub fn skip_content(&mut self, len: u64) -> Result<()> {
        self.copy_content(len, &mut std::io::sink(), Path::new("<sink>"))
    }

    fn decode_name(&self, raw: &[u8]) -> Result<String> {
        let name = std::str::from_utf8(raw).map_err(|_| {
            Error::InvalidEntryName(format!(
                "name is not utf-8: {}",
                String::from_utf8_lossy(raw)
            ))
        })?;
        validate_name(name, &self.limits)?;
        Ok(name.to_string())
    }

    fn consume(&mut self, n: usize) {
        self.inner.consume(n);
        self.offset += n as u64;
    }
}

/// parse a decimal length field; digits only, no sign
fn parse_len(bytes: &[u8]) -> Result<u64> {
    let invalid = || Error::InvalidLength(String::from_utf8_lossy(bytes).into_owned());

    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }

    // all ascii digits, so utf-8 is guaranteed
    let text = std::str::from_utf8(bytes).map_err(|_| invalid())?;
    text.parse::<u64>().map_err(|_| invalid())
}
