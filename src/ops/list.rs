use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::error::{IoResultExt, Result};
use crate::format::{walk, FrameReader, FrameSink};
use crate::ops::{Listener, Stats};

/// accepts frames without acting on them; the walker skips file content
struct Discard;

impl FrameSink for Discard {
    fn enter_dir(&mut self, _name: &str, _depth: usize) -> Result<()> {
        Ok(())
    }

    fn leave_dir(&mut self, _depth: usize) -> Result<()> {
        Ok(())
    }

    fn file<R: BufRead>(
        &mut self,
        _name: &str,
        _size: u64,
        _depth: usize,
        _content: &mut FrameReader<R>,
    ) -> Result<()> {
        Ok(())
    }
}

/// walk an archive stream without writing anything, checking its framing
pub fn list<R: BufRead>(reader: &mut FrameReader<R>, listener: &mut dyn Listener) -> Result<Stats> {
    walk(reader, &mut Discard, listener)
}

/// open `archive` and list it
pub fn list_file(archive: &Path, config: &Config, listener: &mut dyn Listener) -> Result<Stats> {
    let file = File::open(archive).with_path(archive)?;
    let mut reader = FrameReader::new(BufReader::new(file), archive, config.limits);
    list(&mut reader, listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::ops::Visit;
    use crate::Error;
    use std::io::Cursor;

    fn list_bytes(data: &[u8]) -> Result<(Vec<String>, Stats)> {
        let mut lines = Vec::new();
        let mut listener = |v: &Visit<'_>| lines.push(v.to_string());
        let mut reader = FrameReader::new(Cursor::new(data.to_vec()), "mem", Limits::default());
        let stats = list(&mut reader, &mut listener)?;
        Ok((lines, stats))
    }

    #[test]
    fn test_list_scenario() {
        let (lines, stats) = list_bytes(b"2:d/5:a.txt2:hi2:e/0:0:").unwrap();
        assert_eq!(lines, vec!["d/", "  a.txt", "  e/"]);
        assert_eq!(stats.bytes, 2);
    }

    #[test]
    fn test_list_detects_corruption() {
        assert!(matches!(
            list_bytes(b"2:d/0:0:").unwrap_err(),
            Error::UnbalancedSentinel
        ));
        assert!(matches!(
            list_bytes(b"x:").unwrap_err(),
            Error::InvalidLength(_)
        ));
        assert!(matches!(
            list_bytes(b"1:f5:ab").unwrap_err(),
            Error::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_list_binary_content() {
        let mut data = b"3:bin4:".to_vec();
        data.extend_from_slice(b"0:/:");
        let (lines, stats) = list_bytes(&data).unwrap();
        assert_eq!(lines, vec!["bin"]);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.directories, 0);
    }
}
