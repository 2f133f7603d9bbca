use std::fs::{self, File, Metadata};
use std::io::{BufWriter, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::config::Limits;
use crate::error::{Error, IoResultExt, Result};
use crate::format::FrameWriter;
use crate::fs::FileType;
use crate::ops::{Listener, Stats, Visit};
use crate::types::EntryKind;

/// pending work for the tree walker
enum Work {
    Visit {
        path: PathBuf,
        name: String,
        depth: usize,
    },
    Close,
}

/// serializes filesystem trees into one archive stream
///
/// each call to [`Packer::add`] appends one top-level entry. traversal uses
/// an explicit stack, so nesting is bounded by `max_depth` rather than the
/// call stack.
pub struct Packer<'a, W: Write> {
    out: FrameWriter<W>,
    listener: &'a mut dyn Listener,
    /// (dev, ino) of a file never to pack, usually the archive itself
    exclude: Option<(u64, u64)>,
    stats: Stats,
}

impl<'a, W: Write> Packer<'a, W> {
    pub fn new(out: FrameWriter<W>, listener: &'a mut dyn Listener) -> Self {
        Self {
            out,
            listener,
            exclude: None,
            stats: Stats::default(),
        }
    }

    /// skip the file described by `meta` wherever it appears
    pub fn exclude(&mut self, meta: &Metadata) {
        self.exclude = Some((meta.dev(), meta.ino()));
    }

    /// pack `input` and everything below it as one top-level entry
    pub fn add(&mut self, input: &Path) -> Result<()> {
        let max_depth = self.out.limits().max_depth;
        let mut stack = vec![Work::Visit {
            path: input.to_path_buf(),
            name: top_level_name(input)?,
            depth: 0,
        }];

        tracing::info!(input = %input.display(), "packing");

        while let Some(work) = stack.pop() {
            let (path, name, depth) = match work {
                Work::Close => {
                    self.out.write_end_of_directory()?;
                    continue;
                }
                Work::Visit { path, name, depth } => (path, name, depth),
            };

            let (file_type, meta) = FileType::of(&path)?;
            if self.exclude == Some((meta.dev(), meta.ino())) {
                tracing::warn!(path = %path.display(), "skipping the archive being written");
                self.stats.skipped.push(path);
                continue;
            }

            match file_type {
                FileType::Directory => {
                    if depth >= max_depth {
                        return Err(Error::DepthExceeded { max: max_depth });
                    }
                    let children = read_children(&path)?;

                    self.listener.visit(&Visit {
                        depth,
                        name: &name,
                        kind: EntryKind::Directory,
                        size: None,
                    });
                    self.out.write_directory(&name)?;
                    self.stats.directories += 1;

                    stack.push(Work::Close);
                    stack.extend(children.into_iter().rev().map(|(path, name)| Work::Visit {
                        path,
                        name,
                        depth: depth + 1,
                    }));
                }

                FileType::Regular => {
                    let mut file = File::open(&path).with_path(&path)?;
                    let size = meta.len();

                    self.listener.visit(&Visit {
                        depth,
                        name: &name,
                        kind: EntryKind::File,
                        size: Some(size),
                    });
                    self.out.write_file_header(&name, size)?;
                    self.out.write_content(&mut file, size, &path)?;
                    self.stats.files += 1;
                    self.stats.bytes += size;
                }

                other => {
                    tracing::warn!(
                        path = %path.display(),
                        kind = other.type_name(),
                        "skipping non-regular entry"
                    );
                    self.stats.skipped.push(path);
                }
            }
        }

        Ok(())
    }

    /// flush the stream and hand back the sink with the accumulated counts
    pub fn finish(mut self) -> Result<(W, Stats)> {
        self.out.flush()?;
        tracing::info!(bytes = self.out.written(), stats = %self.stats, "pack complete");
        Ok((self.out.into_inner(), self.stats))
    }
}

/// pack every input, in order, into a new archive at `output`
///
/// an existing `output` is truncated. a failure midway leaves a partial
/// archive behind.
pub fn pack_paths(
    inputs: &[PathBuf],
    output: &Path,
    limits: Limits,
    listener: &mut dyn Listener,
) -> Result<Stats> {
    let file = File::create(output).with_path(output)?;
    let meta = file.metadata().with_path(output)?;

    let out = FrameWriter::new(BufWriter::new(file), output, limits);
    let mut packer = Packer::new(out, listener);
    packer.exclude(&meta);

    for input in inputs {
        packer.add(input)?;
    }

    let (_, stats) = packer.finish()?;
    Ok(stats)
}

/// directory entries in the order the os lists them, `.` and `..` excluded
fn read_children(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| Error::NonUtf8Name(path.clone()))?;
        children.push((path, name));
    }
    Ok(children)
}

/// the name a top-level input is framed under: its final component
fn top_level_name(input: &Path) -> Result<String> {
    let name = match input.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            // ".", ".." and the like name whatever they resolve to
            let resolved = input.canonicalize().with_path(input)?;
            resolved
                .file_name()
                .ok_or_else(|| Error::InvalidInput(input.to_path_buf()))?
                .to_os_string()
        }
    };

    name.into_string()
        .map_err(|_| Error::NonUtf8Name(input.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Silent;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    fn pack_one(input: &Path, limits: Limits) -> Result<(Vec<u8>, Stats)> {
        let mut listener = Silent;
        let mut packer = Packer::new(FrameWriter::new(Vec::new(), "mem", limits), &mut listener);
        packer.add(input)?;
        packer.finish()
    }

    #[test]
    fn test_pack_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "world").unwrap();

        let (bytes, stats) = pack_one(&path, Limits::default()).unwrap();
        assert_eq!(bytes, b"9:hello.txt5:world");
        assert_eq!(stats.files, 1);
        assert_eq!(stats.bytes, 5);
    }

    #[test]
    fn test_pack_scenario() {
        let dir = tempdir().unwrap();
        let d = dir.path().join("d");
        fs::create_dir(&d).unwrap();
        fs::write(d.join("a.txt"), "hi").unwrap();
        fs::create_dir(d.join("e")).unwrap();

        let (bytes, stats) = pack_one(&d, Limits::default()).unwrap();

        // child order follows the os listing
        let expected_a = b"2:d/5:a.txt2:hi2:e/0:0:".to_vec();
        let expected_b = b"2:d/2:e/0:5:a.txt2:hi0:".to_vec();
        assert!(
            bytes == expected_a || bytes == expected_b,
            "{:?}",
            String::from_utf8_lossy(&bytes)
        );
        assert_eq!(stats.directories, 2);
        assert_eq!(stats.files, 1);
    }

    #[test]
    fn test_pack_uses_final_component() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("outer/inner");
        fs::create_dir_all(&nested).unwrap();

        let (bytes, _) = pack_one(&nested, Limits::default()).unwrap();
        assert_eq!(bytes, b"6:inner/0:");
    }

    #[test]
    fn test_pack_skips_symlink() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        symlink("/etc/passwd", root.join("link")).unwrap();

        let (bytes, stats) = pack_one(&root, Limits::default()).unwrap();
        assert_eq!(bytes, b"5:root/0:");
        assert_eq!(stats.skipped, vec![root.join("link")]);
    }

    #[test]
    fn test_pack_missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        let err = pack_one(&dir.path().join("absent"), Limits::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_pack_depth_limit() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("a");
        fs::create_dir_all(root.join("b/c")).unwrap();

        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(matches!(
            pack_one(&root, limits).unwrap_err(),
            Error::DepthExceeded { max: 2 }
        ));

        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        assert!(pack_one(&root, limits).is_ok());
    }

    #[test]
    fn test_pack_rejects_long_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abcdef");
        fs::write(&path, "").unwrap();

        let limits = Limits {
            max_name_len: 5,
            ..Limits::default()
        };
        assert!(matches!(
            pack_one(&path, limits).unwrap_err(),
            Error::NameTooLong { max: 5, .. }
        ));
    }

    #[test]
    fn test_pack_rejects_non_utf8_name() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        let bad = root.join(std::ffi::OsStr::from_bytes(b"bad\xff"));
        fs::write(&bad, "").unwrap();

        assert!(matches!(
            pack_one(&root, Limits::default()).unwrap_err(),
            Error::NonUtf8Name(_)
        ));
    }

    #[test]
    fn test_top_level_name_resolves_dot() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("named");
        fs::create_dir(&inner).unwrap();

        assert_eq!(top_level_name(&inner.join(".")).unwrap(), "named");

        let parent = dir.path().canonicalize().unwrap();
        assert_eq!(
            top_level_name(&inner.join("..")).unwrap(),
            parent.file_name().unwrap().to_str().unwrap()
        );
        assert!(matches!(
            top_level_name(Path::new("/")).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn test_pack_paths_excludes_output() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("data"), "x").unwrap();
        let output = root.join("out.fp");

        let stats = pack_paths(&[root.clone()], &output, Limits::default(), &mut Silent).unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.skipped, vec![output.clone()]);

        let bytes = fs::read(&output).unwrap();
        assert_eq!(bytes, b"5:root/4:data1:x0:");
    }

    #[test]
    fn test_listener_sees_depths() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("r");
        fs::create_dir_all(root.join("s")).unwrap();
        fs::write(root.join("s/f"), "1").unwrap();

        let mut seen = Vec::new();
        {
            let mut listener = |v: &Visit<'_>| seen.push(v.to_string());
            let mut packer = Packer::new(
                FrameWriter::new(Vec::new(), "mem", Limits::default()),
                &mut listener,
            );
            packer.add(&root).unwrap();
            packer.finish().unwrap();
        }
        assert_eq!(seen, vec!["r/", "  s/", "    f"]);
    }
}
