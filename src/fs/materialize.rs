use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::stat::Mode;

use crate::error::{Error, IoResultExt, Result};

/// create `path` and every missing ancestor as directories
///
/// walks the path left to right. a prefix that exists as anything other
/// than a directory is [`Error::NotADirectory`]; any other failure is an
/// io error. re-running on a materialized path is a no-op.
pub fn materialize(path: &Path, mode: u32) -> Result<()> {
    let mut prefix = PathBuf::new();

    for component in path.components() {
        prefix.push(component);

        match fs::metadata(&prefix) {
            Ok(meta) if meta.is_dir() => continue,
            Ok(_) => return Err(Error::NotADirectory(prefix)),
            Err(e) if e.kind() == ErrorKind::NotFound => create_dir(&prefix, mode)?,
            Err(e) => return Err(e).with_path(prefix),
        }
    }

    Ok(())
}

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    match nix::unistd::mkdir(path, Mode::from_bits_truncate(mode as _)) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), mode = format_args!("{:o}", mode), "created directory");
            Ok(())
        }
        // lost a race with another creator; fine as long as it is a directory
        Err(Errno::EEXIST) if path.is_dir() => Ok(()),
        Err(Errno::EEXIST) => Err(Error::NotADirectory(path.to_path_buf())),
        Err(errno) => Err(std::io::Error::from(errno)).with_path(path),
    }
}
