use std::path::PathBuf;

/// error type for framepack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path exists and is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("input is neither a directory nor a regular file: {0}")]
    InvalidInput(PathBuf),

    #[error("file name is not valid utf-8: {0}")]
    NonUtf8Name(PathBuf),

    #[error("invalid entry name: {0}")]
    InvalidEntryName(String),

    #[error("entry name exceeds {max} bytes: {name}")]
    NameTooLong { name: String, max: usize },

    #[error("field exceeds {max} bytes without a delimiter")]
    FieldTooLong { max: usize },

    #[error("invalid length field: {0:?}")]
    InvalidLength(String),

    #[error("unexpected end of archive while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("end-of-directory marker without an open directory")]
    UnbalancedSentinel,

    #[error("archive ended with {depth} unterminated directories")]
    UnterminatedDirectory { depth: usize },

    #[error("directory nesting exceeds {max} levels")]
    DepthExceeded { max: usize },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
