//! wire format: length-prefixed text frames
//!
//! ```text
//! entry     := dir-entry | file-entry
//! dir-entry := LEN ":" NAME "/" entry* "0:"
//! file-entry:= LEN ":" NAME LEN ":" BYTES
//! ```
//!
//! a directory's declared length counts the trailing `/`. the end of a
//! directory is the empty frame `0:`.

mod reader;
mod walk;
mod writer;

pub use reader::{Field, Frame, FrameReader};
pub use walk::{walk, FrameSink};
pub use writer::FrameWriter;

/// terminates every length field
pub const DELIM: u8 = b':';

/// last byte of a directory name as transmitted
pub const DIR_MARKER: u8 = b'/';

/// end-of-directory frame
pub const SENTINEL: &[u8] = b"0:";
