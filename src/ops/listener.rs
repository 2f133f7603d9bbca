//! progress callbacks for pack, unpack and list

use std::fmt;

use crate::types::EntryKind;

/// one entry as it is packed, unpacked or listed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit<'a> {
    /// nesting level, top-level entries are 0
    pub depth: usize,
    pub name: &'a str,
    pub kind: EntryKind,
    /// content length for files
    pub size: Option<u64>,
}

impl fmt::Display for Visit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str("  ")?;
        }
        match self.kind {
            EntryKind::Directory => write!(f, "{}/", self.name),
            EntryKind::File => f.write_str(self.name),
        }
    }
}

/// receives a [`Visit`] for every entry
pub trait Listener {
    fn visit(&mut self, visit: &Visit<'_>);
}

impl<F> Listener for F
where
    F: FnMut(&Visit<'_>),
{
    fn visit(&mut self, visit: &Visit<'_>) {
        self(visit)
    }
}

/// discards every visit
pub struct Silent;

impl Listener for Silent {
    fn visit(&mut self, _visit: &Visit<'_>) {}
}
