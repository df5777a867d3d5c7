//! Header table entry.
//!
//! An entry is a name-value pair tagged with the table it lives in and its
//! index there. Entries are never modified after creation.

use bytes::Bytes;
use std::fmt;

/// Per-entry overhead counted against the dynamic table capacity.
///
/// RFC 9204 Section 3.2.1: size = name length + value length + 32.
pub const ENTRY_SIZE_OVERHEAD: u64 = 32;

/// Returns the size an entry with this name and value occupies in the
/// dynamic table.
#[inline]
pub fn entry_size(name: &[u8], value: &[u8]) -> u64 {
    name.len() as u64 + value.len() as u64 + ENTRY_SIZE_OVERHEAD
}

/// An immutable static or dynamic table entry.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    name: Bytes,
    value: Bytes,
    is_static: bool,
    insertion_index: u64,
}

impl Entry {
    pub(crate) fn new(name: Bytes, value: Bytes, is_static: bool, insertion_index: u64) -> Self {
        Self {
            name,
            value,
            is_static,
            insertion_index,
        }
    }

    pub fn name(&self) -> &Bytes {
        &self.name
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// True for static table entries.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Position in the static table, or absolute index in the dynamic table.
    pub fn insertion_index(&self) -> u64 {
        self.insertion_index
    }

    /// Size of this entry for dynamic table accounting.
    pub fn size(&self) -> u64 {
        entry_size(&self.name, &self.value)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry({} #{}: {:?}: {:?})",
            if self.is_static { "static" } else { "dynamic" },
            self.insertion_index,
            String::from_utf8_lossy(&self.name),
            String::from_utf8_lossy(&self.value)
        )
    }
}
