//! Header table: the static table merged with a per-connection dynamic table.
//!
//! The dynamic table is a FIFO of entries addressed by absolute index
//! (RFC 9204 Section 3.2.4). Absolute indices are assigned at insertion and
//! never reused; once an entry is evicted its index simply stops resolving.
//!
//! Two content-keyed indices speed up encoder-side lookups. Each maps to the
//! absolute index of the most recently inserted matching entry, and never to
//! an evicted one.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::QpackConfig;
use crate::entry::{entry_size, Entry, ENTRY_SIZE_OVERHEAD};
use crate::error::{Error, Result};
use crate::static_table::{static_table, StaticTable};

/// Result of [`HeaderTable::find_header_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    /// Neither table has an entry with this name.
    NoMatch,
    /// An entry with the same name but a different value.
    Name { is_static: bool, index: u64 },
    /// An entry with the same name and value.
    NameAndValue { is_static: bool, index: u64 },
}

/// Static and dynamic header tables for one side of a connection.
pub struct HeaderTable {
    static_table: &'static StaticTable,

    /// Live dynamic entries, oldest first.
    dynamic_entries: VecDeque<Entry>,
    /// Sum of the sizes of `dynamic_entries`.
    dynamic_table_size: u64,
    dynamic_table_capacity: u64,
    maximum_dynamic_table_capacity: u64,
    max_entries: u64,
    /// Number of dynamic entries evicted so far; absolute index of the front.
    dropped_entry_count: u64,

    /// name -> value -> absolute index of the newest live entry.
    dynamic_index: HashMap<Bytes, HashMap<Bytes, u64>>,
    /// name -> absolute index of the newest live entry with that name.
    dynamic_name_index: HashMap<Bytes, u64>,
}

impl HeaderTable {
    /// Creates a header table with the negotiated maximum dynamic table
    /// capacity.
    ///
    /// The maximum is fixed for the lifetime of the table; the current
    /// capacity starts out equal to it and can only be lowered (or raised back
    /// up to it) through [`update_table_size`](Self::update_table_size).
    pub fn new(maximum_dynamic_table_capacity: u64) -> Self {
        Self {
            static_table: static_table(),
            dynamic_entries: VecDeque::new(),
            dynamic_table_size: 0,
            dynamic_table_capacity: maximum_dynamic_table_capacity,
            maximum_dynamic_table_capacity,
            max_entries: maximum_dynamic_table_capacity / ENTRY_SIZE_OVERHEAD,
            dropped_entry_count: 0,
            dynamic_index: HashMap::new(),
            dynamic_name_index: HashMap::new(),
        }
    }

    /// Creates a header table sized by `config.max_table_capacity`.
    pub fn from_config(config: &QpackConfig) -> Self {
        Self::new(config.max_table_capacity)
    }

    /// Returns the entry at `index` in the static table, or at absolute
    /// `index` in the dynamic table.
    ///
    /// Evicted and not-yet-inserted dynamic indices return `None`.
    pub fn lookup_entry(&self, is_static: bool, index: u64) -> Option<&Entry> {
        if is_static {
            return self.static_table.get(index);
        }

        let offset = index.checked_sub(self.dropped_entry_count)?;
        usize::try_from(offset)
            .ok()
            .and_then(|offset| self.dynamic_entries.get(offset))
    }

    /// Finds the best entry for a header field.
    ///
    /// Exact matches win over name-only matches. Within each kind the static
    /// table is consulted before the dynamic table.
    pub fn find_header_field(&self, name: &[u8], value: &[u8]) -> FieldMatch {
        if let Some(index) = self.static_table.find_exact(name, value) {
            return FieldMatch::NameAndValue {
                is_static: true,
                index,
            };
        }

        if let Some(&index) = self
            .dynamic_index
            .get(name)
            .and_then(|values| values.get(value))
        {
            return FieldMatch::NameAndValue {
                is_static: false,
                index,
            };
        }

        if let Some(index) = self.static_table.find_name(name) {
            return FieldMatch::Name {
                is_static: true,
                index,
            };
        }

        if let Some(&index) = self.dynamic_name_index.get(name) {
            return FieldMatch::Name {
                is_static: false,
                index,
            };
        }

        FieldMatch::NoMatch
    }

    /// Inserts an entry into the dynamic table, evicting the oldest entries
    /// as needed.
    ///
    /// Fails without modifying the table if the entry is larger than the
    /// current capacity.
    pub fn insert_entry(&mut self, name: &[u8], value: &[u8]) -> Result<&Entry> {
        let size = entry_size(name, value);
        if size > self.dynamic_table_capacity {
            debug!(
                size,
                capacity = self.dynamic_table_capacity,
                "rejecting dynamic table entry larger than capacity"
            );
            return Err(Error::EntryTooLarge(size, self.dynamic_table_capacity));
        }

        let index = self.inserted_entry_count();
        let name = Bytes::copy_from_slice(name);
        let value = Bytes::copy_from_slice(value);

        self.dynamic_entries
            .push_back(Entry::new(name.clone(), value.clone(), false, index));
        self.dynamic_table_size += size;
        self.evict_down_to_current_capacity();

        // Newest entry wins for both keys.
        self.dynamic_index
            .entry(name.clone())
            .or_default()
            .insert(value, index);
        self.dynamic_name_index.insert(name, index);

        trace!(
            index,
            size,
            table_size = self.dynamic_table_size,
            "inserted dynamic table entry"
        );

        Ok(&self.dynamic_entries[(index - self.dropped_entry_count) as usize])
    }

    /// Sets the dynamic table capacity, evicting entries that no longer fit.
    ///
    /// Fails if `max_size` exceeds the negotiated maximum.
    pub fn update_table_size(&mut self, max_size: u64) -> Result<()> {
        if max_size > self.maximum_dynamic_table_capacity {
            debug!(
                requested = max_size,
                maximum = self.maximum_dynamic_table_capacity,
                "rejecting dynamic table capacity above maximum"
            );
            return Err(Error::CapacityExceedsMaximum(
                max_size,
                self.maximum_dynamic_table_capacity,
            ));
        }

        debug!(
            from = self.dynamic_table_capacity,
            to = max_size,
            "updating dynamic table capacity"
        );
        self.dynamic_table_capacity = max_size;
        self.evict_down_to_current_capacity();

        debug_assert!(self.dynamic_table_size <= self.dynamic_table_capacity);
        Ok(())
    }

    fn evict_down_to_current_capacity(&mut self) {
        while self.dynamic_table_size > self.dynamic_table_capacity {
            let Some(entry) = self.dynamic_entries.pop_front() else {
                unreachable!(
                    "dynamic table size {} with no entries",
                    self.dynamic_table_size
                );
            };

            let size = entry.size();
            debug_assert!(self.dynamic_table_size >= size);
            self.dynamic_table_size -= size;

            // A newer entry with the same key may own the index slot by now.
            let index = entry.insertion_index();
            let name: &[u8] = entry.name();
            let value: &[u8] = entry.value();
            if let Some(values) = self.dynamic_index.get_mut(name) {
                if values.get(value) == Some(&index) {
                    values.remove(value);
                    if values.is_empty() {
                        self.dynamic_index.remove(name);
                    }
                }
            }
            if self.dynamic_name_index.get(name) == Some(&index) {
                self.dynamic_name_index.remove(name);
            }

            self.dropped_entry_count += 1;
            trace!(index, size, "evicted dynamic table entry");
        }
    }

    /// The shared static table.
    pub fn static_table(&self) -> &'static StaticTable {
        self.static_table
    }

    /// Sum of the sizes of all live dynamic entries.
    pub fn dynamic_table_size(&self) -> u64 {
        self.dynamic_table_size
    }

    pub fn dynamic_table_capacity(&self) -> u64 {
        self.dynamic_table_capacity
    }

    pub fn maximum_dynamic_table_capacity(&self) -> u64 {
        self.maximum_dynamic_table_capacity
    }

    /// Maximum number of entries the table could hold, used to encode the
    /// Required Insert Count (RFC 9204 Section 4.5.1.1).
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    pub fn dropped_entry_count(&self) -> u64 {
        self.dropped_entry_count
    }

    /// Total number of entries ever inserted; the next absolute index.
    pub fn inserted_entry_count(&self) -> u64 {
        self.dropped_entry_count + self.dynamic_entries.len() as u64
    }

    /// Number of live dynamic entries.
    pub fn dynamic_entry_count(&self) -> usize {
        self.dynamic_entries.len()
    }
}
