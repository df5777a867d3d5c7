//! QPACK static table (RFC 9204 Appendix A).
//!
//! The table and its two lookup indices are built once per process and
//! shared by reference with every [`HeaderTable`](crate::HeaderTable).

use std::collections::HashMap;

use bytes::Bytes;

use crate::entry::Entry;

/// The 99 predefined field lines, indexed from 0.
const STATIC_ENTRIES: &[(&[u8], &[u8])] = &[
    (b":authority", b""),
    (b":path", b"/"),
    (b"age", b"0"),
    (b"content-disposition", b""),
    (b"content-length", b"0"),
    (b"cookie", b""),
    (b"date", b""),
    (b"etag", b""),
    (b"if-modified-since", b""),
    (b"if-none-match", b""),
    (b"last-modified", b""),
    (b"link", b""),
    (b"location", b""),
    (b"referer", b""),
    (b"set-cookie", b""),
    (b":method", b"CONNECT"),
    (b":method", b"DELETE"),
    (b":method", b"GET"),
    (b":method", b"HEAD"),
    (b":method", b"OPTIONS"),
    (b":method", b"POST"),
    (b":method", b"PUT"),
    (b":scheme", b"http"),
    (b":scheme", b"https"),
    (b":status", b"103"),
    (b":status", b"200"),
    (b":status", b"304"),
    (b":status", b"404"),
    (b":status", b"503"),
    (b"accept", b"*/*"),
    (b"accept", b"application/dns-message"),
    (b"accept-encoding", b"gzip, deflate, br"),
    (b"accept-ranges", b"bytes"),
    (b"access-control-allow-headers", b"cache-control"),
    (b"access-control-allow-headers", b"content-type"),
    (b"access-control-allow-origin", b"*"),
    (b"cache-control", b"max-age=0"),
    (b"cache-control", b"max-age=2592000"),
    (b"cache-control", b"max-age=604800"),
    (b"cache-control", b"no-cache"),
    (b"cache-control", b"no-store"),
    (b"cache-control", b"public, max-age=31536000"),
    (b"content-encoding", b"br"),
    (b"content-encoding", b"gzip"),
    (b"content-type", b"application/dns-message"),
    (b"content-type", b"application/javascript"),
    (b"content-type", b"application/json"),
    (b"content-type", b"application/x-www-form-urlencoded"),
    (b"content-type", b"image/gif"),
    (b"content-type", b"image/jpeg"),
    (b"content-type", b"image/png"),
    (b"content-type", b"text/css"),
    (b"content-type", b"text/html; charset=utf-8"),
    (b"content-type", b"text/plain"),
    (b"content-type", b"text/plain;charset=utf-8"),
    (b"range", b"bytes=0-"),
    (b"strict-transport-security", b"max-age=31536000"),
    (b"strict-transport-security", b"max-age=31536000; includesubdomains"),
    (b"strict-transport-security", b"max-age=31536000; includesubdomains; preload"),
    (b"vary", b"accept-encoding"),
    (b"vary", b"origin"),
    (b"x-content-type-options", b"nosniff"),
    (b"x-xss-protection", b"1; mode=block"),
    (b":status", b"100"),
    (b":status", b"204"),
    (b":status", b"206"),
    (b":status", b"302"),
    (b":status", b"400"),
    (b":status", b"403"),
    (b":status", b"421"),
    (b":status", b"425"),
    (b":status", b"500"),
    (b"accept-language", b""),
    (b"access-control-allow-credentials", b"FALSE"),
    (b"access-control-allow-credentials", b"TRUE"),
    (b"access-control-allow-headers", b"*"),
    (b"access-control-allow-methods", b"get"),
    (b"access-control-allow-methods", b"get, post, options"),
    (b"access-control-allow-methods", b"options"),
    (b"access-control-expose-headers", b"content-length"),
    (b"access-control-request-headers", b"content-type"),
    (b"access-control-request-method", b"get"),
    (b"access-control-request-method", b"post"),
    (b"alt-svc", b"clear"),
    (b"authorization", b""),
    (b"content-security-policy", b"script-src 'none'; object-src 'none'; base-uri 'none'"),
    (b"early-data", b"1"),
    (b"expect-ct", b""),
    (b"forwarded", b""),
    (b"if-range", b""),
    (b"origin", b""),
    (b"purpose", b"prefetch"),
    (b"server", b""),
    (b"timing-allow-origin", b"*"),
    (b"upgrade-insecure-requests", b"1"),
    (b"user-agent", b""),
    (b"x-forwarded-for", b""),
    (b"x-frame-options", b"deny"),
    (b"x-frame-options", b"sameorigin"),
];

/// Read-only static table with exact and name-only indices.
pub struct StaticTable {
    entries: Vec<Entry>,
    /// name -> value -> index.
    exact_index: HashMap<&'static [u8], HashMap<&'static [u8], u64>>,
    /// name -> lowest index carrying that name.
    name_index: HashMap<&'static [u8], u64>,
}

impl StaticTable {
    fn build() -> Self {
        let mut entries = Vec::with_capacity(STATIC_ENTRIES.len());
        let mut exact_index: HashMap<&'static [u8], HashMap<&'static [u8], u64>> = HashMap::new();
        let mut name_index = HashMap::new();

        for (index, &(name, value)) in STATIC_ENTRIES.iter().enumerate() {
            let index = index as u64;
            entries.push(Entry::new(
                Bytes::from_static(name),
                Bytes::from_static(value),
                true,
                index,
            ));
            exact_index
                .entry(name)
                .or_default()
                .entry(value)
                .or_insert(index);
            name_index.entry(name).or_insert(index);
        }

        Self {
            entries,
            exact_index,
            name_index,
        }
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: u64) -> Option<&Entry> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.entries.get(index))
    }

    /// Index of the entry matching both name and value.
    #[inline]
    pub fn find_exact(&self, name: &[u8], value: &[u8]) -> Option<u64> {
        self.exact_index
            .get(name)
            .and_then(|values| values.get(value))
            .copied()
    }

    /// Index of the first entry with this name.
    #[inline]
    pub fn find_name(&self, name: &[u8]) -> Option<u64> {
        self.name_index.get(name).copied()
    }
}

lazy_static::lazy_static! {
    static ref STATIC_TABLE: StaticTable = StaticTable::build();
}

/// Returns the process-wide static table.
pub fn static_table() -> &'static StaticTable {
    &STATIC_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_table_size() {
        assert_eq!(static_table().len(), 99);
        assert!(!static_table().is_empty());
    }

    #[test]
    fn test_exact_match() {
        let table = static_table();
        assert_eq!(table.find_exact(b":method", b"GET"), Some(17));
        assert_eq!(table.find_exact(b":status", b"200"), Some(25));
        assert_eq!(table.find_exact(b":authority", b""), Some(0));
        assert_eq!(table.find_exact(b":method", b"PATCH"), None);
    }

    #[test]
    fn test_name_match_reports_first_entry() {
        let table = static_table();
        assert_eq!(table.find_name(b":method"), Some(15));
        assert_eq!(table.find_name(b"content-type"), Some(44));
        assert_eq!(table.find_name(b":status"), Some(24));
        assert_eq!(table.find_name(b"x-custom"), None);
    }

    #[test]
    fn test_get_entry() {
        let entry = static_table().get(17).unwrap();
        assert_eq!(&entry.name()[..], b":method");
        assert_eq!(&entry.value()[..], b"GET");
        assert!(entry.is_static());
        assert_eq!(entry.insertion_index(), 17);

        assert!(static_table().get(99).is_none());
        assert!(static_table().get(u64::MAX).is_none());
    }

    #[test]
    fn test_shared_instance() {
        assert!(std::ptr::eq(static_table(), static_table()));
    }
}
