//! QPACK configuration.
//!
//! Deserializable from the `[qpack]` section of a TOML configuration file.

use serde::{Deserialize, Serialize};

use crate::integer::MAX_INTEGER;

/// Default maximum dynamic table capacity (4 KB).
pub const DEFAULT_MAX_TABLE_CAPACITY: u64 = 4096;

/// Whether string literals may be Huffman-encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuffmanEncoding {
    /// Huffman-encode a string whenever that makes it strictly shorter.
    #[default]
    Enabled,
    /// Always send strings raw.
    Disabled,
}

/// Header table and instruction encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QpackConfig {
    /// Maximum dynamic table capacity in bytes (default: 4096).
    ///
    /// RFC 9204 Section 3.2.3: advertised in SETTINGS_QPACK_MAX_TABLE_CAPACITY.
    /// Zero disables the dynamic table; only the static table is used.
    pub max_table_capacity: u64,

    /// Huffman-encode string literals when shorter (default: enabled).
    pub huffman: HuffmanEncoding,
}

impl Default for QpackConfig {
    fn default() -> Self {
        Self {
            max_table_capacity: DEFAULT_MAX_TABLE_CAPACITY,
            huffman: HuffmanEncoding::default(),
        }
    }
}

impl QpackConfig {
    /// Validate configuration.
    ///
    /// Returns `Ok(())` if valid, or a list of error messages if invalid.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Set Dynamic Table Capacity carries the value as a prefix integer.
        if self.max_table_capacity > MAX_INTEGER {
            errors.push(format!(
                "max_table_capacity ({}) exceeds the largest QPACK integer ({})",
                self.max_table_capacity, MAX_INTEGER
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
