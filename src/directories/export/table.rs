//! The merged, ordered export table.

use super::{header::ExportDirectoryHeader, ExportEntry, ENTRYPOINT_NAME};
use crate::{file::parser::Parser, Result};

/// The export table of a module: the module's declared name plus its exports, sorted by
/// ascending address (ties broken by ascending ordinal).
///
/// The table is built once from the decoded directory arrays and is immutable afterwards;
/// re-reading a module replaces the table wholesale. It is move-only: there is no implicit
/// duplication of a structure a consumer treats as the authoritative view of a module's
/// surface.
///
/// Insertion order from the raw PE arrays is not preserved; the sorted order is the only
/// ordering contract, and [`ExportTable::find_by_address`] binary-searches by it.
#[derive(Debug, Default)]
pub struct ExportTable {
    /// The name of the module which exports these functions
    module: String,
    /// All exports, sorted by (address, ordinal)
    entries: Vec<ExportEntry>,
}

impl ExportTable {
    /// Builds the table by merging the decoded directory arrays.
    ///
    /// The reconciliation works in two passes: every address-table slot becomes a
    /// candidate entry with its base-adjusted ordinal and no name, then each name is
    /// attached to the slot its name-ordinal selects. Slots no name points at stay
    /// ordinal-only exports. When the source data aliases several names onto one slot the
    /// last write wins; that case is not validated.
    ///
    /// A non-zero `entry_point` appends one synthetic entry named
    /// [`ENTRYPOINT_NAME`] with an ordinal one past the highest ordinal seen (or the
    /// ordinal base for an otherwise empty table), so a consumer sees the module's start
    /// address uniformly alongside real exports.
    ///
    /// The caller is expected to have validated the arrays against the header
    /// ([`ExportDirectoryHeader::read`] and the decoder do); a name-ordinal outside the
    /// address table is ignored here.
    #[must_use]
    pub fn build(
        header: &ExportDirectoryHeader,
        addresses: &[u32],
        name_ordinals: &[u16],
        names: Vec<String>,
        module: String,
        entry_point: u32,
    ) -> ExportTable {
        let mut entries: Vec<ExportEntry> = addresses
            .iter()
            .enumerate()
            .map(|(index, &address)| ExportEntry {
                address,
                ordinal: u16::try_from(u64::from(header.ordinal_base) + index as u64)
                    .unwrap_or(u16::MAX),
                name: None,
            })
            .collect();

        for (&slot, name) in name_ordinals.iter().zip(names) {
            if let Some(entry) = entries.get_mut(usize::from(slot)) {
                entry.name = Some(name);
            }
        }

        if entry_point != 0 {
            let ordinal = match entries.iter().map(|entry| entry.ordinal).max() {
                Some(highest) => highest.saturating_add(1),
                None => u16::try_from(header.ordinal_base).unwrap_or(u16::MAX),
            };

            entries.push(ExportEntry {
                address: entry_point,
                ordinal,
                name: Some(ENTRYPOINT_NAME.to_string()),
            });
        }

        entries.sort_unstable();

        ExportTable { module, entries }
    }

    /// The name of the module these exports belong to.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in sorted order.
    #[must_use]
    pub fn as_slice(&self) -> &[ExportEntry] {
        &self.entries
    }

    /// Iterates the entries in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExportEntry> {
        self.entries.iter()
    }

    /// Looks up an entry by its exact address.
    ///
    /// Binary search over the sorted table. When several entries share the address, the
    /// one with the lowest ordinal is returned.
    #[must_use]
    pub fn find_by_address(&self, address: u32) -> Option<&ExportEntry> {
        let index = self.entries.partition_point(|entry| entry.address < address);
        self.entries
            .get(index)
            .filter(|entry| entry.address == address)
    }

    /// Serializes the whole table into `buffer`: the module name (32-bit length prefix
    /// plus UTF-8 bytes), the entry count, then every entry in stored order via
    /// [`ExportEntry::serialize`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&(self.module.len() as u32).to_le_bytes());
        buffer.extend_from_slice(self.module.as_bytes());
        buffer.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        for entry in &self.entries {
            entry.serialize(buffer);
        }
    }

    /// Deserializes a table from the round-trip format written by
    /// [`ExportTable::serialize`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is truncated or
    /// [`crate::Error::Malformed`] if a string is not valid UTF-8.
    pub fn deserialize(parser: &mut Parser) -> Result<ExportTable> {
        let module_length = parser.read_le::<u32>()? as usize;
        let module = parser.read_utf8(module_length)?;

        let count = parser.read_le::<u32>()? as usize;
        let mut entries = Vec::with_capacity(count.min(0x1_0000));
        for _ in 0..count {
            entries.push(ExportEntry::deserialize(parser)?);
        }

        Ok(ExportTable { module, entries })
    }
}

impl<'a> IntoIterator for &'a ExportTable {
    type Item = &'a ExportEntry;
    type IntoIter = std::slice::Iter<'a, ExportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
