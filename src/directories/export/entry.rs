//! A single entry of the export table.

use crate::{file::parser::Parser, Result};

/// One export of a PE module: an ordinal, an address, and optionally a name.
///
/// Entries come in two shapes. A named export was reconciled from the name pointer and
/// name ordinal tables; an unnamed export originates purely from its position in the
/// export address table and is reachable only by ordinal. `address` of zero is a valid
/// "thunked" indicator. An address pointing back into the export section conventionally
/// marks a forwarder to another module; classifying and resolving forwarders is the
/// consumer's responsibility (see
/// [`DirectoryLocation::contains`](crate::directories::DirectoryLocation::contains)).
///
/// Entries order by ascending `address`, ties broken by ascending `ordinal` (the derived
/// field order below). This is the one comparison the type defines; the export table is
/// stored and displayed in this order and binary-searches by it.
///
/// # Examples
///
/// ```rust
/// use edata::directories::export::ExportEntry;
///
/// let entry = ExportEntry {
///     address: 0x1100,
///     ordinal: 1,
///     name: Some("Foo".to_string()),
/// };
///
/// assert!(entry.has_name());
/// assert!(entry.is_valid());
///
/// let mut buffer = Vec::new();
/// entry.serialize(&mut buffer);
/// let restored = ExportEntry::deserialize(&mut edata::Parser::new(&buffer))?;
/// assert_eq!(entry, restored);
/// # Ok::<(), edata::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExportEntry {
    /// The relative virtual address of the exported symbol
    pub address: u32,
    /// The ordinal number, valid for every export
    pub ordinal: u16,
    /// The export's name, `None` for ordinal-only exports
    pub name: Option<String>,
}

impl ExportEntry {
    /// Returns `true` if this export is referenced by name.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// The export's name, or the empty string for ordinal-only exports.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns `true` if this entry is internally consistent.
    ///
    /// A named export must carry a non-empty name; the ordinal range is guaranteed by the
    /// field type. Invalid entries are a data-integrity signal to the caller, not rejected
    /// automatically: the table keeps them and callers may filter.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.name.as_ref().map_or(true, |name| !name.is_empty())
    }

    /// Serializes this entry into `buffer`.
    ///
    /// Field order is fixed: a one-byte name-presence flag, the name (32-bit length prefix
    /// plus UTF-8 bytes) when present, the 32-bit address, the 16-bit ordinal. All
    /// integers little-endian. This is the crate's round-trip format, not the PE byte
    /// layout.
    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize(&self, buffer: &mut Vec<u8>) {
        match &self.name {
            Some(name) => {
                buffer.push(1);
                buffer.extend_from_slice(&(name.len() as u32).to_le_bytes());
                buffer.extend_from_slice(name.as_bytes());
            }
            None => buffer.push(0),
        }

        buffer.extend_from_slice(&self.address.to_le_bytes());
        buffer.extend_from_slice(&self.ordinal.to_le_bytes());
    }

    /// Deserializes one entry from the round-trip format written by
    /// [`ExportEntry::serialize`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer is truncated or
    /// [`crate::Error::Malformed`] if the name bytes are not valid UTF-8.
    pub fn deserialize(parser: &mut Parser) -> Result<ExportEntry> {
        let name = if parser.read_le::<u8>()? != 0 {
            let length = parser.read_le::<u32>()? as usize;
            Some(parser.read_utf8(length)?)
        } else {
            None
        };

        let address = parser.read_le::<u32>()?;
        let ordinal = parser.read_le::<u16>()?;

        Ok(ExportEntry {
            address,
            ordinal,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(address: u32, ordinal: u16, name: &str) -> ExportEntry {
        ExportEntry {
            address,
            ordinal,
            name: Some(name.to_string()),
        }
    }

    fn by_ordinal(address: u32, ordinal: u16) -> ExportEntry {
        ExportEntry {
            address,
            ordinal,
            name: None,
        }
    }

    #[test]
    fn name_accessors() {
        let entry = named(0x1000, 1, "CreateWidget");
        assert!(entry.has_name());
        assert_eq!(entry.name(), "CreateWidget");

        let entry = by_ordinal(0x1000, 2);
        assert!(!entry.has_name());
        assert_eq!(entry.name(), "");
    }

    #[test]
    fn validity() {
        assert!(named(0x1000, 1, "Foo").is_valid());
        assert!(by_ordinal(0x1000, 1).is_valid());
        assert!(by_ordinal(0, 0).is_valid());

        // A named export with an empty name is a data-integrity signal.
        assert!(!named(0x1000, 1, "").is_valid());
    }

    #[test]
    fn ordering_by_address_then_ordinal() {
        let mut entries = vec![
            by_ordinal(0x3000, 1),
            named(0x1000, 5, "Late"),
            named(0x1000, 2, "Early"),
            by_ordinal(0x2000, 9),
        ];
        entries.sort_unstable();

        let keys: Vec<(u32, u16)> = entries.iter().map(|e| (e.address, e.ordinal)).collect();
        assert_eq!(
            keys,
            vec![(0x1000, 2), (0x1000, 5), (0x2000, 9), (0x3000, 1)]
        );
    }

    #[test]
    fn round_trip_named() {
        let entry = named(0xDEAD_0000, 42, "GetWidgetCount");

        let mut buffer = Vec::new();
        entry.serialize(&mut buffer);

        let restored = ExportEntry::deserialize(&mut Parser::new(&buffer)).unwrap();
        assert_eq!(entry, restored);

        // serialize(deserialize(serialize(e))) == serialize(e)
        let mut second = Vec::new();
        restored.serialize(&mut second);
        assert_eq!(buffer, second);
    }

    #[test]
    fn round_trip_by_ordinal() {
        let entry = by_ordinal(0x1234, 7);

        let mut buffer = Vec::new();
        entry.serialize(&mut buffer);
        assert_eq!(buffer.len(), 7); // flag + address + ordinal, no name bytes

        let restored = ExportEntry::deserialize(&mut Parser::new(&buffer)).unwrap();
        assert_eq!(entry, restored);
    }

    #[test]
    fn serialized_field_order() {
        let entry = named(0x0102_0304, 0x0506, "AB");

        let mut buffer = Vec::new();
        entry.serialize(&mut buffer);

        assert_eq!(
            buffer,
            vec![
                0x01, // has a name
                0x02, 0x00, 0x00, 0x00, // name length
                0x41, 0x42, // "AB"
                0x04, 0x03, 0x02, 0x01, // address
                0x06, 0x05, // ordinal
            ]
        );
    }

    #[test]
    fn deserialize_truncated() {
        let entry = named(0x1000, 1, "Truncated");

        let mut buffer = Vec::new();
        entry.serialize(&mut buffer);
        buffer.truncate(buffer.len() - 1);

        assert!(ExportEntry::deserialize(&mut Parser::new(&buffer)).is_err());
    }
}
