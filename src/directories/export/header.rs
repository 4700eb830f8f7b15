//! The fixed-layout `IMAGE_EXPORT_DIRECTORY` record.
//!
//! This is the 40-byte header at the start of the export data directory. Its three RVA
//! fields point at the parallel arrays the export table is reconstructed from; the record
//! itself carries the counts and the ordinal base.
//!
//! # Reference
//! - Microsoft PE/COFF Specification, "The .edata Section"

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// The `IMAGE_EXPORT_DIRECTORY` record of a PE image.
///
/// Decoded once per directory; read-only afterwards. The flags, timestamp and version
/// fields are reserved or informational and are ignored by the decoder, but they are
/// retained so a consumer can display them.
#[derive(Debug)]
pub struct ExportDirectoryHeader {
    /// Reserved export flags, always observed as 0
    pub characteristics: u32,
    /// Time and date the export data was created (epoch seconds)
    pub time_date_stamp: u32,
    /// Major version number, informational only
    pub major_version: u16,
    /// Minor version number, informational only
    pub minor_version: u16,
    /// RVA of the module's own name as a null-terminated string
    pub name_rva: u32,
    /// Starting ordinal number of the export address table
    pub ordinal_base: u32,
    /// Number of entries in the export address table
    pub address_table_entries: u32,
    /// Number of entries in the name pointer table (and the name ordinal table)
    pub number_of_name_pointers: u32,
    /// RVA of the export address table
    pub export_address_table_rva: u32,
    /// RVA of the name pointer table
    pub name_pointer_rva: u32,
    /// RVA of the name ordinal table
    pub ordinal_table_rva: u32,
}

impl ExportDirectoryHeader {
    /// Size of the fixed-layout record in bytes.
    pub const SIZE: usize = 40;

    /// Create an `ExportDirectoryHeader` from a sequence of bytes.
    ///
    /// Validates the count invariants the table builder depends on: the name pointer
    /// count may not exceed the address table count (unnamed exports have no name
    /// pointer, never the other way around), and every derivable ordinal
    /// (`ordinal_base + index`) must fit the 16-bit ordinal space.
    ///
    /// # Arguments
    /// * `data` - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns an error if the data is too short to contain the record, or if any count
    /// invariant fails.
    pub fn read(data: &[u8]) -> Result<ExportDirectoryHeader> {
        if data.len() < Self::SIZE {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let characteristics = parser.read_le::<u32>()?;
        let time_date_stamp = parser.read_le::<u32>()?;
        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let name_rva = parser.read_le::<u32>()?;
        let ordinal_base = parser.read_le::<u32>()?;
        let address_table_entries = parser.read_le::<u32>()?;
        let number_of_name_pointers = parser.read_le::<u32>()?;
        let export_address_table_rva = parser.read_le::<u32>()?;
        let name_pointer_rva = parser.read_le::<u32>()?;
        let ordinal_table_rva = parser.read_le::<u32>()?;

        if number_of_name_pointers > address_table_entries {
            return Err(malformed_error!(
                "Name pointer count {} exceeds export address table count {}",
                number_of_name_pointers,
                address_table_entries
            ));
        }

        if address_table_entries > 0x1_0000 {
            return Err(malformed_error!(
                "Export address table count {} exceeds the 16-bit ordinal space",
                address_table_entries
            ));
        }

        if ordinal_base > u32::from(u16::MAX) {
            return Err(malformed_error!(
                "Ordinal base {} is not a 16-bit ordinal",
                ordinal_base
            ));
        }

        let highest_ordinal =
            u64::from(ordinal_base) + u64::from(address_table_entries.saturating_sub(1));
        if address_table_entries > 0 && highest_ordinal > u64::from(u16::MAX) {
            return Err(malformed_error!(
                "Ordinal base {} plus {} exports exceeds the 16-bit ordinal space",
                ordinal_base,
                address_table_entries
            ));
        }

        Ok(ExportDirectoryHeader {
            characteristics,
            time_date_stamp,
            major_version,
            minor_version,
            name_rva,
            ordinal_base,
            address_table_entries,
            number_of_name_pointers,
            export_address_table_rva,
            name_pointer_rva,
            ordinal_table_rva,
        })
    }
}
