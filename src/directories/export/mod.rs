//! The PE export directory: the table of functions a module makes available to others.
//!
//! The export directory is one record plus three parallel arrays. The *export address
//! table* holds one RVA per export, indexed by `ordinal - ordinal_base`. The *name
//! pointer table* and the *name ordinal table* run in lockstep: entry `j` of the first
//! points at a name string, entry `j` of the second selects the address-table slot that
//! name belongs to. Exports no name points at exist all the same; they are reachable only
//! by ordinal.
//!
//! [`ExportDirectory`] decodes all of that into an [`ExportTable`] of
//! ordinal/name/address triples, optionally adding a synthetic entry for the module's
//! entry point, and can re-serialize the (possibly edited) table through the crate's
//! round-trip format.
//!
//! Decoding runs against any [`AddressSpace`]: a [`crate::File`] translates RVAs through
//! the section table, a [`crate::Loaded`] view indexes a mapped image directly. Forwarded
//! exports (an address that points back into the export directory's own range) are kept
//! as-is; see [`DirectoryLocation::contains`] for the classification consumers apply.
//!
//! # Examples
//!
//! ```rust,no_run
//! use edata::directories::export::ExportDirectory;
//! use edata::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("example.dll"))?;
//!
//! if let Some(directory) = ExportDirectory::from_file(&file)? {
//!     println!("{} exports {} symbols:", directory.module(), directory.exports().len());
//!     for entry in directory.exports() {
//!         match &entry.name {
//!             Some(name) => println!("  #{:<5} {:#010x} {}", entry.ordinal, entry.address, name),
//!             None => println!("  #{:<5} {:#010x} <by ordinal>", entry.ordinal, entry.address),
//!         }
//!     }
//! }
//! # Ok::<(), edata::Error>(())
//! ```

mod entry;
mod header;
mod table;

pub use entry::ExportEntry;
pub use header::ExportDirectoryHeader;
pub use table::ExportTable;

use std::fmt;

use super::{locate, Directory, DirectoryLocation};
use crate::{file::parser::Parser, AddressSpace, File, Result};
use goblin::pe::data_directories::DataDirectoryType;

/// Name given to the synthetic export carrying the module's entry point.
pub const ENTRYPOINT_NAME: &str = "EntryPoint";

/// Longest name string the decoder will read before declaring the data corrupt.
const MAX_NAME_LENGTH: usize = 4096;

/// A decoded export directory: the raw header record, its location, and the merged
/// export table.
///
/// Constructed fresh on each decode and immutable afterwards; move-only. The
/// [`ExportTable`] is the externally visible artifact, the header and location are kept
/// for display and for the consumer-side forwarder classification.
#[derive(Debug)]
pub struct ExportDirectory {
    /// The IMAGE_EXPORT_DIRECTORY record for the export table
    header: ExportDirectoryHeader,
    /// Where the directory lives inside the image
    location: DirectoryLocation,
    /// All exported functions, merged and sorted
    exports: ExportTable,
}

impl ExportDirectory {
    /// Locates and decodes the export directory of a parsed PE file.
    ///
    /// Chains the locator, the decoder and the table builder, using the file's entry
    /// point for the synthetic [`ENTRYPOINT_NAME`] export. A raw PE file stores plain
    /// RVAs, so no image-base rebasing is applied; decode a dumped loaded image through
    /// [`ExportDirectory::read`] when the record may hold absolute pointers.
    ///
    /// # Returns
    /// `Ok(None)` when the image carries no export directory: the module simply exports
    /// nothing, which is a normal outcome and not an error.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when declared sizes or counts exceed the
    /// available data, or [`crate::Error::InvalidAddressSpace`] when a referenced RVA
    /// cannot be mapped.
    pub fn from_file(file: &File) -> Result<Option<ExportDirectory>> {
        let Some(location) = locate(file, DataDirectoryType::ExportTable) else {
            return Ok(None);
        };

        Ok(Some(Self::read(file, location, 0, file.entry_point())?))
    }

    /// Decodes the export directory at `location` from any address space.
    ///
    /// `image_base` is used only to translate the module-name pointer and `entry_point`
    /// into relative addresses when the source record stores absolute values; pass 0 when
    /// the record is known to hold plain RVAs. `entry_point` of 0 means "not provided"
    /// and suppresses the synthetic [`ENTRYPOINT_NAME`] export.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when any read runs past the declared directory
    /// size or the underlying data ends unexpectedly, and
    /// [`crate::Error::InvalidAddressSpace`] when a referenced RVA has no mapping (for
    /// instance an absolute pointer left untranslated because no image base was
    /// supplied).
    pub fn read(
        image: &impl AddressSpace,
        location: DirectoryLocation,
        image_base: u64,
        entry_point: u32,
    ) -> Result<ExportDirectory> {
        if (location.size as usize) < ExportDirectoryHeader::SIZE {
            return Err(malformed_error!(
                "Export directory size {} is smaller than the {} byte record",
                location.size,
                ExportDirectoryHeader::SIZE
            ));
        }

        let header =
            ExportDirectoryHeader::read(image.read_rva(location.rva, ExportDirectoryHeader::SIZE)?)?;

        let addresses = read_address_table(image, &header)?;
        let name_ordinals = read_name_ordinals(image, &header, addresses.len())?;
        let names = read_names(image, &header, image_base)?;

        let module = read_string(image, rebase(header.name_rva, image_base))?;
        let entry_point = rebase(entry_point, image_base);

        let exports = ExportTable::build(
            &header,
            &addresses,
            &name_ordinals,
            names,
            module,
            entry_point,
        );

        Ok(ExportDirectory {
            header,
            location,
            exports,
        })
    }

    /// The decoded `IMAGE_EXPORT_DIRECTORY` record.
    #[must_use]
    pub fn header(&self) -> &ExportDirectoryHeader {
        &self.header
    }

    /// Where the directory lives inside the image.
    ///
    /// Exposed so consumers can classify forwarded exports: an entry whose address
    /// satisfies [`DirectoryLocation::contains`] points at a forwarder string rather than
    /// code.
    #[must_use]
    pub fn location(&self) -> DirectoryLocation {
        self.location
    }

    /// Returns the export table.
    #[must_use]
    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }

    /// The module's own declared name.
    #[must_use]
    pub fn module(&self) -> &str {
        self.exports.module()
    }
}

impl Directory for ExportDirectory {
    fn is_directory_type(dir_type: DataDirectoryType) -> bool {
        dir_type == DataDirectoryType::ExportTable
    }

    fn read_directory(file: &File) -> Result<Option<Self>> {
        Self::from_file(file)
    }
}

impl fmt::Display for ExportDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Export directory of {} ({} entries)",
            self.module(),
            self.exports.len()
        )?;

        for entry in &self.exports {
            match &entry.name {
                Some(name) => {
                    writeln!(f, "  #{:<5} {:#010x} {}", entry.ordinal, entry.address, name)?;
                }
                None => {
                    writeln!(
                        f,
                        "  #{:<5} {:#010x} <by ordinal>",
                        entry.ordinal, entry.address
                    )?;
                }
            }
        }

        Ok(())
    }
}

/// Step 2: the raw per-ordinal address array.
fn read_address_table(
    image: &impl AddressSpace,
    header: &ExportDirectoryHeader,
) -> Result<Vec<u32>> {
    let count = header.address_table_entries as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let data = image.read_rva(header.export_address_table_rva, count * 4)?;
    let mut parser = Parser::new(data);

    let mut addresses = Vec::with_capacity(count);
    for _ in 0..count {
        addresses.push(parser.read_le::<u32>()?);
    }

    Ok(addresses)
}

/// Step 4: the indices that tie each name to an address-table slot.
fn read_name_ordinals(
    image: &impl AddressSpace,
    header: &ExportDirectoryHeader,
    address_count: usize,
) -> Result<Vec<u16>> {
    let count = header.number_of_name_pointers as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let data = image.read_rva(header.ordinal_table_rva, count * 2)?;
    let mut parser = Parser::new(data);

    let mut ordinals = Vec::with_capacity(count);
    for _ in 0..count {
        let ordinal = parser.read_le::<u16>()?;
        if usize::from(ordinal) >= address_count {
            return Err(malformed_error!(
                "Name ordinal {} selects a slot outside the {} entry address table",
                ordinal,
                address_count
            ));
        }

        ordinals.push(ordinal);
    }

    Ok(ordinals)
}

/// Step 3: the name pointer table and every string it references.
fn read_names(
    image: &impl AddressSpace,
    header: &ExportDirectoryHeader,
    image_base: u64,
) -> Result<Vec<String>> {
    let count = header.number_of_name_pointers as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let data = image.read_rva(header.name_pointer_rva, count * 4)?;
    let mut parser = Parser::new(data);

    let mut pointers = Vec::with_capacity(count);
    for _ in 0..count {
        pointers.push(parser.read_le::<u32>()?);
    }

    let mut names = Vec::with_capacity(count);
    for pointer in pointers {
        names.push(read_string(image, rebase(pointer, image_base))?);
    }

    Ok(names)
}

/// Reads a null-terminated UTF-8 string at `rva`, capped at [`MAX_NAME_LENGTH`] bytes.
fn read_string(image: &impl AddressSpace, rva: u32) -> Result<String> {
    let data = image.read_rva_up_to(rva, MAX_NAME_LENGTH)?;
    Parser::new(data).read_string_utf8()
}

/// Translates a pointer that may be stored as an absolute virtual address.
///
/// With no image base the value is taken as an RVA unchanged. Otherwise a value at or
/// above the base is treated as absolute and rebased; a value below it is already
/// relative. A genuine RVA numerically above the image base cannot be told apart from an
/// absolute pointer, so the absolute interpretation wins.
fn rebase(pointer: u32, image_base: u64) -> u32 {
    if image_base == 0 {
        return pointer;
    }

    match u64::from(pointer).checked_sub(image_base) {
        Some(rva) => u32::try_from(rva).unwrap_or(pointer),
        None => pointer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{
        minimal_pe, minimal_pe_without_exports, put_u16, put_u32, ENTRY_POINT_RVA, MODULE_NAME,
    };
    use crate::Loaded;

    /// A flat loaded-image buffer holding the reference directory: ordinal base 1, three
    /// addresses `[0x1000, 0x1010, 0x1020]`, names `Foo` -> slot 0 and `Bar` -> slot 2.
    /// All structures live below 0x100 so the addresses never collide with them.
    fn flat_image() -> Vec<u8> {
        let mut image = vec![0u8; 0x100];

        // Record at 0x10.
        put_u32(&mut image, 0x10 + 12, 0x90); // name RVA
        put_u32(&mut image, 0x10 + 16, 1); // ordinal base
        put_u32(&mut image, 0x10 + 20, 3); // address table entries
        put_u32(&mut image, 0x10 + 24, 2); // number of name pointers
        put_u32(&mut image, 0x10 + 28, 0x40); // export address table RVA
        put_u32(&mut image, 0x10 + 32, 0x50); // name pointer table RVA
        put_u32(&mut image, 0x10 + 36, 0x60); // ordinal table RVA

        put_u32(&mut image, 0x40, 0x1000);
        put_u32(&mut image, 0x44, 0x1010);
        put_u32(&mut image, 0x48, 0x1020);

        put_u32(&mut image, 0x50, 0x70); // -> "Foo"
        put_u32(&mut image, 0x54, 0x74); // -> "Bar"

        put_u16(&mut image, 0x60, 0);
        put_u16(&mut image, 0x62, 2);

        image[0x70..0x74].copy_from_slice(b"Foo\0");
        image[0x74..0x78].copy_from_slice(b"Bar\0");
        image[0x90..0x99].copy_from_slice(b"demo.dll\0");

        image
    }

    const FLAT_LOCATION: DirectoryLocation = DirectoryLocation {
        rva: 0x10,
        size: 0x90,
    };

    #[test]
    fn decode_reference_directory() {
        let image = flat_image();
        let directory =
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0).unwrap();

        assert_eq!(directory.module(), "demo.dll");
        assert_eq!(directory.header().ordinal_base, 1);

        let entries = directory.exports().as_slice();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].ordinal, 1);
        assert_eq!(entries[0].address, 0x1000);
        assert_eq!(entries[0].name(), "Foo");

        assert_eq!(entries[1].ordinal, 2);
        assert_eq!(entries[1].address, 0x1010);
        assert!(!entries[1].has_name());
        assert!(entries[1].is_valid());

        assert_eq!(entries[2].ordinal, 3);
        assert_eq!(entries[2].address, 0x1020);
        assert_eq!(entries[2].name(), "Bar");
    }

    #[test]
    fn decode_with_entry_point() {
        let image = flat_image();
        let directory =
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0x0800).unwrap();

        let entries = directory.exports().as_slice();
        assert_eq!(entries.len(), 4);

        // Lowest address, so it sorts first; ordinal is one past the real ones.
        assert_eq!(entries[0].name(), ENTRYPOINT_NAME);
        assert_eq!(entries[0].address, 0x0800);
        assert_eq!(entries[0].ordinal, 4);
    }

    #[test]
    fn decode_zero_exports() {
        let mut image = flat_image();
        put_u32(&mut image, 0x10 + 20, 0); // no exports
        put_u32(&mut image, 0x10 + 24, 0); // no names

        let directory =
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0).unwrap();

        assert!(directory.exports().is_empty());
        assert_eq!(directory.module(), "demo.dll");
    }

    #[test]
    fn decode_rebases_absolute_pointers() {
        const IMAGE_BASE: u64 = 0x0040_0000;

        let mut image = flat_image();
        // Store the module-name and export-name pointers as absolute virtual addresses.
        put_u32(&mut image, 0x10 + 12, 0x0040_0090);
        put_u32(&mut image, 0x50, 0x0040_0070);
        put_u32(&mut image, 0x54, 0x0040_0074);

        let directory =
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, IMAGE_BASE, 0).unwrap();

        assert_eq!(directory.module(), "demo.dll");
        assert_eq!(directory.exports().as_slice()[0].name(), "Foo");
    }

    #[test]
    fn decode_absolute_pointers_without_base_fail() {
        let mut image = flat_image();
        put_u32(&mut image, 0x10 + 12, 0x0040_0090); // absolute, but image_base stays 0

        let result = ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0);
        assert!(matches!(
            result,
            Err(crate::Error::InvalidAddressSpace { .. })
        ));
    }

    #[test]
    fn decode_undersized_directory() {
        let image = flat_image();
        let location = DirectoryLocation {
            rva: 0x10,
            size: 0x20,
        };

        assert!(matches!(
            ExportDirectory::read(&Loaded::new(&image), location, 0, 0),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn decode_name_count_exceeding_exports() {
        let mut image = flat_image();
        put_u32(&mut image, 0x10 + 24, 4); // 4 names > 3 exports

        assert!(matches!(
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn decode_name_ordinal_out_of_range() {
        let mut image = flat_image();
        put_u16(&mut image, 0x62, 3); // slot 3 of a 3-entry address table

        assert!(matches!(
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn decode_truncated_address_table() {
        let mut image = flat_image();
        put_u32(&mut image, 0x10 + 28, 0xF8); // address table runs past the image

        assert!(matches!(
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn from_file_decodes() {
        let file = File::from_mem(minimal_pe()).unwrap();
        let directory = ExportDirectory::from_file(&file).unwrap().unwrap();

        assert_eq!(directory.module(), MODULE_NAME);

        // Three real exports plus the synthetic entry point.
        let entries = directory.exports().as_slice();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].name(), ENTRYPOINT_NAME);
        assert_eq!(entries[0].address, ENTRY_POINT_RVA);
    }

    #[test]
    fn from_file_absent_directory() {
        let file = File::from_mem(minimal_pe_without_exports()).unwrap();
        assert!(ExportDirectory::from_file(&file).unwrap().is_none());
    }

    #[test]
    fn directory_dispatch() {
        assert!(ExportDirectory::is_directory_type(
            DataDirectoryType::ExportTable
        ));
        assert!(!ExportDirectory::is_directory_type(
            DataDirectoryType::ImportTable
        ));

        let file = File::from_mem(minimal_pe()).unwrap();
        let directory = crate::directories::read_directory::<ExportDirectory>(&file)
            .unwrap()
            .unwrap();
        assert_eq!(directory.module(), MODULE_NAME);
    }

    #[test]
    fn display_lists_entries() {
        let image = flat_image();
        let directory =
            ExportDirectory::read(&Loaded::new(&image), FLAT_LOCATION, 0, 0).unwrap();

        let rendered = directory.to_string();
        assert!(rendered.contains("demo.dll"));
        assert!(rendered.contains("Foo"));
        assert!(rendered.contains("<by ordinal>"));
    }

    #[test]
    fn rebase_behaviour() {
        // No base: values pass through.
        assert_eq!(rebase(0x1000, 0), 0x1000);

        // Below the base: already relative.
        assert_eq!(rebase(0x1000, 0x0040_0000), 0x1000);

        // At or above the base: absolute, gets rebased.
        assert_eq!(rebase(0x0040_1000, 0x0040_0000), 0x1000);

        // 64-bit base above the u32 pointer range: values stay relative.
        assert_eq!(rebase(0x1000, 0x1_8000_0000), 0x1000);
    }
}
