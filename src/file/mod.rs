//! PE file abstraction and address-space translation.
//!
//! This module provides the infrastructure the export-directory core sits on: a unified
//! way to open a PE image, query its header, and turn relative virtual addresses into raw
//! bytes.
//!
//! # Key Components
//!
//! - [`File`] - A parsed PE image over a pluggable data source, answering directory and
//!   section queries through the `goblin` header parser
//! - [`Backend`] - Trait over raw byte sources (disk files, memory buffers)
//! - [`AddressSpace`] - The addressing abstraction: RVA in, bytes out
//! - [`Loaded`] - An [`AddressSpace`] over an already-mapped image where RVAs index the
//!   buffer directly
//! - [`crate::file::physical::Physical`] / [`crate::file::memory::Memory`] - Backend
//!   implementations
//! - [`crate::file::parser::Parser`] / [`crate::file::io`] - Bounds-checked reading
//!   primitives
//!
//! # Two views of the same image
//!
//! A PE on disk and a PE mapped by a loader differ only in addressing: on disk, an RVA
//! must be translated through the section table to a file offset; in a loaded image, the
//! RVA *is* the offset. [`File`] implements the first translation, [`Loaded`] the second,
//! and everything above this module works against [`AddressSpace`] so it never needs to
//! know which one it is reading from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use edata::File;
//! use goblin::pe::data_directories::DataDirectoryType;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("example.dll"))?;
//! println!("image base: {:#x}", file.imagebase());
//!
//! if let Some((rva, size)) = file.data_directory(DataDirectoryType::ExportTable) {
//!     println!("export directory at RVA {:#x}, {} bytes", rva, size);
//! }
//! # Ok::<(), edata::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::{
    data_directories::DataDirectoryType, header::Header, section_table::SectionTable, PE,
};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of PE data, allowing for both in-memory and
/// on-disk representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// The addressing abstraction: resolve a relative virtual address to raw bytes.
///
/// The export directory references all of its structures by RVA. Implementations of this
/// trait decide what an RVA means: [`File`] translates through the PE section table to a
/// file offset, [`Loaded`] treats the RVA as a direct index into an already-mapped image.
/// A custom implementation over a header with no backing image at all would return
/// [`crate::Error::InvalidAddressSpace`] from every read, which is how a caller learns
/// that export decoding is impossible rather than merely absent.
pub trait AddressSpace {
    /// Returns exactly `len` bytes starting at `rva`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddressSpace`] if no mapping exists for `rva`, or
    /// [`crate::Error::Malformed`] if the mapped range is truncated before `len` bytes.
    fn read_rva(&self, rva: u32, len: usize) -> Result<&[u8]>;

    /// Returns the longest readable run starting at `rva`, capped at `len` bytes.
    ///
    /// Used for null-terminated strings whose length is not known up front.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidAddressSpace`] if no mapping exists for `rva`.
    fn read_rva_up_to(&self, rva: u32, len: usize) -> Result<&[u8]>;
}

/// An [`AddressSpace`] over an image that is already mapped at its load layout.
///
/// In a loaded (or dumped) image the sections sit at their virtual addresses, so an RVA
/// indexes the buffer directly and no section-table translation is involved.
///
/// # Examples
///
/// ```rust
/// use edata::{AddressSpace, Loaded};
///
/// let image = [0u8, 1, 2, 3, 4, 5, 6, 7];
/// let loaded = Loaded::new(&image);
/// assert_eq!(loaded.read_rva(4, 2)?, &[4, 5]);
/// # Ok::<(), edata::Error>(())
/// ```
pub struct Loaded<'a> {
    data: &'a [u8],
}

impl<'a> Loaded<'a> {
    /// Create a loaded-image view over a byte buffer whose offsets are RVAs.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Loaded { data }
    }
}

impl AddressSpace for Loaded<'_> {
    fn read_rva(&self, rva: u32, len: usize) -> Result<&[u8]> {
        let start = rva as usize;
        let Some(end) = start.checked_add(len) else {
            return Err(malformed_error!(
                "RVA {:#010x} + {} bytes overflows the address space",
                rva,
                len
            ));
        };

        if end > self.data.len() {
            return Err(malformed_error!(
                "RVA {:#010x} + {} bytes runs past the end of the image ({} bytes)",
                rva,
                len,
                self.data.len()
            ));
        }

        Ok(&self.data[start..end])
    }

    fn read_rva_up_to(&self, rva: u32, len: usize) -> Result<&[u8]> {
        let start = rva as usize;
        if start >= self.data.len() {
            return Err(crate::Error::InvalidAddressSpace { rva });
        }

        let end = std::cmp::min(start.saturating_add(len), self.data.len());
        Ok(&self.data[start..end])
    }
}

/// Represents a parsed PE image.
///
/// This struct wraps the goblin-parsed PE and provides methods for accessing headers,
/// sections and data directories, and for converting between address spaces. It supports
/// loading from both files and memory buffers; the parsed [`goblin::pe::PE`] borrows from
/// the backend buffer, so the two are held together in a self-referencing cell.
///
/// `File` is move-only; it is the "header abstraction" the directory locator and decoder
/// consume.
///
/// # Examples
///
/// ```rust,no_run
/// use edata::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("example.dll"))?;
/// println!("loaded {} bytes, entry point at RVA {:#x}", file.len(), file.entry_point());
/// # Ok::<(), edata::Error>(())
/// ```
#[self_referencing]
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads a PE file from the given path.
    ///
    /// The file is memory-mapped for efficient access.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the PE file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or opened
    /// - The file is not a valid PE format
    /// - The file is empty or has no optional header
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the PE file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, the data is not a valid PE format, or the
    /// optional header is missing.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or not a valid PE.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match PE::parse(data.data()) {
                Ok(pe) => {
                    if pe.header.optional_header.is_none() {
                        return Err(malformed_error!("File does not have an OptionalHeader"));
                    }

                    Ok(pe)
                }
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the image base address of the loaded PE file.
    ///
    /// The image base is the preferred virtual address the module is loaded at; pointers
    /// stored as absolute virtual addresses are rebased against it.
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.with_pe(|pe| pe.image_base)
    }

    /// Returns a reference to the PE header.
    #[must_use]
    pub fn header(&self) -> &Header {
        self.with_pe(|pe| &pe.header)
    }

    /// Returns the entry-point RVA of the image, or 0 if the image declares none.
    ///
    /// This is the address the loader transfers control to, and the address the export
    /// table builder turns into the synthetic `"EntryPoint"` pseudo-export.
    #[must_use]
    pub fn entry_point(&self) -> u32 {
        self.with_pe(|pe| {
            pe.header.optional_header.map_or(0, |header| {
                u32::try_from(header.standard_fields.address_of_entry_point).unwrap_or(0)
            })
        })
    }

    /// Returns an iterator over the section headers of the PE file.
    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.with_pe(|pe| pe.sections.iter())
    }

    /// Returns the RVA and size of a specific data directory entry.
    ///
    /// This is the directory-table lookup the locator builds on: it answers "where does
    /// directory type T live", with `None` covering both a missing slot and a present but
    /// zeroed one.
    ///
    /// # Arguments
    /// * `dir_type` - The type of data directory to retrieve
    ///
    /// # Returns
    /// - `Some((rva, size))` if the directory exists with non-zero address and size
    /// - `None` if the directory doesn't exist or has zero address/size
    #[must_use]
    pub fn data_directory(&self, dir_type: DataDirectoryType) -> Option<(u32, u32)> {
        self.with_pe(|pe| {
            pe.header.optional_header.and_then(|optional_header| {
                optional_header
                    .data_directories
                    .dirs()
                    .find(|(directory_type, directory)| {
                        *directory_type == dir_type
                            && directory.virtual_address != 0
                            && directory.size != 0
                    })
                    .map(|(_, directory)| (directory.virtual_address, directory.size))
            })
        })
    }

    /// Returns the raw data of the loaded file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The offset to start the slice from.
    /// * `len` - The length of the slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Converts a relative virtual address (RVA) to a file offset.
    ///
    /// RVAs below the first section map into the unrelocated header region; everything
    /// else must fall inside a section's virtual range.
    ///
    /// # Arguments
    ///
    /// * `rva` - The RVA to convert.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAddressSpace`] if no section maps the RVA, or
    /// [`crate::Error::Malformed`] if a section header is internally inconsistent.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        self.with_pe(|pe| {
            for section in &pe.sections {
                let Some(section_end) = section.virtual_address.checked_add(section.virtual_size)
                else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        section.virtual_size
                    ));
                };

                if section.virtual_address <= rva && rva < section_end {
                    return Ok((rva - section.virtual_address) as usize
                        + section.pointer_to_raw_data as usize);
                }
            }

            // The header region is not described by a section and maps 1:1.
            match pe.sections.iter().map(|s| s.virtual_address).min() {
                Some(first_section) if rva < first_section => Ok(rva as usize),
                None => Ok(rva as usize),
                _ => Err(crate::Error::InvalidAddressSpace { rva }),
            }
        })
    }
}

impl AddressSpace for File {
    fn read_rva(&self, rva: u32, len: usize) -> Result<&[u8]> {
        let offset = self.rva_to_offset(rva)?;
        self.data_slice(offset, len).map_err(|_| {
            malformed_error!(
                "RVA {:#010x} + {} bytes runs past the end of the file ({} bytes)",
                rva,
                len,
                self.len()
            )
        })
    }

    fn read_rva_up_to(&self, rva: u32, len: usize) -> Result<&[u8]> {
        let offset = self.rva_to_offset(rva)?;
        if offset >= self.len() {
            return Err(crate::Error::InvalidAddressSpace { rva });
        }

        let available = std::cmp::min(len, self.len() - offset);
        self.data_slice(offset, available)
    }
}
