//! PE data directory location and decoding.
//!
//! The PE optional header ends in a table of data directories, each slot describing where
//! one well-known structure (exports, imports, resources, ...) lives inside the image.
//! This module provides the pieces shared by every directory kind:
//!
//! - [`locate`] - The directory locator: pure query from directory type to
//!   [`DirectoryLocation`], with `None` as the normal "this module has no such directory"
//!   outcome
//! - [`Directory`] - The capability trait one concrete directory kind implements; a
//!   registry entry is "does this type identifier belong to me" plus "decode yourself from
//!   this image"
//! - [`read_directory`] - Dispatch by implementation: `read_directory::<ExportDirectory>`
//!   picks the right slot and decodes it
//!
//! Directory kinds live in submodules; [`export`] is the export directory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use edata::directories::{locate, read_directory};
//! use edata::directories::export::ExportDirectory;
//! use edata::File;
//! use goblin::pe::data_directories::DataDirectoryType;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("example.dll"))?;
//!
//! if let Some(location) = locate(&file, DataDirectoryType::ExportTable) {
//!     println!("export directory: RVA {:#x}, {} bytes", location.rva, location.size);
//! }
//!
//! if let Some(exports) = read_directory::<ExportDirectory>(&file)? {
//!     println!("{}", exports);
//! }
//! # Ok::<(), edata::Error>(())
//! ```

pub mod export;

use crate::{File, Result};
use goblin::pe::data_directories::DataDirectoryType;

/// Location of one data directory inside a PE image.
///
/// Produced by [`locate`]; consumed by the per-directory decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLocation {
    /// RVA of the first byte of the directory.
    pub rva: u32,
    /// Declared size of the directory in bytes.
    pub size: u32,
}

impl DirectoryLocation {
    /// Returns `true` if `rva` falls inside this directory's declared range.
    ///
    /// For the export directory this is the conventional forwarder test: an export whose
    /// address points back into the export section is a forwarder string, not code.
    /// Classification is left to the consumer; this crate never resolves forwarders.
    #[must_use]
    pub fn contains(&self, rva: u32) -> bool {
        rva >= self.rva && rva - self.rva < self.size
    }
}

/// Looks up where a data directory lives inside a parsed image.
///
/// This is a pure query against the header's directory table. An absent slot and a
/// present-but-zeroed slot are the same outcome: the module simply does not carry that
/// directory, which is normal and not an error.
///
/// # Arguments
/// * `file` - The parsed PE image
/// * `dir_type` - The directory type identifier to look up
#[must_use]
pub fn locate(file: &File, dir_type: DataDirectoryType) -> Option<DirectoryLocation> {
    file.data_directory(dir_type)
        .map(|(rva, size)| DirectoryLocation { rva, size })
}

/// Capability implemented by each concrete data directory kind.
///
/// A directory kind knows which type identifier belongs to it and how to decode itself
/// from a parsed image. [`read_directory`] dispatches through this trait, replacing the
/// virtual-dispatch hierarchy such decoders are traditionally built on.
pub trait Directory: Sized {
    /// Returns `true` if `dir_type` is the directory slot this implementation decodes.
    fn is_directory_type(dir_type: DataDirectoryType) -> bool;

    /// Locates and decodes this directory from a parsed image.
    ///
    /// # Errors
    /// Returns `Ok(None)` when the image does not carry this directory; decoding failures
    /// are returned as errors.
    fn read_directory(file: &File) -> Result<Option<Self>>;
}

/// Locates and decodes the directory kind `T` from a parsed image.
///
/// # Errors
/// Propagates the decoding errors of `T`; an absent directory is `Ok(None)`.
pub fn read_directory<T: Directory>(file: &File) -> Result<Option<T>> {
    T::read_directory(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{minimal_pe, minimal_pe_without_exports, EXPORT_DIR_RVA, EXPORT_DIR_SIZE};

    #[test]
    fn locate_present() {
        let file = File::from_mem(minimal_pe()).unwrap();

        let location = locate(&file, DataDirectoryType::ExportTable).unwrap();
        assert_eq!(location.rva, EXPORT_DIR_RVA);
        assert_eq!(location.size, EXPORT_DIR_SIZE);
    }

    #[test]
    fn locate_absent() {
        let file = File::from_mem(minimal_pe_without_exports()).unwrap();

        assert!(locate(&file, DataDirectoryType::ExportTable).is_none());
        assert!(locate(&file, DataDirectoryType::ImportTable).is_none());
    }

    #[test]
    fn location_contains() {
        let location = DirectoryLocation {
            rva: 0x1000,
            size: 0x80,
        };

        assert!(location.contains(0x1000));
        assert!(location.contains(0x107F));
        assert!(!location.contains(0x1080));
        assert!(!location.contains(0x0FFF));
    }
}
