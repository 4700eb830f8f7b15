//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`Physical`] backend that implements the
//! [`crate::file::Backend`] trait for accessing PE files from disk using memory-mapped
//! I/O. Export tables are read in a non-sequential pattern (the directory record, then
//! three separate arrays, then scattered name strings), which is exactly the access shape
//! memory mapping serves well: only the touched pages are loaded, and the operating system
//! handles caching.
//!
//! # Examples
//!
//! ```rust,ignore
//! use edata::file::{Backend, Physical};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("example.dll"))?;
//!
//! // Check the DOS signature
//! let dos = physical.data_slice(0, 2)?;
//! assert_eq!(dos, b"MZ");
//! # Ok::<(), edata::Error>(())
//! ```

use super::Backend;
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for efficient access to files on disk.
///
/// [`Physical`] maps the file directly into the process's virtual address space, so the
/// file does not need to be read into memory upfront and random access into the export
/// structures stays cheap. The mapping is read-only and shared. All access operations
/// include bounds checking.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the PE file on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(crate::Error::OutOfBounds);
        };

        if offset_end > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn physical() {
        let path = temp_file("edata_physical.bin", &[0x4D, 0x5A, 0x00, 0x01, 0x02, 0x03]);
        let physical = Physical::new(&path).unwrap();

        assert_eq!(physical.len(), 6);
        assert_eq!(physical.data()[0], 0x4D);
        assert_eq!(physical.data()[1], 0x5A);
        assert_eq!(physical.data_slice(2, 3).unwrap(), &[0x00, 0x01, 0x02]);

        assert!(physical.data_slice(0, 7).is_err());
        assert!(physical.data_slice(usize::MAX, usize::MAX).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn physical_invalid_file_path() {
        let result = Physical::new("/nonexistent/path/to/file.dll");
        assert!(result.is_err());
        match result.unwrap_err() {
            FileError(io_error) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn physical_boundary_conditions() {
        let path = temp_file("edata_physical_bounds.bin", &[0xCC; 64]);
        let physical = Physical::new(&path).unwrap();

        assert_eq!(physical.data_slice(63, 1).unwrap().len(), 1);
        assert_eq!(physical.data_slice(0, 64).unwrap().len(), 64);
        assert!(physical.data_slice(64, 1).is_err());
        assert_eq!(physical.data_slice(64, 0).unwrap().len(), 0);

        std::fs::remove_file(&path).unwrap();
    }
}
