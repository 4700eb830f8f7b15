//! Convenient re-exports of the most commonly used types and traits.
//!
//! Importing the prelude brings the whole public surface needed for typical export
//! analysis into scope:
//!
//! ```rust,no_run
//! use edata::prelude::*;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("example.dll"))?;
//! if let Some(directory) = ExportDirectory::from_file(&file)? {
//!     for entry in directory.exports() {
//!         println!("#{} -> {:#x}", entry.ordinal, entry.address);
//!     }
//! }
//! # Ok::<(), edata::Error>(())
//! ```

pub use crate::{
    directories::{
        export::{
            ExportDirectory, ExportDirectoryHeader, ExportEntry, ExportTable, ENTRYPOINT_NAME,
        },
        locate, read_directory, Directory, DirectoryLocation,
    },
    AddressSpace, Backend, Error, File, Loaded, Parser, Result,
};
