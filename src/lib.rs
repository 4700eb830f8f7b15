// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # edata
//!
//! A library for parsing, inspecting and re-serializing the export directory of PE
//! (Portable Executable) binaries: the `.edata` structure through which a DLL or EXE
//! advertises the functions it makes available to other modules, by name and/or ordinal.
//!
//! ## Features
//!
//! - **Complete export reconstruction** - Merges the export address table, name pointer
//!   table and name ordinal table into canonical ordinal/name/address triples, including
//!   ordinal-only exports that carry no name
//! - **Two address views** - Decode from a raw file (section-table RVA translation) or
//!   from an already-loaded image (identity mapping), behind one `AddressSpace` trait
//! - **Entry-point pseudo-export** - Optionally surfaces the module entry point as a
//!   synthetic `"EntryPoint"` table entry for uniform inspection
//! - **Stable ordering and round-trips** - Tables are sorted by address and serialize to
//!   a deterministic format that reconstructs identical logical state
//! - **Memory safe on hostile input** - Every read is bounds-checked; corrupt counts and
//!   truncated structures surface as structured errors, never panics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edata::prelude::*;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("example.dll"))?;
//!
//! match ExportDirectory::from_file(&file)? {
//!     Some(directory) => {
//!         println!("{} exports {} symbols", directory.module(), directory.exports().len());
//!         for entry in directory.exports() {
//!             println!("  #{:<5} {:#010x} {}", entry.ordinal, entry.address, entry.name());
//!         }
//!     }
//!     None => println!("module exports nothing"),
//! }
//! # Ok::<(), edata::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `edata` is organized into two layers:
//!
//! - The file layer ([`File`], [`Backend`], [`AddressSpace`], [`Parser`]) opens a PE
//!   image from disk or memory, answers header queries through the `goblin` parser, and
//!   translates relative virtual addresses into bytes.
//! - The directory layer ([`directories`]) locates a data directory by type identifier
//!   and decodes it. [`directories::export::ExportDirectory`] is the export directory:
//!   locator, decoder and table builder chained behind one call.
//!
//! Data flows one way: locate, decode the record and its three arrays, build the table.
//! The built [`directories::export::ExportTable`] is the only externally visible
//! artifact.
//!
//! ## Scope
//!
//! The crate decodes export data; it deliberately does not validate overall PE header
//! integrity (the `goblin` parser is trusted for that), does not resolve forwarded
//! exports (an address pointing back into the export directory is kept as-is and can be
//! classified by the consumer via
//! [`directories::DirectoryLocation::contains`]), and does not demangle or normalize
//! symbol names.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). An absent export directory is not
//! an error; corrupt data and unmappable addresses are:
//!
//! ```rust,no_run
//! use edata::{Error, File};
//! use edata::directories::export::ExportDirectory;
//!
//! let data: Vec<u8> = std::fs::read("example.dll")?;
//! let file = File::from_mem(data)?;
//! match ExportDirectory::from_file(&file) {
//!     Ok(Some(_)) => println!("decoded"),
//!     Ok(None) => println!("no export directory"),
//!     Err(Error::Malformed { message, .. }) => println!("corrupt: {}", message),
//!     Err(e) => println!("error: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use edata::prelude::*;
///
/// let file = File::from_file("example.dll".as_ref())?;
/// let directory = ExportDirectory::from_file(&file)?;
/// # Ok::<(), edata::Error>(())
/// ```
pub mod prelude;

/// Location and decoding of PE data directories.
///
/// Carries the directory locator ([`directories::locate`]), the per-kind
/// [`directories::Directory`] capability trait with its
/// [`directories::read_directory`] dispatch, and the concrete
/// [`directories::export`] implementation this crate is about.
pub mod directories;

/// Re-export of the `goblin` PE parser.
///
/// Directory type identifiers
/// ([`goblin::pe::data_directories::DataDirectoryType`]) and header types appear in this
/// crate's public API; the re-export saves consumers from tracking a matching `goblin`
/// version themselves.
pub use goblin;

/// `edata` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `edata` Error type
///
/// The main error type for all operations in this crate. See [`error::Error`] for the
/// taxonomy: corrupt data and unmappable addresses are errors, an absent directory is
/// not.
pub use error::Error;

/// Parsed PE image over a pluggable data source.
///
/// See [`File`] for loading from disk ([`File::from_file`]) or memory
/// ([`File::from_mem`]) and for header and address-space queries.
pub use file::File;

/// Address-space abstraction and the loaded-image view.
///
/// [`AddressSpace`] resolves relative virtual addresses to bytes; [`Loaded`] implements
/// it over an image mapped at its load layout, where RVAs index the buffer directly.
pub use file::{AddressSpace, Loaded};

/// Backend trait over raw PE byte sources (disk files, memory buffers).
pub use file::Backend;

/// Bounds-checked cursor over binary data.
///
/// Used for walking fixed-layout records and as the deserialization side of the export
/// table round-trip format.
pub use file::parser::Parser;
