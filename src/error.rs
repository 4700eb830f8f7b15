use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The taxonomy separates three situations a caller handles differently:
///
/// - **Absent data** is not an error at all: a missing export directory is reported as
///   `None` by [`crate::directories::locate`] and as `Ok(None)` by
///   [`crate::directories::export::ExportDirectory::from_file`].
/// - **Corrupt data** ([`Error::Malformed`], [`Error::OutOfBounds`]) means declared sizes or
///   counts exceed what the image actually contains. No partial result is produced; a partially
///   decoded export table is worse than none.
/// - **Unmappable addresses** ([`Error::InvalidAddressSpace`]) means a relative virtual address
///   could not be translated into bytes, either because the image carries no mapping for it or
///   because an absolute pointer was stored and no image base was supplied.
///
/// # Examples
///
/// ```rust,no_run
/// use edata::{Error, File};
/// use edata::directories::export::ExportDirectory;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("example.dll"))?;
/// match ExportDirectory::from_file(&file) {
///     Ok(Some(directory)) => println!("{} exports", directory.exports().len()),
///     Ok(None) => println!("module exports nothing"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("corrupt export data: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("error: {}", e),
/// }
/// # Ok::<(), edata::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// Declared sizes or counts in the export directory exceed the available data, or a
    /// referenced structure is truncated. The error records the source location where the
    /// malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading from a buffer.
    ///
    /// This is a safety check in the low-level read primitives to prevent buffer overruns
    /// when parsing malformed or truncated data.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A relative virtual address could not be resolved to bytes.
    ///
    /// Either the image carries no section mapping for the address, or the source record
    /// stored absolute pointers and no image base was supplied to rebase them. Distinct from
    /// [`Error::Malformed`]: the directory itself may be intact, but the address space cannot
    /// serve it.
    #[error("No address-space mapping for RVA {rva:#010x}")]
    InvalidAddressSpace {
        /// The relative virtual address that could not be translated
        rva: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping a file from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping external
    /// library errors with additional context.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    ///
    /// The goblin crate is used for low-level PE/COFF header parsing. This error wraps any
    /// failures from that parsing layer.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),
}
