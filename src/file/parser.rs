//! Cursor-based byte stream parser for PE structures.
//!
//! This module provides the [`Parser`] type, a bounds-checked cursor over a byte slice.
//! It is the reading surface used for walking the fixed-layout export-directory record,
//! the parallel export arrays, and the null-terminated name strings they reference, and it
//! is also the deserialization side of the crate's round-trip format.
//!
//! # Usage Examples
//!
//! ```rust
//! use edata::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! # Ok::<(), edata::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, PeIO},
    Result,
};

/// A bounds-checked cursor over binary data.
///
/// `Parser` maintains a position within a byte slice and refuses any read that would run
/// past the end, returning [`crate::Error::OutOfBounds`] instead. Positions can be moved
/// freely with [`Parser::seek`] and [`Parser::advance_by`] for random access into
/// fixed-layout structures.
///
/// # Examples
///
/// ```rust
/// use edata::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// parser.seek(6)?;
/// let last = parser.read_le::<u16>()?;
/// assert_eq!(last, 0x0807);
/// # Ok::<(), edata::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by `step` would exceed the data
    /// length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Read a value of type `T` in little-endian byte order and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edata::Parser;
    ///
    /// let data = [0x10, 0x00, 0x00, 0x00];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_le::<u32>()?, 0x10);
    /// # Ok::<(), edata::Error>(())
    /// ```
    pub fn read_le<T: PeIO>(&mut self) -> Result<T> {
        read_le_at(self.data, &mut self.position)
    }

    /// Read a null-terminated UTF-8 string from the current position.
    ///
    /// Stops at the first zero byte, or at the end of the buffer if no terminator is found
    /// (a string running up to the end of the data is a valid case). The position advances
    /// past the terminator when one was present.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let mut end = start;

        while end < self.data.len() && self.data[end] != 0 {
            end += 1;
        }

        let string_data = &self.data[start..end];

        if end < self.data.len() {
            self.position = end + 1;
        } else {
            self.position = end;
        }

        String::from_utf8(string_data.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                end,
                e.utf8_error()
            )
        })
    }

    /// Read exactly `len` bytes from the current position as a UTF-8 string.
    ///
    /// This is the counterpart of the length-prefixed string encoding used by the export
    /// table round-trip format.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain, or
    /// [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> Result<String> {
        let Some(end) = self.position.checked_add(len) else {
            return Err(crate::Error::OutOfBounds);
        };

        if end > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        let string_data = &self.data[self.position..end];
        self.position = end;

        String::from_utf8(string_data.to_vec())
            .map_err(|e| malformed_error!("Invalid UTF-8 string of length {}: {}", len, e))
    }
}
