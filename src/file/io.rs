//! Safe little-endian reading primitives for PE structures.
//!
//! Every multi-byte integer in the PE format is little-endian, so this module only carries
//! the little-endian subset of byte-order conversions. All reads are bounds-checked and
//! return [`crate::Error::OutOfBounds`] rather than panicking on truncated input, which is
//! the foundation the rest of the crate builds on when it parses attacker-controlled files.
//!
//! # Key Components
//!
//! - [`PeIO`] - Trait tying a primitive integer to its fixed-size byte representation
//! - [`read_le`] - Read a value from the start of a buffer
//! - [`read_le_at`] - Read a value at an offset, advancing the offset afterwards
//!
//! # Examples
//!
//! ```rust,ignore
//! use edata::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u32 = read_le_at(&data, &mut offset)?; // offset: 2 -> 6
//!
//! assert_eq!(first, 1);
//! assert_eq!(second, 2);
//! # Ok::<(), edata::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive integers that can be decoded from a fixed-size little-endian buffer.
///
/// Implemented for the unsigned widths the PE export directory uses (`u8`, `u16`, `u32`,
/// `u64`). The associated `Bytes` type is the fixed-size array backing the value, which lets
/// [`read_le_at`] size its bounds check from the type alone.
pub trait PeIO: Sized {
    /// The fixed-size byte array backing this type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Decode `Self` from its little-endian byte representation.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Encode `Self` into its little-endian byte representation.
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_pe_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl PeIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_pe_io! {
    u8 => 1,
    u16 => 2,
    u32 => 4,
    u64 => 8,
}

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer holds fewer bytes than `T` requires.
pub fn read_le<T: PeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at the given offset.
///
/// The offset is advanced by the number of bytes read, so sequential calls walk a
/// fixed-layout record field by field.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if reading `T` at `offset` would exceed the buffer.
pub fn read_le_at<T: PeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}
