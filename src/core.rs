//! Byte-key access shared by the radix orderer and the encoder.
//!
//! This module defines:
//! - [`KeyAccessor`]: random access to the byte key of each row.
//! - SortPtr: internal row handle carrying a cached 8-byte key window.

use std::collections::VecDeque;

/// Size of the key window cached in each sort pointer.
pub const PREFIX_CACHE_SIZE: usize = 8;

/// Row handle used while ordering: original row index, full key length, and
/// the big-endian window of key bytes starting at the current radix offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SortPtr {
    pub index: usize,
    pub len: usize,
    pub cache: u64,
}

/// Random access to byte-comparable keys, one per row.
///
/// The orderer only ever compares keys byte-wise, with a shorter key that is
/// a prefix of a longer one sorting first. Anything that can hand out such
/// keys without copying can be ordered: the encoder's flat key buffer, a
/// `Vec<Vec<u8>>`, or an Arrow-style offsets + data layout.
///
/// # Examples
///
/// ```
/// use locsort::core::KeyAccessor;
///
/// struct Names {
///     data: Vec<String>,
/// }
///
/// impl KeyAccessor for Names {
///     fn get_key(&self, index: usize) -> &[u8] {
///         self.data[index].as_bytes()
///     }
///
///     fn len(&self) -> usize {
///         self.data.len()
///     }
/// }
/// ```
pub trait KeyAccessor {
    /// Returns the key of row `index`.
    fn get_key(&self, index: usize) -> &[u8];

    /// Returns the number of rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Big-endian window of up to 8 key bytes starting at `offset`,
    /// zero-padded past the end of the key.
    ///
    /// Implementors with a contiguous layout may override this to skip
    /// building the intermediate slice.
    #[inline(always)]
    fn get_u64_prefix(&self, index: usize, offset: usize) -> u64 {
        let key = self.get_key(index);
        if offset >= key.len() {
            return 0;
        }

        let tail = &key[offset..];
        match tail.first_chunk::<PREFIX_CACHE_SIZE>() {
            Some(chunk) => u64::from_be_bytes(*chunk),
            None => {
                let mut buf = [0u8; PREFIX_CACHE_SIZE];
                buf[..tail.len()].copy_from_slice(tail);
                u64::from_be_bytes(buf)
            }
        }
    }
}

impl<T: AsRef<[u8]>> KeyAccessor for [T] {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}

// Explicit Vec impl to avoid `.as_slice()` at call sites.
impl<T: AsRef<[u8]>> KeyAccessor for Vec<T> {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<T: AsRef<[u8]>> KeyAccessor for VecDeque<T> {
    fn get_key(&self, index: usize) -> &[u8] {
        self[index].as_ref()
    }

    fn len(&self) -> usize {
        self.len()
    }
}
