//! Tag-length-value record encoding.
//!
//! A box is a flat sequence of items. Each item is a little-endian `u32`
//! tag, a little-endian `u32` value length, then the value bytes:
//!
//! ```text
//! +---------+---------+----------------+
//! | tag u32 | len u32 | value[len]     |  ...repeated
//! +---------+---------+----------------+
//! ```
//!
//! Integers are stored as `i32`, shorts (used for booleans) as `i16`,
//! strings as their UTF-8 bytes plus a trailing NUL. Boxes nest by storing
//! one box's bytes as another box's value.

use thiserror::Error;

const HEADER_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TlvError {
    #[error("truncated item at offset {offset}")]
    Truncated { offset: usize },
    #[error("value of {len} bytes does not fit a u32 length")]
    TooLarge { len: usize },
    #[error("tag {tag}: expected {expected} value bytes, found {found}")]
    WrongSize {
        tag: u32,
        expected: usize,
        found: usize,
    },
    #[error("tag {tag}: string value is not NUL-terminated UTF-8")]
    BadString { tag: u32 },
}

/// A record under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlvBox {
    buf: Vec<u8>,
    count: usize,
}

impl TlvBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_int(&mut self, tag: u32, value: i32) -> Result<(), TlvError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    pub fn put_short(&mut self, tag: u32, value: i16) -> Result<(), TlvError> {
        self.put_bytes(tag, &value.to_le_bytes())
    }

    pub fn put_string(&mut self, tag: u32, value: &str) -> Result<(), TlvError> {
        let len = value.len() + 1;
        let len32 = u32::try_from(len).map_err(|_| TlvError::TooLarge { len })?;
        self.buf.reserve(HEADER_LEN + len);
        self.buf.extend_from_slice(&tag.to_le_bytes());
        self.buf.extend_from_slice(&len32.to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        self.count += 1;
        Ok(())
    }

    /// Append raw value bytes under `tag`.
    pub fn put_bytes(&mut self, tag: u32, value: &[u8]) -> Result<(), TlvError> {
        let len = u32::try_from(value.len())
            .map_err(|_| TlvError::TooLarge { len: value.len() })?;
        self.buf.reserve(HEADER_LEN + value.len());
        self.buf.extend_from_slice(&tag.to_le_bytes());
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(value);
        self.count += 1;
        Ok(())
    }

    /// Nest `inner` as a single item.
    pub fn put_box(&mut self, tag: u32, inner: &TlvBox) -> Result<(), TlvError> {
        self.put_bytes(tag, inner.as_bytes())
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Iterate the items of an encoded box without copying.
    pub fn parse(bytes: &[u8]) -> Items<'_> {
        Items { bytes, offset: 0 }
    }
}

/// One decoded item borrowing from the encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub tag: u32,
    pub value: &'a [u8],
}

impl<'a> Tlv<'a> {
    pub fn as_int(&self) -> Result<i32, TlvError> {
        Ok(i32::from_le_bytes(self.fixed()?))
    }

    pub fn as_short(&self) -> Result<i16, TlvError> {
        Ok(i16::from_le_bytes(self.fixed()?))
    }

    /// The string value without its trailing NUL.
    pub fn as_str(&self) -> Result<&'a str, TlvError> {
        match self.value.split_last() {
            Some((0, body)) => {
                core::str::from_utf8(body).map_err(|_| TlvError::BadString { tag: self.tag })
            }
            _ => Err(TlvError::BadString { tag: self.tag }),
        }
    }

    /// Items of a nested box.
    pub fn as_box(&self) -> Items<'a> {
        TlvBox::parse(self.value)
    }

    fn fixed<const N: usize>(&self) -> Result<[u8; N], TlvError> {
        self.value.try_into().map_err(|_| TlvError::WrongSize {
            tag: self.tag,
            expected: N,
            found: self.value.len(),
        })
    }
}

/// Iterator returned by [`TlvBox::parse`]. Yields an error and stops at
/// the first truncated item.
pub struct Items<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<Tlv<'a>, TlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.bytes.get(self.offset..)?;
        if rest.is_empty() {
            return None;
        }
        let offset = self.offset;
        // Stop after an error.
        self.offset = self.bytes.len();

        if rest.len() < HEADER_LEN {
            return Some(Err(TlvError::Truncated { offset }));
        }
        let (header, tail) = rest.split_at(HEADER_LEN);
        let tag = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let value = match tail.get(..len) {
            Some(value) => value,
            None => return Some(Err(TlvError::Truncated { offset })),
        };

        self.offset = offset + HEADER_LEN + len;
        Some(Ok(Tlv { tag, value }))
    }
}
