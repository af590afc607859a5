//! # Tuple Header
//!
//! The header precedes the payload on the wire and carries everything a
//! reader needs to address fields without consulting the payload itself.
//!
//! ## Layout (protocol version 0)
//!
//! ```text
//! byte 0             [ size_enum:2 | tuple_version:6 ]
//! bytes 1..5         namespace hash   (u32 LE)
//! bytes 5..9         type hash        (u32 LE)
//! bytes 9..13        field count      (u32 LE)
//! bytes 13..13+N*W   offset table: N entries of width W in {1,2,4,8}
//! next W bytes       payload content length, width W
//! ```
//!
//! W is the smallest width that fits the content length, encoded in the
//! top two bits of byte 0. An offset of all-ones at width W is the
//! sentinel for "this optional field is absent in this tuple version".
//! Because real offsets are strictly less than the content length, which
//! is itself strictly less than the all-ones value at W, the sentinel can
//! never collide with a real offset.
//!
//! The fixed 13-byte prefix is described by a zerocopy struct so encode
//! and decode share one layout definition.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::codes::{write_uint, SizeClass};
use crate::error::TupleError;
use crate::tuple::types::TupleType;

/// Byte length of the fixed header prefix.
pub const FIXED_HEADER_LEN: usize = 13;

/// Mask for the tuple-version bits of header byte 0 (and the
/// protocol-version bits of the envelope byte).
pub const VERSION_MASK: u8 = 0x3F;

/// The packed fixed prefix of every version-0 header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub(crate) struct RawPrefix {
    packed: u8,
    namespace_hash: U32,
    type_hash: U32,
    field_count: U32,
}

const _: () = assert!(std::mem::size_of::<RawPrefix>() == FIXED_HEADER_LEN);

impl RawPrefix {
    pub(crate) fn new(
        tuple_version: u8,
        field_size: SizeClass,
        namespace_hash: u32,
        type_hash: u32,
        field_count: u32,
    ) -> Self {
        Self {
            packed: (tuple_version & VERSION_MASK) | (field_size.bits() << 6),
            namespace_hash: U32::new(namespace_hash),
            type_hash: U32::new(type_hash),
            field_count: U32::new(field_count),
        }
    }

    pub(crate) fn parse(bytes: &[u8]) -> Result<&Self> {
        ensure!(bytes.len() >= FIXED_HEADER_LEN, TupleError::TupleLengthTooSmall);
        Self::ref_from_bytes(&bytes[..FIXED_HEADER_LEN])
            .map_err(|_| TupleError::TupleLengthTooSmall.into())
    }

    pub(crate) fn tuple_version(&self) -> u8 {
        self.packed & VERSION_MASK
    }

    pub(crate) fn field_size(&self) -> SizeClass {
        SizeClass::from_bits(self.packed >> 6)
    }

    pub(crate) fn namespace_hash(&self) -> u32 {
        self.namespace_hash.get()
    }

    pub(crate) fn type_hash(&self) -> u32 {
        self.type_hash.get()
    }

    pub(crate) fn field_count(&self) -> u32 {
        self.field_count.get()
    }
}

/// Decoded (or to-be-encoded) tuple header.
///
/// Offsets are stored widened to u64 with the absent-field sentinel
/// normalized to `u64::MAX` regardless of the on-wire width. The header
/// carries the full [`TupleType`] by value so a decoded tuple stays
/// self-contained once the registry lookup has happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleHeader {
    pub protocol_version: u8,
    pub tuple_version: u8,
    pub namespace_hash: u32,
    pub type_hash: u32,
    pub field_count: u32,
    pub field_size: SizeClass,
    pub content_length: u64,
    pub offsets: Vec<u64>,
    pub tuple_type: TupleType,
}

impl TupleHeader {
    /// Encoded size: the fixed prefix, the offset table, and the
    /// content-length field at the same width as the offsets.
    pub fn size(&self) -> usize {
        let width = self.field_size.width();
        FIXED_HEADER_LEN + width * self.field_count as usize + width
    }

    /// Encodes the header into the front of `dst`, returning the number of
    /// bytes written.
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        ensure!(
            self.offsets.len() == self.field_count as usize,
            TupleError::InvalidHeader(format!(
                "field count {} does not equal number of field offsets {}",
                self.field_count,
                self.offsets.len()
            ))
        );
        ensure!(
            self.tuple_version & !VERSION_MASK == 0,
            TupleError::InvalidHeader(format!(
                "tuple version {} does not fit in six bits",
                self.tuple_version
            ))
        );
        let size = self.size();
        ensure!(
            dst.len() >= size,
            TupleError::BufferTooSmall {
                required: size,
                available: dst.len(),
            }
        );

        let prefix = RawPrefix::new(
            self.tuple_version,
            self.field_size,
            self.namespace_hash,
            self.type_hash,
            self.field_count,
        );
        dst[..FIXED_HEADER_LEN].copy_from_slice(prefix.as_bytes());

        let width = self.field_size.width();
        let mut pos = FIXED_HEADER_LEN;
        for &offset in &self.offsets {
            // Truncating u64::MAX yields the all-ones sentinel at width W.
            write_uint(&mut dst[pos..], offset, width);
            pos += width;
        }
        write_uint(&mut dst[pos..], self.content_length, width);
        pos += width;
        Ok(pos)
    }

    /// Encodes the header into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size()];
        self.encode(&mut buf)?;
        Ok(buf)
    }
}
