//! # Tuple
//!
//! An immutable encoded record: the payload bytes produced by a builder
//! (or recovered by a decoder) plus the header that addresses them. The
//! tuple owns its payload, so it stays valid after the builder buffer is
//! reused or the decoder moves on to the next record.

use eyre::{bail, ensure, Result};

use crate::error::TupleError;
use crate::tuple::header::TupleHeader;
use crate::tuple::types::TupleType;

/// An immutable encoded record addressable by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub(crate) data: Vec<u8>,
    pub header: TupleHeader,
}

impl Tuple {
    pub(crate) fn new(data: Vec<u8>, header: TupleHeader) -> Self {
        Self { data, header }
    }

    /// Number of payload bytes, header not included.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Identity comparison by both hashes.
    pub fn is(&self, tuple_type: &TupleType) -> bool {
        self.header.namespace_hash == tuple_type.namespace_hash()
            && self.header.type_hash == tuple_type.type_hash()
    }

    /// Raw payload bytes (the concatenated field records).
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of a field within the payload.
    ///
    /// Returns `Ok(None)` for an optional field that is absent in this
    /// tuple's version (the sentinel offset). Fails with `UnknownField`
    /// for names the schema does not declare, and with
    /// `InvalidFieldIndex` when the schema and the header disagree on the
    /// field count.
    pub fn offset(&self, field: &str) -> Result<Option<u64>> {
        let Some(index) = self.header.tuple_type.field_index(field) else {
            bail!(TupleError::UnknownField(field.to_string()));
        };
        if index >= self.header.field_count as usize {
            bail!(TupleError::InvalidFieldIndex {
                index,
                field_count: self.header.field_count,
            });
        }
        let offset = self.header.offsets[index];
        if offset == u64::MAX {
            return Ok(None);
        }
        Ok(Some(offset))
    }

    /// Serializes header followed by payload into the front of `dst`,
    /// returning the number of bytes written.
    pub fn write(&self, dst: &mut [u8]) -> Result<usize> {
        let required = self.header.size() + self.data.len();
        ensure!(
            dst.len() >= required,
            TupleError::BufferTooSmall {
                required,
                available: dst.len(),
            }
        );
        let wrote = self.header.encode(dst)?;
        dst[wrote..wrote + self.data.len()].copy_from_slice(&self.data);
        Ok(wrote + self.data.len())
    }
}
