//! # Typed Field Accessors
//!
//! The read side of a [`Tuple`]: locate a field through the header offset
//! table, check the tag byte, and widen the narrowed payload back to the
//! declared type. String and byte accessors return references into the
//! tuple's own payload; nothing here copies except the array getters,
//! which materialize their elements.
//!
//! Every accessor returns `Ok(None)` for an optional field that is absent
//! in this tuple's version, and fails with `TypeMismatch` when the
//! accessor variant does not match the field's declared type.
//!
//! ## Thread Safety
//!
//! Accessors take `&self` and read immutable bytes; a sealed tuple can be
//! shared across threads freely.

use eyre::{bail, eyre, Result};

use crate::codes::{read_uint, SizeClass, TypeCode};
use crate::error::TupleError;
use crate::registry::Registry;
use crate::tuple::record::Tuple;
use crate::tuple::types::FieldType;
use crate::wire::decoder::{decode_tuple, tuple_body_size};

impl Tuple {
    /// Type-checks the access and resolves the field's payload position.
    fn field_start(&self, field: &str, accessed: FieldType) -> Result<Option<usize>> {
        let Some(declared) = self.header.tuple_type.field(field) else {
            bail!(TupleError::UnknownField(field.to_string()));
        };
        if declared.field_type != accessed {
            bail!(TupleError::TypeMismatch {
                field: field.to_string(),
                declared: declared.field_type,
                accessed,
            });
        }
        Ok(self.offset(field)?.map(|offset| offset as usize))
    }

    fn tag_at(&self, field: &str, at: usize) -> Result<u8> {
        self.data
            .get(at)
            .copied()
            .ok_or_else(|| eyre!("field record for '{}' is out of bounds", field))
    }

    fn bytes_at(&self, field: &str, at: usize, len: usize) -> Result<&[u8]> {
        self.data
            .get(at..at + len)
            .ok_or_else(|| eyre!("field record for '{}' is truncated", field))
    }

    /// Reads a length- or count-prefixed record whose tag must be one of
    /// `family`, indexed by size class. Returns the prefix value and the
    /// position just past the prefix.
    fn prefixed(&self, field: &str, at: usize, family: [TypeCode; 4]) -> Result<(u64, usize)> {
        let tag = self.tag_at(field, at)?;
        let class = if tag == family[0].as_u8() {
            SizeClass::One
        } else if tag == family[1].as_u8() {
            SizeClass::Two
        } else if tag == family[2].as_u8() {
            SizeClass::Four
        } else if tag == family[3].as_u8() {
            SizeClass::Eight
        } else {
            bail!("unexpected tag {tag:#04x} for field '{field}'");
        };
        let width = class.width();
        let value = read_uint(self.bytes_at(field, at + 1, width)?, width);
        Ok((value, at + 1 + width))
    }

    pub fn get_bool(&self, field: &str) -> Result<Option<bool>> {
        let Some(at) = self.field_start(field, FieldType::Bool)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::BoolTrue.as_u8() => Ok(Some(true)),
            tag if tag == TypeCode::BoolFalse.as_u8() => Ok(Some(false)),
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    pub fn get_uint8(&self, field: &str) -> Result<Option<u8>> {
        let Some(at) = self.field_start(field, FieldType::Uint8)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::Uint8.as_u8() => Ok(Some(self.bytes_at(field, at + 1, 1)?[0])),
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    pub fn get_uint16(&self, field: &str) -> Result<Option<u16>> {
        let Some(at) = self.field_start(field, FieldType::Uint16)? else {
            return Ok(None);
        };
        let value = self.read_unsigned(
            field,
            at,
            &[(TypeCode::Uint16As8, 1), (TypeCode::Uint16As16, 2)],
        )?;
        Ok(Some(value as u16))
    }

    pub fn get_uint32(&self, field: &str) -> Result<Option<u32>> {
        let Some(at) = self.field_start(field, FieldType::Uint32)? else {
            return Ok(None);
        };
        let value = self.read_unsigned(
            field,
            at,
            &[
                (TypeCode::Uint32As8, 1),
                (TypeCode::Uint32As16, 2),
                (TypeCode::Uint32As32, 4),
            ],
        )?;
        Ok(Some(value as u32))
    }

    pub fn get_uint64(&self, field: &str) -> Result<Option<u64>> {
        let Some(at) = self.field_start(field, FieldType::Uint64)? else {
            return Ok(None);
        };
        let value = self.read_unsigned(
            field,
            at,
            &[
                (TypeCode::Uint64As8, 1),
                (TypeCode::Uint64As16, 2),
                (TypeCode::Uint64As32, 4),
                (TypeCode::Uint64As64, 8),
            ],
        )?;
        Ok(Some(value))
    }

    pub fn get_int8(&self, field: &str) -> Result<Option<i8>> {
        let Some(at) = self.field_start(field, FieldType::Int8)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::Int8.as_u8() => {
                Ok(Some(self.bytes_at(field, at + 1, 1)?[0] as i8))
            }
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    pub fn get_int16(&self, field: &str) -> Result<Option<i16>> {
        let Some(at) = self.field_start(field, FieldType::Int16)? else {
            return Ok(None);
        };
        let value = self.read_signed(
            field,
            at,
            &[(TypeCode::Int16As8, 1), (TypeCode::Int16As16, 2)],
        )?;
        Ok(Some(value as i16))
    }

    pub fn get_int32(&self, field: &str) -> Result<Option<i32>> {
        let Some(at) = self.field_start(field, FieldType::Int32)? else {
            return Ok(None);
        };
        let value = self.read_signed(
            field,
            at,
            &[
                (TypeCode::Int32As8, 1),
                (TypeCode::Int32As16, 2),
                (TypeCode::Int32As32, 4),
            ],
        )?;
        Ok(Some(value as i32))
    }

    pub fn get_int64(&self, field: &str) -> Result<Option<i64>> {
        let Some(at) = self.field_start(field, FieldType::Int64)? else {
            return Ok(None);
        };
        let value = self.read_signed(
            field,
            at,
            &[
                (TypeCode::Int64As8, 1),
                (TypeCode::Int64As16, 2),
                (TypeCode::Int64As32, 4),
                (TypeCode::Int64As64, 8),
            ],
        )?;
        Ok(Some(value))
    }

    pub fn get_float32(&self, field: &str) -> Result<Option<f32>> {
        let Some(at) = self.field_start(field, FieldType::Float32)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::Float32.as_u8() => {
                let bytes: [u8; 4] = self
                    .bytes_at(field, at + 1, 4)?
                    .try_into()
                    .map_err(|_| eyre!("insufficient data for float32 field '{}'", field))?;
                Ok(Some(f32::from_le_bytes(bytes)))
            }
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    pub fn get_float64(&self, field: &str) -> Result<Option<f64>> {
        let Some(at) = self.field_start(field, FieldType::Float64)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::Float64.as_u8() => {
                let bytes: [u8; 8] = self
                    .bytes_at(field, at + 1, 8)?
                    .try_into()
                    .map_err(|_| eyre!("insufficient data for float64 field '{}'", field))?;
                Ok(Some(f64::from_le_bytes(bytes)))
            }
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    /// Timestamps are i64 nanoseconds since the Unix epoch.
    pub fn get_timestamp(&self, field: &str) -> Result<Option<i64>> {
        let Some(at) = self.field_start(field, FieldType::Timestamp)? else {
            return Ok(None);
        };
        match self.tag_at(field, at)? {
            tag if tag == TypeCode::Timestamp.as_u8() => {
                let bytes: [u8; 8] = self
                    .bytes_at(field, at + 1, 8)?
                    .try_into()
                    .map_err(|_| eyre!("insufficient data for timestamp field '{}'", field))?;
                Ok(Some(i64::from_le_bytes(bytes)))
            }
            tag => bail!("unexpected tag {tag:#04x} for field '{field}'"),
        }
    }

    pub fn get_string(&self, field: &str) -> Result<Option<&str>> {
        let Some(at) = self.field_start(field, FieldType::String)? else {
            return Ok(None);
        };
        let (length, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::String8,
                TypeCode::String16,
                TypeCode::String32,
                TypeCode::String64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, length as usize)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|err| eyre!("invalid UTF-8 in string field '{}': {}", field, err))?;
        Ok(Some(text))
    }

    pub fn get_bytes(&self, field: &str) -> Result<Option<&[u8]>> {
        let Some(at) = self.field_start(field, FieldType::Bytes)? else {
            return Ok(None);
        };
        let (length, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Bytes8,
                TypeCode::Bytes16,
                TypeCode::Bytes32,
                TypeCode::Bytes64,
            ],
        )?;
        Ok(Some(self.bytes_at(field, start, length as usize)?))
    }

    /// Decodes a nested tuple field. The registry resolves the nested
    /// type, exactly as it would for a top-level decode.
    pub fn get_tuple(&self, field: &str, registry: &Registry) -> Result<Option<Tuple>> {
        let Some(at) = self.field_start(field, FieldType::Tuple)? else {
            return Ok(None);
        };
        let (length, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::TupleRef8,
                TypeCode::TupleRef16,
                TypeCode::TupleRef32,
                TypeCode::TupleRef64,
            ],
        )?;
        let body = self.bytes_at(field, start, length as usize)?;
        Ok(Some(decode_tuple(registry, body)?))
    }

    pub fn get_bool_array(&self, field: &str) -> Result<Option<Vec<bool>>> {
        let Some(at) = self.field_start(field, FieldType::BoolArray)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::BoolArray8,
                TypeCode::BoolArray16,
                TypeCode::BoolArray32,
                TypeCode::BoolArray64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize)?;
        Ok(Some(bytes.iter().map(|&b| b != 0).collect()))
    }

    pub fn get_uint8_array(&self, field: &str) -> Result<Option<Vec<u8>>> {
        let Some(at) = self.field_start(field, FieldType::Uint8Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Uint8Array8,
                TypeCode::Uint8Array16,
                TypeCode::Uint8Array32,
                TypeCode::Uint8Array64,
            ],
        )?;
        Ok(Some(self.bytes_at(field, start, count as usize)?.to_vec()))
    }

    pub fn get_uint16_array(&self, field: &str) -> Result<Option<Vec<u16>>> {
        let Some(at) = self.field_start(field, FieldType::Uint16Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Uint16Array8,
                TypeCode::Uint16Array16,
                TypeCode::Uint16Array32,
                TypeCode::Uint16Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 2)?;
        Ok(Some(
            bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                .collect(),
        ))
    }

    pub fn get_uint32_array(&self, field: &str) -> Result<Option<Vec<u32>>> {
        let Some(at) = self.field_start(field, FieldType::Uint32Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Uint32Array8,
                TypeCode::Uint32Array16,
                TypeCode::Uint32Array32,
                TypeCode::Uint32Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 4)?;
        Ok(Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_uint64_array(&self, field: &str) -> Result<Option<Vec<u64>>> {
        let Some(at) = self.field_start(field, FieldType::Uint64Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Uint64Array8,
                TypeCode::Uint64Array16,
                TypeCode::Uint64Array32,
                TypeCode::Uint64Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 8)?;
        Ok(Some(
            bytes
                .chunks_exact(8)
                .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_int8_array(&self, field: &str) -> Result<Option<Vec<i8>>> {
        let Some(at) = self.field_start(field, FieldType::Int8Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Int8Array8,
                TypeCode::Int8Array16,
                TypeCode::Int8Array32,
                TypeCode::Int8Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize)?;
        Ok(Some(bytes.iter().map(|&b| b as i8).collect()))
    }

    pub fn get_int16_array(&self, field: &str) -> Result<Option<Vec<i16>>> {
        let Some(at) = self.field_start(field, FieldType::Int16Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Int16Array8,
                TypeCode::Int16Array16,
                TypeCode::Int16Array32,
                TypeCode::Int16Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 2)?;
        Ok(Some(
            bytes
                .chunks_exact(2)
                .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
                .collect(),
        ))
    }

    pub fn get_int32_array(&self, field: &str) -> Result<Option<Vec<i32>>> {
        let Some(at) = self.field_start(field, FieldType::Int32Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Int32Array8,
                TypeCode::Int32Array16,
                TypeCode::Int32Array32,
                TypeCode::Int32Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 4)?;
        Ok(Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_int64_array(&self, field: &str) -> Result<Option<Vec<i64>>> {
        let Some(at) = self.field_start(field, FieldType::Int64Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Int64Array8,
                TypeCode::Int64Array16,
                TypeCode::Int64Array32,
                TypeCode::Int64Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 8)?;
        Ok(Some(
            bytes
                .chunks_exact(8)
                .map(|chunk| i64::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_float32_array(&self, field: &str) -> Result<Option<Vec<f32>>> {
        let Some(at) = self.field_start(field, FieldType::Float32Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Float32Array8,
                TypeCode::Float32Array16,
                TypeCode::Float32Array32,
                TypeCode::Float32Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 4)?;
        Ok(Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_float64_array(&self, field: &str) -> Result<Option<Vec<f64>>> {
        let Some(at) = self.field_start(field, FieldType::Float64Array)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::Float64Array8,
                TypeCode::Float64Array16,
                TypeCode::Float64Array32,
                TypeCode::Float64Array64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 8)?;
        Ok(Some(
            bytes
                .chunks_exact(8)
                .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    pub fn get_timestamp_array(&self, field: &str) -> Result<Option<Vec<i64>>> {
        let Some(at) = self.field_start(field, FieldType::TimestampArray)? else {
            return Ok(None);
        };
        let (count, start) = self.prefixed(
            field,
            at,
            [
                TypeCode::TimestampArray8,
                TypeCode::TimestampArray16,
                TypeCode::TimestampArray32,
                TypeCode::TimestampArray64,
            ],
        )?;
        let bytes = self.bytes_at(field, start, count as usize * 8)?;
        Ok(Some(
            bytes
                .chunks_exact(8)
                .map(|chunk| i64::from_le_bytes(chunk.try_into().unwrap()))
                .collect(),
        ))
    }

    /// Decodes a nested tuple array. Elements delimit themselves through
    /// their headers.
    pub fn get_tuple_array(&self, field: &str, registry: &Registry) -> Result<Option<Vec<Tuple>>> {
        let Some(at) = self.field_start(field, FieldType::TupleArray)? else {
            return Ok(None);
        };
        let (count, mut start) = self.prefixed(
            field,
            at,
            [
                TypeCode::TupleArray8,
                TypeCode::TupleArray16,
                TypeCode::TupleArray32,
                TypeCode::TupleArray64,
            ],
        )?;
        let mut tuples = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let remaining = self
                .data
                .get(start..)
                .ok_or_else(|| eyre!("field record for '{}' is truncated", field))?;
            let size = tuple_body_size(remaining)?;
            let body = self.bytes_at(field, start, size)?;
            tuples.push(decode_tuple(registry, body)?);
            start += size;
        }
        Ok(Some(tuples))
    }

    fn read_unsigned(&self, field: &str, at: usize, forms: &[(TypeCode, usize)]) -> Result<u64> {
        let tag = self.tag_at(field, at)?;
        for &(code, width) in forms {
            if tag == code.as_u8() {
                return Ok(read_uint(self.bytes_at(field, at + 1, width)?, width));
            }
        }
        bail!("unexpected tag {tag:#04x} for field '{field}'");
    }

    fn read_signed(&self, field: &str, at: usize, forms: &[(TypeCode, usize)]) -> Result<i64> {
        let tag = self.tag_at(field, at)?;
        for &(code, width) in forms {
            if tag == code.as_u8() {
                let bytes = self.bytes_at(field, at + 1, width)?;
                return Ok(match width {
                    1 => bytes[0] as i8 as i64,
                    2 => i16::from_le_bytes([bytes[0], bytes[1]]) as i64,
                    4 => i32::from_le_bytes(bytes.try_into().unwrap()) as i64,
                    _ => i64::from_le_bytes(bytes.try_into().unwrap()),
                });
            }
        }
        bail!("unexpected tag {tag:#04x} for field '{field}'");
    }
}
