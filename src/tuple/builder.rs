//! # TupleBuilder
//!
//! `TupleBuilder` fills a caller-supplied byte buffer with encoded field
//! records and seals them into an immutable [`Tuple`]. The builder is the
//! only component that writes payload bytes, so the width-selection policy
//! lives here: every put picks the narrowest tag that represents the
//! value, the length, or the element count.
//!
//! ## Put protocol
//!
//! Every `put_*` runs the same three steps:
//!
//! 1. **Type check**: the field must exist in the schema and its declared
//!    category must match the put variant.
//! 2. **Space check**: the whole record (tag, prefix, payload) must fit in
//!    the remaining buffer. Nothing is written on failure, the cursor does
//!    not move, and no offset is recorded.
//! 3. **Write**: tag byte at the cursor, then the payload. The field's
//!    offset is recorded at the tag byte position; putting the same field
//!    again overwrites the offset and leaves the earlier bytes as dead
//!    payload.
//!
//! ## Build
//!
//! `build` walks the schema versions in declaration order against the
//! recorded offsets, synthesizes the header (including the tuple version,
//! which is the count of the leading run of satisfied versions), copies
//! the used slice of the buffer into the tuple, and resets the builder for
//! the next fill cycle.
//!
//! ## Usage
//!
//! ```ignore
//! let mut buffer = vec![0u8; 1024];
//! let mut builder = TupleBuilder::new(user_type, &mut buffer);
//! builder.put_string("uuid", "ab-cd")?;
//! builder.put_string("username", "max")?;
//! builder.put_uint8("age", 29)?;
//! let tuple = builder.build()?;
//! ```

use eyre::{bail, Result};
use hashbrown::HashMap;

use crate::codes::{write_uint, SizeClass, TypeCode};
use crate::error::TupleError;
use crate::tuple::header::TupleHeader;
use crate::tuple::record::Tuple;
use crate::tuple::types::{Field, FieldType, TupleType};
use crate::wire::PROTOCOL_VERSION;

/// Validation and layout engine for one tuple type over one buffer.
pub struct TupleBuilder<'a> {
    tuple_type: TupleType,
    fields: HashMap<String, Field>,
    offsets: HashMap<String, u64>,
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> TupleBuilder<'a> {
    /// Creates a builder for `tuple_type` writing into `buffer`. The
    /// buffer is logically owned by the builder until `build` returns.
    pub fn new(tuple_type: TupleType, buffer: &'a mut [u8]) -> Self {
        let mut fields = HashMap::with_capacity(tuple_type.field_count());
        for version in tuple_type.versions() {
            for field in &version.fields {
                fields.insert(field.name.clone(), field.clone());
            }
        }
        Self {
            tuple_type,
            fields,
            offsets: HashMap::new(),
            buffer,
            pos: 0,
        }
    }

    pub fn tuple_type(&self) -> &TupleType {
        &self.tuple_type
    }

    /// Bytes remaining in the buffer.
    pub fn available(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Abandons the current fill cycle: cursor back to zero, offsets
    /// cleared. `build` performs this implicitly.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.offsets.clear();
    }

    fn type_check(&self, field: &str, accessed: FieldType) -> Result<()> {
        let Some(declared) = self.fields.get(field) else {
            bail!(TupleError::UnknownField(field.to_string()));
        };
        if declared.field_type != accessed {
            bail!(TupleError::TypeMismatch {
                field: field.to_string(),
                declared: declared.field_type,
                accessed,
            });
        }
        Ok(())
    }

    fn ensure_space(&self, required: usize) -> Result<()> {
        if self.available() < required {
            bail!(TupleError::BufferTooSmall {
                required,
                available: self.available(),
            });
        }
        Ok(())
    }

    /// Records the field offset at the tag byte and advances the cursor.
    fn commit(&mut self, field: &str, written: usize) -> usize {
        self.offsets.insert(field.to_string(), self.pos as u64);
        self.pos += written;
        written
    }

    pub fn put_bool(&mut self, field: &str, value: bool) -> Result<usize> {
        self.type_check(field, FieldType::Bool)?;
        self.ensure_space(1)?;
        self.buffer[self.pos] = if value {
            TypeCode::BoolTrue.as_u8()
        } else {
            TypeCode::BoolFalse.as_u8()
        };
        Ok(self.commit(field, 1))
    }

    pub fn put_uint8(&mut self, field: &str, value: u8) -> Result<usize> {
        self.type_check(field, FieldType::Uint8)?;
        self.ensure_space(2)?;
        self.buffer[self.pos] = TypeCode::Uint8.as_u8();
        self.buffer[self.pos + 1] = value;
        Ok(self.commit(field, 2))
    }

    pub fn put_uint16(&mut self, field: &str, value: u16) -> Result<usize> {
        self.type_check(field, FieldType::Uint16)?;
        let class = SizeClass::for_value(value as u64).min(SizeClass::Two);
        self.write_unsigned(field, TypeCode::uint16(class), value as u64, class)
    }

    pub fn put_uint32(&mut self, field: &str, value: u32) -> Result<usize> {
        self.type_check(field, FieldType::Uint32)?;
        let class = SizeClass::for_value(value as u64).min(SizeClass::Four);
        self.write_unsigned(field, TypeCode::uint32(class), value as u64, class)
    }

    pub fn put_uint64(&mut self, field: &str, value: u64) -> Result<usize> {
        self.type_check(field, FieldType::Uint64)?;
        let class = SizeClass::for_value(value);
        self.write_unsigned(field, TypeCode::uint64(class), value, class)
    }

    pub fn put_int8(&mut self, field: &str, value: i8) -> Result<usize> {
        self.type_check(field, FieldType::Int8)?;
        self.ensure_space(2)?;
        self.buffer[self.pos] = TypeCode::Int8.as_u8();
        self.buffer[self.pos + 1] = value as u8;
        Ok(self.commit(field, 2))
    }

    pub fn put_int16(&mut self, field: &str, value: i16) -> Result<usize> {
        self.type_check(field, FieldType::Int16)?;
        let class = SizeClass::for_signed(value as i64).min(SizeClass::Two);
        self.write_signed(field, TypeCode::int16(class), value as i64, class)
    }

    pub fn put_int32(&mut self, field: &str, value: i32) -> Result<usize> {
        self.type_check(field, FieldType::Int32)?;
        let class = SizeClass::for_signed(value as i64).min(SizeClass::Four);
        self.write_signed(field, TypeCode::int32(class), value as i64, class)
    }

    pub fn put_int64(&mut self, field: &str, value: i64) -> Result<usize> {
        self.type_check(field, FieldType::Int64)?;
        let class = SizeClass::for_signed(value);
        self.write_signed(field, TypeCode::int64(class), value, class)
    }

    pub fn put_float32(&mut self, field: &str, value: f32) -> Result<usize> {
        self.type_check(field, FieldType::Float32)?;
        self.ensure_space(5)?;
        self.buffer[self.pos] = TypeCode::Float32.as_u8();
        self.buffer[self.pos + 1..self.pos + 5].copy_from_slice(&value.to_le_bytes());
        Ok(self.commit(field, 5))
    }

    pub fn put_float64(&mut self, field: &str, value: f64) -> Result<usize> {
        self.type_check(field, FieldType::Float64)?;
        self.ensure_space(9)?;
        self.buffer[self.pos] = TypeCode::Float64.as_u8();
        self.buffer[self.pos + 1..self.pos + 9].copy_from_slice(&value.to_le_bytes());
        Ok(self.commit(field, 9))
    }

    /// Writes a timestamp as i64 nanoseconds since the Unix epoch. Always
    /// nine bytes; timestamps are never narrowed.
    pub fn put_timestamp(&mut self, field: &str, nanos: i64) -> Result<usize> {
        self.type_check(field, FieldType::Timestamp)?;
        self.ensure_space(9)?;
        self.buffer[self.pos] = TypeCode::Timestamp.as_u8();
        self.buffer[self.pos + 1..self.pos + 9].copy_from_slice(&nanos.to_le_bytes());
        Ok(self.commit(field, 9))
    }

    pub fn put_string(&mut self, field: &str, value: &str) -> Result<usize> {
        self.type_check(field, FieldType::String)?;
        let bytes = value.as_bytes();
        let class = SizeClass::for_value(bytes.len() as u64);
        self.write_var(field, TypeCode::string(class), class, bytes.len() as u64, bytes)
    }

    pub fn put_bytes(&mut self, field: &str, value: &[u8]) -> Result<usize> {
        self.type_check(field, FieldType::Bytes)?;
        let class = SizeClass::for_value(value.len() as u64);
        self.write_var(field, TypeCode::bytes(class), class, value.len() as u64, value)
    }

    /// Writes a nested tuple as header followed by payload, length-prefixed
    /// by the combined byte count.
    pub fn put_tuple(&mut self, field: &str, value: &Tuple) -> Result<usize> {
        self.type_check(field, FieldType::Tuple)?;
        let body = value.header.size() + value.size();
        let class = SizeClass::for_value(body as u64);
        let prefix = class.width();
        let total = 1 + prefix + body;
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::tuple_ref(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], body as u64, prefix);
        let start = self.pos + 1 + prefix;
        value.write(&mut self.buffer[start..start + body])?;
        Ok(self.commit(field, total))
    }

    pub fn put_bool_array(&mut self, field: &str, values: &[bool]) -> Result<usize> {
        self.type_check(field, FieldType::BoolArray)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 1);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::bool_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at] = value as u8;
            at += 1;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_uint8_array(&mut self, field: &str, values: &[u8]) -> Result<usize> {
        self.type_check(field, FieldType::Uint8Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 1);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::uint8_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        self.buffer[self.pos + 1 + prefix..self.pos + total].copy_from_slice(values);
        Ok(self.commit(field, total))
    }

    pub fn put_uint16_array(&mut self, field: &str, values: &[u16]) -> Result<usize> {
        self.type_check(field, FieldType::Uint16Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 2);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::uint16_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
            at += 2;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_uint32_array(&mut self, field: &str, values: &[u32]) -> Result<usize> {
        self.type_check(field, FieldType::Uint32Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 4);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::uint32_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
            at += 4;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_uint64_array(&mut self, field: &str, values: &[u64]) -> Result<usize> {
        self.type_check(field, FieldType::Uint64Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 8);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::uint64_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 8].copy_from_slice(&value.to_le_bytes());
            at += 8;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_int8_array(&mut self, field: &str, values: &[i8]) -> Result<usize> {
        self.type_check(field, FieldType::Int8Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 1);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::int8_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at] = value as u8;
            at += 1;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_int16_array(&mut self, field: &str, values: &[i16]) -> Result<usize> {
        self.type_check(field, FieldType::Int16Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 2);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::int16_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
            at += 2;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_int32_array(&mut self, field: &str, values: &[i32]) -> Result<usize> {
        self.type_check(field, FieldType::Int32Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 4);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::int32_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
            at += 4;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_int64_array(&mut self, field: &str, values: &[i64]) -> Result<usize> {
        self.type_check(field, FieldType::Int64Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 8);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::int64_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 8].copy_from_slice(&value.to_le_bytes());
            at += 8;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_float32_array(&mut self, field: &str, values: &[f32]) -> Result<usize> {
        self.type_check(field, FieldType::Float32Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 4);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::float32_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
            at += 4;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_float64_array(&mut self, field: &str, values: &[f64]) -> Result<usize> {
        self.type_check(field, FieldType::Float64Array)?;
        let (class, prefix, total) = Self::array_layout(values.len(), 8);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::float64_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in values {
            self.buffer[at..at + 8].copy_from_slice(&value.to_le_bytes());
            at += 8;
        }
        Ok(self.commit(field, total))
    }

    pub fn put_timestamp_array(&mut self, field: &str, nanos: &[i64]) -> Result<usize> {
        self.type_check(field, FieldType::TimestampArray)?;
        let (class, prefix, total) = Self::array_layout(nanos.len(), 8);
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::timestamp_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], nanos.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for &value in nanos {
            self.buffer[at..at + 8].copy_from_slice(&value.to_le_bytes());
            at += 8;
        }
        Ok(self.commit(field, total))
    }

    /// Writes an array of nested tuples. The count is prefixed; each
    /// element is header followed by payload, and elements delimit
    /// themselves through their headers.
    pub fn put_tuple_array(&mut self, field: &str, values: &[Tuple]) -> Result<usize> {
        self.type_check(field, FieldType::TupleArray)?;
        let body: usize = values
            .iter()
            .map(|tuple| tuple.header.size() + tuple.size())
            .sum();
        let class = SizeClass::for_value(values.len() as u64);
        let prefix = class.width();
        let total = 1 + prefix + body;
        self.ensure_space(total)?;
        self.buffer[self.pos] = TypeCode::tuple_array(class).as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], values.len() as u64, prefix);
        let mut at = self.pos + 1 + prefix;
        for tuple in values {
            let size = tuple.header.size() + tuple.size();
            tuple.write(&mut self.buffer[at..at + size])?;
            at += size;
        }
        Ok(self.commit(field, total))
    }

    fn write_unsigned(
        &mut self,
        field: &str,
        code: TypeCode,
        value: u64,
        class: SizeClass,
    ) -> Result<usize> {
        let width = class.width();
        self.ensure_space(1 + width)?;
        self.buffer[self.pos] = code.as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], value, width);
        Ok(self.commit(field, 1 + width))
    }

    fn write_signed(
        &mut self,
        field: &str,
        code: TypeCode,
        value: i64,
        class: SizeClass,
    ) -> Result<usize> {
        let width = class.width();
        self.ensure_space(1 + width)?;
        self.buffer[self.pos] = code.as_u8();
        match class {
            SizeClass::One => self.buffer[self.pos + 1] = value as i8 as u8,
            SizeClass::Two => self.buffer[self.pos + 1..self.pos + 3]
                .copy_from_slice(&(value as i16).to_le_bytes()),
            SizeClass::Four => self.buffer[self.pos + 1..self.pos + 5]
                .copy_from_slice(&(value as i32).to_le_bytes()),
            SizeClass::Eight => {
                self.buffer[self.pos + 1..self.pos + 9].copy_from_slice(&value.to_le_bytes())
            }
        }
        Ok(self.commit(field, 1 + width))
    }

    fn write_var(
        &mut self,
        field: &str,
        code: TypeCode,
        class: SizeClass,
        length: u64,
        payload: &[u8],
    ) -> Result<usize> {
        let prefix = class.width();
        let total = 1 + prefix + payload.len();
        self.ensure_space(total)?;
        self.buffer[self.pos] = code.as_u8();
        write_uint(&mut self.buffer[self.pos + 1..], length, prefix);
        self.buffer[self.pos + 1 + prefix..self.pos + total].copy_from_slice(payload);
        Ok(self.commit(field, total))
    }

    fn array_layout(count: usize, element_width: usize) -> (SizeClass, usize, usize) {
        let class = SizeClass::for_value(count as u64);
        let prefix = class.width();
        (class, prefix, 1 + prefix + count * element_width)
    }

    /// Seals the written fields into a [`Tuple`]. The builder is reset
    /// whether or not the build succeeds.
    pub fn build(&mut self) -> Result<Tuple> {
        match self.new_header() {
            Ok(header) => {
                let data = self.buffer[..self.pos].to_vec();
                self.reset();
                Ok(Tuple::new(data, header))
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Synthesizes the header from the recorded offsets.
    ///
    /// Versions are walked in declaration order alongside the running
    /// dense field index. A version is satisfied when every required field
    /// was written and, for versions with no required fields, at least one
    /// of its fields was written. The tuple version is the length of the
    /// leading run of satisfied versions, so a consumer that reads tuple
    /// version V may rely on every required field of versions 1..=V being
    /// present.
    fn new_header(&self) -> Result<TupleHeader> {
        let field_count = self.tuple_type.field_count() as u32;
        let mut offsets = vec![u64::MAX; field_count as usize];
        let mut tuple_version: u8 = 0;
        let mut run_intact = true;
        let mut missing: Option<&str> = None;
        let mut first_unwritten: Option<&str> = None;
        let mut index = 0usize;

        for version in self.tuple_type.versions() {
            let mut satisfied = true;
            let mut any_written = version.fields.is_empty();
            for (slot, field) in version.fields.iter().enumerate() {
                match self.offsets.get(field.name.as_str()) {
                    Some(&offset) => {
                        offsets[index + slot] = offset;
                        any_written = true;
                    }
                    None => {
                        if first_unwritten.is_none() {
                            first_unwritten = Some(&field.name);
                        }
                        if field.required {
                            // A missing required field stops this version;
                            // the rest of its slots keep the sentinel.
                            satisfied = false;
                            if missing.is_none() {
                                missing = Some(&field.name);
                            }
                            break;
                        }
                    }
                }
            }
            index += version.fields.len();
            if run_intact && satisfied && any_written {
                tuple_version += 1;
            } else {
                run_intact = false;
            }
        }

        if tuple_version == 0 {
            let name = missing.or(first_unwritten).unwrap_or_default();
            bail!(TupleError::MissingRequiredField(name.to_string()));
        }

        Ok(TupleHeader {
            protocol_version: PROTOCOL_VERSION,
            tuple_version,
            namespace_hash: self.tuple_type.namespace_hash(),
            type_hash: self.tuple_type.type_hash(),
            field_count,
            field_size: SizeClass::for_value(self.pos as u64),
            content_length: self.pos as u64,
            offsets,
            tuple_type: self.tuple_type.clone(),
        })
    }
}
