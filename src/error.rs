//! # Error Categories
//!
//! Every failure the serialization core can surface falls into one of the
//! categories below. Operations return `eyre::Result`, so callers that only
//! want a message get one for free; callers that dispatch on the category
//! downcast the report:
//!
//! ```ignore
//! match builder.put_uint8("age", 25) {
//!     Err(e) if matches!(e.downcast_ref(), Some(TupleError::UnknownField(_))) => ...,
//!     other => ...,
//! }
//! ```
//!
//! Schema parse failures use [`SyntaxError`](crate::schema::SyntaxError)
//! instead, and reader/writer failures pass through as `std::io::Error`.

use thiserror::Error;

use crate::tuple::FieldType;

/// Failure categories for building, encoding and decoding tuples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TupleError {
    /// A put or offset call named a field the schema does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A put or get used the wrong variant for the field's declared type.
    #[error("incorrect type for field '{field}': declared {declared:?}, accessed as {accessed:?}")]
    TypeMismatch {
        field: String,
        declared: FieldType,
        accessed: FieldType,
    },

    /// A write would run past the end of the target buffer.
    #[error("buffer too small: need {required} bytes, {available} available")]
    BufferTooSmall { required: usize, available: usize },

    /// Build could not satisfy any schema version.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// Header bytes are self-inconsistent.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The decoder received fewer bytes than the fixed header requires.
    #[error("tuple length is too short for the fixed header")]
    TupleLengthTooSmall,

    /// The decoded content length exceeded the decoder's cap.
    #[error("tuple of {length} bytes exceeds maximum allowable length {max}")]
    TupleTooLarge { length: u64, max: u64 },

    /// The envelope declared a protocol this implementation does not know.
    #[error("invalid protocol version in tuple envelope: {0}")]
    InvalidProtocolVersion(u8),

    /// Decoded hashes do not map to any registered tuple type.
    #[error("unknown tuple type: namespace hash {namespace_hash:#010x}, type hash {type_hash:#010x}")]
    UnknownType { namespace_hash: u32, type_hash: u32 },

    /// The schema's dense index for a field exceeds the header field count.
    #[error("field index {index} out of range for header with {field_count} fields")]
    InvalidFieldIndex { index: usize, field_count: u32 },
}
