//! # Tuple Core
//!
//! Everything between a schema and the wire: the in-memory type model,
//! the builder that lays out field records into a buffer, the header that
//! addresses them, and the sealed tuple with its typed accessors.
//!
//! ## Record Binary Layout
//!
//! Each field record in a payload is:
//!
//! ```text
//! +-----------+---------------------+--------------+
//! | tag (1B)  | length? (1|2|4|8 B) | payload ...  |
//! +-----------+---------------------+--------------+
//! ```
//!
//! Fixed-width scalars omit the length; variable-width payloads carry it
//! at the width implied by the tag. The header's offset table records
//! where each field record starts, so field access never scans the
//! payload.
//!
//! ## Module Structure
//!
//! - `types`: FieldType, Field, Version, TupleType
//! - `builder`: TupleBuilder with the put_* family
//! - `header`: TupleHeader encode/decode and the fixed prefix layout
//! - `record`: the sealed Tuple (size, identity, offsets, write)
//! - `view`: typed get_* accessors over a sealed tuple

pub mod builder;
pub mod header;
pub mod record;
pub mod types;
pub mod view;

#[cfg(test)]
mod tests;

pub use builder::TupleBuilder;
pub use header::{TupleHeader, FIXED_HEADER_LEN};
pub use record::Tuple;
pub use types::{Field, FieldType, TupleType, Version, MAX_VERSIONS};
