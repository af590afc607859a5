//! # Wire Format
//!
//! A framed envelope lets a reader recover a tuple of unknown size from a
//! byte stream:
//!
//! ```text
//! byte 0        [ size_enum:2 | protocol_version:6 ]
//! next W bytes  content length (header + payload), little-endian
//! then          exactly content-length bytes of header and payload
//! ```
//!
//! The envelope's width W is chosen independently of the header's: a small
//! tuple with a large offset table and a large tuple with a tiny one each
//! get the minimal framing for their own totals.
//!
//! Protocol version 0 denotes the header layout described in
//! [`crate::tuple::header`]. An [`Encoder`] writes the frame to any
//! `io::Write`; a [`Decoder`] reads frames from any `io::Read`, resolving
//! types through a [`Registry`](crate::Registry).

pub mod decoder;
pub mod encoder;

pub use decoder::{decode_tuple, Decoder};
pub use encoder::Encoder;

/// The wire protocol version this crate emits.
pub const PROTOCOL_VERSION: u8 = 0;
