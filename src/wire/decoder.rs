//! # Decoder
//!
//! Reads framed tuples from a byte stream: parse the envelope byte,
//! read the content length at the indicated width, cap-check it, draw
//! exactly that many bytes into the working buffer, then parse the header
//! and payload for the protocol version the envelope declared.
//!
//! The decoder owns one working buffer that is reset between calls, so a
//! single decoder is not safe for concurrent use; give each thread its
//! own decoder over its own reader.

use std::io::{BufReader, Read};

use eyre::{bail, ensure, Result};

use crate::codes::{read_uint, SizeClass};
use crate::error::TupleError;
use crate::registry::Registry;
use crate::tuple::header::{RawPrefix, TupleHeader, VERSION_MASK, FIXED_HEADER_LEN};
use crate::tuple::Tuple;

/// Reads framed tuples from an underlying reader, resolving types through
/// a registry.
pub struct Decoder<R> {
    registry: Registry,
    max_size: u64,
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder with a maximum tuple size. Frames whose declared
    /// content length exceeds `max_size` are rejected before any payload
    /// bytes are read.
    pub fn new(registry: Registry, max_size: u64, reader: R) -> Self {
        Self {
            registry,
            max_size,
            reader: BufReader::new(reader),
            buffer: Vec::new(),
        }
    }

    /// Reads and decodes the next tuple from the stream.
    pub fn decode(&mut self) -> Result<Tuple> {
        let mut envelope = [0u8; 1];
        self.reader.read_exact(&mut envelope)?;
        let protocol_version = envelope[0] & VERSION_MASK;
        let class = SizeClass::from_bits(envelope[0] >> 6);

        let width = class.width();
        let mut length = [0u8; 8];
        self.reader.read_exact(&mut length[..width])?;
        let content_length = read_uint(&length, width);

        if content_length > self.max_size {
            bail!(TupleError::TupleTooLarge {
                length: content_length,
                max: self.max_size,
            });
        }

        self.buffer.clear();
        self.buffer.resize(content_length as usize, 0);
        self.reader.read_exact(&mut self.buffer)?;

        match protocol_version {
            0 => decode_tuple(&self.registry, &self.buffer),
            version => bail!(TupleError::InvalidProtocolVersion(version)),
        }
    }
}

/// Parses one protocol-version-0 tuple body (header followed by payload,
/// no envelope) against a registry.
pub fn decode_tuple(registry: &Registry, body: &[u8]) -> Result<Tuple> {
    let prefix = RawPrefix::parse(body)?;
    let tuple_version = prefix.tuple_version();
    let field_size = prefix.field_size();
    let namespace_hash = prefix.namespace_hash();
    let type_hash = prefix.type_hash();
    let field_count = prefix.field_count();

    let width = field_size.width();
    let table_len = field_count as usize * width;
    let header_len = FIXED_HEADER_LEN + table_len + width;
    ensure!(body.len() >= header_len, TupleError::TupleLengthTooSmall);

    // Widen each offset to u64, normalizing the all-ones sentinel.
    let sentinel = field_size.sentinel();
    let mut offsets = Vec::with_capacity(field_count as usize);
    let mut pos = FIXED_HEADER_LEN;
    for _ in 0..field_count {
        let raw = read_uint(&body[pos..], width);
        offsets.push(if raw == sentinel { u64::MAX } else { raw });
        pos += width;
    }
    let content_length = read_uint(&body[pos..], width);
    pos += width;

    let Some(tuple_type) = registry.get(namespace_hash, type_hash) else {
        bail!(TupleError::UnknownType {
            namespace_hash,
            type_hash,
        });
    };

    let payload = &body[pos..];
    ensure!(
        payload.len() as u64 == content_length,
        TupleError::InvalidHeader(format!(
            "content length {} disagrees with {} payload bytes",
            content_length,
            payload.len()
        ))
    );

    let header = TupleHeader {
        protocol_version: 0,
        tuple_version,
        namespace_hash,
        type_hash,
        field_count,
        field_size,
        content_length,
        offsets,
        tuple_type,
    };
    Ok(Tuple::new(payload.to_vec(), header))
}

/// Total byte length (header plus payload) of the tuple body starting at
/// the front of `body`. Used to walk self-delimiting nested tuples.
pub(crate) fn tuple_body_size(body: &[u8]) -> Result<usize> {
    let prefix = RawPrefix::parse(body)?;
    let width = prefix.field_size().width();
    let table_len = prefix.field_count() as usize * width;
    let header_len = FIXED_HEADER_LEN + table_len + width;
    ensure!(body.len() >= header_len, TupleError::TupleLengthTooSmall);
    let content_length = read_uint(&body[FIXED_HEADER_LEN + table_len..], width);
    Ok(header_len + content_length as usize)
}
