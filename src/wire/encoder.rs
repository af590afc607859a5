//! # Encoder
//!
//! Serializes sealed tuples to a writer: envelope byte, content length at
//! the minimal width, header bytes, payload bytes. The encoder adds no
//! buffering of its own beyond assembling one frame; wrap the writer in a
//! `BufWriter` when the sink is unbuffered. Concurrent encoding is safe
//! only with independent encoders over independent writers.

use std::io::Write;

use eyre::Result;

use crate::codes::{write_uint, SizeClass};
use crate::tuple::Tuple;
use crate::wire::PROTOCOL_VERSION;

/// Writes framed tuples to an underlying writer.
pub struct Encoder<W> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes one tuple, returning the total number of bytes written to
    /// the stream (envelope and length prefix included).
    pub fn encode(&mut self, tuple: &Tuple) -> Result<usize> {
        let header_len = tuple.header.size();
        let content_length = (header_len + tuple.size()) as u64;
        let class = SizeClass::for_value(content_length);
        let width = class.width();

        let mut frame = Vec::with_capacity(1 + width + content_length as usize);
        frame.push(PROTOCOL_VERSION | (class.bits() << 6));
        let mut length = [0u8; 8];
        write_uint(&mut length, content_length, width);
        frame.extend_from_slice(&length[..width]);

        let mut header = vec![0u8; header_len];
        tuple.header.encode(&mut header)?;
        frame.extend_from_slice(&header);
        frame.extend_from_slice(tuple.payload());

        self.writer.write_all(&frame)?;
        Ok(frame.len())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
