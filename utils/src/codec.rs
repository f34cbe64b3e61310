//! Big-endian cursor codec.
//!
//! Every EPID structure has a fixed-layout, big-endian wire form. Parsers read it through a
//! [`ByteReader`], which never pads or truncates: asking for more bytes than remain is an error, and
//! [`BeDecode::from_be_bytes`] additionally rejects trailing bytes.

use ark_std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before `needed` bytes could be read.
    UnexpectedEnd { needed: usize, remaining: usize },
    /// A complete value was decoded but this many bytes were left over.
    TrailingBytes(usize),
}

/// Cursor over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    /// Everything not yet consumed, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    /// Succeeds only if the whole input was consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

/// Growable output buffer for the big-endian encoders.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.put(&v.to_be_bytes())
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.put(&v.to_be_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// A type with a fixed big-endian wire layout.
pub trait BeEncode {
    /// Exact number of bytes [`BeEncode::encode`] appends.
    fn encoded_size(&self) -> usize;

    fn encode(&self, w: &mut ByteWriter);

    fn to_be_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(self.encoded_size());
        self.encode(&mut w);
        w.into_inner()
    }
}

pub trait BeDecode: Sized {
    type Error: From<CodecError>;

    fn decode(r: &mut ByteReader<'_>) -> Result<Self, Self::Error>;

    /// Decodes a value that must span the whole of `bytes`.
    fn from_be_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut r = ByteReader::new(bytes);
        let v = Self::decode(&mut r)?;
        r.finish()?;
        Ok(v)
    }
}
