use std::mem;
use std::num::TryFromIntError;

use anyhow::bail;

use super::context::WireContext;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("serialization version {0} is not supported")]
    VersionMismatch(u8),
    #[error("length does not fit into its prefix: {0}")]
    LengthOverflow(#[from] TryFromIntError),
    #[error("output buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("compression failed: {0}")]
    CompressionFailed(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type SerializeResult<R = ()> = anyhow::Result<R>;

pub trait Serialize {
    type Input: ?Sized;
    fn serialize<S: Serializer>(value: &Self::Input, ser: &mut S) -> SerializeResult;
}

pub trait Serializer {
    fn context(&self) -> WireContext;

    fn write_bytes(&mut self, bytes: &[u8]) -> SerializeResult;

    /// Reserves `length` bytes and lets `fill` write all of them at once.
    fn write<F>(&mut self, length: usize, fill: F) -> SerializeResult
    where
        F: FnOnce(&mut [u8]);
}

/// Serializes into a growing buffer.
#[derive(Debug)]
pub struct VecSerializer {
    context: WireContext,
    data: Vec<u8>,
}

impl VecSerializer {
    #[must_use]
    pub fn new(context: WireContext, initial_capacity: usize) -> Self {
        Self {
            context,
            data: Vec::with_capacity(initial_capacity),
        }
    }

    /// Returns everything written so far and leaves the serializer empty.
    pub fn take(&mut self) -> Vec<u8> {
        mem::take(&mut self.data)
    }
}

impl Serializer for VecSerializer {
    fn context(&self) -> WireContext {
        self.context
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> SerializeResult {
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    fn write<F>(&mut self, length: usize, fill: F) -> SerializeResult
    where
        F: FnOnce(&mut [u8]),
    {
        let start = self.data.len();
        self.data.resize(start + length, 0);
        if let Some(chunk) = self.data.get_mut(start..) {
            fill(chunk);
        }
        Ok(())
    }
}

/// Serializes into a caller provided buffer.
///
/// A write which doesn't fit fails before touching the buffer.
#[derive(Debug)]
pub struct SliceSerializer<'buf> {
    context: WireContext,
    buf: &'buf mut [u8],
    pos: usize,
}

impl<'buf> SliceSerializer<'buf> {
    #[must_use]
    pub fn new(context: WireContext, buf: &'buf mut [u8]) -> Self {
        Self {
            context,
            buf,
            pos: 0,
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.pos
    }

    fn reserve(&mut self, length: usize) -> SerializeResult<&mut [u8]> {
        let available = self.buf.len() - self.pos;
        let Some(chunk) = self.buf.get_mut(self.pos..self.pos.saturating_add(length)) else {
            bail!(SerializeError::BufferTooSmall {
                needed: length,
                available,
            });
        };
        self.pos += length;
        Ok(chunk)
    }
}

impl Serializer for SliceSerializer<'_> {
    fn context(&self) -> WireContext {
        self.context
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> SerializeResult {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn write<F>(&mut self, length: usize, fill: F) -> SerializeResult
    where
        F: FnOnce(&mut [u8]),
    {
        fill(self.reserve(length)?);
        Ok(())
    }
}
