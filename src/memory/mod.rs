//! Guest memory access - offset resolution and result marshaling
//!
//! Design: the guest never hands the host a pointer, only an integer offset
//! into its own linear memory. `GuestMemory` is the capability the host holds
//! over that region; every read and write is a bounds-checked slice operation.
//!
//! Two rules hold for every write helper here:
//! - offset 0 is the "no destination" sentinel and is never touched
//! - nothing is written unless the whole target region fits in memory

use std::ffi::CString;
use std::fmt;
use std::ops::Range;

use thiserror::Error;
use tracing::{trace, warn};

/// Guest memory faults
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Region `[offset, offset + len)` does not lie inside guest memory
    #[error("guest region {offset:#x}+{len} outside memory of {memory_size} bytes")]
    OutOfBounds {
        offset: u32,
        len: usize,
        memory_size: usize,
    },

    /// String read ran off the end of guest memory before a NUL byte
    #[error("guest string at {offset:#x} is not NUL-terminated")]
    Unterminated { offset: u32 },
}

/// Byte position in guest linear memory
///
/// Wire integers are 32-bit signed; they are reinterpreted as unsigned so
/// that offsets past 2 GiB in a wasm32 memory stay addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GuestOffset(u32);

impl GuestOffset {
    /// The "caller does not want this output" sentinel
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Reinterpret a wire integer as an offset
    #[inline]
    pub const fn from_wire(raw: i32) -> Self {
        Self(raw as u32)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `None` for the null sentinel, the byte index otherwise
    #[inline]
    pub const fn resolve(self) -> Option<u32> {
        if self.is_null() {
            None
        } else {
            Some(self.0)
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<i32> for GuestOffset {
    fn from(raw: i32) -> Self {
        Self::from_wire(raw)
    }
}

impl fmt::Display for GuestOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Capability over a guest's linear memory
pub struct GuestMemory<'a> {
    bytes: &'a mut [u8],
}

impl<'a> GuestMemory<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Current size of the guest region in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &*self.bytes
    }

    fn region(&self, offset: u32, len: usize) -> Result<Range<usize>, MemoryError> {
        let start = offset as usize;
        start
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .map(|end| start..end)
            .ok_or_else(|| {
                warn!(
                    target: "memory",
                    offset,
                    len,
                    memory_size = self.bytes.len(),
                    "guest offset out of range"
                );
                MemoryError::OutOfBounds {
                    offset,
                    len,
                    memory_size: self.bytes.len(),
                }
            })
    }

    /// Check that `len` bytes fit at `dst` without writing anything
    ///
    /// Always succeeds for the null sentinel.
    pub fn check(&self, dst: GuestOffset, len: usize) -> Result<(), MemoryError> {
        match dst.resolve() {
            Some(offset) => self.region(offset, len).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Copy `src` verbatim to `dst`
    ///
    /// No-op for a null destination or an empty source. Returns the number of
    /// bytes written.
    pub fn write_bytes(&mut self, dst: GuestOffset, src: &[u8]) -> Result<usize, MemoryError> {
        let Some(offset) = dst.resolve() else {
            return Ok(0);
        };
        if src.is_empty() {
            return Ok(0);
        }

        let range = self.region(offset, src.len())?;
        self.bytes[range].copy_from_slice(src);
        trace!(target: "memory", offset, len = src.len(), "bytes written");
        Ok(src.len())
    }

    /// Copy an array of doubles to `dst` in native byte order
    pub fn write_f64s(&mut self, dst: GuestOffset, values: &[f64]) -> Result<usize, MemoryError> {
        let Some(offset) = dst.resolve() else {
            return Ok(0);
        };
        if values.is_empty() {
            return Ok(0);
        }

        let len = values.len() * F64_SIZE;
        let range = self.region(offset, len)?;
        for (chunk, value) in self.bytes[range].chunks_exact_mut(F64_SIZE).zip(values) {
            chunk.copy_from_slice(&value.to_ne_bytes());
        }
        trace!(target: "memory", offset, len, "doubles written");
        Ok(len)
    }

    /// Truncate-and-terminate string write
    ///
    /// `text` is read up to its first NUL byte (or its end). At most
    /// `max_len - 1` data bytes are copied, followed by exactly one NUL.
    /// Absent text is written as the empty string. A null destination or a
    /// non-positive `max_len` writes nothing.
    ///
    /// Returns the number of data bytes written, excluding the terminator.
    pub fn write_bounded_string(
        &mut self,
        dst: GuestOffset,
        text: Option<&[u8]>,
        max_len: i32,
    ) -> Result<i32, MemoryError> {
        let Some(offset) = dst.resolve() else {
            return Ok(0);
        };
        if max_len <= 0 {
            return Ok(0);
        }

        let data = text.map(c_text).unwrap_or_default();
        let len = data.len().min(max_len as usize - 1);

        let range = self.region(offset, len + 1)?;
        let out = &mut self.bytes[range];
        out[..len].copy_from_slice(&data[..len]);
        out[len] = 0;

        trace!(target: "memory", offset, len, max_len, truncated = len < data.len(), "string written");
        Ok(len as i32)
    }

    /// Read a NUL-terminated string starting at `src`
    ///
    /// Returns `None` for the null sentinel. The terminator must lie inside
    /// guest memory.
    pub fn read_c_string(&self, src: GuestOffset) -> Result<Option<CString>, MemoryError> {
        let Some(offset) = src.resolve() else {
            return Ok(None);
        };

        let start = offset as usize;
        let tail = self.bytes.get(start..).ok_or(MemoryError::OutOfBounds {
            offset,
            len: 1,
            memory_size: self.bytes.len(),
        })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(MemoryError::Unterminated { offset })?;

        // Cut at the first NUL, so the slice has none inside.
        Ok(CString::new(&tail[..end]).ok())
    }
}

impl fmt::Debug for GuestMemory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestMemory").field("len", &self.bytes.len()).finish()
    }
}

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Bytes of a C-style buffer up to the first NUL
#[inline]
pub fn c_text(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}

#[cfg(test)]
mod tests;
