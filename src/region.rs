// Staging regions for the caller/session boundary.
//
// Two independently (re)allocatable byte regions:
//   - InputRegion: the caller stages compressed bytes here before a step
//   - OutputRegion: a step writes decompressed bytes here, from the start
//
// Both are fixed-capacity boxes. Reallocation releases the previous buffer
// and invalidates any address handed out for it. Allocation goes through
// `try_reserve_exact` so an out-of-memory condition surfaces as an error
// instead of aborting the process.

use std::fmt;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which of the two staging regions an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Input,
    Output,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// The allocator could not satisfy the request. The region keeps its
    /// previous buffer.
    #[error("failed to allocate {requested} bytes for the {kind} region")]
    AllocationFailed { kind: RegionKind, requested: usize },

    /// A valid length larger than the region's capacity was declared.
    #[error("{kind} region length {len} exceeds capacity {capacity}")]
    LengthExceedsCapacity {
        kind: RegionKind,
        len: usize,
        capacity: usize,
    },
}

fn allocate_zeroed(kind: RegionKind, len: usize) -> Result<Box<[u8]>, RegionError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| RegionError::AllocationFailed {
            kind,
            requested: len,
        })?;
    buf.resize(len, 0);
    Ok(buf.into_boxed_slice())
}

// ---------------------------------------------------------------------------
// InputRegion
// ---------------------------------------------------------------------------

/// Caller-owned staging buffer for compressed bytes.
///
/// Tracks a capacity (fixed until the next [`allocate`](Self::allocate)) and
/// a valid length: the number of leading bytes the caller has staged. Steps
/// may only reference ranges inside the valid length.
#[derive(Debug, Default)]
pub struct InputRegion {
    buf: Box<[u8]>,
    len: usize,
}

impl InputRegion {
    /// An empty, zero-capacity region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a region with `capacity` bytes already allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, RegionError> {
        let mut region = Self::new();
        region.allocate(capacity)?;
        Ok(region)
    }

    /// (Re)allocate the region to `len` bytes and return the whole buffer
    /// for filling.
    ///
    /// The prior buffer is released and its contents are discarded; the
    /// valid length resets to zero. `len == 0` yields an empty region.
    pub fn allocate(&mut self, len: usize) -> Result<&mut [u8], RegionError> {
        self.buf = allocate_zeroed(RegionKind::Input, len)?;
        self.len = 0;
        log::debug!("input region allocated: {len} bytes");
        Ok(&mut self.buf[..])
    }

    /// Copy `chunk` into the start of the region and make it the valid
    /// contents. Copies at most `capacity()` bytes; returns the count copied.
    pub fn stage(&mut self, chunk: &[u8]) -> usize {
        let n = chunk.len().min(self.buf.len());
        self.buf[..n].copy_from_slice(&chunk[..n]);
        self.len = n;
        n
    }

    /// Declare the first `len` bytes as valid after filling them in place
    /// through [`as_mut_slice`](Self::as_mut_slice).
    pub fn set_len(&mut self, len: usize) -> Result<(), RegionError> {
        if len > self.buf.len() {
            return Err(RegionError::LengthExceedsCapacity {
                kind: RegionKind::Input,
                len,
                capacity: self.buf.len(),
            });
        }
        self.len = len;
        Ok(())
    }

    /// Borrow `[offset, offset + len)` of the staged bytes, or `None` if the
    /// range reaches past the valid length.
    pub fn window(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(&self.buf[offset..end])
    }

    /// The staged bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// The full buffer, regardless of the valid length.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Base address of the current allocation.
    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of staged bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ---------------------------------------------------------------------------
// OutputRegion
// ---------------------------------------------------------------------------

/// Caller-owned buffer that a decode step writes into.
///
/// Every step writes from the region start, bounded by the capacity. The
/// bytes written by the last step stay available until they are drained or
/// the next step overwrites them.
#[derive(Debug, Default)]
pub struct OutputRegion {
    buf: Box<[u8]>,
    filled: usize,
}

impl OutputRegion {
    /// An empty, zero-capacity region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a region with `capacity` bytes already allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, RegionError> {
        let mut region = Self::new();
        region.allocate(capacity)?;
        Ok(region)
    }

    /// (Re)allocate the region to `len` bytes.
    ///
    /// Any undrained output is discarded and the write position resets to
    /// the region start. A capacity of at least one byte is needed for a
    /// step to make observable progress.
    pub fn allocate(&mut self, len: usize) -> Result<&mut [u8], RegionError> {
        self.buf = allocate_zeroed(RegionKind::Output, len)?;
        self.filled = 0;
        log::debug!("output region allocated: {len} bytes");
        Ok(&mut self.buf[..])
    }

    /// Take the bytes produced by the last step. A second call without an
    /// intervening step returns an empty slice.
    pub fn drain(&mut self) -> &[u8] {
        let n = std::mem::take(&mut self.filled);
        &self.buf[..n]
    }

    /// The bytes produced by the last step and not yet drained.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Base address of the current allocation.
    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Whole buffer handed to a decode step. Previously produced bytes are
    /// considered overwritten.
    pub(crate) fn begin_step(&mut self) -> &mut [u8] {
        self.filled = 0;
        &mut self.buf
    }

    pub(crate) fn end_step(&mut self, produced: usize) {
        debug_assert!(produced <= self.buf.len());
        self.filled = produced.min(self.buf.len());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
