// Decode session: the resumable state machine over one compressed stream.
//
// States: Created -> Running -> {Done, Failed}
//
// A session owns its decoder state and nothing else. The caller owns both
// staging regions; a step borrows a range of the input region and the whole
// output region for the duration of that one call. Format errors are not
// Rust errors here: they come back as a `StepResult` with `StepStatus::Error`
// so that output produced by the failing step can still be drained. Only
// caller mistakes (stepping a terminal session, out-of-range input) and
// resource failures are returned as `Err`.

use std::fmt;

use crate::decode::{BrotliBackend, DecodeStep};
use crate::diagnostics::{ErrorCode, SessionTotals, StepResult, StepStatus};
use crate::region::{InputRegion, OutputRegion, RegionError, RegionKind};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction-time configuration for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Accept streams using the large-window extension. Standard streams
    /// decode identically either way.
    pub large_window: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { large_window: true }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Constructed, no step taken yet.
    Created,
    /// At least one step taken and the stream is not finished.
    Running,
    /// The decoder confirmed the end of the stream.
    Done,
    /// The decoder rejected the encoded data.
    Failed,
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Taxonomy class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A region allocation could not be satisfied.
    ResourceExhaustion,
    /// The caller broke the session protocol.
    ContractViolation,
    /// The compressed data is invalid or truncated.
    Format,
    /// Reading compressed bytes or writing decompressed bytes failed.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Region(#[from] RegionError),

    /// A step was requested on a session that already finished or failed.
    #[error("session is {state}; no further steps are accepted")]
    Terminal { state: SessionState },

    /// The requested input range reaches past the staged input.
    #[error("input range {offset}+{len} exceeds the {staged} staged bytes")]
    InputOutOfBounds {
        offset: usize,
        len: usize,
        staged: usize,
    },

    /// The region was never allocated.
    #[error("{0} region has not been allocated")]
    RegionNotAllocated(RegionKind),

    /// The session handle does not refer to a live session.
    #[error("unknown or destroyed session {0}")]
    UnknownSession(u64),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Region(RegionError::AllocationFailed { .. }) => ErrorKind::ResourceExhaustion,
            Self::Region(RegionError::LengthExceedsCapacity { .. })
            | Self::Terminal { .. }
            | Self::InputOutOfBounds { .. }
            | Self::RegionNotAllocated(_)
            | Self::UnknownSession(_) => ErrorKind::ContractViolation,
        }
    }
}

// ---------------------------------------------------------------------------
// DecodeSession
// ---------------------------------------------------------------------------

/// Stateful decoder for one logical compressed stream.
///
/// Not `Clone`: the decoder state has exactly one owner, and
/// [`destroy`](Self::destroy) consumes the session so it cannot be driven
/// afterwards.
///
/// # Driving a session
///
/// ```
/// use oxibr::{DecodeSession, InputRegion, OutputRegion, StepStatus};
///
/// // "hello world" compressed as one uncompressed meta-block.
/// let compressed = [
///     0x0b, 0x05, 0x80, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0x6f, 0x72, 0x6c, 0x64, 0x03,
/// ];
///
/// let mut input = InputRegion::with_capacity(4).unwrap();
/// let mut output = OutputRegion::with_capacity(4).unwrap();
/// let mut session = DecodeSession::create();
/// let mut decoded = Vec::new();
///
/// 'feed: for chunk in compressed.chunks(4) {
///     let staged = input.stage(chunk);
///     let mut offset = 0;
///     loop {
///         let r = session.step(&input, offset, staged - offset, &mut output).unwrap();
///         offset += r.consumed_input;
///         decoded.extend_from_slice(output.drain());
///         match r.status {
///             StepStatus::HasMoreOutput => continue,
///             StepStatus::NeedsMoreInput => break,
///             StepStatus::Done => break 'feed,
///             StepStatus::Error => panic!("corrupt stream: {}", r.error_code),
///         }
///     }
/// }
/// assert_eq!(decoded, b"hello world");
/// session.destroy();
/// ```
pub struct DecodeSession<D: DecodeStep = BrotliBackend> {
    decoder: D,
    state: SessionState,
    last: Option<StepResult>,
    /// Length of the input range handed to the last accepted step.
    last_input_len: usize,
    totals: SessionTotals,
}

impl DecodeSession<BrotliBackend> {
    /// Create a Brotli session with default options (large window on).
    pub fn create() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        log::debug!("creating brotli session (large_window={})", options.large_window);
        Self::from_decoder(BrotliBackend::new(options.large_window))
    }
}

impl<D: DecodeStep> DecodeSession<D> {
    /// Create a session around an already configured decoder.
    pub fn from_decoder(decoder: D) -> Self {
        Self {
            decoder,
            state: SessionState::Created,
            last: None,
            last_input_len: 0,
            totals: SessionTotals::default(),
        }
    }

    /// Decode from `input[offset..offset + len]` into `output`.
    ///
    /// Output is written from the start of the region and never past its
    /// capacity; bytes from a previous step that were not drained are
    /// overwritten. On [`StepStatus::HasMoreOutput`] drain the output and
    /// call again with the unconsumed remainder of the same input.
    ///
    /// Rejected calls (terminal session, range outside the staged input)
    /// leave the session, its diagnostics and the output region untouched.
    pub fn step(
        &mut self,
        input: &InputRegion,
        offset: usize,
        len: usize,
        output: &mut OutputRegion,
    ) -> Result<StepResult, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Terminal { state: self.state });
        }
        let window = input
            .window(offset, len)
            .ok_or(SessionError::InputOutOfBounds {
                offset,
                len,
                staged: input.len(),
            })?;

        let result = self.decoder.step(window, output.begin_step());
        output.end_step(result.produced_output);
        self.record(len, result);
        Ok(result)
    }

    /// Decode directly between caller slices, bypassing staging regions.
    ///
    /// Same protocol as [`step`](Self::step): `output` is written from its
    /// first byte.
    pub fn step_slices(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Terminal { state: self.state });
        }
        let result = self.decoder.step(input, output);
        self.record(input.len(), result);
        Ok(result)
    }

    fn record(&mut self, input_len: usize, result: StepResult) {
        debug_assert!(result.consumed_input <= input_len);
        self.totals.record(&result);
        self.last = Some(result);
        self.last_input_len = input_len;

        let next = match result.status {
            StepStatus::Done => SessionState::Done,
            StepStatus::Error => SessionState::Failed,
            StepStatus::NeedsMoreInput | StepStatus::HasMoreOutput => SessionState::Running,
        };

        log::trace!(
            "{} step: in={}/{} out={} status={}",
            self.decoder.name(),
            result.consumed_input,
            input_len,
            result.produced_output,
            result.status
        );

        if next != self.state && next.is_terminal() {
            match next {
                SessionState::Failed => log::warn!(
                    "{} session failed after {} input bytes: error {}",
                    self.decoder.name(),
                    self.totals.consumed_input,
                    result.error_code
                ),
                _ => log::debug!(
                    "{} session done: {} bytes in, {} bytes out, {} steps",
                    self.decoder.name(),
                    self.totals.consumed_input,
                    self.totals.produced_output,
                    self.totals.steps
                ),
            }
        }
        self.state = next;
    }

    /// True if decoded bytes are buffered inside the decoder that did not fit
    /// into the output of the last step.
    pub fn has_buffered_output(&self) -> bool {
        !self.state.is_terminal() && self.decoder.has_more_output()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Snapshot of the most recent accepted step.
    pub fn last_result(&self) -> Option<StepResult> {
        self.last
    }

    /// Error code of the last step; [`ErrorCode::NONE`] unless it failed.
    pub fn error_code(&self) -> ErrorCode {
        self.last.map_or(ErrorCode::NONE, |r| r.error_code)
    }

    /// Input bytes consumed by the last step.
    pub fn consumed_input(&self) -> usize {
        self.last.map_or(0, |r| r.consumed_input)
    }

    /// Output bytes produced by the last step.
    pub fn produced_output(&self) -> usize {
        self.last.map_or(0, |r| r.produced_output)
    }

    /// Input bytes of the last supplied range that were left unconsumed.
    pub fn available_input(&self) -> usize {
        self.last_input_len - self.consumed_input()
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    /// Release the decoder state.
    pub fn destroy(self) {
        log::debug!(
            "destroying {} session in state {} after {} steps",
            self.decoder.name(),
            self.state,
            self.totals.steps
        );
    }
}

impl Default for DecodeSession<BrotliBackend> {
    fn default() -> Self {
        Self::create()
    }
}

impl<D: DecodeStep> fmt::Debug for DecodeSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeSession")
            .field("decoder", &self.decoder.name())
            .field("state", &self.state)
            .field("last", &self.last)
            .field("totals", &self.totals)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
