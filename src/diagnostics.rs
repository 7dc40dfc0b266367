// Per-step diagnostics: status, byte counts and structured error codes.
//
// A `StepResult` is returned fresh from every step and is never mutated
// afterwards, so diagnostics queried after a step always describe that step.

use std::fmt;

// ---------------------------------------------------------------------------
// StepStatus
// ---------------------------------------------------------------------------

/// Outcome classification of one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// The decoder confirmed the logical stream is complete.
    Done,
    /// All supplied input was consumed and more encoded bytes are needed.
    NeedsMoreInput,
    /// The output region filled up; drain it and step again with the
    /// unconsumed remainder of the input.
    HasMoreOutput,
    /// Corrupt or unsupported encoded data. The session is now failed.
    Error,
}

impl StepStatus {
    /// Numeric code used on the handle-based boundary surface.
    pub const fn code(self) -> i32 {
        match self {
            Self::Error => 0,
            Self::Done => 1,
            Self::NeedsMoreInput => 2,
            Self::HasMoreOutput => 3,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Error),
            1 => Some(Self::Done),
            2 => Some(Self::NeedsMoreInput),
            3 => Some(Self::HasMoreOutput),
            _ => None,
        }
    }

    /// Whether a session that returned this status accepts further steps.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Done => "done",
            Self::NeedsMoreInput => "needs more input",
            Self::HasMoreOutput => "has more output",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Structured decoder error identifier. Zero means "no error"; decoder
/// failures are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const NONE: Self = Self(0);

    pub const FORMAT_EXUBERANT_NIBBLE: Self = Self(-1);
    pub const FORMAT_RESERVED: Self = Self(-2);
    pub const FORMAT_EXUBERANT_META_NIBBLE: Self = Self(-3);
    pub const FORMAT_SIMPLE_HUFFMAN_ALPHABET: Self = Self(-4);
    pub const FORMAT_SIMPLE_HUFFMAN_SAME: Self = Self(-5);
    pub const FORMAT_CL_SPACE: Self = Self(-6);
    pub const FORMAT_HUFFMAN_SPACE: Self = Self(-7);
    pub const FORMAT_CONTEXT_MAP_REPEAT: Self = Self(-8);
    pub const FORMAT_BLOCK_LENGTH_1: Self = Self(-9);
    pub const FORMAT_BLOCK_LENGTH_2: Self = Self(-10);
    pub const FORMAT_TRANSFORM: Self = Self(-11);
    pub const FORMAT_DICTIONARY: Self = Self(-12);
    pub const FORMAT_WINDOW_BITS: Self = Self(-13);
    pub const FORMAT_PADDING_1: Self = Self(-14);
    pub const FORMAT_PADDING_2: Self = Self(-15);
    pub const FORMAT_DISTANCE: Self = Self(-16);
    pub const COMPOUND_DICTIONARY: Self = Self(-18);
    pub const DICTIONARY_NOT_SET: Self = Self(-19);
    pub const INVALID_ARGUMENTS: Self = Self(-20);
    pub const ALLOC_CONTEXT_MODES: Self = Self(-21);
    pub const ALLOC_TREE_GROUPS: Self = Self(-22);
    pub const ALLOC_CONTEXT_MAP: Self = Self(-25);
    pub const ALLOC_RING_BUFFER_1: Self = Self(-26);
    pub const ALLOC_RING_BUFFER_2: Self = Self(-27);
    pub const ALLOC_BLOCK_TYPE_TREES: Self = Self(-30);
    pub const UNREACHABLE: Self = Self(-31);

    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Codes the decoder reports when its own internal allocations fail.
    pub const fn is_allocation_failure(self) -> bool {
        self.0 <= -21 && self.0 >= -30
    }

    /// Symbolic name of a known code.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "NO_ERROR",
            -1 => "FORMAT_EXUBERANT_NIBBLE",
            -2 => "FORMAT_RESERVED",
            -3 => "FORMAT_EXUBERANT_META_NIBBLE",
            -4 => "FORMAT_SIMPLE_HUFFMAN_ALPHABET",
            -5 => "FORMAT_SIMPLE_HUFFMAN_SAME",
            -6 => "FORMAT_CL_SPACE",
            -7 => "FORMAT_HUFFMAN_SPACE",
            -8 => "FORMAT_CONTEXT_MAP_REPEAT",
            -9 => "FORMAT_BLOCK_LENGTH_1",
            -10 => "FORMAT_BLOCK_LENGTH_2",
            -11 => "FORMAT_TRANSFORM",
            -12 => "FORMAT_DICTIONARY",
            -13 => "FORMAT_WINDOW_BITS",
            -14 => "FORMAT_PADDING_1",
            -15 => "FORMAT_PADDING_2",
            -16 => "FORMAT_DISTANCE",
            -18 => "COMPOUND_DICTIONARY",
            -19 => "DICTIONARY_NOT_SET",
            -20 => "INVALID_ARGUMENTS",
            -21 => "ALLOC_CONTEXT_MODES",
            -22 => "ALLOC_TREE_GROUPS",
            -25 => "ALLOC_CONTEXT_MAP",
            -26 => "ALLOC_RING_BUFFER_1",
            -27 => "ALLOC_RING_BUFFER_2",
            -30 => "ALLOC_BLOCK_TYPE_TREES",
            -31 => "UNREACHABLE",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

// ---------------------------------------------------------------------------
// StepResult
// ---------------------------------------------------------------------------

/// Snapshot of one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Bytes taken from the supplied input range.
    pub consumed_input: usize,
    /// Bytes written to the start of the output region.
    pub produced_output: usize,
    pub status: StepStatus,
    /// Non-zero exactly when `status` is [`StepStatus::Error`].
    pub error_code: ErrorCode,
}

impl StepResult {
    pub const fn new(consumed_input: usize, produced_output: usize, status: StepStatus) -> Self {
        Self {
            consumed_input,
            produced_output,
            status,
            error_code: ErrorCode::NONE,
        }
    }

    pub const fn failed(consumed_input: usize, produced_output: usize, code: ErrorCode) -> Self {
        Self {
            consumed_input,
            produced_output,
            status: StepStatus::Error,
            error_code: code,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.status, StepStatus::Error)
    }
}

// ---------------------------------------------------------------------------
// SessionTotals
// ---------------------------------------------------------------------------

/// Running totals over a session's accepted steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTotals {
    pub consumed_input: u64,
    pub produced_output: u64,
    pub steps: u64,
}

impl SessionTotals {
    pub(crate) fn record(&mut self, result: &StepResult) {
        self.consumed_input += result.consumed_input as u64;
        self.produced_output += result.produced_output as u64;
        self.steps += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
