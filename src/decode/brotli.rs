// Brotli (RFC 7932) decode step backed by the `brotli` crate.
//
// Wraps a boxed `BrotliState` and maps `BrotliDecompressStream` results onto
// the session's step vocabulary. The large-window capability is applied once
// at construction, before the first step.

use ::brotli::enc::StandardAlloc;
use ::brotli::{BrotliDecompressStream, BrotliResult, BrotliState};
use brotli_decompressor::BrotliDecoderHasMoreOutput;

use super::DecodeStep;
use crate::diagnostics::{ErrorCode, StepResult, StepStatus};

type State = BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>;

/// Streaming Brotli decoder state.
pub struct BrotliBackend {
    state: Box<State>,
    /// Total bytes written across all steps, maintained by the decoder.
    total_out: usize,
    error: ErrorCode,
}

impl BrotliBackend {
    /// Create a decoder. With `large_window` set, streams using the
    /// large-window extension (window bits up to 30) are accepted in
    /// addition to standard streams.
    pub fn new(large_window: bool) -> Self {
        let mut state = Box::new(State::new(
            StandardAlloc::default(),
            StandardAlloc::default(),
            StandardAlloc::default(),
        ));
        state.large_window = large_window;
        Self {
            state,
            total_out: 0,
            error: ErrorCode::NONE,
        }
    }
}

impl Default for BrotliBackend {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for BrotliBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrotliBackend")
            .field("total_out", &self.total_out)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl DecodeStep for BrotliBackend {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> StepResult {
        let mut available_in = input.len();
        let mut input_offset = 0usize;
        let mut available_out = output.len();
        let mut output_offset = 0usize;

        let result = BrotliDecompressStream(
            &mut available_in,
            &mut input_offset,
            input,
            &mut available_out,
            &mut output_offset,
            output,
            &mut self.total_out,
            &mut *self.state,
        );

        let consumed = input_offset;
        let produced = output_offset;

        match result {
            BrotliResult::ResultSuccess => StepResult::new(consumed, produced, StepStatus::Done),
            BrotliResult::NeedsMoreInput => {
                StepResult::new(consumed, produced, StepStatus::NeedsMoreInput)
            }
            BrotliResult::NeedsMoreOutput => {
                StepResult::new(consumed, produced, StepStatus::HasMoreOutput)
            }
            BrotliResult::ResultFailure => {
                let mut code = ErrorCode::new(self.state.error_code as i32);
                if code.is_none() {
                    log::warn!("brotli decoder failed without an error code");
                    code = ErrorCode::UNREACHABLE;
                }
                self.error = code;
                StepResult::failed(consumed, produced, code)
            }
        }
    }

    fn has_more_output(&self) -> bool {
        BrotliDecoderHasMoreOutput(&*self.state)
    }

    fn error_code(&self) -> ErrorCode {
        self.error
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
