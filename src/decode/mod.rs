// Decode-step backends.
//
// A session drives its decoder through the `DecodeStep` trait: one bounded
// unit of work over an input slice and an output slice. The format-specific
// bitstream handling lives entirely behind this trait.
//
// - `brotli` : BrotliBackend, the production decoder (brotli crate)

pub mod brotli;

pub use self::brotli::BrotliBackend;

use crate::diagnostics::{ErrorCode, StepResult};

/// One resumable decompression primitive.
///
/// # Contract
///
/// `step` must read at most `input.len()` bytes and write at most
/// `output.len()` bytes starting at `output[0]`. The returned
/// [`StepResult`] reports exactly how many bytes were taken and written.
/// Data that was decoded but did not fit must be kept internally and
/// emitted by the next call, which receives the unconsumed remainder of the
/// input.
///
/// Callers never invoke `step` again after it reported
/// [`StepStatus::Done`](crate::StepStatus::Done) or
/// [`StepStatus::Error`](crate::StepStatus::Error).
pub trait DecodeStep {
    /// Short backend name used in log output.
    fn name(&self) -> &'static str;

    /// Perform one unit of decoding work.
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> StepResult;

    /// Whether decoded bytes are held internally that were not yet written
    /// to an output slice.
    fn has_more_output(&self) -> bool;

    /// Most recent error reported by the decoder, or [`ErrorCode::NONE`].
    fn error_code(&self) -> ErrorCode;
}

impl<D: DecodeStep + ?Sized> DecodeStep for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) -> StepResult {
        (**self).step(input, output)
    }

    fn has_more_output(&self) -> bool {
        (**self).has_more_output()
    }

    fn error_code(&self) -> ErrorCode {
        (**self).error_code()
    }
}
