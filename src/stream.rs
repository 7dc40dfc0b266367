// Chunk-fed streaming decoder.
//
// StreamDecoder drives a DecodeSession over compressed data that arrives in
// arbitrary pieces (network bodies, file reads):
//   - Each incoming chunk is staged region-by-region into an InputRegion
//   - The session is stepped until the staged bytes are consumed, resuming
//     at the consumed offset whenever the output region fills up
//   - Every produced byte is drained straight to a `Write` sink
//
// Only the two staging regions and the decoder window are held in memory.

use std::io::{Read, Write};

use crate::diagnostics::{ErrorCode, SessionTotals, StepStatus};
use crate::region::{InputRegion, OutputRegion, RegionError};
use crate::session::{DecodeSession, ErrorKind, SessionError, SessionOptions, SessionState};

/// Default input staging region size (128 KiB).
pub const DEFAULT_INPUT_REGION_LEN: usize = 128 * 1024;
/// Default output staging region size (512 KiB).
pub const DEFAULT_OUTPUT_REGION_LEN: usize = 512 * 1024;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`StreamDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Capacity of the input staging region. Must be at least 1.
    pub input_region_len: usize,
    /// Capacity of the output staging region. Must be at least 1.
    pub output_region_len: usize,
    pub session: SessionOptions,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            input_region_len: DEFAULT_INPUT_REGION_LEN,
            output_region_len: DEFAULT_OUTPUT_REGION_LEN,
            session: SessionOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder rejected the compressed data.
    #[error("corrupt brotli stream after {consumed} input bytes: error {code}")]
    Format { code: ErrorCode, consumed: u64 },

    /// Input ended before the stream was complete.
    #[error("truncated brotli stream: ended after {consumed} input bytes")]
    Truncated { consumed: u64 },

    /// Bytes followed the end of the compressed stream.
    #[error("{extra} unexpected bytes after the end of the brotli stream")]
    TrailingData { extra: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::Format { code, .. } if code.is_allocation_failure() => {
                ErrorKind::ResourceExhaustion
            }
            Self::Format { .. } | Self::Truncated { .. } | Self::TrailingData { .. } => {
                ErrorKind::Format
            }
            Self::InvalidOptions(_) => ErrorKind::ContractViolation,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<RegionError> for DecodeError {
    fn from(e: RegionError) -> Self {
        Self::Session(SessionError::Region(e))
    }
}

// ---------------------------------------------------------------------------
// StreamDecoder
// ---------------------------------------------------------------------------

/// Streaming decoder fed one chunk at a time.
pub struct StreamDecoder {
    input: InputRegion,
    output: OutputRegion,
    options: SessionOptions,
    /// Created on the first non-empty chunk; `None` again once failed.
    session: Option<DecodeSession>,
    state: SessionState,
    bytes_in: u64,
    bytes_out: u64,
    steps: u64,
}

impl StreamDecoder {
    /// Create a decoder with the default 128 KiB / 512 KiB regions.
    pub fn new() -> Result<Self, DecodeError> {
        Self::with_options(StreamOptions::default())
    }

    pub fn with_options(options: StreamOptions) -> Result<Self, DecodeError> {
        if options.input_region_len == 0 || options.output_region_len == 0 {
            return Err(DecodeError::InvalidOptions(format!(
                "region sizes must be non-zero (input={}, output={})",
                options.input_region_len, options.output_region_len
            )));
        }
        Ok(Self {
            input: InputRegion::with_capacity(options.input_region_len)?,
            output: OutputRegion::with_capacity(options.output_region_len)?,
            options: options.session,
            session: None,
            state: SessionState::Created,
            bytes_in: 0,
            bytes_out: 0,
            steps: 0,
        })
    }

    /// Decode `chunk`, writing every decompressed byte to `sink`.
    ///
    /// Returns the number of bytes written for this chunk. After a format
    /// error the decoder is failed and rejects further data.
    pub fn feed<W: Write>(&mut self, chunk: &[u8], sink: &mut W) -> Result<u64, DecodeError> {
        match self.state {
            SessionState::Failed => {
                return Err(SessionError::Terminal {
                    state: SessionState::Failed,
                }
                .into());
            }
            SessionState::Done if !chunk.is_empty() => {
                return Err(DecodeError::TrailingData { extra: chunk.len() });
            }
            _ => {}
        }
        if chunk.is_empty() {
            return Ok(0);
        }

        let session = self
            .session
            .get_or_insert_with(|| DecodeSession::with_options(self.options));
        let mut written = 0u64;

        let mut remaining = chunk;
        while !remaining.is_empty() {
            let staged = self.input.stage(remaining);
            remaining = &remaining[staged..];
            let mut offset = 0;

            loop {
                let result = session.step(&self.input, offset, staged - offset, &mut self.output)?;
                offset += result.consumed_input;
                self.steps += 1;
                self.bytes_in += result.consumed_input as u64;

                let produced = self.output.drain();
                sink.write_all(produced)?;
                written += produced.len() as u64;
                self.bytes_out += produced.len() as u64;

                match result.status {
                    StepStatus::HasMoreOutput => continue,
                    StepStatus::NeedsMoreInput if session.has_buffered_output() => continue,
                    StepStatus::NeedsMoreInput => break,
                    StepStatus::Done => {
                        self.state = SessionState::Done;
                        let extra = (staged - offset) + remaining.len();
                        if extra > 0 {
                            return Err(DecodeError::TrailingData { extra });
                        }
                        return Ok(written);
                    }
                    StepStatus::Error => {
                        self.state = SessionState::Failed;
                        if let Some(session) = self.session.take() {
                            session.destroy();
                        }
                        return Err(DecodeError::Format {
                            code: result.error_code,
                            consumed: self.bytes_in,
                        });
                    }
                }
            }
        }

        self.state = SessionState::Running;
        Ok(written)
    }

    /// Decode `chunk` and return the decompressed bytes.
    pub fn feed_to_vec(&mut self, chunk: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        self.feed(chunk, &mut out)?;
        Ok(out)
    }

    /// Finish decoding. Fails with [`DecodeError::Truncated`] unless the
    /// stream reached its end. Returns the total decompressed size.
    pub fn finish(mut self) -> Result<u64, DecodeError> {
        if let Some(session) = self.session.take() {
            session.destroy();
        }
        match self.state {
            SessionState::Done => Ok(self.bytes_out),
            SessionState::Failed => Err(SessionError::Terminal {
                state: SessionState::Failed,
            }
            .into()),
            SessionState::Created | SessionState::Running => Err(DecodeError::Truncated {
                consumed: self.bytes_in,
            }),
        }
    }

    /// Whether the end of the compressed stream has been reached.
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Done
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Compressed bytes consumed so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Decompressed bytes produced so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Decode steps issued so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl std::fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("input_region_len", &self.input.capacity())
            .field("output_region_len", &self.output.capacity())
            .field("state", &self.state)
            .field("bytes_in", &self.bytes_in)
            .field("bytes_out", &self.bytes_out)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Decompress a complete in-memory Brotli stream.
pub fn decode_all(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = StreamDecoder::new()?;
    let mut out = Vec::new();
    decoder.feed(compressed, &mut out)?;
    decoder.finish()?;
    Ok(out)
}

/// Decompress everything `reader` yields into `writer`, reading
/// `options.input_region_len` bytes at a time. Returns the decompressed size.
pub fn decode_reader<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    options: StreamOptions,
) -> Result<u64, DecodeError> {
    pump(reader, writer, options).map(|totals| totals.produced_output)
}

/// Read-feed-finish loop shared by the reader, file and CLI front ends.
pub(crate) fn pump<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    options: StreamOptions,
) -> Result<SessionTotals, DecodeError> {
    let mut decoder = StreamDecoder::with_options(options)?;
    let mut buf = vec![0u8; options.input_region_len];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        decoder.feed(&buf[..n], writer)?;
    }
    let consumed_input = decoder.bytes_in();
    let steps = decoder.steps();
    Ok(SessionTotals {
        consumed_input,
        produced_output: decoder.finish()?,
        steps,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_BR: [u8; 15] = [
        0x0b, 0x05, 0x80, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0x6f, 0x72, 0x6c, 0x64, 0x03,
    ];

    fn tiny() -> StreamOptions {
        StreamOptions {
            input_region_len: 4,
            output_region_len: 4,
            ..Default::default()
        }
    }

    #[test]
    fn decode_all_hello() {
        assert_eq!(decode_all(&HELLO_BR).unwrap(), b"hello world");
    }

    #[test]
    fn byte_at_a_time_with_tiny_regions() {
        let mut decoder = StreamDecoder::with_options(StreamOptions {
            input_region_len: 1,
            output_region_len: 1,
            ..Default::default()
        })
        .unwrap();
        let mut out = Vec::new();
        for b in HELLO_BR {
            decoder.feed(&[b], &mut out).unwrap();
        }
        assert!(decoder.is_finished());
        assert_eq!(decoder.bytes_in(), HELLO_BR.len() as u64);
        assert_eq!(decoder.finish().unwrap(), 11);
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn chunk_larger_than_region_is_split() {
        let mut decoder = StreamDecoder::with_options(tiny()).unwrap();
        let out = decoder.feed_to_vec(&HELLO_BR).unwrap();
        assert_eq!(out, b"hello world");
        assert!(decoder.steps() >= 4);
    }

    #[test]
    fn truncated_stream_is_reported() {
        let mut decoder = StreamDecoder::with_options(tiny()).unwrap();
        decoder.feed_to_vec(&HELLO_BR[..9]).unwrap();
        let err = decoder.finish().unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { consumed: 9 }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn empty_input_is_truncated() {
        let decoder = StreamDecoder::new().unwrap();
        assert!(matches!(
            decoder.finish().unwrap_err(),
            DecodeError::Truncated { consumed: 0 }
        ));
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let mut data = HELLO_BR.to_vec();
        data.extend_from_slice(b"junk");
        let err = decode_all(&data).unwrap_err();
        assert!(matches!(err, DecodeError::TrailingData { extra: 4 }));

        let mut decoder = StreamDecoder::new().unwrap();
        decoder.feed_to_vec(&HELLO_BR).unwrap();
        decoder.feed_to_vec(&[]).unwrap();
        assert!(matches!(
            decoder.feed_to_vec(b"x").unwrap_err(),
            DecodeError::TrailingData { extra: 1 }
        ));
    }

    #[test]
    fn format_error_fails_the_decoder() {
        let mut decoder = StreamDecoder::new().unwrap();
        let err = decoder.feed_to_vec(&[0x11, 0xff, 0xff, 0xff]).unwrap_err();
        match err {
            DecodeError::Format { code, .. } => assert!(!code.is_none()),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(decoder.state(), SessionState::Failed);
        assert!(matches!(
            decoder.feed_to_vec(&HELLO_BR).unwrap_err(),
            DecodeError::Session(SessionError::Terminal { .. })
        ));
    }

    #[test]
    fn zero_sized_regions_are_rejected() {
        let err = StreamDecoder::with_options(StreamOptions {
            output_region_len: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidOptions(_)));
    }

    #[test]
    fn decode_from_reader() {
        let mut reader = std::io::Cursor::new(&HELLO_BR[..]);
        let mut out = Vec::new();
        let total = decode_reader(&mut reader, &mut out, tiny()).unwrap();
        assert_eq!(total, 11);
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn pump_reports_totals() {
        let mut reader = std::io::Cursor::new(&HELLO_BR[..]);
        let mut out = Vec::new();
        let totals = pump(&mut reader, &mut out, tiny()).unwrap();
        assert_eq!(totals.consumed_input, HELLO_BR.len() as u64);
        assert_eq!(totals.produced_output, 11);
        // Four 4-byte reads, each stepped at least once.
        assert!(totals.steps >= 4);
        assert_eq!(out, b"hello world");

        let mut short = std::io::Cursor::new(&HELLO_BR[..8]);
        let err = pump(&mut short, &mut Vec::new(), tiny()).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { consumed: 8 }));
    }
}
