// File-level helpers for Brotli decoding.
//
// Provides `decode_file()`, which wraps the streaming decoder with buffered
// file I/O. Optionally computes a streaming SHA-256 of the decompressed
// output (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::stream::{self, DecodeError, StreamOptions};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Decompressed output size in bytes.
    pub output_size: u64,
    /// Decode steps issued.
    pub steps: u64,
    /// SHA-256 of the decompressed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Decompress the Brotli file at `input_path` into `output_path`.
///
/// The input is streamed through a `BufReader` and decoded
/// `options.input_region_len` bytes at a time; the output uses `BufWriter`.
/// A partially written output file is left in place on error.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    options: StreamOptions,
) -> Result<DecodeStats, DecodeError> {
    let input_file = File::open(input_path)?;
    let input_size = input_file.metadata()?.len();
    let mut reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let output_file = File::create(output_path)?;
    let mut output_writer = BufWriter::with_capacity(BUF_SIZE, output_file);

    #[cfg(feature = "file-io")]
    let mut output_hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let totals = {
        let mut hashing_writer = HashingWriter {
            inner: &mut output_writer,
            hasher: &mut output_hasher,
        };
        stream::pump(&mut reader, &mut hashing_writer, options)?
    };

    #[cfg(not(feature = "file-io"))]
    let totals = stream::pump(&mut reader, &mut output_writer, options)?;
    let output_size = totals.produced_output;

    output_writer.flush()?;
    log::debug!(
        "decoded {} -> {}: {input_size} -> {output_size} bytes",
        input_path.display(),
        output_path.display()
    );

    #[cfg(feature = "file-io")]
    let output_sha256 = Some(output_hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(DecodeStats {
        input_size,
        output_size,
        steps: totals.steps,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
