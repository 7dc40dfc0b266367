//! Oxibr: a staged, streaming Brotli decoder in Rust.
//!
//! The crate provides:
//! - Caller-owned staging regions (`region`)
//! - A resumable decode session with per-step diagnostics (`session`)
//! - A handle-based host for embedders (`host`)
//! - A chunked stream driver and one-shot helpers (`stream`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! // "hello world" as a single uncompressed meta-block.
//! let compressed = [
//!     0x0b, 0x05, 0x80, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0x6f, 0x72, 0x6c, 0x64, 0x03,
//! ];
//! let decoded = oxibr::decode_all(&compressed).unwrap();
//! assert_eq!(decoded, b"hello world");
//! ```

pub mod decode;
pub mod diagnostics;
pub mod host;
pub mod io;
pub mod region;
pub mod session;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;

pub use diagnostics::{ErrorCode, SessionTotals, StepResult, StepStatus};
pub use host::{DecodeHost, SessionId};
pub use region::{InputRegion, OutputRegion, RegionError, RegionKind};
pub use session::{DecodeSession, ErrorKind, SessionError, SessionOptions, SessionState};
pub use stream::{DecodeError, StreamDecoder, StreamOptions, decode_all, decode_reader};
