//! # UIGen Wire
//!
//! The chat response body is a sequence of newline-terminated frames, each
//! `<tag>:<payload>`:
//!
//! | Tag | Payload | Meaning |
//! |-----|---------|---------|
//! | `0` | quoted, escaped string | a chunk of assistant text |
//! | `1` | JSON object | the final file-tree snapshot |
//! | `3` | quoted, escaped string | the stream was aborted by an error |
//!
//! A successful stream is any number of text frames followed by exactly one
//! snapshot frame. Decoders skip tags they do not know.

pub mod decode;
pub mod encode;

use thiserror::Error;
use uigen_vfs::Snapshot;

pub use decode::{FrameDecoder, decode_all, decode_line};
pub use encode::{encode_error, encode_snapshot, encode_text, escape};

/// Tag for assistant text frames.
pub const TEXT_TAG: &str = "0";
/// Tag for the final snapshot frame.
pub const SNAPSHOT_TAG: &str = "1";
/// Tag for the terminal error frame.
pub const ERROR_TAG: &str = "3";

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Snapshot(Snapshot),
    Error(String),
}

impl Frame {
    /// Render this frame as one wire line, trailing newline included.
    pub fn encode(&self) -> Result<String, WireError> {
        match self {
            Frame::Text(text) => Ok(encode_text(text)),
            Frame::Snapshot(snapshot) => encode_snapshot(snapshot),
            Frame::Error(message) => Ok(encode_error(message)),
        }
    }
}

/// Errors raised while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid snapshot payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream ended inside a frame ({pending} bytes pending)")]
    UnexpectedEof { pending: usize },
}
