//! Wire-level decoding: chunk buffering, frame extraction, event
//! classification.

pub mod buffer;
pub mod classifier;
pub mod extractor;
pub mod sse;

#[cfg(test)]
mod extractor_tests;

pub use buffer::ChunkBuffer;
pub use classifier::classify;
pub use sse::LineBuffer;

/// How the backend frames its response body.
///
/// Different endpoints use different conventions: some emit concatenated
/// JSON objects with no delimiters at all (objects may split anywhere
/// across chunk boundaries), others use newline-delimited SSE `data:`
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Concatenated `{...}{...}` objects, no envelope.
    JsonStream,
    /// `data: {...}\n` lines.
    Sse,
}
