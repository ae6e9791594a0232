//! Error taxonomy for the switchable stream.

use thiserror::Error;

/// Terminal error delivered through the logical output stream.
///
/// The consumer must be able to tell "answer finished" apart from
/// "answer cut off by policy" and "provider failed", so these are
/// distinct variants rather than a single opaque error.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Truncation persisted after the segment ceiling was reached.
    #[error("cannot continue response: maximum of {switches} segments reached")]
    SegmentLimit {
        /// Number of segments delivered before the ceiling was hit.
        switches: usize,
    },

    /// A provider invocation failed outright (not a truncation).
    #[error("upstream invocation failed: {0}")]
    Upstream(anyhow::Error),
}

/// Error returned by control operations on a
/// [`SwitchableStream`](crate::SwitchableStream).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
    /// `bind` was called while a source is already attached.
    #[error("stream is already bound to a source")]
    AlreadyBound,

    /// `switch_source` was called before any source was bound.
    #[error("stream has no bound source")]
    NotBound,

    /// The stream was closed or failed; no further source can attach.
    #[error("stream is closed")]
    Closed,

    /// The consumer dropped the output; the stream is dead.
    #[error("consumer disconnected")]
    Disconnected,
}
