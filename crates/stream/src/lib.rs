//! Stream continuation engine.
//!
//! One logical readable output backed by a sequence of provider
//! invocations: when an invocation is cut off by its per-call token
//! limit, the engine transparently requests a continuation and switches
//! the output to the new invocation's source, so the consumer perceives
//! a single uninterrupted reply. The chain is bounded by a hard segment
//! ceiling; hitting it is a visible terminal error, never a silent stop.

pub use continuation::{Continuation, DEFAULT_CONTINUE_PROMPT, MAX_RESPONSE_SEGMENTS};
pub use error::{StreamError, SwitchError};
pub use segment::{SegmentStatus, segment};
pub use switchable::{Source, SwitchableStream};

mod continuation;
mod error;
mod segment;
mod switchable;
