//! Continuation policy driving segment invocations and source switches.
//!
//! Each provider invocation can emit only a bounded number of tokens.
//! When one is cut off (`FinishReason::Length`), the policy appends the
//! partial assistant text and a continuation directive to the message
//! list, invokes the provider again, and switches the multiplexer to the
//! new source. The consumer never sees the seam. The chain is bounded:
//! once the ceiling is reached a still-truncated reply terminates with
//! [`StreamError::SegmentLimit`].

use crate::{SegmentStatus, StreamError, SwitchableStream, segment};
use bytes::Bytes;
use futures_core::Stream;
use llm::{FinishReason, LLM, Message};

/// Maximum number of response segments per logical reply.
pub const MAX_RESPONSE_SEGMENTS: usize = 2;

/// Continuation directive appended as a user message after a truncated
/// segment.
pub const DEFAULT_CONTINUE_PROMPT: &str = "Continue your prior response. IMPORTANT: Immediately begin from where you left off without any interruptions. Do not repeat any content that has already been sent.";

/// One logical reply driven across one or more provider invocations.
pub struct Continuation<L: LLM> {
    provider: L,
    config: L::ChatConfig,
    messages: Vec<Message>,
    max_segments: usize,
    continue_prompt: String,
}

impl<L: LLM> Continuation<L> {
    /// Create a continuation run over the given conversation.
    pub fn new(provider: L, config: L::ChatConfig, messages: Vec<Message>) -> Self {
        Self {
            provider,
            config,
            messages,
            max_segments: MAX_RESPONSE_SEGMENTS,
            continue_prompt: DEFAULT_CONTINUE_PROMPT.to_owned(),
        }
    }

    /// Override the segment ceiling.
    pub fn with_max_segments(mut self, max_segments: usize) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// Override the continuation directive.
    pub fn with_continue_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.continue_prompt = prompt.into();
        self
    }

    /// Start streaming the reply.
    ///
    /// Spawns the driver task and returns the logical output. Must be
    /// called from within a tokio runtime. The driver ends when the
    /// reply terminates or the consumer drops the output.
    pub fn stream(self) -> impl Stream<Item = Result<Bytes, StreamError>> + Send {
        let (control, output) = SwitchableStream::new();
        tokio::spawn(self.drive(control));
        output
    }

    /// The driver loop: one provider invocation per iteration, with the
    /// segment index made explicit by the multiplexer's switch count.
    async fn drive(mut self, control: SwitchableStream) {
        loop {
            let chunks = self.provider.stream(self.config.clone(), &self.messages);
            let (source, status) = segment(chunks);

            let attached = if control.switches() == 0 {
                control.bind(source)
            } else {
                control.switch_source(source)
            };
            if let Err(err) = attached {
                tracing::debug!("source not attached: {err}");
                return;
            }

            match status.await {
                Ok(SegmentStatus::Finished {
                    reason: FinishReason::Length,
                    text,
                }) => {
                    let switches = control.switches();
                    if switches >= self.max_segments {
                        tracing::warn!("response still truncated after {switches} segments");
                        control.fail(StreamError::SegmentLimit { switches });
                        return;
                    }

                    tracing::info!(
                        "max token limit reached: continuing response ({} switches left)",
                        self.max_segments - switches
                    );
                    self.messages.push(Message::assistant(text));
                    self.messages.push(Message::user(self.continue_prompt.as_str()));
                }
                Ok(SegmentStatus::Finished { reason, .. }) => {
                    tracing::debug!("response finished: {reason:?}");
                    control.close();
                    return;
                }
                Ok(SegmentStatus::Failed(message)) => {
                    // The source already failed the stream with the
                    // underlying error; nothing is retried.
                    tracing::error!("provider invocation failed: {message}");
                    return;
                }
                Err(_) => {
                    // Status sender dropped: the consumer disconnected and
                    // the in-flight invocation went down with the source.
                    tracing::debug!("consumer disconnected mid-segment");
                    return;
                }
            }
        }
    }
}
