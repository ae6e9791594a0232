//! One logical readable output backed by swappable upstream sources.
//!
//! The control handle attaches, replaces, and terminates sources; the
//! output delivers their bytes in attach order with no gap or overlap
//! across a replacement. The output is pull-based: an upstream source is
//! only polled when the consumer polls the output, so the multiplexer
//! never reads ahead of the consumer and never buffers more than the
//! in-flight item.

use crate::{StreamError, SwitchError};
use bytes::Bytes;
use futures_core::Stream;
use futures_util::{StreamExt, stream::BoxStream};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::mpsc;

/// A byte source feeding the multiplexer.
///
/// Boxed so sources of different concrete types can be swapped in over
/// the stream's lifetime.
pub type Source = BoxStream<'static, Result<Bytes, StreamError>>;

/// Logical stream status. Owned by the multiplexer; control methods
/// request transitions and validate them against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// Constructed, no upstream bound yet.
    Empty,
    /// Forwarding from a bound source.
    Active,
    /// Terminal. No further bytes.
    Closed,
}

/// Control commands queued to the output.
enum Command {
    Attach(Source),
    Close,
    Fail(StreamError),
}

/// Control handle for a logical output stream whose upstream source can
/// be replaced without the consumer noticing a boundary.
pub struct SwitchableStream {
    commands: mpsc::UnboundedSender<Command>,
    status: Arc<Mutex<Status>>,
    switches: Arc<AtomicUsize>,
}

impl SwitchableStream {
    /// Create an unbound stream, returning the control handle and the
    /// logical output.
    ///
    /// The output ends cleanly on [`close`](Self::close), with an error
    /// item on [`fail`](Self::fail) or a failing source, and is torn
    /// down when the consumer drops it.
    pub fn new() -> (Self, impl Stream<Item = Result<Bytes, StreamError>> + Send) {
        let (commands, mut queue) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(Status::Empty));
        let switches = Arc::new(AtomicUsize::new(0));

        let drain_status = Arc::clone(&status);
        let output = async_stream::stream! {
            while let Some(command) = queue.recv().await {
                match command {
                    Command::Attach(mut source) => {
                        while let Some(item) = source.next().await {
                            match item {
                                Ok(bytes) => yield Ok(bytes),
                                Err(err) => {
                                    // Source failed mid-segment: tear down,
                                    // dropping any queued replacement.
                                    *drain_status.lock().unwrap() = Status::Closed;
                                    yield Err(err);
                                    return;
                                }
                            }
                        }
                    }
                    Command::Close => return,
                    Command::Fail(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        };

        (
            Self {
                commands,
                status,
                switches,
            },
            output,
        )
    }

    /// Bind the first upstream source. Valid only before any source has
    /// been attached.
    pub fn bind(&self, source: Source) -> Result<(), SwitchError> {
        let mut status = self.status.lock().unwrap();
        match *status {
            Status::Empty => {
                self.send(Command::Attach(source))?;
                *status = Status::Active;
                self.switches.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Status::Active => Err(SwitchError::AlreadyBound),
            Status::Closed => Err(SwitchError::Closed),
        }
    }

    /// Replace the active upstream source.
    ///
    /// Bytes the old source has yet to deliver are flushed first; once it
    /// signals end-of-data the output continues from the new source with
    /// no end-of-stream in between. Rejected after [`close`](Self::close)
    /// or [`fail`](Self::fail) — a rejected source never reaches the
    /// consumer.
    pub fn switch_source(&self, source: Source) -> Result<(), SwitchError> {
        let status = self.status.lock().unwrap();
        match *status {
            Status::Active => {
                self.send(Command::Attach(source))?;
                self.switches.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Status::Empty => Err(SwitchError::NotBound),
            Status::Closed => Err(SwitchError::Closed),
        }
    }

    /// Close the stream. Idempotent: the consumer sees exactly one
    /// end-of-data signal, after the active source has been drained.
    pub fn close(&self) {
        let mut status = self.status.lock().unwrap();
        if *status != Status::Closed {
            *status = Status::Closed;
            let _ = self.commands.send(Command::Close);
        }
    }

    /// Terminate the stream with an error instead of a clean end-of-data
    /// signal. Irreversible; a no-op once closed.
    pub fn fail(&self, err: StreamError) {
        let mut status = self.status.lock().unwrap();
        if *status != Status::Closed {
            *status = Status::Closed;
            let _ = self.commands.send(Command::Fail(err));
        }
    }

    /// Number of upstream sources attached so far, the initial bind
    /// included.
    pub fn switches(&self) -> usize {
        self.switches.load(Ordering::Relaxed)
    }

    fn send(&self, command: Command) -> Result<(), SwitchError> {
        self.commands
            .send(command)
            .map_err(|_| SwitchError::Disconnected)
    }
}
