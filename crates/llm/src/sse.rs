//! Incremental SSE `data:` line decoding.
//!
//! Provider responses arrive as arbitrary network chunks: a JSON payload
//! (or even a multi-byte character) can be split across two reads. The
//! buffer carries the partial tail between feeds and only hands back
//! complete `data:` payloads.

/// Reassembles SSE `data:` lines from raw network chunks.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning the `data:` payloads it
    /// completed. `[DONE]` markers and non-data lines (`event:`,
    /// comments, blank keep-alives) are dropped.
    pub fn feed(&mut self, input: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(input);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(data) = line.trim_end().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }
            payloads.push(data.to_owned());
        }

        payloads
    }
}
