//! SSE framing for streamed completions.
//!
//! Chunks from the HTTP body are arbitrary byte slices: an event, or even a
//! multi-byte character, may be split across two of them. Bytes are held
//! until a full event (terminated by a blank line) is available.

/// Payload the OpenAI-compatible APIs send as the last event.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Accumulates raw body bytes and yields complete `data:` payloads.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body chunk. CRLF line endings are normalised to LF.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    /// Remove and return every complete event's data payload, in order.
    ///
    /// Multi-line `data:` fields are joined with `\n`. Events without data
    /// (comments, keep-alives, bare `event:` lines) are dropped. An
    /// incomplete trailing event stays buffered.
    pub fn drain_events(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        while let Some(end) = find_event_end(&self.pending) {
            let block: Vec<u8> = self.pending.drain(..end + 2).collect();
            let block = String::from_utf8_lossy(&block[..end]);
            let data: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if !data.is_empty() {
                events.push(data.join("\n"));
            }
        }
        events
    }

    /// Bytes waiting for the rest of their event.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn find_event_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|w| w == b"\n\n")
}
