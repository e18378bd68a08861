//! Incremental parser for `text/event-stream` bodies.
//!
//! The realtime database streams change notifications as server-sent
//! events. Network chunks split frames at arbitrary byte offsets, so the
//! parser buffers input and yields only complete frames.

/// One complete server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` field; empty when the stream omitted it.
    pub event: String,
    /// The `data:` field; multiple data lines are joined with `\n`.
    pub data: String,
}

/// Buffering frame parser. Feed it raw chunks; collect complete frames.
///
/// The buffer is kept as bytes so a multi-byte character split across
/// network chunks is only decoded once its frame is complete.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        // A blank line terminates a frame.
        while let Some(end) = find_frame_end(&self.buf) {
            let raw = String::from_utf8_lossy(&self.buf[..end.body]).into_owned();
            self.buf.drain(..end.total);
            if let Some(frame) = parse_frame(&raw) {
                frames.push(frame);
            }
        }
        frames
    }
}

struct FrameEnd {
    /// Bytes of frame body (excluding the terminating blank line).
    body: usize,
    /// Bytes to drain from the buffer (body + terminator).
    total: usize,
}

fn find_frame_end(buf: &[u8]) -> Option<FrameEnd> {
    // Accept both \n\n and \r\n\r\n terminators.
    let lf = find_subsequence(buf, b"\n\n").map(|i| FrameEnd {
        body: i,
        total: i + 2,
    });
    let crlf = find_subsequence(buf, b"\r\n\r\n").map(|i| FrameEnd {
        body: i,
        total: i + 4,
    });
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.body <= b.body { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = String::new();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in raw.lines() {
        // Comment lines keep the connection alive; skip them.
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event = value.trim_start_matches(' ').to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim_start_matches(' '));
        }
    }

    if event.is_empty() && data_lines.is_empty() {
        return None;
    }

    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}
