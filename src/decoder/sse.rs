use tracing::trace;

/// Carry-over line splitter for SSE-framed streams.
///
/// Chunks may end mid-line; the partial line stays buffered until its
/// newline arrives in a later chunk.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed a chunk, invoking `line_handler` for each complete line.
    pub fn push_chunk<F>(&mut self, chunk: &str, mut line_handler: F)
    where
        F: FnMut(&str),
    {
        for c in chunk.chars() {
            if c == '\n' {
                if !self.buffer.is_empty() {
                    let line = std::mem::take(&mut self.buffer);
                    line_handler(&line);
                }
            } else {
                self.buffer.push(c);
            }
        }
    }

    /// Take whatever partial line is left, emptying the buffer.
    pub fn take_remainder(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

/// Extract the JSON payload from an SSE line.
///
/// Returns `None` for non-data lines (comments, event names, blanks) and
/// for the `[DONE]` sentinel some backends append.
pub fn sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        trace!("SSE stream sentinel received");
        return None;
    }
    Some(data)
}
