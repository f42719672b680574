/// Append-only text buffer holding the undecoded tail of one stream.
///
/// Chunks are appended as they arrive from the network; the extractor
/// consumes the prefix it has fully processed. Anything left over is a
/// partial frame waiting for the next chunk.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buffer: String,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Remove the first `n` bytes. `n` must land on a char boundary; the
    /// extractor only ever consumes up to an ASCII delimiter.
    pub fn consume(&mut self, n: usize) {
        self.buffer.drain(..n);
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Take whatever is left unconsumed, emptying the buffer.
    pub fn take_remainder(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
