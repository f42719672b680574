use super::buffer::ChunkBuffer;
use tracing::debug;

/// Scan the buffer for balanced top-level `{...}` objects and parse each
/// one, consuming the processed prefix.
///
/// The scan tracks brace depth together with string/escape state, so braces
/// and quotes inside string values never affect the frame boundaries. A
/// buffer ending mid-object yields no frame for that portion; the partial
/// text stays buffered for the next append. A balanced frame that fails to
/// parse is dropped with a log so one bad frame cannot stall the stream.
pub fn drain(buffer: &mut ChunkBuffer) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut start: Option<usize> = None;
    let mut consumed = 0;

    {
        let text = buffer.as_str();
        // Braces and quotes are ASCII, so a byte scan is safe in UTF-8.
        for (i, &b) in text.as_bytes().iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' if depth > 0 => in_string = true,
                b'{' => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                b'}' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let frame_start = start.take().expect("open brace recorded at depth 0");
                        let raw = &text[frame_start..=i];
                        match serde_json::from_str::<serde_json::Value>(raw) {
                            Ok(value) => frames.push(value),
                            Err(e) => {
                                debug!("dropping unparseable frame ({} bytes): {}", raw.len(), e)
                            }
                        }
                        consumed = i + 1;
                    }
                }
                // Anything outside an object is inter-frame noise.
                _ => {}
            }
        }

        if depth > 0 {
            // Mid-object: keep the partial frame, but drop noise ahead of it.
            if let Some(frame_start) = start {
                consumed = consumed.max(frame_start);
            }
        } else {
            consumed = text.len();
        }
    }

    buffer.consume(consumed);
    frames
}
