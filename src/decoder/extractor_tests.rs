use super::buffer::ChunkBuffer;
use super::extractor;
use serde_json::json;

fn drain_str(text: &str) -> Vec<serde_json::Value> {
    let mut buffer = ChunkBuffer::new();
    buffer.append(text);
    extractor::drain(&mut buffer)
}

#[test]
fn single_object() {
    let frames = drain_str(r#"{"type":"text","content":"hi"}"#);
    assert_eq!(frames, vec![json!({"type":"text","content":"hi"})]);
}

#[test]
fn multiple_objects_in_one_chunk() {
    let frames = drain_str(r#"{"a":1}{"b":2}{"c":3}"#);
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], json!({"a":1}));
    assert_eq!(frames[2], json!({"c":3}));
}

/// Splitting a serialized object at any index and delivering the halves as
/// two appends yields exactly the same single frame as one append.
#[test]
fn extraction_is_chunk_boundary_independent() {
    let text = r#"{"type":"tool_call","tool":"FactSet_GlobalPrices","args":{"ticker":"NVDA","range":"1y"}}"#;
    let expected = drain_str(text);
    assert_eq!(expected.len(), 1);

    for split in 0..=text.len() {
        let mut buffer = ChunkBuffer::new();
        let mut frames = Vec::new();

        buffer.append(&text[..split]);
        frames.extend(extractor::drain(&mut buffer));
        buffer.append(&text[split..]);
        frames.extend(extractor::drain(&mut buffer));

        assert_eq!(frames, expected, "split at byte {split}");
    }
}

#[test]
fn braces_and_escaped_quotes_inside_strings() {
    let frames = drain_str(r#"{"text": "a {b} c \"d\""}"#);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["text"], json!(r#"a {b} c "d""#));
}

#[test]
fn escaped_backslash_before_closing_quote() {
    let frames = drain_str(r#"{"path": "C:\\"}{"next": true}"#);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["path"], json!("C:\\"));
}

/// A balanced but unparseable frame is dropped and must not block the
/// well-formed frame behind it.
#[test]
fn malformed_frame_is_dropped_and_isolated() {
    let frames = drain_str(r#"{"bad": }{"good": 1}"#);
    assert_eq!(frames, vec![json!({"good": 1})]);
}

#[test]
fn partial_tail_stays_buffered_until_completed() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(r#"{"a":1}{"b":"#);
    let frames = extractor::drain(&mut buffer);
    assert_eq!(frames, vec![json!({"a":1})]);
    assert_eq!(buffer.as_str(), r#"{"b":"#);

    buffer.append("2}");
    let frames = extractor::drain(&mut buffer);
    assert_eq!(frames, vec![json!({"b":2})]);
    assert!(buffer.is_empty());
}

#[test]
fn noise_between_frames_is_skipped() {
    let frames = drain_str("\n {\"a\":1} junk\n{\"b\":2}\n");
    assert_eq!(frames.len(), 2);
}

#[test]
fn noise_ahead_of_partial_frame_is_trimmed() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(r#"junk {"a":"#);
    let frames = extractor::drain(&mut buffer);
    assert!(frames.is_empty());
    assert_eq!(buffer.as_str(), r#"{"a":"#);
}

#[test]
fn empty_buffer_after_consuming_complete_frames() {
    let mut buffer = ChunkBuffer::new();
    buffer.append(r#"{"a":1} trailing"#);
    extractor::drain(&mut buffer);
    assert!(buffer.is_empty());
}

#[test]
fn nested_objects_count_as_one_frame() {
    let frames = drain_str(r#"{"outer":{"inner":{"deep":[1,2,{"x":3}]}}}"#);
    assert_eq!(frames.len(), 1);
}
