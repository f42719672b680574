use crate::types::{GroundingResult, StreamEvent, TokenUsage, TopologyGraph};
use serde_json::Value;
use tracing::debug;

/// Recursion bound for the grounding scan. Keeps worst-case cost on deeply
/// nested payloads predictable.
const MAX_SCAN_DEPTH: usize = 8;

/// Map one parsed frame to its typed events.
///
/// Dispatch is ordered; a loose payload can validly match several shapes,
/// so priority matters:
/// 1. A `type` field from the closed set classifies directly.
/// 2. The two answer-text schema variants (`answer.answerText`,
///    `content.parts[*].text`) yield a `TextDelta`; citations riding in the
///    same frame are still collected by the grounding scan.
/// 3. The grounding scan yields zero or more `Grounding` events.
/// 4. Anything else is `Unknown`.
///
/// Classification never fails: missing fields degrade to a best-effort
/// partial event or `Unknown`.
pub fn classify(frame: &Value) -> Vec<StreamEvent> {
    if let Some(kind) = frame.get("type").and_then(Value::as_str) {
        if let Some(event) = classify_typed(kind, frame) {
            return vec![event];
        }
    }

    let mut events = Vec::new();
    if let Some(text) = answer_text(frame) {
        events.push(StreamEvent::TextDelta { content: text });
    }

    let mut results = Vec::new();
    scan_grounding(frame, 0, &mut results);
    events.extend(results.into_iter().map(StreamEvent::Grounding));

    if events.is_empty() {
        events.push(StreamEvent::Unknown);
    }
    events
}

fn classify_typed(kind: &str, frame: &Value) -> Option<StreamEvent> {
    let event = match kind {
        "text" => StreamEvent::TextDelta {
            content: str_field(frame, "content"),
        },
        "tool_call" => match frame.get("tool").and_then(Value::as_str) {
            Some(tool) => StreamEvent::ToolCall {
                tool: tool.to_string(),
                args: frame
                    .get("args")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default())),
            },
            None => {
                debug!("tool_call frame without a tool name");
                StreamEvent::Unknown
            }
        },
        "tool_result" => match frame.get("tool").and_then(Value::as_str) {
            Some(tool) => StreamEvent::ToolResult {
                tool: tool.to_string(),
                result: frame.get("result").cloned().unwrap_or(Value::Null),
                duration_seconds: frame.get("durationSeconds").and_then(Value::as_f64),
            },
            None => {
                debug!("tool_result frame without a tool name");
                StreamEvent::Unknown
            }
        },
        "usage" => StreamEvent::Usage(TokenUsage {
            prompt_tokens: u32_field(frame, "promptTokens"),
            candidate_tokens: u32_field(frame, "candidateTokens"),
            total_tokens: u32_field(frame, "totalTokens"),
        }),
        "topology" => match serde_json::from_value::<TopologyGraph>(frame.clone()) {
            Ok(graph) => StreamEvent::Topology(graph),
            Err(e) => {
                debug!("malformed topology frame: {}", e);
                StreamEvent::Unknown
            }
        },
        "agent_transition" => match frame.get("agent").and_then(Value::as_str) {
            Some(agent) => StreamEvent::AgentTransition {
                agent: agent.to_string(),
            },
            None => {
                debug!("agent_transition frame without an agent name");
                StreamEvent::Unknown
            }
        },
        "error" => StreamEvent::Error {
            message: frame
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        },
        _ => return None,
    };
    Some(event)
}

/// Pull answer text out of either upstream schema variant.
fn answer_text(frame: &Value) -> Option<String> {
    if let Some(text) = frame.pointer("/answer/answerText").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts = frame.pointer("/content/parts")?.as_array()?;
    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(Value::as_str) {
            text.push_str(t);
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Depth-first search for citation/source collections at any nesting level.
///
/// The walk stops at string values and never descends into `text` or
/// `answerText` keys (those belong to the text rules above).
fn scan_grounding(value: &Value, depth: usize, out: &mut Vec<GroundingResult>) {
    if depth >= MAX_SCAN_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match key.as_str() {
                    "answerText" | "text" => {}
                    "citations" | "searchResults" | "groundingChunks" => {
                        collect_entries(child, out)
                    }
                    "groundingMetadata" => match child.get("groundingChunks") {
                        Some(chunks) => collect_entries(chunks, out),
                        None => scan_grounding(child, depth + 1, out),
                    },
                    _ => scan_grounding(child, depth + 1, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_grounding(item, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn collect_entries(value: &Value, out: &mut Vec<GroundingResult>) {
    let Some(entries) = value.as_array() else {
        return;
    };
    for (position, entry) in entries.iter().enumerate() {
        if let Some(result) = result_from_entry(entry, position) {
            out.push(result);
        }
    }
}

fn result_from_entry(entry: &Value, position: usize) -> Option<GroundingResult> {
    let mut result = GroundingResult {
        name: str_field(entry, "name"),
        title: str_field(entry, "title"),
        url: str_field(entry, "url"),
        snippet: str_field(entry, "snippet"),
        rank: entry.get("rank").and_then(Value::as_u64).map(|r| r as u32),
    };

    if result.identity().is_none() {
        // Gemini grounding chunks nest the source under `web` or
        // `retrievedContext`.
        let nested = entry.get("web").or_else(|| entry.get("retrievedContext"))?;
        result.url = str_field(nested, "uri");
        result.title = str_field(nested, "title");
    }

    if result.identity().is_none() {
        debug!("skipping grounding entry without name or url");
        return None;
    }
    if result.rank.is_none() {
        result.rank = Some(position as u32);
    }
    Some(result)
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn u32_field(value: &Value, key: &str) -> u32 {
    value.get(key).and_then(Value::as_u64).unwrap_or_default() as u32
}
