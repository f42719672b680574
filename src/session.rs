use crate::decoder::{classify, sse, ChunkBuffer, Framing, LineBuffer};
use crate::types::StreamEvent;
use tracing::debug;

/// How a stream session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClose {
    Clean,
    /// The stream ended mid-frame; the dangling partial text was discarded,
    /// never completed or guessed.
    Truncated { discarded_bytes: usize },
}

enum FramingState {
    Json(ChunkBuffer),
    Sse(LineBuffer),
}

/// One decoding session per outstanding request.
///
/// Owns the unconsumed stream buffer exclusively; sessions must not be
/// shared across concurrent requests. All extraction and classification is
/// synchronous and happens between chunk arrivals; events come back in
/// strict wire order. Abandoning a session is simply dropping it.
pub struct StreamSession {
    framing: Framing,
    state: FramingState,
}

impl StreamSession {
    pub fn new(framing: Framing) -> Self {
        let state = match framing {
            Framing::JsonStream => FramingState::Json(ChunkBuffer::new()),
            Framing::Sse => FramingState::Sse(LineBuffer::new()),
        };
        Self { framing, state }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Feed one decoded chunk, returning every event whose frame completed.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<StreamEvent> {
        match &mut self.state {
            FramingState::Json(buffer) => {
                buffer.append(chunk);
                crate::decoder::extractor::drain(buffer)
                    .iter()
                    .flat_map(classify)
                    .collect()
            }
            FramingState::Sse(lines) => {
                let mut events = Vec::new();
                lines.push_chunk(chunk, |line| {
                    let Some(data) = sse::sse_data(line) else {
                        return;
                    };
                    match serde_json::from_str::<serde_json::Value>(data) {
                        Ok(frame) => events.extend(classify(&frame)),
                        Err(e) => debug!("dropping unparseable SSE payload: {}", e),
                    }
                });
                events
            }
        }
    }

    /// Close the session. A leftover partial frame is reported and
    /// discarded; whatever was already reconciled stands.
    pub fn finish(mut self) -> SessionClose {
        let leftover = match &mut self.state {
            FramingState::Json(buffer) => buffer.take_remainder(),
            FramingState::Sse(lines) => lines.take_remainder(),
        };
        if leftover.trim().is_empty() {
            SessionClose::Clean
        } else {
            debug!(
                "stream ended mid-frame, discarding {} bytes of partial tail",
                leftover.len()
            );
            SessionClose::Truncated {
                discarded_bytes: leftover.len(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LedgerKind, SessionState};
    use crate::state::{ChartOverride, PricePoint, Series};

    /// Two chunks, frames split across the boundary, driving every slice:
    /// text split around a tool round-trip that also maps onto a chart.
    #[test]
    fn json_stream_round_trip() {
        let chunk1 = concat!(
            r#"{"type":"text","content":"Rev"}"#,
            r#"{"type":"tool_call","tool":"FactSet_GlobalPrices","args":{"ticker":"NVDA"}}"#
        );
        let chunk2 = concat!(
            r#"{"type":"tool_result","tool":"FactSet_GlobalPrices","result":{"data":[{"requestId":"NVDA-US","date":"2024-01-01","close":500}]}}"#,
            r#"{"type":"text","content":"enue grew."}"#
        );

        let mut session = StreamSession::new(Framing::JsonStream);
        let mut state = SessionState::new();
        state.begin_turn("How is NVDA doing?");

        for chunk in [chunk1, chunk2] {
            for event in session.push_chunk(chunk) {
                state.apply(&event);
            }
        }
        assert_eq!(session.finish(), SessionClose::Clean);

        assert_eq!(state.draft, "Revenue grew.");
        assert_eq!(state.ledger.len(), 2);
        assert_eq!(state.ledger[0].kind, LedgerKind::Call);
        assert_eq!(state.ledger[0].tool, "FactSet_GlobalPrices");
        assert_eq!(state.ledger[1].kind, LedgerKind::Result);
        assert_eq!(state.active_node, None);
        assert_eq!(
            state.chart,
            Some(ChartOverride::Line {
                series: vec![Series {
                    ticker: "NVDA".to_string(),
                    history: vec![PricePoint {
                        date: "2024-01-01".to_string(),
                        close: 500.0,
                    }],
                }],
            })
        );
    }

    #[test]
    fn frame_split_mid_object_across_chunks() {
        let mut session = StreamSession::new(Framing::JsonStream);
        let events1 = session.push_chunk(r#"{"type":"text","con"#);
        assert!(events1.is_empty());
        let events2 = session.push_chunk(r#"tent":"hello"}"#);
        assert_eq!(
            events2,
            vec![crate::types::StreamEvent::TextDelta {
                content: "hello".to_string()
            }]
        );
    }

    #[test]
    fn sse_mode_parses_data_lines() {
        let mut session = StreamSession::new(Framing::Sse);
        let events = session.push_chunk(
            "data: {\"type\":\"text\",\"content\":\"hi\"}\ndata: {\"type\":\"usage\",\"promptTokens\":3,\"candidateTokens\":1,\"totalTokens\":4}\n",
        );
        assert_eq!(events.len(), 2);
        assert_eq!(session.finish(), SessionClose::Clean);
    }

    #[test]
    fn sse_bad_payload_does_not_stall_stream() {
        let mut session = StreamSession::new(Framing::Sse);
        let events = session
            .push_chunk("data: {not json}\ndata: {\"type\":\"text\",\"content\":\"ok\"}\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn finish_reports_truncated_tail() {
        let mut session = StreamSession::new(Framing::JsonStream);
        session.push_chunk(r#"{"type":"text","content":"done"}{"type":"tool_"#);
        assert!(matches!(
            session.finish(),
            SessionClose::Truncated { discarded_bytes } if discarded_bytes > 0
        ));
    }
}
