use super::chart::{chart_from_tool_result, merge_override};
use super::dedup::is_duplicate;
use super::{ErrorRecord, LedgerEntry, LedgerKind, SessionState};
use crate::types::{GroundingResult, StreamEvent, TokenUsage, TopologyGraph};
use chrono::Utc;
use tracing::{debug, trace};

impl SessionState {
    /// Apply one classified event to the state slices.
    ///
    /// Safe to call repeatedly; each slice's merge rule is idempotent or
    /// additive on its own terms, and events touching independent slices
    /// tolerate out-of-order arrival. Never fails: anything surprising is
    /// logged and absorbed.
    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { content } => self.apply_text(content),
            StreamEvent::ToolCall { tool, args } => {
                self.ledger.push(LedgerEntry {
                    kind: LedgerKind::Call,
                    tool: tool.clone(),
                    payload: args.clone(),
                    duration_seconds: None,
                });
                self.active_node = Some(tool.clone());
            }
            StreamEvent::ToolResult {
                tool,
                result,
                duration_seconds,
            } => self.apply_tool_result(tool, result, *duration_seconds),
            StreamEvent::Usage(usage) => self.apply_usage(usage),
            StreamEvent::Topology(graph) => self.apply_topology(graph),
            StreamEvent::AgentTransition { agent } => {
                self.active_node = Some(agent.clone());
            }
            StreamEvent::Grounding(result) => self.apply_grounding(result),
            StreamEvent::Error { message } => self.apply_error(message),
            StreamEvent::Unknown => trace!("ignoring unclassified frame"),
        }
    }

    /// Dual-mode text accumulation.
    ///
    /// Upstream framing is inconsistent: some backends resend the full text
    /// so far on every frame, others send only the new suffix. A frame that
    /// extends the accumulated text replaces it (cumulative mode); anything
    /// else appends, unless it exactly duplicates the current tail
    /// (re-delivery guard).
    fn apply_text(&mut self, content: &str) {
        if content.starts_with(self.draft.as_str()) {
            self.draft = content.to_string();
        } else if !self.draft.ends_with(content) {
            self.draft.push_str(content);
        } else {
            trace!("suppressing re-delivered trailing delta");
        }
    }

    /// Results pair with calls by tool name in arrival order; the wire
    /// carries no correlation id, so two in-flight calls to the same tool
    /// cannot be told apart.
    fn apply_tool_result(
        &mut self,
        tool: &str,
        result: &serde_json::Value,
        duration_seconds: Option<f64>,
    ) {
        let has_call = self
            .ledger
            .iter()
            .any(|e| e.kind == LedgerKind::Call && e.tool == tool);
        if !has_call {
            debug!("result for {} arrived without a recorded call", tool);
        }

        self.ledger.push(LedgerEntry {
            kind: LedgerKind::Result,
            tool: tool.to_string(),
            payload: result.clone(),
            duration_seconds,
        });

        if self.active_node.as_deref() == Some(tool) {
            self.active_node = None;
        }

        if let Some(incoming) = chart_from_tool_result(tool, result) {
            merge_override(&mut self.chart, incoming);
        }
    }

    fn apply_usage(&mut self, usage: &TokenUsage) {
        self.usage.accumulate(usage);
    }

    fn apply_topology(&mut self, graph: &TopologyGraph) {
        self.topology = Some(graph.clone());
    }

    /// First-seen wins: overlapping stream frames re-deliver the same
    /// citation, so an incoming record whose identity key already exists
    /// is skipped.
    fn apply_grounding(&mut self, result: &GroundingResult) {
        if result.identity().is_none() {
            debug!("dropping grounding result without an identity key");
            return;
        }
        if is_duplicate(&self.results, result, |r| {
            r.identity().map(str::to_string)
        }) {
            trace!("skipping duplicate grounding result");
            return;
        }
        self.results.push(result.clone());
    }

    /// Errors are surfaced, not swallowed: recorded in the ledger with the
    /// originating query, and appended to the draft so the failure is
    /// visible in the transcript.
    fn apply_error(&mut self, message: &str) {
        self.errors.push(ErrorRecord {
            timestamp: Utc::now(),
            query: self.current_query().to_string(),
            message: message.to_string(),
        });

        if !self.draft.is_empty() && !self.draft.ends_with('\n') {
            self.draft.push('\n');
        }
        self.draft.push_str(&format!("Error: {message}"));
    }
}
