//! UI-facing state slices and the reconciliation rules that mutate them.

pub mod chart;
pub mod dedup;
pub mod reconciler;


pub use chart::{ChartOverride, DataPoint, PricePoint, Series};

use crate::types::{GroundingResult, TokenUsage, TopologyGraph};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(rename = "toolsUsed", skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
    #[serde(rename = "latencyMs", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Call,
    Result,
}

/// Append-ordered record of tool activity for one turn. Entries are never
/// deduplicated; repeated calls to the same tool are all recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub kind: LedgerKind,
    pub tool: String,
    pub payload: serde_json::Value,
    #[serde(rename = "durationSeconds", skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    /// The user query that was in flight when the error arrived.
    pub query: String,
    pub message: String,
}

/// The reconciled state slices one UI context owns.
///
/// Slices are mutated only by the reconciler; between reconciliation calls
/// the presentation layer must treat them as read-only snapshots. The
/// slices outlive any single stream session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub messages: Vec<ChatMessage>,
    /// Accumulated text of the in-progress assistant message.
    pub draft: String,
    pub ledger: Vec<LedgerEntry>,
    pub usage: TokenUsage,
    /// Currently highlighted agent/tool node, if any.
    pub active_node: Option<String>,
    pub topology: Option<TopologyGraph>,
    pub chart: Option<ChartOverride>,
    /// Citation/source records, deduplicated by identity key.
    pub results: Vec<GroundingResult>,
    pub errors: Vec<ErrorRecord>,

    current_query: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new conversation turn: record the user message and reset
    /// the per-turn slices. This is the only place counters reset.
    pub fn begin_turn(&mut self, query: &str) {
        self.messages.push(ChatMessage {
            role: Role::User,
            text: query.to_string(),
            sources: None,
            tools_used: None,
            latency_ms: None,
        });
        self.current_query = query.to_string();
        self.draft.clear();
        self.ledger.clear();
        self.results.clear();
        self.chart = None;
        self.active_node = None;
        self.usage = TokenUsage::zero();
    }

    /// Fold the in-progress draft into the transcript with the metadata
    /// gathered during the turn.
    pub fn finish_turn(&mut self, latency_ms: Option<u64>) {
        let sources: Vec<String> = self
            .results
            .iter()
            .filter_map(|r| r.identity().map(str::to_string))
            .collect();

        let mut tools_used: Vec<String> = Vec::new();
        for entry in &self.ledger {
            if entry.kind == LedgerKind::Call && !tools_used.contains(&entry.tool) {
                tools_used.push(entry.tool.clone());
            }
        }

        self.messages.push(ChatMessage {
            role: Role::Assistant,
            text: std::mem::take(&mut self.draft),
            sources: if sources.is_empty() {
                None
            } else {
                Some(sources)
            },
            tools_used: if tools_used.is_empty() {
                None
            } else {
                Some(tools_used)
            },
            latency_ms,
        });
        self.active_node = None;
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }
}
