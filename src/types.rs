use serde::{Deserialize, Serialize};

/// Running token counters for a conversation turn.
///
/// Counters are additive: every `usage` frame on the wire carries partial
/// counts that accumulate into these totals.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct TokenUsage {
    #[serde(rename = "promptTokens", default)]
    pub prompt_tokens: u32,
    #[serde(rename = "candidateTokens", default)]
    pub candidate_tokens: u32,
    #[serde(rename = "totalTokens", default)]
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn zero() -> Self {
        TokenUsage {
            prompt_tokens: 0,
            candidate_tokens: 0,
            total_tokens: 0,
        }
    }

    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.candidate_tokens += other.candidate_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TopologyNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "agentType", skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
}

/// Workflow graph pushed by the orchestrator. Replaced wholesale, never
/// merged.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct TopologyGraph {
    #[serde(default)]
    pub nodes: Vec<TopologyNode>,
    #[serde(default)]
    pub edges: Vec<TopologyEdge>,
}

/// A citation/source record discovered in search or answer payloads.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct GroundingResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

impl GroundingResult {
    /// Stable identity key: `name`, falling back to `url`. Records without
    /// either cannot be deduplicated and have no identity.
    pub fn identity(&self) -> Option<&str> {
        if !self.name.is_empty() {
            Some(&self.name)
        } else if !self.url.is_empty() {
            Some(&self.url)
        } else {
            None
        }
    }
}

/// A classified, typed interpretation of one wire frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental (or cumulative, depending on the backend) answer text.
    TextDelta { content: String },
    /// An agent-initiated tool invocation.
    ToolCall {
        tool: String,
        args: serde_json::Value,
    },
    /// Completion of a tool invocation, paired with the call by tool name
    /// in arrival order. The wire carries no correlation id.
    ToolResult {
        tool: String,
        result: serde_json::Value,
        duration_seconds: Option<f64>,
    },
    Usage(TokenUsage),
    Topology(TopologyGraph),
    /// A new agent became active; used for live node highlighting.
    AgentTransition { agent: String },
    Grounding(GroundingResult),
    /// Upstream-declared failure. Surfaced to the user, does not stop the
    /// stream.
    Error { message: String },
    /// Frame matched no known shape. Ignored by the reconciler.
    Unknown,
}

/// Transport errors for the chunked-HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
