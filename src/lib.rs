//! Streaming event decoder and UI-state reconciler for agent backends.
//!
//! This crate implements:
//! - Frame extraction from chunked response bodies, in two framings:
//!   concatenated JSON objects (split anywhere across chunks) and SSE
//!   `data:` lines
//! - Classification of loose frames into a closed set of typed events
//! - Reconciliation of events into UI-facing state slices (transcript,
//!   tool ledger, token counters, workflow topology, chart override,
//!   citations) with idempotent, order-preserving merge rules
//! - A thin chunked-HTTP client wiring the above to a live backend


pub mod client;
pub mod decoder;
pub mod logging;
pub mod session;
pub mod state;
pub mod types;

pub use client::AgentClient;
pub use decoder::Framing;
pub use session::{SessionClose, StreamSession};
pub use state::SessionState;
pub use types::*;

use anyhow::Result;

/// Observer invoked for every classified event, in wire order.
///
/// Hosts inject this instead of reaching for ambient globals; returning an
/// error aborts the turn.
pub type EventCallback = Box<dyn Fn(&StreamEvent) -> Result<()> + Send + Sync>;
