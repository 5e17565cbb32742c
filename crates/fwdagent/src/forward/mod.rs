//! Forwarding decision engine and topology event router.
//!
//! The engine is the orchestrator: per packet arrival it consults the
//! learning table and the topology graph, decides between flooding and
//! forwarding, and hands install/packet-out commands to the transport sink.
//! Topology notifications mutate the graph through the same component so
//! cascade invalidation of installed rules happens at event time.

mod engine;

pub use engine::{Decision, FloodReason, ForwardingEngine};
