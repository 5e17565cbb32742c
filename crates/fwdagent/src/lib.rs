//! fwdagent - Topology-aware forwarding engine daemon.
//!
//! Observes topology-change and packet-arrival notifications from switches,
//! maintains a live graph of switches, learned hosts, and links, and decides
//! per packet whether to flood or forward along a shortest path, installing
//! switch rules so subsequent packets of the flow bypass the controller.
//!
//! # Architecture
//!
//! ```text
//! [transport] ──events──> [FwdDaemon] ──per-switch lanes──> [ForwardingEngine]
//!                                                             │    │    │
//!                                                       [topology][fdb][flow]
//!                                                             │
//! [transport] <──commands── [CommandSink] <──────────────────┘
//! ```
//!
//! # Key components
//!
//! - [`topology::TopologyGraph`]: the directed network graph and its
//!   shortest-path query
//! - [`fdb::FdbTable`]: passive source-address learning
//! - [`forward::ForwardingEngine`]: per-packet decisions and topology event
//!   routing, with cascade invalidation of installed rules
//! - [`flow::FlowTable`]: installed-rule dedup and invalidation
//! - [`daemon::FwdDaemon`]: per-switch ordered event dispatch
//!
//! The switch-control transport and any admin/REST surface are external
//! collaborators: they feed [`fwd_orch_common::TopologyEvent`] and
//! [`fwd_orch_common::PacketIn`] values in and receive
//! [`fwd_orch_common::Command`] values out through a
//! [`fwd_orch_common::CommandSink`].

pub mod daemon;
pub mod error;
pub mod fdb;
pub mod flow;
pub mod forward;
pub mod topology;

pub use daemon::{EngineEvent, FwdDaemon, FwdDaemonConfig};
pub use error::{FwdResult, FwdagentError};
pub use forward::{Decision, FloodReason, ForwardingEngine};
