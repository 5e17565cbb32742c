//! Topology graph store.
//!
//! Owns the directed graph of switches, learned hosts, and port-annotated
//! links. The store knows nothing about packets or rules; the forwarding
//! engine serializes every mutation and query behind one lock so a path can
//! never reference a half-removed edge.

mod graph;
mod types;

pub use graph::TopologyGraph;
pub use types::{AttachmentChange, HostPath, LinkUpsert, NodeId, SwitchRemoval};
