//! Topology graph vertex and result types.

use fwd_types::{MacAddress, PortNo, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex in the topology graph.
///
/// Switches forward; hosts are leaves hanging off their attachment switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Switch(SwitchId),
    Host(MacAddress),
}

impl NodeId {
    /// Returns true for switch vertices.
    pub fn is_switch(&self) -> bool {
        matches!(self, NodeId::Switch(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Switch(id) => write!(f, "switch/{id}"),
            NodeId::Host(mac) => write!(f, "host/{mac}"),
        }
    }
}

/// A computed minimum-hop path from a switch to a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPath {
    /// The switch sequence, starting at the querying switch and ending at
    /// the destination host's attachment switch.
    pub hops: Vec<SwitchId>,
    /// Egress port on the first switch toward the next hop (or toward the
    /// host itself when the path is a single switch).
    pub egress_port: PortNo,
}

/// Outcome of a link upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkUpsert {
    /// The edge was created.
    Added,
    /// An existing edge's port annotation was overwritten.
    Updated,
    /// One of the endpoints is not a known switch; nothing was stored.
    MissingEndpoint,
}

/// Outcome of observing or force-setting a host attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentChange {
    /// First sighting of this host anywhere.
    New,
    /// The host was attached elsewhere; the old edges were replaced.
    Moved,
    /// Same switch and port as before.
    Unchanged,
    /// The switch is not in the graph; nothing was stored.
    MissingSwitch,
}

/// Report of a cascading switch removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchRemoval {
    /// Hosts whose sole attachment was through the removed switch; their
    /// nodes were removed along with it.
    pub detached_hosts: Vec<MacAddress>,
}
