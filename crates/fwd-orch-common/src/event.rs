//! Inbound notifications from the switch-control transport.

use fwd_types::{MacAddress, PortNo, SwitchId};
use serde::{Deserialize, Serialize};

/// Topology-change notification.
///
/// Link events are directional: a symmetric physical link is reported as two
/// events (one per direction), each carrying the egress port on its own
/// source switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyEvent {
    /// A switch completed its feature handshake and is under control.
    SwitchJoined { switch: SwitchId },
    /// A switch disconnected.
    SwitchLeft { switch: SwitchId },
    /// A directed link appeared (or its egress port changed).
    LinkUp {
        src: SwitchId,
        dst: SwitchId,
        src_port: PortNo,
    },
    /// A directed link disappeared.
    LinkDown { src: SwitchId, dst: SwitchId },
}

impl TopologyEvent {
    /// The switch whose ordered event lane this notification belongs to.
    ///
    /// Link events order on their source switch; per-switch ordering is the
    /// dispatcher's delivery guarantee.
    pub fn ordering_switch(&self) -> SwitchId {
        match self {
            TopologyEvent::SwitchJoined { switch } | TopologyEvent::SwitchLeft { switch } => {
                *switch
            }
            TopologyEvent::LinkUp { src, .. } | TopologyEvent::LinkDown { src, .. } => *src,
        }
    }
}

/// The triggering packet of a packet-arrival notification.
///
/// Switches either buffer the packet and hand the controller a buffer id, or
/// ship the raw bytes when no buffer is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketPayload {
    /// The packet is held in the switch's buffer.
    Buffered(u32),
    /// The full packet bytes, for bufferless switches.
    Raw(Vec<u8>),
}

/// A packet-arrival notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketIn {
    /// Switch the packet arrived at.
    pub switch: SwitchId,
    /// Ingress port.
    pub in_port: PortNo,
    /// Source link-layer address.
    pub src: MacAddress,
    /// Destination link-layer address.
    pub dst: MacAddress,
    /// Buffer reference or raw bytes of the triggering packet.
    pub payload: PacketPayload,
}
