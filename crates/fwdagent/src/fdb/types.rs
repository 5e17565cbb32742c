//! Host learning types.

use fwd_types::{PortNo, SwitchId};
use serde::{Deserialize, Serialize};

/// Where a host's traffic was most recently seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Switch the traffic arrived at.
    pub switch: SwitchId,
    /// Ingress port on that switch.
    pub port: PortNo,
}

impl Attachment {
    /// Creates an attachment record.
    pub fn new(switch: SwitchId, port: PortNo) -> Self {
        Self { switch, port }
    }
}

/// What an observation did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Learn {
    /// First sighting of this address.
    NewHost,
    /// The address was attached elsewhere before; `from` is the stale spot.
    Moved { from: Attachment },
    /// Same attachment as already recorded.
    Refreshed,
}

impl Learn {
    /// Returns true on the first sighting of an address.
    pub fn is_new(&self) -> bool {
        matches!(self, Learn::NewHost)
    }
}

/// Running counters for the learning table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdbStats {
    /// Addresses seen for the first time.
    pub hosts_learned: u64,
    /// Attachment changes (different switch or port).
    pub moves: u64,
    /// Observations that matched the recorded attachment.
    pub refreshes: u64,
}
